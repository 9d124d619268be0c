//! Headless rendering layer.
//!
//! A [`Stage`] owns [`StageNode`]s the way a real renderer would own its scene
//! nodes, and hands out weak [`ElementRef`]s to the engine. The command line
//! driver and the test-suite use it in place of an on-screen renderer.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use serde::{Deserialize, Serialize};

use crate::element::{BoundingBox, ElementRef, Renderable, Transform};

/// In-memory node with a fixed layout slot and a mutable transform.
#[derive(Debug)]
pub struct StageNode {
    name: String,
    layout: BoundingBox,
    mounted: bool,
    transform: Transform,
    bounds_queries: Cell<usize>,
}

impl StageNode {
    pub fn new(name: impl Into<String>, layout: BoundingBox) -> Self {
        Self {
            name: name.into(),
            layout,
            mounted: true,
            transform: Transform::IDENTITY,
            bounds_queries: Cell::new(0),
        }
    }

    /// Convenience constructor returning the node in its shared form.
    pub fn shared(name: impl Into<String>, layout: BoundingBox) -> Rc<RefCell<StageNode>> {
        Rc::new(RefCell::new(Self::new(name, layout)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> BoundingBox {
        self.layout
    }

    /// Moves the node to a new layout slot, as a re-render after a swap would.
    pub fn set_layout(&mut self, layout: BoundingBox) {
        self.layout = layout;
    }

    pub fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }

    /// Number of times the node's on-screen bounds were queried.
    pub fn bounds_queries(&self) -> usize {
        self.bounds_queries.get()
    }
}

impl Renderable for StageNode {
    fn transform(&self) -> Transform {
        self.transform
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Layout slot offset by the current translation, like a browser's client
    /// rect. Scale and rotation are ignored.
    fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounds_queries.set(self.bounds_queries.get() + 1);
        if !self.mounted {
            return None;
        }
        Some(BoundingBox {
            left: self.layout.left + self.transform.x,
            top: self.layout.top + self.transform.y,
            ..self.layout
        })
    }
}

/// Serializable view of a node's pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub name: String,
    pub layout: BoundingBox,
    pub transform: Transform,
}

/// Owner of every headless node.
#[derive(Debug, Default)]
pub struct Stage {
    nodes: Vec<Rc<RefCell<StageNode>>>,
}

impl Stage {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Adds a node and returns the engine-facing handle to it.
    pub fn add(&mut self, name: impl Into<String>, layout: BoundingBox) -> ElementRef {
        let node = StageNode::shared(name, layout);
        let element = ElementRef::new(&node);
        self.nodes.push(node);
        element
    }

    /// Looks up a node by name.
    pub fn element(&self, name: &str) -> Option<ElementRef> {
        self.node(name).map(|node| ElementRef::new(&node))
    }

    pub fn node(&self, name: &str) -> Option<Rc<RefCell<StageNode>>> {
        self.nodes
            .iter()
            .find(|node| node.borrow().name == name)
            .cloned()
    }

    /// Drops the stage's ownership of a node. Handles held by the engine go
    /// inert once no other owner remains.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|node| node.borrow().name != name);
        self.nodes.len() != before
    }

    /// Exchanges the layout slots of two nodes, mirroring the re-render the
    /// puzzle performs once a swap is committed.
    pub fn swap_layouts(&mut self, a: &str, b: &str) -> bool {
        let (Some(a), Some(b)) = (self.node(a), self.node(b)) else {
            return false;
        };
        if Rc::ptr_eq(&a, &b) {
            return true;
        }
        let mut a = a.borrow_mut();
        let mut b = b.borrow_mut();
        std::mem::swap(&mut a.layout, &mut b.layout);
        true
    }

    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        self.nodes
            .iter()
            .map(|node| {
                let node = node.borrow();
                NodeSnapshot {
                    name: node.name.clone(),
                    layout: node.layout,
                    transform: node.transform,
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
