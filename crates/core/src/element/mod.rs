//! Handles to renderable nodes and the transform state they expose.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use serde::{Deserialize, Serialize};

/// Live transform snapshot of an element.
///
/// `tilt` is the decorative rotation channel and `opacity` has a channel of
/// its own; every other field belongs to the primary channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale: f32,
    pub opacity: f32,
    pub tilt: f32,
}

impl Transform {
    /// The resting pose: untranslated, unrotated, full scale and opacity.
    pub const IDENTITY: Transform = Transform {
        x: 0.0,
        y: 0.0,
        rotation: 0.0,
        scale: 1.0,
        opacity: 1.0,
        tilt: 0.0,
    };

    /// Returns the value of a single property.
    pub fn get(&self, property: Property) -> f32 {
        match property {
            Property::X => self.x,
            Property::Y => self.y,
            Property::Rotation => self.rotation,
            Property::Scale => self.scale,
            Property::Opacity => self.opacity,
            Property::Tilt => self.tilt,
        }
    }

    /// Overwrites a single property.
    pub fn set(&mut self, property: Property, value: f32) {
        match property {
            Property::X => self.x = value,
            Property::Y => self.y = value,
            Property::Rotation => self.rotation = value,
            Property::Scale => self.scale = value,
            Property::Opacity => self.opacity = value,
            Property::Tilt => self.tilt = value,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Animatable transform properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    X,
    Y,
    Rotation,
    Scale,
    Opacity,
    Tilt,
}

impl Property {
    pub const ALL: [Property; 6] = [
        Property::X,
        Property::Y,
        Property::Rotation,
        Property::Scale,
        Property::Opacity,
        Property::Tilt,
    ];

    /// The channel that owns writes to this property.
    pub fn channel(self) -> Channel {
        match self {
            Property::Opacity => Channel::Opacity,
            Property::Tilt => Channel::Decorative,
            _ => Channel::Primary,
        }
    }
}

/// Motion channel of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Translation, scale and structural rotation. Exclusive per element: the
    /// most recently started primary timeline wins.
    Primary,
    /// Opacity. Exclusive per element, independent of the primary channel.
    Opacity,
    /// Decorative rotation (liquid tilt). May run alongside a primary timeline.
    Decorative,
}

impl Channel {
    /// Whether a newer timeline on this channel takes the element over.
    pub fn is_exclusive(self) -> bool {
        !matches!(self, Channel::Decorative)
    }
}

/// Partial transform a phase animates towards. Unset fields are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyTargets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt: Option<f32>,
}

impl PropertyTargets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_x(mut self, x: f32) -> Self {
        self.x = Some(x);
        self
    }

    pub fn with_y(mut self, y: f32) -> Self {
        self.y = Some(y);
        self
    }

    pub fn with_translate(self, x: f32, y: f32) -> Self {
        self.with_x(x).with_y(y)
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_tilt(mut self, tilt: f32) -> Self {
        self.tilt = Some(tilt);
        self
    }

    /// Returns the target for one property, if set.
    pub fn get(&self, property: Property) -> Option<f32> {
        match property {
            Property::X => self.x,
            Property::Y => self.y,
            Property::Rotation => self.rotation,
            Property::Scale => self.scale,
            Property::Opacity => self.opacity,
            Property::Tilt => self.tilt,
        }
    }

    /// Iterates the properties that carry a target value.
    pub fn iter(&self) -> impl Iterator<Item = (Property, f32)> + '_ {
        Property::ALL
            .into_iter()
            .filter_map(move |property| self.get(property).map(|value| (property, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Returns true when every set property belongs to `channel`.
    pub fn confined_to(&self, channel: Channel) -> bool {
        self.iter().all(|(property, _)| property.channel() == channel)
    }

    /// Writes every target straight onto `transform`.
    pub fn apply_to(&self, transform: &mut Transform) {
        for (property, value) in self.iter() {
            transform.set(property, value);
        }
    }
}

/// On-screen bounding box in layout pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Capability implemented by the rendering layer for every animatable node.
pub trait Renderable {
    /// Current transform state of the node.
    fn transform(&self) -> Transform;

    /// Replaces the node's transform state.
    fn set_transform(&mut self, transform: Transform);

    /// Current on-screen bounds, or `None` when the node is not mounted.
    fn bounding_box(&self) -> Option<BoundingBox>;
}

/// Shared ownership form the rendering layer keeps its nodes in.
pub type SharedRenderable = Rc<RefCell<dyn Renderable>>;

/// Stable identity of a referenced node, valid while the node is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(usize);

/// Weak handle the engine keeps to a node owned by the rendering layer.
///
/// Every accessor silently does nothing once the node has been dropped.
#[derive(Clone)]
pub struct ElementRef {
    key: ElementKey,
    node: Weak<RefCell<dyn Renderable>>,
}

impl ElementRef {
    pub fn new<R: Renderable + 'static>(node: &Rc<RefCell<R>>) -> Self {
        let weak: Weak<RefCell<R>> = Rc::downgrade(node);
        let weak: Weak<RefCell<dyn Renderable>> = weak;
        Self {
            key: ElementKey(Rc::as_ptr(node) as *const () as usize),
            node: weak,
        }
    }

    /// Builds a handle from an already type-erased node.
    pub fn from_shared(node: &SharedRenderable) -> Self {
        Self {
            key: ElementKey(Rc::as_ptr(node) as *const () as usize),
            node: Rc::downgrade(node),
        }
    }

    pub fn key(&self) -> ElementKey {
        self.key
    }

    /// Returns true while the rendering layer still owns the node.
    pub fn is_alive(&self) -> bool {
        self.node.strong_count() > 0
    }

    /// Reads the current transform, if the node is alive and not borrowed.
    pub fn transform(&self) -> Option<Transform> {
        let node = self.node.upgrade()?;
        let node = node.try_borrow().ok()?;
        Some(node.transform())
    }

    /// Applies `update` to the node's transform. Returns false when the node is
    /// gone or already borrowed elsewhere.
    pub fn update(&self, update: impl FnOnce(&mut Transform)) -> bool {
        let Some(node) = self.node.upgrade() else {
            return false;
        };
        let Ok(mut node) = node.try_borrow_mut() else {
            return false;
        };
        let mut transform = node.transform();
        update(&mut transform);
        node.set_transform(transform);
        true
    }

    /// Queries the node's on-screen bounds.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let node = self.node.upgrade()?;
        let node = node.try_borrow().ok()?;
        node.bounding_box()
    }
}

impl PartialEq for ElementRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && Weak::ptr_eq(&self.node, &other.node)
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("key", &self.key)
            .field("alive", &self.is_alive())
            .finish()
    }
}
