//! Live geometry capture for gestures that depend on layout.

use serde::{Deserialize, Serialize};

use crate::element::{BoundingBox, ElementRef};

/// Translation vector between two elements, captured once per gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SwapDelta {
    pub dx: f32,
    pub dy: f32,
}

impl SwapDelta {
    pub const ZERO: SwapDelta = SwapDelta { dx: 0.0, dy: 0.0 };

    /// Delta that carries `from` onto `to`.
    pub fn between(from: BoundingBox, to: BoundingBox) -> Self {
        Self {
            dx: to.left - from.left,
            dy: to.top - from.top,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    /// The same displacement in the opposite direction.
    pub fn inverted(&self) -> Self {
        Self {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}

/// Reads on-screen bounds at the instant a gesture is requested.
#[derive(Debug, Default, Clone)]
pub struct GeometryResolver;

impl GeometryResolver {
    pub fn new() -> Self {
        Self
    }

    /// Snapshot of the element's bounds, or `None` when it is not mounted or
    /// has been dropped.
    pub fn snapshot(&self, element: &ElementRef) -> Option<BoundingBox> {
        let bounds = element.bounding_box()?;
        let finite = [bounds.left, bounds.top, bounds.width, bounds.height]
            .iter()
            .all(|v| v.is_finite());
        finite.then_some(bounds)
    }

    /// Delta from `a`'s position to `b`'s. Each element is queried exactly
    /// once; missing geometry on either side yields [`SwapDelta::ZERO`].
    pub fn swap_delta(&self, a: &ElementRef, b: &ElementRef) -> SwapDelta {
        let from = self.snapshot(a);
        let to = self.snapshot(b);
        match (from, to) {
            (Some(from), Some(to)) => SwapDelta::between(from, to),
            _ => {
                tracing::debug!(
                    a_mounted = from.is_some(),
                    b_mounted = to.is_some(),
                    "geometry unavailable, swapping in place"
                );
                SwapDelta::ZERO
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Stage;

    #[test]
    fn computes_delta_from_left_and_top() {
        let mut stage = Stage::new();
        let a = stage.add("a", BoundingBox::new(0.0, 100.0, 40.0, 80.0));
        let b = stage.add("b", BoundingBox::new(80.0, 100.0, 40.0, 80.0));

        let delta = GeometryResolver::new().swap_delta(&a, &b);
        assert_eq!(delta, SwapDelta { dx: 80.0, dy: 0.0 });
        assert_eq!(delta.inverted(), SwapDelta { dx: -80.0, dy: 0.0 });
    }

    #[test]
    fn queries_each_element_once() {
        let mut stage = Stage::new();
        let a = stage.add("a", BoundingBox::new(0.0, 0.0, 40.0, 80.0));
        let b = stage.add("b", BoundingBox::new(0.0, 120.0, 40.0, 80.0));

        GeometryResolver::new().swap_delta(&a, &b);
        assert_eq!(stage.node("a").unwrap().borrow().bounds_queries(), 1);
        assert_eq!(stage.node("b").unwrap().borrow().bounds_queries(), 1);
    }

    #[test]
    fn unmounted_element_yields_zero_delta() {
        let mut stage = Stage::new();
        let a = stage.add("a", BoundingBox::new(0.0, 0.0, 40.0, 80.0));
        let b = stage.add("b", BoundingBox::new(200.0, 0.0, 40.0, 80.0));
        stage.node("b").unwrap().borrow_mut().set_mounted(false);

        assert!(GeometryResolver::new().swap_delta(&a, &b).is_zero());
    }
}
