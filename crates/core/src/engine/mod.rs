//! Gesture facade exposed to the puzzle UI.
//!
//! Every operation is total: absent or dropped targets produce a
//! [`Completion::Skipped`](crate::Completion::Skipped) handle, and missing
//! geometry degrades a swap to an in-place lift and land.

use crate::{
    config::MotionConfig,
    element::ElementRef,
    geometry::GeometryResolver,
    profile::MotionProfiles,
    scheduler::{MotionHandle, Scheduler},
    secondary::{SecondaryMotion, SloshKind},
    timeline::Timeline,
};

/// Upper bound on simulated time for [`AnimationEngine::settle`].
const SETTLE_LIMIT_SECONDS: f32 = 30.0;

#[derive(Debug)]
pub struct AnimationEngine {
    profiles: MotionProfiles,
    secondary: SecondaryMotion,
    geometry: GeometryResolver,
    scheduler: Scheduler,
}

impl AnimationEngine {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            secondary: SecondaryMotion::new(config.slosh.clone()),
            profiles: MotionProfiles::new(config),
            geometry: GeometryResolver::new(),
            scheduler: Scheduler::new(),
        }
    }

    pub fn profiles(&self) -> &MotionProfiles {
        &self.profiles
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Advances the shared animation clock.
    pub fn tick(&mut self, dt: f32) {
        self.scheduler.tick(dt);
    }

    /// Ticks with a fixed step until no timeline is active. Returns the
    /// simulated time spent.
    pub fn settle(&mut self, step: f32) -> f32 {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            1.0 / 60.0
        };
        let mut elapsed = 0.0;
        while !self.scheduler.is_idle() && elapsed < SETTLE_LIMIT_SECONDS {
            self.scheduler.tick(step);
            elapsed += step;
        }
        elapsed
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    pub fn active_timelines(&self) -> usize {
        self.scheduler.active_count()
    }

    /// Cancels every running timeline. The engine stays usable afterwards.
    pub fn dispose(&mut self) {
        tracing::debug!(active = self.active_timelines(), "disposing animation engine");
        self.scheduler.cancel_all();
    }

    pub fn hover(&mut self, element: Option<&ElementRef>, hovering: bool) -> MotionHandle {
        let Some(element) = live(element) else {
            return MotionHandle::skipped();
        };
        tracing::trace!(hovering, "hover");
        let timeline = self.profiles.hover(element, hovering);
        self.start(timeline)
    }

    pub fn select(&mut self, element: Option<&ElementRef>) -> MotionHandle {
        let Some(element) = live(element) else {
            return MotionHandle::skipped();
        };
        tracing::trace!("select");
        let timeline = self.profiles.select(element);
        self.start(timeline)
    }

    pub fn deselect(&mut self, element: Option<&ElementRef>) -> MotionHandle {
        let Some(element) = live(element) else {
            return MotionHandle::skipped();
        };
        tracing::trace!("deselect");
        let timeline = self.profiles.deselect(element);
        self.start(timeline)
    }

    /// Snaps the element into its selected or rest pose without tweening,
    /// overriding any primary gesture in flight.
    pub fn set_immediate_state(&mut self, element: Option<&ElementRef>, selected: bool) {
        let Some(element) = live(element) else {
            return;
        };
        let pose = self.profiles.selection_pose(selected);
        self.scheduler.apply_now(element, &pose);
    }

    /// Exchanges two elements. Decorative handles, when given, get a swap
    /// slosh that lasts as long as the exchange and is not awaited.
    pub fn swap(
        &mut self,
        a: Option<&ElementRef>,
        b: Option<&ElementRef>,
        decorative_a: Option<&ElementRef>,
        decorative_b: Option<&ElementRef>,
    ) -> MotionHandle {
        let (Some(a), Some(b)) = (live(a), live(b)) else {
            return MotionHandle::skipped();
        };

        let delta = self.geometry.swap_delta(a, b);
        tracing::debug!(dx = delta.dx, dy = delta.dy, "swap");
        let timeline = self.profiles.swap(a, b, delta);
        let span = timeline.duration();
        let handle = self.start(timeline);

        let intensity = self.profiles.config().swap.slosh_intensity;
        for liquid in [decorative_a, decorative_b].into_iter().flatten() {
            self.secondary.start(
                &mut self.scheduler,
                liquid,
                intensity,
                SloshKind::Swap,
                Some(span),
            );
        }

        handle
    }

    /// Decorative tilt on a liquid element.
    pub fn slosh(
        &mut self,
        liquid: Option<&ElementRef>,
        intensity: Option<f32>,
        kind: SloshKind,
    ) -> MotionHandle {
        let Some(liquid) = live(liquid) else {
            return MotionHandle::skipped();
        };
        let intensity = intensity.unwrap_or(self.secondary_default_intensity());
        self.secondary
            .start(&mut self.scheduler, liquid, intensity, kind, None)
    }

    /// Brief scale-up of the row container. Always lands at the configured
    /// base scale, so back-to-back pulses never leave the row enlarged.
    pub fn pulse(&mut self, row: Option<&ElementRef>) -> MotionHandle {
        let Some(row) = live(row) else {
            return MotionHandle::skipped();
        };
        let timeline = self.profiles.pulse(row);
        self.start(timeline)
    }

    /// Staggered jiggle across every live element, settled by one handle.
    pub fn win_celebration(&mut self, elements: &[ElementRef]) -> MotionHandle {
        let alive: Vec<ElementRef> = elements
            .iter()
            .filter(|element| element.is_alive())
            .cloned()
            .collect();
        if alive.is_empty() {
            return MotionHandle::skipped();
        }
        tracing::debug!(count = alive.len(), "win celebration");
        let timeline = self.profiles.win_celebration(&alive);
        self.start(timeline)
    }

    pub fn fade_overlay(&mut self, overlay: Option<&ElementRef>, visible: bool) -> MotionHandle {
        let Some(overlay) = live(overlay) else {
            return MotionHandle::skipped();
        };
        let timeline = self.profiles.fade(overlay, visible);
        self.start(timeline)
    }

    fn secondary_default_intensity(&self) -> f32 {
        self.profiles.config().slosh.default_intensity
    }

    fn start(&mut self, timeline: Timeline) -> MotionHandle {
        let (_, handle) = self.scheduler.start(timeline);
        handle
    }
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

fn live(element: Option<&ElementRef>) -> Option<&ElementRef> {
    element.filter(|element| element.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        element::{BoundingBox, Transform},
        render::Stage,
        scheduler::Completion,
    };

    const STEP: f32 = 1.0 / 60.0;

    fn pose(element: &ElementRef) -> Transform {
        element.transform().expect("element should be alive")
    }

    fn run(engine: &mut AnimationEngine, seconds: f32) {
        let steps = (seconds / STEP).round() as usize;
        for _ in 0..steps {
            engine.tick(STEP);
        }
    }

    fn pair(left_a: f32, top_a: f32, left_b: f32, top_b: f32) -> (Stage, ElementRef, ElementRef) {
        let mut stage = Stage::new();
        let a = stage.add("a", BoundingBox::new(left_a, top_a, 40.0, 80.0));
        let b = stage.add("b", BoundingBox::new(left_b, top_b, 40.0, 80.0));
        (stage, a, b)
    }

    #[test]
    fn fade_in_then_out_leaves_overlay_transparent() {
        let mut stage = Stage::new();
        let overlay = stage.add("overlay", BoundingBox::default());
        overlay.update(|t| t.opacity = 0.0);
        let mut engine = AnimationEngine::default();

        let shown = engine.fade_overlay(Some(&overlay), true);
        engine.settle(STEP);
        assert_eq!(pose(&overlay).opacity, 1.0);
        assert_eq!(shown.state(), Completion::Finished);

        engine.fade_overlay(Some(&overlay), false);
        engine.settle(STEP);
        assert_eq!(pose(&overlay).opacity, 0.0);
    }

    #[test]
    fn hover_on_then_off_restores_rest_pose() {
        let (_stage, a, _) = pair(0.0, 0.0, 80.0, 0.0);
        let mut engine = AnimationEngine::default();

        engine.hover(Some(&a), true);
        engine.settle(STEP);
        let lifted = pose(&a);
        assert_eq!(lifted.y, -6.0);
        assert_eq!(lifted.scale, 1.08);
        assert_eq!(lifted.rotation, 1.0);

        engine.hover(Some(&a), false);
        engine.settle(STEP);
        let rest = pose(&a);
        assert_eq!((rest.y, rest.scale, rest.rotation), (0.0, 1.0, 0.0));
    }

    #[test]
    fn hover_off_mid_flight_still_lands_at_rest() {
        let (_stage, a, _) = pair(0.0, 0.0, 80.0, 0.0);
        let mut engine = AnimationEngine::default();

        let on = engine.hover(Some(&a), true);
        run(&mut engine, 0.05);
        engine.hover(Some(&a), false);
        assert_eq!(on.state(), Completion::Overridden);

        engine.settle(STEP);
        let rest = pose(&a);
        assert_eq!((rest.y, rest.scale, rest.rotation), (0.0, 1.0, 0.0));
    }

    #[test]
    fn swap_settles_to_clean_pose_for_any_layout() {
        let layouts = [
            (0.0, 100.0, 80.0, 100.0),
            (300.0, 20.0, -40.0, 250.0),
            (12.5, 0.0, 12.5, 0.0),
        ];
        for (la, ta, lb, tb) in layouts {
            let (_stage, a, b) = pair(la, ta, lb, tb);
            let mut engine = AnimationEngine::default();
            let handle = engine.swap(Some(&a), Some(&b), None, None);
            engine.settle(STEP);

            for element in [&a, &b] {
                let p = pose(element);
                assert_eq!((p.x, p.y, p.scale, p.rotation), (0.0, 0.0, 1.0, 0.0));
            }
            assert_eq!(handle.state(), Completion::Finished);
        }
    }

    #[test]
    fn swap_crosses_by_captured_delta_then_resets() {
        let (_stage, a, b) = pair(0.0, 100.0, 80.0, 100.0);
        let mut engine = AnimationEngine::default();
        engine.swap(Some(&a), Some(&b), None, None);

        // Crossing ends at 0.29s; landing only touches y and scale.
        engine.tick(0.3);
        assert_eq!(pose(&a).x, 80.0);
        assert_eq!(pose(&b).x, -80.0);

        engine.settle(STEP);
        assert_eq!(pose(&a).x, 0.0);
        assert_eq!(pose(&b).x, 0.0);
    }

    #[test]
    fn swap_ignores_layout_shifts_after_invocation() {
        let (stage, a, b) = pair(0.0, 100.0, 80.0, 100.0);
        let mut engine = AnimationEngine::default();
        engine.swap(Some(&a), Some(&b), None, None);

        stage
            .node("b")
            .unwrap()
            .borrow_mut()
            .set_layout(BoundingBox::new(500.0, 100.0, 40.0, 80.0));
        engine.tick(0.3);
        assert_eq!(pose(&a).x, 80.0);
        assert_eq!(stage.node("a").unwrap().borrow().bounds_queries(), 1);
    }

    #[test]
    fn swap_without_decorations_still_moves_both() {
        let (_stage, a, b) = pair(0.0, 0.0, 120.0, 0.0);
        let mut engine = AnimationEngine::default();
        let handle = engine.swap(Some(&a), Some(&b), None, None);
        assert_eq!(engine.active_timelines(), 1);

        run(&mut engine, 0.2);
        assert!(pose(&a).x > 0.0);
        assert!(pose(&b).x < 0.0);
        assert!(pose(&a).y < 0.0);
        engine.settle(STEP);
        assert_eq!(handle.state(), Completion::Finished);
    }

    #[test]
    fn swap_without_geometry_lifts_in_place() {
        let (stage, a, b) = pair(0.0, 0.0, 120.0, 0.0);
        stage.node("a").unwrap().borrow_mut().set_mounted(false);
        let mut engine = AnimationEngine::default();
        engine.swap(Some(&a), Some(&b), None, None);

        run(&mut engine, 0.2);
        assert_eq!(pose(&a).x, 0.0);
        assert_eq!(pose(&b).x, 0.0);
        assert!(pose(&a).y < 0.0);
    }

    #[test]
    fn swap_slosh_runs_independently_of_the_primary() {
        let mut stage = Stage::new();
        let a = stage.add("a", BoundingBox::new(0.0, 0.0, 40.0, 80.0));
        let b = stage.add("b", BoundingBox::new(80.0, 0.0, 40.0, 80.0));
        let liquid_a = stage.add("liquid-a", BoundingBox::default());
        let liquid_b = stage.add("liquid-b", BoundingBox::default());
        let mut engine = AnimationEngine::default();

        let handle = engine.swap(Some(&a), Some(&b), Some(&liquid_a), Some(&liquid_b));
        assert_eq!(engine.active_timelines(), 3);

        run(&mut engine, 0.1);
        assert!(pose(&liquid_a).tilt < 0.0);
        assert!(pose(&liquid_b).tilt < 0.0);

        engine.settle(STEP);
        assert_eq!(handle.state(), Completion::Finished);
        assert_eq!(pose(&liquid_a).tilt, 0.0);
        assert_eq!(pose(&liquid_b).tilt, 0.0);
    }

    #[test]
    fn decorative_tilt_on_a_swapped_element_survives_override() {
        let (_stage, a, b) = pair(0.0, 0.0, 80.0, 0.0);
        let mut engine = AnimationEngine::default();
        let tilt = engine.slosh(Some(&a), Some(3.0), SloshKind::Hover);
        engine.swap(Some(&a), Some(&b), None, None);
        assert_eq!(tilt.state(), Completion::Pending);

        engine.settle(STEP);
        assert_eq!(pose(&a).tilt, 3.0);
        assert_eq!(tilt.state(), Completion::Finished);
    }

    #[test]
    fn win_celebration_ends_level_after_staggered_steps() {
        let mut stage = Stage::new();
        let bottles: Vec<ElementRef> = (0..4)
            .map(|i| stage.add(format!("bottle-{i}"), BoundingBox::default()))
            .collect();
        let mut engine = AnimationEngine::default();
        let handle = engine.win_celebration(&bottles);
        assert_eq!(engine.active_timelines(), 1);

        // 3 * 0.04 + 5 * 0.08 = 0.52
        run(&mut engine, 0.5);
        assert_eq!(handle.state(), Completion::Pending);
        run(&mut engine, 0.05);
        assert_eq!(handle.state(), Completion::Finished);
        for bottle in &bottles {
            assert_eq!(pose(bottle).rotation, 0.0);
        }
    }

    #[test]
    fn select_overrides_hover_in_flight() {
        let (_stage, a, _) = pair(0.0, 0.0, 80.0, 0.0);
        let mut engine = AnimationEngine::default();

        let hover = engine.hover(Some(&a), true);
        run(&mut engine, 0.07);
        assert!(pose(&a).rotation > 0.0);

        let select = engine.select(Some(&a));
        assert_eq!(hover.state(), Completion::Overridden);
        engine.settle(STEP);

        let selected = pose(&a);
        assert_eq!(
            (selected.y, selected.scale, selected.rotation),
            (-12.0, 1.15, 0.0)
        );
        assert_eq!(select.state(), Completion::Finished);
    }

    #[test]
    fn deselect_returns_to_rest() {
        let (_stage, a, _) = pair(0.0, 0.0, 80.0, 0.0);
        let mut engine = AnimationEngine::default();
        engine.select(Some(&a));
        engine.settle(STEP);
        engine.deselect(Some(&a));
        engine.settle(STEP);
        let rest = pose(&a);
        assert_eq!((rest.y, rest.scale, rest.rotation), (0.0, 1.0, 0.0));
    }

    #[test]
    fn immediate_state_snaps_and_cancels_in_flight_motion() {
        let (_stage, a, _) = pair(0.0, 0.0, 80.0, 0.0);
        let mut engine = AnimationEngine::default();
        let select = engine.select(Some(&a));
        run(&mut engine, 0.05);

        engine.set_immediate_state(Some(&a), false);
        assert_eq!(select.state(), Completion::Overridden);
        let rest = pose(&a);
        assert_eq!((rest.y, rest.scale), (0.0, 1.0));

        engine.set_immediate_state(Some(&a), true);
        let selected = pose(&a);
        assert_eq!((selected.y, selected.scale), (-12.0, 1.15));
        assert!(engine.is_idle());
    }

    #[test]
    fn pulse_returns_row_to_its_scale() {
        let mut stage = Stage::new();
        let row = stage.add("row", BoundingBox::default());
        let mut engine = AnimationEngine::default();
        engine.pulse(Some(&row));

        run(&mut engine, 0.15);
        assert!(pose(&row).scale > 1.02);
        engine.settle(STEP);
        assert_eq!(pose(&row).scale, 1.0);
    }

    #[test]
    fn overlapping_pulses_land_at_rest_scale() {
        let mut stage = Stage::new();
        let row = stage.add("row", BoundingBox::default());
        let mut engine = AnimationEngine::default();
        let first = engine.pulse(Some(&row));

        run(&mut engine, 0.1);
        assert!(pose(&row).scale > 1.0);
        let second = engine.pulse(Some(&row));
        assert_eq!(first.state(), Completion::Overridden);

        engine.settle(STEP);
        assert_eq!(pose(&row).scale, 1.0);
        assert_eq!(second.state(), Completion::Finished);
    }

    #[test]
    fn fade_does_not_interrupt_hover_on_the_same_element() {
        let (_stage, a, _) = pair(0.0, 0.0, 80.0, 0.0);
        let mut engine = AnimationEngine::default();

        let hover = engine.hover(Some(&a), true);
        run(&mut engine, 0.05);
        let fade = engine.fade_overlay(Some(&a), false);
        assert_eq!(hover.state(), Completion::Pending);

        engine.settle(STEP);
        let p = pose(&a);
        assert_eq!((p.y, p.scale, p.opacity), (-6.0, 1.08, 0.0));
        assert_eq!(hover.state(), Completion::Finished);
        assert_eq!(fade.state(), Completion::Finished);
    }

    #[test]
    fn gestures_complete_after_long_uptime() {
        let (_stage, a, _) = pair(0.0, 0.0, 80.0, 0.0);
        let mut engine = AnimationEngine::default();
        engine.tick(600_000.0);

        let hover = engine.hover(Some(&a), true);
        engine.settle(STEP);
        assert_eq!(hover.state(), Completion::Finished);
        assert_eq!(pose(&a).y, -6.0);
    }

    #[test]
    fn absent_targets_are_skipped() {
        let mut stage = Stage::new();
        let gone = stage.add("gone", BoundingBox::default());
        let present = stage.add("present", BoundingBox::default());
        stage.remove("gone");
        let mut engine = AnimationEngine::default();

        let handles = [
            engine.hover(None, true),
            engine.select(None),
            engine.deselect(Some(&gone)),
            engine.swap(Some(&present), None, None, None),
            engine.swap(Some(&gone), Some(&present), None, None),
            engine.pulse(None),
            engine.win_celebration(&[]),
            engine.win_celebration(&[gone.clone()]),
            engine.fade_overlay(None, true),
            engine.slosh(None, None, SloshKind::Swap),
        ];
        engine.set_immediate_state(None, true);

        assert!(handles.iter().all(|h| h.state() == Completion::Skipped));
        assert!(engine.is_idle());
        assert_eq!(pose(&present), Transform::IDENTITY);
    }

    #[test]
    fn dispose_cancels_running_gestures() {
        let (_stage, a, b) = pair(0.0, 0.0, 80.0, 0.0);
        let mut engine = AnimationEngine::default();
        let swap = engine.swap(Some(&a), Some(&b), None, None);
        engine.tick(0.05);

        engine.dispose();
        assert_eq!(swap.state(), Completion::Cancelled);
        assert!(engine.is_idle());
        assert_eq!(engine.scheduler().clock().time_seconds, 0.0);

        let hover = engine.hover(Some(&a), true);
        engine.settle(STEP);
        assert_eq!(hover.state(), Completion::Finished);
    }
}
