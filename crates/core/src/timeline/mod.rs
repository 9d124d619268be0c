//! Phase composition and the shared animation clock.
//!
//! A [`TimelineBuilder`] collects [`Phase`]s and resolves each one's
//! [`StartOffset`] against a running cursor, the latest phase end seen so
//! far. [`TimelineBuilder::build`] freezes the result into an immutable
//! [`Timeline`] that the scheduler plays back.

use serde::{Deserialize, Serialize};

use crate::{
    easing::Easing,
    element::{Channel, ElementRef, PropertyTargets},
};

/// Total time the scheduler has been ticked, kept in `f64` so it stays
/// precise over long sessions. Timelines measure their own elapsed time.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnimationClock {
    pub time_seconds: f64,
}

impl AnimationClock {
    pub fn reset(&mut self) {
        self.time_seconds = 0.0;
    }

    pub fn advance(&mut self, delta: f32) {
        if delta.is_finite() {
            self.time_seconds = (self.time_seconds + f64::from(delta)).max(0.0);
        }
    }
}

/// When a phase begins, relative to the timeline being built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOffset {
    /// Absolute delay from timeline start.
    FromStart(f32),
    /// Shift from the cursor. Negative values overlap the preceding phases.
    FromCursor(f32),
}

impl StartOffset {
    /// Start right where the preceding phases end.
    pub const AFTER: StartOffset = StartOffset::FromCursor(0.0);

    /// Resolved start time given the current cursor, never before zero.
    pub fn resolve(self, cursor: f32) -> f32 {
        let start = match self {
            StartOffset::FromStart(at) => at,
            StartOffset::FromCursor(shift) => cursor + shift,
        };
        if start.is_finite() {
            start.max(0.0)
        } else {
            cursor
        }
    }
}

impl Default for StartOffset {
    fn default() -> Self {
        Self::AFTER
    }
}

/// One scheduled motion step.
#[derive(Debug, Clone)]
pub struct Phase {
    pub targets: Vec<ElementRef>,
    pub properties: PropertyTargets,
    pub duration: f32,
    pub easing: Easing,
    pub offset: StartOffset,
}

impl Phase {
    /// Tween `targets` towards `properties`.
    pub fn to(
        targets: impl IntoIterator<Item = ElementRef>,
        properties: PropertyTargets,
        duration: f32,
        easing: Easing,
    ) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            properties,
            duration: if duration.is_finite() {
                duration.max(0.0)
            } else {
                0.0
            },
            easing,
            offset: StartOffset::AFTER,
        }
    }

    /// Write `properties` onto `targets` without tweening.
    pub fn set(targets: impl IntoIterator<Item = ElementRef>, properties: PropertyTargets) -> Self {
        Self::to(targets, properties, 0.0, Easing::Linear)
    }

    pub fn at(mut self, offset: StartOffset) -> Self {
        self.offset = offset;
        self
    }
}

/// A phase with its start time resolved.
#[derive(Debug, Clone)]
pub struct ScheduledPhase {
    pub phase: Phase,
    pub start: f32,
}

impl ScheduledPhase {
    pub fn end(&self) -> f32 {
        self.start + self.phase.duration
    }
}

/// Collects phases for a single timeline.
#[derive(Debug)]
pub struct TimelineBuilder {
    label: String,
    channel: Channel,
    phases: Vec<ScheduledPhase>,
    cursor: f32,
}

impl TimelineBuilder {
    pub fn new(label: impl Into<String>, channel: Channel) -> Self {
        Self {
            label: label.into(),
            channel,
            phases: Vec::new(),
            cursor: 0.0,
        }
    }

    pub fn primary(label: impl Into<String>) -> Self {
        Self::new(label, Channel::Primary)
    }

    pub fn decorative(label: impl Into<String>) -> Self {
        Self::new(label, Channel::Decorative)
    }

    /// Latest phase end seen so far.
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Resolves the phase's offset and appends it. Returns the resolved start.
    pub fn push(&mut self, phase: Phase) -> f32 {
        let start = phase.offset.resolve(self.cursor);
        let scheduled = ScheduledPhase { phase, start };
        self.cursor = self.cursor.max(scheduled.end());
        self.phases.push(scheduled);
        start
    }

    /// Chaining form of [`TimelineBuilder::push`].
    pub fn then(mut self, phase: Phase) -> Self {
        self.push(phase);
        self
    }

    /// Freezes the phases into a timeline ordered by start time. Phases that
    /// start together keep their insertion order.
    pub fn build(self) -> Timeline {
        let mut phases = self.phases;
        phases.sort_by(|a, b| a.start.total_cmp(&b.start));
        Timeline {
            label: self.label,
            channel: self.channel,
            duration: self.cursor,
            phases: phases.into_boxed_slice(),
        }
    }
}

/// Immutable, ordered sequence of phases sharing one clock.
#[derive(Debug, Clone)]
pub struct Timeline {
    label: String,
    channel: Channel,
    duration: f32,
    phases: Box<[ScheduledPhase]>,
}

impl Timeline {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Time at which the last phase ends.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn phases(&self) -> &[ScheduledPhase] {
        &self.phases
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Distinct elements any phase writes to.
    pub fn targets(&self) -> Vec<ElementRef> {
        let mut targets: Vec<ElementRef> = Vec::new();
        for scheduled in self.phases.iter() {
            for target in &scheduled.phase.targets {
                if !targets.iter().any(|known| known.key() == target.key()) {
                    targets.push(target.clone());
                }
            }
        }
        targets
    }

    /// Serializable description of the resolved schedule.
    pub fn schedule(&self) -> TimelineSchedule {
        TimelineSchedule {
            label: self.label.clone(),
            channel: self.channel,
            duration: self.duration,
            phases: self
                .phases
                .iter()
                .map(|scheduled| PhaseSummary {
                    start: scheduled.start,
                    end: scheduled.end(),
                    targets: scheduled.phase.targets.len(),
                    properties: scheduled.phase.properties,
                    easing: scheduled.phase.easing,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineSchedule {
    pub label: String,
    pub channel: Channel,
    pub duration: f32,
    pub phases: Vec<PhaseSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub start: f32,
    pub end: f32,
    pub targets: usize,
    pub properties: PropertyTargets,
    pub easing: Easing,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{element::BoundingBox, render::Stage};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn element(stage: &mut Stage, name: &str) -> ElementRef {
        stage.add(name, BoundingBox::default())
    }

    #[test]
    fn sequential_phases_follow_the_cursor() {
        let mut stage = Stage::new();
        let a = element(&mut stage, "a");
        let timeline = TimelineBuilder::primary("seq")
            .then(Phase::to([a.clone()], PropertyTargets::new().with_y(-5.0), 0.2, Easing::Linear))
            .then(Phase::to([a], PropertyTargets::new().with_y(0.0), 0.3, Easing::Linear))
            .build();

        let starts: Vec<f32> = timeline.phases().iter().map(|p| p.start).collect();
        assert!(approx(starts[0], 0.0));
        assert!(approx(starts[1], 0.2));
        assert!(approx(timeline.duration(), 0.5));
    }

    #[test]
    fn negative_cursor_offsets_overlap() {
        let mut stage = Stage::new();
        let a = element(&mut stage, "a");
        let b = element(&mut stage, "b");
        let mut builder = TimelineBuilder::primary("overlap");
        builder.push(Phase::to([a.clone(), b.clone()], PropertyTargets::new().with_y(-25.0), 0.12, Easing::Linear));
        let cross_a = builder.push(
            Phase::to([a], PropertyTargets::new().with_x(80.0), 0.25, Easing::Linear)
                .at(StartOffset::FromCursor(-0.08)),
        );
        let cross_b = builder.push(
            Phase::to([b], PropertyTargets::new().with_x(-80.0), 0.25, Easing::Linear)
                .at(StartOffset::FromCursor(-0.25)),
        );

        assert!(approx(cross_a, 0.04));
        assert!(approx(cross_b, 0.04));
        assert!(approx(builder.cursor(), 0.29));
    }

    #[test]
    fn offsets_never_resolve_before_zero() {
        assert_eq!(StartOffset::FromCursor(-1.0).resolve(0.3), 0.0);
        assert_eq!(StartOffset::FromStart(-2.0).resolve(0.3), 0.0);
        assert_eq!(StartOffset::FromStart(f32::NAN).resolve(0.3), 0.3);
    }

    #[test]
    fn absolute_offsets_ignore_the_cursor() {
        let mut stage = Stage::new();
        let a = element(&mut stage, "a");
        let mut builder = TimelineBuilder::primary("absolute");
        builder.push(Phase::to([a.clone()], PropertyTargets::new().with_rotation(4.0), 0.5, Easing::Linear));
        let start = builder.push(
            Phase::to([a], PropertyTargets::new().with_rotation(0.0), 0.1, Easing::Linear)
                .at(StartOffset::FromStart(0.12)),
        );
        assert!(approx(start, 0.12));
        assert!(approx(builder.cursor(), 0.5));
    }

    #[test]
    fn equal_starts_keep_insertion_order() {
        let mut stage = Stage::new();
        let a = element(&mut stage, "a");
        let timeline = TimelineBuilder::primary("order")
            .then(Phase::to([a.clone()], PropertyTargets::new().with_x(3.0), 0.1, Easing::Linear).at(StartOffset::FromStart(0.2)))
            .then(Phase::to([a.clone()], PropertyTargets::new().with_x(1.0), 0.1, Easing::Linear).at(StartOffset::FromStart(0.0)))
            .then(Phase::to([a], PropertyTargets::new().with_x(2.0), 0.1, Easing::Linear).at(StartOffset::FromStart(0.2)))
            .build();

        let xs: Vec<f32> = timeline
            .phases()
            .iter()
            .map(|p| p.phase.properties.x.unwrap())
            .collect();
        assert_eq!(xs, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn schedule_reports_distinct_targets() {
        let mut stage = Stage::new();
        let a = element(&mut stage, "a");
        let b = element(&mut stage, "b");
        let timeline = TimelineBuilder::primary("targets")
            .then(Phase::to([a.clone(), b], PropertyTargets::new().with_scale(1.1), 0.1, Easing::Linear))
            .then(Phase::set([a], PropertyTargets::new().with_x(0.0)))
            .build();

        assert_eq!(timeline.targets().len(), 2);
        let schedule = timeline.schedule();
        assert_eq!(schedule.phases.len(), 2);
        assert!(approx(schedule.phases[1].start, 0.1));
        assert!(approx(schedule.phases[1].end, 0.1));
    }

    #[test]
    fn clock_never_runs_backwards_past_zero() {
        let mut clock = AnimationClock::default();
        clock.advance(0.5);
        clock.advance(-2.0);
        assert_eq!(clock.time_seconds, 0.0);
        clock.advance(f32::INFINITY);
        assert_eq!(clock.time_seconds, 0.0);
    }

    #[test]
    fn clock_resolves_frame_steps_after_long_uptime() {
        let mut clock = AnimationClock::default();
        clock.advance(600_000.0);
        clock.advance(1.0 / 60.0);
        assert!(clock.time_seconds > 600_000.0);

        clock.reset();
        assert_eq!(clock.time_seconds, 0.0);
    }
}
