//! Decorative secondary motion.
//!
//! Liquid slosh runs on the decorative tilt channel as its own timeline. It
//! may share a duration with the primary gesture that triggered it but never
//! an ordering: the primary's completion never waits on it.

use serde::{Deserialize, Serialize};

use crate::{
    config::SloshConfig,
    element::{ElementRef, PropertyTargets},
    scheduler::{MotionHandle, Scheduler},
    timeline::{Phase, Timeline, TimelineBuilder},
};

/// Flavour of liquid slosh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SloshKind {
    /// Single lean towards the intensity.
    #[default]
    Hover,
    /// Whip against the motion, spring past centre, settle at rest.
    Swap,
}

/// Fire-and-forget oscillation driver for decorative channels.
#[derive(Debug, Clone, Default)]
pub struct SecondaryMotion {
    config: SloshConfig,
}

impl SecondaryMotion {
    pub fn new(config: SloshConfig) -> Self {
        Self { config }
    }

    /// Builds a slosh timeline. With `span` set, the swap oscillation's steps
    /// are stretched or squeezed proportionally so the whole slosh lasts
    /// `span` seconds.
    pub fn slosh(
        &self,
        liquid: &ElementRef,
        intensity: f32,
        kind: SloshKind,
        span: Option<f32>,
    ) -> Timeline {
        let config = &self.config;
        let intensity = if intensity.is_finite() {
            intensity
        } else {
            config.default_intensity
        };
        let target = [liquid.clone()];

        match kind {
            SloshKind::Hover => TimelineBuilder::decorative("slosh-hover")
                .then(Phase::to(
                    target,
                    PropertyTargets::new().with_tilt(intensity),
                    config.hover_duration,
                    config.hover_easing,
                ))
                .build(),
            SloshKind::Swap => {
                let natural =
                    config.whip_duration + config.rebound_duration + config.settle_duration;
                let stretch = match span {
                    Some(span) if span.is_finite() && span > 0.0 && natural > 0.0 => {
                        span / natural
                    }
                    _ => 1.0,
                };
                TimelineBuilder::decorative("slosh-swap")
                    .then(Phase::to(
                        target.clone(),
                        PropertyTargets::new().with_tilt(-intensity * config.whip_factor),
                        config.whip_duration * stretch,
                        config.whip_easing,
                    ))
                    .then(Phase::to(
                        target.clone(),
                        PropertyTargets::new().with_tilt(intensity),
                        config.rebound_duration * stretch,
                        config.rebound_easing,
                    ))
                    .then(Phase::to(
                        target,
                        PropertyTargets::new().with_tilt(0.0),
                        config.settle_duration * stretch,
                        config.settle_easing,
                    ))
                    .build()
            }
        }
    }

    /// Builds and starts a slosh. The returned handle may be dropped.
    pub fn start(
        &self,
        scheduler: &mut Scheduler,
        liquid: &ElementRef,
        intensity: f32,
        kind: SloshKind,
        span: Option<f32>,
    ) -> MotionHandle {
        if !liquid.is_alive() {
            return MotionHandle::skipped();
        }
        let (_, handle) = scheduler.start(self.slosh(liquid, intensity, kind, span));
        handle
    }
}
