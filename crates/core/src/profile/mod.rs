//! Motion profile registry.
//!
//! Declarative per-gesture phase definitions. Each method turns the tunables
//! in [`MotionConfig`] plus the gesture's targets into a frozen [`Timeline`];
//! nothing here touches the clock.

use serde::{Deserialize, Serialize};

use crate::{
    config::MotionConfig,
    element::{Channel, ElementRef, PropertyTargets, Transform},
    geometry::SwapDelta,
    timeline::{Phase, StartOffset, Timeline, TimelineBuilder},
};

/// Named gestures the registry knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    HoverOn,
    HoverOff,
    Select,
    Deselect,
    Swap,
    Pulse,
    WinCelebration,
    FadeIn,
    FadeOut,
}

impl Gesture {
    pub fn label(self) -> &'static str {
        match self {
            Gesture::HoverOn => "hover-on",
            Gesture::HoverOff => "hover-off",
            Gesture::Select => "select",
            Gesture::Deselect => "deselect",
            Gesture::Swap => "swap",
            Gesture::Pulse => "pulse",
            Gesture::WinCelebration => "win-celebration",
            Gesture::FadeIn => "fade-in",
            Gesture::FadeOut => "fade-out",
        }
    }
}

/// Number of rotation steps in the win oscillation.
pub const WIN_STEPS: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct MotionProfiles {
    config: MotionConfig,
}

impl MotionProfiles {
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Resting pose every primary gesture returns to.
    pub fn rest_pose(&self) -> PropertyTargets {
        PropertyTargets::new()
            .with_y(0.0)
            .with_scale(1.0)
            .with_rotation(0.0)
    }

    /// Pose reached by `select`, or the rest pose when `selected` is false.
    pub fn selection_pose(&self, selected: bool) -> PropertyTargets {
        if selected {
            let select = &self.config.select;
            PropertyTargets::new()
                .with_y(-select.lift)
                .with_scale(select.scale)
                .with_rotation(0.0)
        } else {
            self.rest_pose()
        }
    }

    pub fn hover_pose(&self, hovering: bool) -> PropertyTargets {
        if hovering {
            let hover = &self.config.hover;
            PropertyTargets::new()
                .with_y(-hover.lift)
                .with_scale(hover.scale)
                .with_rotation(hover.rotation)
        } else {
            self.rest_pose()
        }
    }

    pub fn hover(&self, element: &ElementRef, hovering: bool) -> Timeline {
        let gesture = if hovering {
            Gesture::HoverOn
        } else {
            Gesture::HoverOff
        };
        let hover = &self.config.hover;
        TimelineBuilder::primary(gesture.label())
            .then(Phase::to(
                [element.clone()],
                self.hover_pose(hovering),
                hover.duration,
                hover.easing,
            ))
            .build()
    }

    pub fn select(&self, element: &ElementRef) -> Timeline {
        let select = &self.config.select;
        TimelineBuilder::primary(Gesture::Select.label())
            .then(Phase::to(
                [element.clone()],
                self.selection_pose(true),
                select.duration,
                select.select_easing,
            ))
            .build()
    }

    pub fn deselect(&self, element: &ElementRef) -> Timeline {
        let select = &self.config.select;
        TimelineBuilder::primary(Gesture::Deselect.label())
            .then(Phase::to(
                [element.clone()],
                self.selection_pose(false),
                select.duration,
                select.release_easing,
            ))
            .build()
    }

    /// Four-phase exchange of two elements along a pre-captured delta.
    ///
    /// `delta` carries `a` onto `b`; `b` travels the inverse. The crossing
    /// starts `cross_overlap` seconds before the lift ends, and the final
    /// phase snaps both translations back to zero so the re-rendered layout
    /// starts from a clean pose.
    pub fn swap(&self, a: &ElementRef, b: &ElementRef, delta: SwapDelta) -> Timeline {
        let swap = &self.config.swap;
        let pair = [a.clone(), b.clone()];
        let back = delta.inverted();
        let mut builder = TimelineBuilder::primary(Gesture::Swap.label());

        builder.push(Phase::to(
            pair.clone(),
            PropertyTargets::new()
                .with_y(-swap.lift)
                .with_scale(swap.scale)
                .with_rotation(0.0),
            swap.lift_duration,
            swap.lift_easing,
        ));

        let cross_start = builder.push(
            Phase::to(
                [a.clone()],
                PropertyTargets::new().with_translate(delta.dx, delta.dy - swap.lift),
                swap.cross_duration,
                swap.cross_easing,
            )
            .at(StartOffset::FromCursor(-swap.cross_overlap)),
        );
        builder.push(
            Phase::to(
                [b.clone()],
                PropertyTargets::new().with_translate(back.dx, back.dy - swap.lift),
                swap.cross_duration,
                swap.cross_easing,
            )
            .at(StartOffset::FromStart(cross_start)),
        );

        builder.push(Phase::to(
            pair.clone(),
            PropertyTargets::new().with_y(0.0).with_scale(1.0),
            swap.land_duration,
            swap.land_easing,
        ));

        builder.push(Phase::set(pair, PropertyTargets::new().with_translate(0.0, 0.0)));

        builder.build()
    }

    /// Scale up then return to `base_scale`.
    /// Scale yoyo on the row. The return leg always targets the rest scale.
    pub fn pulse(&self, row: &ElementRef) -> Timeline {
        let pulse = &self.config.pulse;
        TimelineBuilder::primary(Gesture::Pulse.label())
            .then(Phase::to(
                [row.clone()],
                PropertyTargets::new().with_scale(pulse.scale),
                pulse.duration,
                pulse.easing,
            ))
            .then(Phase::to(
                [row.clone()],
                PropertyTargets::new().with_scale(Transform::IDENTITY.scale),
                pulse.duration,
                pulse.easing.mirrored(),
            ))
            .build()
    }

    /// Staggered rotation jiggle across every element, merged into a single
    /// timeline.
    pub fn win_celebration(&self, elements: &[ElementRef]) -> Timeline {
        let win = &self.config.win;
        let mut builder = TimelineBuilder::primary(Gesture::WinCelebration.label());
        for step in win_steps(elements.len(), win.stagger, win.step, win.angle) {
            builder.push(
                Phase::to(
                    [elements[step.element].clone()],
                    PropertyTargets::new().with_rotation(step.rotation),
                    win.step,
                    win.easing,
                )
                .at(StartOffset::FromStart(step.start)),
            );
        }
        builder.build()
    }

    /// Opacity tween on its own channel, so it never interrupts a pose
    /// gesture on the same element.
    pub fn fade(&self, overlay: &ElementRef, visible: bool) -> Timeline {
        let fade = &self.config.fade;
        let (gesture, opacity, duration) = if visible {
            (Gesture::FadeIn, 1.0, fade.in_duration)
        } else {
            (Gesture::FadeOut, 0.0, fade.out_duration)
        };
        TimelineBuilder::new(gesture.label(), Channel::Opacity)
            .then(Phase::to(
                [overlay.clone()],
                PropertyTargets::new().with_opacity(opacity),
                duration,
                fade.easing,
            ))
            .build()
    }
}

/// One rotation step of the win celebration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WinStep {
    pub element: usize,
    pub start: f32,
    pub rotation: f32,
}

/// Step arena for `count` elements: element `i` runs step `k` at
/// `i * stagger + k * step`, rotating through +θ, −θ, +θ/2, −θ/2, 0.
pub fn win_steps(count: usize, stagger: f32, step: f32, angle: f32) -> Vec<WinStep> {
    let rotations: [f32; WIN_STEPS] = [angle, -angle, angle / 2.0, -angle / 2.0, 0.0];
    let mut steps = Vec::with_capacity(count * WIN_STEPS);
    for element in 0..count {
        for (k, rotation) in rotations.iter().enumerate() {
            steps.push(WinStep {
                element,
                start: element as f32 * stagger + k as f32 * step,
                rotation: *rotation,
            });
        }
    }
    steps
}
