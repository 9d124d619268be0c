//! Animation choreography engine for the liquid sorting puzzle.
//!
//! Player actions (hover, select, swap, row completion, win) become short,
//! composable motion on renderable elements. The engine composes multi-phase
//! timelines with overlapping start offsets, captures live geometry once per
//! gesture, and plays a decorative tilt channel alongside the primary
//! translation/scale/rotation channel. Everything runs cooperatively on one
//! shared clock that the host ticks.

pub mod audio;
pub mod config;
pub mod easing;
pub mod element;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod profile;
pub mod render;
pub mod scheduler;
pub mod secondary;
pub mod timeline;

pub use audio::{SilentBackend, SoundBackend, SoundBoard, SoundCue};
pub use config::{AppConfig, AudioConfig, MotionConfig};
pub use easing::Easing;
pub use element::{
    BoundingBox, Channel, ElementKey, ElementRef, Property, PropertyTargets, Renderable,
    SharedRenderable, Transform,
};
pub use engine::AnimationEngine;
pub use error::{MotionError, Result};
pub use geometry::{GeometryResolver, SwapDelta};
pub use profile::{Gesture, MotionProfiles};
pub use render::{NodeSnapshot, Stage, StageNode};
pub use scheduler::{Completion, MotionHandle, Scheduler, TimelineId};
pub use secondary::{SecondaryMotion, SloshKind};
pub use timeline::{
    AnimationClock, Phase, ScheduledPhase, StartOffset, Timeline, TimelineBuilder,
    TimelineSchedule,
};
