//! Animation scheduler.
//!
//! Plays every started [`Timeline`] off one [`AnimationClock`], tracks which
//! timeline owns each exclusive channel of an element and resolves the
//! [`MotionHandle`] returned for each timeline.

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
    fmt,
    future::Future,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll, Waker},
};

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::{
    element::{Channel, ElementKey, ElementRef, PropertyTargets, Transform},
    timeline::{AnimationClock, Timeline},
};

new_key_type! {
    pub struct TimelineId;
}

/// Completion state of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// Still playing.
    Pending,
    /// Every phase ran to its end.
    Finished,
    /// A later primary gesture took over every element this one targeted.
    Overridden,
    /// The scheduler was torn down before the timeline finished.
    Cancelled,
    /// The gesture had nothing to animate (absent or dropped target).
    Skipped,
}

struct Signal {
    state: Cell<Completion>,
    wakers: RefCell<Vec<Waker>>,
}

/// Completion signal for one timeline.
///
/// Awaiting the handle suspends until the timeline settles. Dropping it
/// leaves the animation running.
#[derive(Clone)]
pub struct MotionHandle {
    signal: Rc<Signal>,
}

impl MotionHandle {
    fn with_state(state: Completion) -> Self {
        Self {
            signal: Rc::new(Signal {
                state: Cell::new(state),
                wakers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn pending() -> Self {
        Self::with_state(Completion::Pending)
    }

    /// Already-settled handle returned by gestures that had nothing to do.
    pub fn skipped() -> Self {
        Self::with_state(Completion::Skipped)
    }

    pub(crate) fn finished() -> Self {
        Self::with_state(Completion::Finished)
    }

    pub fn state(&self) -> Completion {
        self.signal.state.get()
    }

    pub fn is_settled(&self) -> bool {
        self.state() != Completion::Pending
    }

    fn resolve(&self, state: Completion) {
        if self.is_settled() {
            return;
        }
        self.signal.state.set(state);
        let wakers = std::mem::take(&mut *self.signal.wakers.borrow_mut());
        for waker in wakers {
            waker.wake();
        }
    }
}

impl Future for MotionHandle {
    type Output = Completion;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let state = self.state();
        if state != Completion::Pending {
            return Poll::Ready(state);
        }
        let mut wakers = self.signal.wakers.borrow_mut();
        if !wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
            wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

impl fmt::Debug for MotionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionHandle")
            .field("state", &self.state())
            .finish()
    }
}

/// Per (phase, target) playback state.
#[derive(Debug, Default, Clone, Copy)]
struct Track {
    from: Option<Transform>,
    done: bool,
}

struct ActiveTimeline {
    timeline: Timeline,
    elapsed: f32,
    target_keys: Vec<ElementKey>,
    tracks: Vec<Vec<Track>>,
    evicted: HashSet<ElementKey>,
    handle: MotionHandle,
}

impl ActiveTimeline {
    fn fully_evicted(&self) -> bool {
        self.target_keys.iter().all(|key| self.evicted.contains(key))
    }

    /// Advances playback by `dt`. Returns true once every phase has ended.
    fn advance(&mut self, dt: f32) -> bool {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        let local = self.elapsed;
        let channel = self.timeline.channel();
        let ActiveTimeline {
            timeline,
            tracks,
            evicted,
            ..
        } = self;

        for (scheduled, phase_tracks) in timeline.phases().iter().zip(tracks.iter_mut()) {
            if local < scheduled.start {
                break;
            }
            let phase = &scheduled.phase;
            let progress = if phase.duration <= 0.0 {
                1.0
            } else {
                ((local - scheduled.start) / phase.duration).min(1.0)
            };
            let eased = phase.easing.apply(progress);

            for (target, track) in phase.targets.iter().zip(phase_tracks.iter_mut()) {
                if track.done {
                    continue;
                }
                if evicted.contains(&target.key()) {
                    track.done = true;
                    continue;
                }
                let from = match track.from {
                    Some(from) => from,
                    None => {
                        let Some(current) = target.transform() else {
                            track.done = true;
                            continue;
                        };
                        track.from = Some(current);
                        current
                    }
                };
                let written = target.update(|transform| {
                    write_progress(transform, &from, &phase.properties, channel, progress, eased)
                });
                if !written || progress >= 1.0 {
                    track.done = true;
                }
            }
        }

        local >= timeline.duration()
    }
}

fn write_progress(
    transform: &mut Transform,
    from: &Transform,
    targets: &PropertyTargets,
    channel: Channel,
    progress: f32,
    eased: f32,
) {
    for (property, to) in targets.iter() {
        if property.channel() != channel {
            continue;
        }
        let value = if progress >= 1.0 {
            to
        } else {
            let start = from.get(property);
            start + (to - start) * eased
        };
        transform.set(property, value);
    }
}

/// Cooperative scheduler that ticks all active timelines on one clock.
#[derive(Default)]
pub struct Scheduler {
    clock: AnimationClock,
    timelines: SlotMap<TimelineId, ActiveTimeline>,
    order: Vec<TimelineId>,
    owners: HashMap<(ElementKey, Channel), TimelineId>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(&self) -> AnimationClock {
        self.clock
    }

    /// Starts a frozen timeline on the shared clock.
    ///
    /// Timelines on an exclusive channel take that channel over on every
    /// element they target; whichever timeline owned it before stops writing
    /// to it. Playback begins on the next tick.
    pub fn start(&mut self, timeline: Timeline) -> (Option<TimelineId>, MotionHandle) {
        if timeline.is_empty() {
            return (None, MotionHandle::finished());
        }

        let target_keys: Vec<ElementKey> = timeline.targets().iter().map(ElementRef::key).collect();
        let channel = timeline.channel();
        let exclusive = channel.is_exclusive();
        if exclusive {
            for key in &target_keys {
                self.release(*key, channel);
            }
        }

        let handle = MotionHandle::pending();
        let tracks = timeline
            .phases()
            .iter()
            .map(|scheduled| vec![Track::default(); scheduled.phase.targets.len()])
            .collect();
        tracing::trace!(
            label = timeline.label(),
            channel = ?timeline.channel(),
            duration = timeline.duration(),
            phases = timeline.phases().len(),
            "starting timeline"
        );

        let id = self.timelines.insert(ActiveTimeline {
            timeline,
            elapsed: 0.0,
            target_keys: target_keys.clone(),
            tracks,
            evicted: HashSet::new(),
            handle: handle.clone(),
        });
        self.order.push(id);
        if exclusive {
            for key in target_keys {
                self.owners.insert((key, channel), id);
            }
        }

        (Some(id), handle)
    }

    /// Writes `targets` onto the element immediately, cancelling whatever
    /// timelines own the channels those targets touch.
    pub fn apply_now(&mut self, element: &ElementRef, targets: &PropertyTargets) -> bool {
        let mut channels: Vec<Channel> = targets
            .iter()
            .map(|(property, _)| property.channel())
            .filter(|channel| channel.is_exclusive())
            .collect();
        channels.dedup();
        for channel in channels {
            self.release(element.key(), channel);
        }
        element.update(|transform| targets.apply_to(transform))
    }

    /// Advances the clock by `dt` seconds and plays every active timeline in
    /// the order they were started.
    pub fn tick(&mut self, dt: f32) {
        self.clock.advance(dt);

        let mut finished = Vec::new();
        for id in &self.order {
            if let Some(active) = self.timelines.get_mut(*id) {
                if active.advance(dt) {
                    finished.push(*id);
                }
            }
        }

        for id in finished {
            self.remove(id, Completion::Finished);
        }
    }

    /// Stops a timeline and settles its handle as cancelled.
    pub fn cancel(&mut self, id: TimelineId) -> bool {
        self.remove(id, Completion::Cancelled)
    }

    /// Stops every timeline and rewinds the clock.
    pub fn cancel_all(&mut self) {
        let ids = std::mem::take(&mut self.order);
        for id in ids {
            if let Some(active) = self.timelines.remove(id) {
                active.handle.resolve(Completion::Cancelled);
            }
        }
        self.owners.clear();
        self.clock.reset();
    }

    /// The timeline currently owning `channel` on the element.
    pub fn owner_of(&self, key: ElementKey, channel: Channel) -> Option<TimelineId> {
        self.owners.get(&(key, channel)).copied()
    }

    pub fn contains(&self, id: TimelineId) -> bool {
        self.timelines.contains_key(id)
    }

    pub fn active_count(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_idle(&self) -> bool {
        self.timelines.is_empty()
    }

    /// Takes one channel of the element away from its current owner.
    fn release(&mut self, key: ElementKey, channel: Channel) {
        let Some(previous) = self.owners.remove(&(key, channel)) else {
            return;
        };
        let overridden = match self.timelines.get_mut(previous) {
            Some(active) => {
                active.evicted.insert(key);
                active.fully_evicted()
            }
            None => false,
        };
        if overridden {
            tracing::trace!(?channel, "timeline overridden by a later gesture");
            self.remove(previous, Completion::Overridden);
        }
    }

    fn remove(&mut self, id: TimelineId, state: Completion) -> bool {
        let Some(active) = self.timelines.remove(id) else {
            return false;
        };
        self.order.retain(|known| *known != id);
        self.owners.retain(|_, owner| *owner != id);
        active.handle.resolve(state);
        true
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("clock", &self.clock)
            .field("timelines", &self.timelines.len())
            .field("owners", &self.owners.len())
            .finish()
    }
}
