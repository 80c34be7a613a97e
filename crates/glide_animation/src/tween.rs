//! Tween instances and their builder
//!
//! A [`Tween`] is a pooled shell: lifecycle state, timing, playback
//! [`TweenProperties`], observers and a boxed [`Interpolator`] payload. Shells
//! outlive the tweens they carry; the engine fills one from a
//! [`TweenBuilder`] on spawn and resets it on retirement.

use std::fmt;
use std::rc::Rc;

use glide_core::{LifecycleEvent, ObserverKind, ObserverList, TweenState, Vec3};
use slotmap::new_key_type;

use crate::curve::AnimationCurve;
use crate::easing::Easing;
use crate::error::{Result, TweenError};
use crate::interpolator::{Interpolator, PositionalInterpolator, PositionalKind, ValueInterpolator};
use crate::properties::{DriveMode, Loops, TweenProperties};
use crate::scheduler::TweenEngine;
use crate::values::TweenValue;

pub use crate::interpolator::TweenKind;

new_key_type! {
    /// Handle to a live tween. Stale handles never alias a recycled shell.
    pub struct TweenId;
}

/// Correlation id of the external object a tween animates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

/// Where the engine found the shell backing a tween
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Prewarmed fixed pool
    Pool,
    /// LRU fallback cache (the shell is resurrected)
    Cache,
    /// Allocated because pool and cache had nothing to offer
    Fresh,
}

/// Observer invoked with the engine and the tween it is attached to
pub type TweenCallback = dyn FnMut(&mut TweenEngine, TweenId);

/// Progress within this distance of a boundary counts as reaching it
const BOUNDARY_EPSILON: f64 = 1e-6;

/// Outcome of reaching a loop boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Boundary {
    /// Keep playing; `notify` fires complete observers
    Repeat { notify: bool },
    Finish,
}

/// A tween instance
pub struct Tween {
    pub(crate) kind: TweenKind,
    pub(crate) state: TweenState,
    pub(crate) payload: Option<Box<dyn Interpolator>>,
    pub(crate) properties: Box<TweenProperties>,
    pub(crate) observers: ObserverList<TweenCallback>,
    pub(crate) target: Option<TargetId>,
    pub(crate) duration: f32,
    running_time: f64,
    rate_progress: f64,
    /// Frame the tween was registered on; promotion waits for a later one
    pub(crate) spawn_frame: u64,
    pub(crate) origin: Origin,
    pub(crate) resurrected: bool,
}

impl Tween {
    /// Empty shell for `kind`
    pub(crate) fn shell(kind: TweenKind, properties: Box<TweenProperties>) -> Self {
        Self {
            kind,
            state: TweenState::Done,
            payload: None,
            properties,
            observers: ObserverList::new(),
            target: None,
            duration: 0.0,
            running_time: 0.0,
            rate_progress: 0.0,
            spawn_frame: 0,
            origin: Origin::Pool,
            resurrected: false,
        }
    }

    pub fn state(&self) -> TweenState {
        self.state
    }

    pub fn kind(&self) -> TweenKind {
        self.kind
    }

    pub fn target(&self) -> Option<TargetId> {
        self.target
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Seconds played in the current loop
    pub fn elapsed(&self) -> f32 {
        self.running_time as f32
    }

    /// Linear progress (0.0 to 1.0) in the current loop
    pub fn progress(&self) -> f32 {
        match self.properties.drive {
            DriveMode::Rate(_) => self.rate_progress as f32,
            DriveMode::Duration if self.duration > 0.0 => {
                (self.running_time / self.duration as f64) as f32
            }
            DriveMode::Duration => 0.0,
        }
    }

    pub fn loop_counter(&self) -> u32 {
        self.properties.loop_counter
    }

    pub fn properties(&self) -> &TweenProperties {
        &self.properties
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Taken from the fallback cache at some point in its life
    pub fn is_resurrected(&self) -> bool {
        self.resurrected
    }

    /// In positional combine mode, or half of a combine-lerp pair
    pub fn is_combined(&self) -> bool {
        self.payload.as_ref().is_some_and(|p| p.is_combined())
    }

    pub fn payload(&self) -> Option<&dyn Interpolator> {
        self.payload.as_deref()
    }

    /// Promote to active: resolve the drive mode and let the payload sample
    /// its start value.
    pub(crate) fn begin(&mut self) -> bool {
        if !self.state.send(LifecycleEvent::Promote) {
            return false;
        }
        self.properties.resolve_drive();
        if let Some(payload) = self.payload.as_mut() {
            payload.begin();
        }
        true
    }

    /// Advance by `dt` seconds and write the new value. Returns `true` when
    /// this write landed on a loop boundary.
    pub(crate) fn advance(&mut self, dt: f32) -> bool {
        let Some(direction) = self.state.direction() else {
            return false;
        };
        let reversed = direction.is_reverse();
        let step = if reversed { -(dt as f64) } else { dt as f64 };

        let (eased, at_boundary) = match self.properties.drive {
            DriveMode::Duration => {
                let duration = self.duration as f64;
                self.running_time = (self.running_time + step).clamp(0.0, duration);
                let at_boundary = reached(self.running_time, duration, reversed);
                if at_boundary {
                    self.running_time = if reversed { 0.0 } else { duration };
                }
                let t = (self.running_time / duration) as f32;
                (self.properties.shape(t, reversed), at_boundary)
            }
            DriveMode::Rate(rate) => {
                self.rate_progress = (self.rate_progress + step * rate as f64).clamp(0.0, 1.0);
                let at_boundary = reached(self.rate_progress, 1.0, reversed);
                if at_boundary {
                    self.rate_progress = if reversed { 0.0 } else { 1.0 };
                }
                (self.rate_progress as f32, at_boundary)
            }
        };

        if let Some(payload) = self.payload.as_mut() {
            payload.write(eased);
        }
        at_boundary
    }

    /// Count a boundary and either flip, rewind, or report the finish
    pub(crate) fn cross_boundary(&mut self) -> Boundary {
        if self.properties.cross_boundary() {
            return Boundary::Finish;
        }

        let notify = if self.properties.pingpong {
            self.state.send(LifecycleEvent::Flip);
            // Only a completed round trip counts as a repeat
            self.properties.on_complete_repeat && self.properties.loop_counter % 2 == 0
        } else {
            self.running_time = 0.0;
            self.rate_progress = 0.0;
            self.properties.on_complete_repeat
        };
        Boundary::Repeat { notify }
    }

    /// Clear everything but the pool bookkeeping
    pub(crate) fn reset(&mut self) {
        self.state = TweenState::Done;
        self.payload = None;
        self.properties.reset();
        self.observers.clear();
        self.observers.abandon_detached();
        self.target = None;
        self.duration = 0.0;
        self.running_time = 0.0;
        self.rate_progress = 0.0;
        self.spawn_frame = 0;
    }
}

fn reached(value: f64, end: f64, reversed: bool) -> bool {
    if reversed {
        value <= BOUNDARY_EPSILON
    } else {
        value >= end - BOUNDARY_EPSILON
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("target", &self.target)
            .field("duration", &self.duration)
            .field("running_time", &self.running_time)
            .field("properties", &self.properties)
            .field("observers", &self.observers)
            .field("origin", &self.origin)
            .field("resurrected", &self.resurrected)
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Describes a tween to spawn
///
/// # Example
///
/// ```rust
/// use glide_animation::{Easing, Loops, TweenBuilder};
///
/// let builder = TweenBuilder::value(0.0f32, 1.0, 0.3, |v| println!("{v}"))
///     .easing(Easing::EaseOutCubic)
///     .loops(Loops::Count(2))
///     .pingpong();
/// ```
pub struct TweenBuilder {
    payload: Box<dyn Interpolator>,
    duration: f32,
    target: Option<TargetId>,
    loops: Option<Loops>,
    pingpong: bool,
    on_complete_repeat: bool,
    rate: Option<f32>,
    delay: f32,
    curve: Option<Rc<dyn AnimationCurve>>,
    easing: Option<Easing>,
    unscaled: bool,
    observers: Vec<(ObserverKind, Box<TweenCallback>)>,
}

impl TweenBuilder {
    /// Tween any payload over `duration` seconds
    pub fn new(payload: impl Interpolator, duration: f32) -> Self {
        Self {
            payload: Box::new(payload),
            duration,
            target: None,
            loops: None,
            pingpong: false,
            on_complete_repeat: false,
            rate: None,
            delay: 0.0,
            curve: None,
            easing: None,
            unscaled: false,
            observers: Vec::new(),
        }
    }

    /// Tween a value from `from` to `to`, handing each step to `writer`
    pub fn value<T: TweenValue>(
        from: T,
        to: T,
        duration: f32,
        writer: impl FnMut(T) + 'static,
    ) -> Self {
        Self::new(ValueInterpolator::new(from, to, writer), duration)
    }

    /// Like [`value`](Self::value), with a read-back accessor so the tween
    /// can be resumed from the live value
    pub fn value_with_read_back<T: TweenValue>(
        from: T,
        to: T,
        duration: f32,
        writer: impl FnMut(T) + 'static,
        reader: impl Fn() -> T + 'static,
    ) -> Self {
        Self::new(
            ValueInterpolator::new(from, to, writer).with_reader(reader),
            duration,
        )
    }

    /// Move, scale or rotate `target` towards `to`, starting from the value
    /// `reader` reports when the tween is promoted
    pub fn positional(
        kind: PositionalKind,
        target: TargetId,
        to: Vec3,
        duration: f32,
        writer: impl FnMut(Vec3) + 'static,
        reader: impl Fn() -> Vec3 + 'static,
    ) -> Self {
        Self::new(
            PositionalInterpolator::new(kind, target, to, writer, reader),
            duration,
        )
        .target(target)
    }

    /// Start a positional tween from `from` instead of the live value. Has no
    /// effect on value tweens.
    pub fn start_from(mut self, from: Vec3) -> Self {
        if let Some(positional) = self
            .payload
            .as_any_mut()
            .downcast_mut::<PositionalInterpolator>()
        {
            positional.override_from(from);
        }
        self
    }

    /// Correlate the tween with an external object
    pub fn target(mut self, target: TargetId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn loops(mut self, loops: Loops) -> Self {
        self.loops = Some(loops);
        self
    }

    /// Reverse direction at every boundary instead of rewinding
    pub fn pingpong(mut self) -> Self {
        self.pingpong = true;
        self
    }

    /// Fire complete observers on every repeat, not only the last
    pub fn complete_on_repeat(mut self) -> Self {
        self.on_complete_repeat = true;
        self
    }

    /// Drive progress at `rate` per second. A negative rate falls back to
    /// duration drive.
    pub fn rate(mut self, rate: f32) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Shape progress with a curve; takes precedence over the easing
    pub fn curve(mut self, curve: impl AnimationCurve + 'static) -> Self {
        self.curve = Some(Rc::new(curve));
        self
    }

    pub fn shared_curve(mut self, curve: Rc<dyn AnimationCurve>) -> Self {
        self.curve = Some(curve);
        self
    }

    /// Tick on unscaled time
    pub fn unscaled(mut self) -> Self {
        self.unscaled = true;
        self
    }

    pub fn on_update(mut self, f: impl FnMut(&mut TweenEngine, TweenId) + 'static) -> Self {
        self.observers.push((ObserverKind::Update, Box::new(f)));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut(&mut TweenEngine, TweenId) + 'static) -> Self {
        self.observers.push((ObserverKind::Complete, Box::new(f)));
        self
    }

    pub fn on_last_complete(
        mut self,
        f: impl FnMut(&mut TweenEngine, TweenId) + 'static,
    ) -> Self {
        self.observers.push((ObserverKind::LastComplete, Box::new(f)));
        self
    }

    pub fn kind(&self) -> TweenKind {
        self.payload.kind()
    }

    /// Rate drive is selected by a positive rate
    fn is_rate_driven(&self) -> bool {
        self.rate.is_some_and(|rate| rate > 0.0)
    }

    /// Check construction parameters before anything is registered
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(rate) = self.rate {
            if rate.is_nan() || rate.is_infinite() {
                return Err(TweenError::InvalidRate(rate));
            }
            if rate == 0.0 {
                return Err(TweenError::ZeroRate);
            }
        }
        if !self.is_rate_driven() && !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(TweenError::InvalidDuration(self.duration));
        }
        if !(self.delay.is_finite() && self.delay >= 0.0) {
            return Err(TweenError::InvalidDelay(self.delay));
        }
        if !self.payload.is_finite() {
            return Err(TweenError::NonFiniteValue);
        }
        Ok(())
    }

    /// Fill a pooled shell
    pub(crate) fn apply(self, tween: &mut Tween, default_easing: Easing) {
        let props = &mut tween.properties;
        props.looping = self.loops.is_some() || self.pingpong;
        props.loops = self.loops.unwrap_or_default();
        props.loop_counter = 0;
        props.pingpong = self.pingpong;
        props.on_complete_repeat = self.on_complete_repeat;
        props.rate = self.rate;
        props.delay = self.delay;
        props.curve = self.curve;
        props.easing = self.easing.unwrap_or(default_easing);
        props.unscaled = self.unscaled;
        props.drive = DriveMode::Duration;

        tween.kind = self.payload.kind();
        tween.payload = Some(self.payload);
        tween.target = self.target;
        tween.duration = self.duration;
        tween.running_time = 0.0;
        tween.rate_progress = 0.0;

        for (kind, callback) in self.observers {
            tween.observers.register(kind, callback);
        }
    }
}

impl fmt::Debug for TweenBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenBuilder")
            .field("kind", &self.payload.kind())
            .field("duration", &self.duration)
            .field("target", &self.target)
            .field("loops", &self.loops)
            .field("pingpong", &self.pingpong)
            .field("rate", &self.rate)
            .field("delay", &self.delay)
            .field("easing", &self.easing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::ValueKind;
    use std::cell::RefCell;

    fn shell() -> Tween {
        Tween::shell(
            TweenKind::Value(ValueKind::Float),
            Box::new(TweenProperties::new()),
        )
    }

    fn started(builder: TweenBuilder) -> Tween {
        let mut tween = shell();
        builder.apply(&mut tween, Easing::Linear);
        tween.state.send(LifecycleEvent::Register);
        assert!(tween.begin());
        tween
    }

    fn recorded(from: f32, to: f32, duration: f32) -> (Rc<RefCell<Vec<f32>>>, TweenBuilder) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let builder = TweenBuilder::value(from, to, duration, move |v: f32| {
            sink.borrow_mut().push(v)
        });
        (log, builder)
    }

    #[test]
    fn test_validation() {
        let ok = TweenBuilder::value(0.0f32, 1.0, 1.0, |_| {});
        assert!(ok.validate().is_ok());

        let zero = TweenBuilder::value(0.0f32, 1.0, 0.0, |_| {});
        assert!(matches!(zero.validate(), Err(TweenError::InvalidDuration(_))));

        let nan = TweenBuilder::value(0.0f32, 1.0, f32::NAN, |_| {});
        assert!(matches!(nan.validate(), Err(TweenError::InvalidDuration(_))));

        let zero_rate = TweenBuilder::value(0.0f32, 1.0, 1.0, |_| {}).rate(0.0);
        assert!(matches!(zero_rate.validate(), Err(TweenError::ZeroRate)));

        let nan_rate = TweenBuilder::value(0.0f32, 1.0, 1.0, |_| {}).rate(f32::NAN);
        assert!(matches!(nan_rate.validate(), Err(TweenError::InvalidRate(_))));

        let delay = TweenBuilder::value(0.0f32, 1.0, 1.0, |_| {}).delay(-1.0);
        assert!(matches!(delay.validate(), Err(TweenError::InvalidDelay(_))));

        let endpoint = TweenBuilder::value(0.0f32, f32::INFINITY, 1.0, |_| {});
        assert!(matches!(endpoint.validate(), Err(TweenError::NonFiniteValue)));
    }

    #[test]
    fn test_rate_mode_ignores_duration() {
        let builder = TweenBuilder::value(0.0f32, 1.0, 0.0, |_| {}).rate(2.0);
        assert!(builder.validate().is_ok());

        // Negative rate means duration drive, so the duration must be valid
        let negative = TweenBuilder::value(0.0f32, 1.0, 0.0, |_| {}).rate(-1.0);
        assert!(matches!(negative.validate(), Err(TweenError::InvalidDuration(_))));
    }

    #[test]
    fn test_apply_fills_properties() {
        let builder = TweenBuilder::value(0.0f32, 1.0, 2.0, |_| {})
            .loops(Loops::Count(3))
            .delay(0.5)
            .target(TargetId(9));
        let mut tween = shell();
        builder.apply(&mut tween, Easing::EaseInQuad);

        assert!(tween.properties.looping);
        assert_eq!(tween.properties.loops, Loops::Count(3));
        assert_eq!(tween.properties.easing, Easing::EaseInQuad);
        assert_eq!(tween.properties.delay, 0.5);
        assert_eq!(tween.target(), Some(TargetId(9)));
        assert_eq!(tween.duration(), 2.0);
    }

    #[test]
    fn test_pingpong_implies_looping() {
        let mut tween = shell();
        TweenBuilder::value(0.0f32, 1.0, 1.0, |_| {})
            .pingpong()
            .apply(&mut tween, Easing::Linear);
        assert!(tween.properties.looping);
        assert_eq!(tween.properties.loops, Loops::NONE);
    }

    #[test]
    fn test_advance_hits_boundary_exactly_once() {
        let (log, builder) = recorded(0.0, 10.0, 2.0);
        let mut tween = started(builder);

        let hits: Vec<bool> = (0..4).map(|_| tween.advance(0.5)).collect();
        assert_eq!(hits, vec![false, false, false, true]);
        assert_eq!(*log.borrow(), vec![2.5, 5.0, 7.5, 10.0]);
    }

    #[test]
    fn test_uneven_split_reaches_end() {
        let (log, builder) = recorded(0.0, 1.0, 1.0);
        let mut tween = started(builder);

        let mut boundary = false;
        for _ in 0..10 {
            boundary = tween.advance(0.1);
        }
        assert!(boundary);
        assert_eq!(log.borrow().last().copied(), Some(1.0));
    }

    #[test]
    fn test_rate_drive() {
        let (log, builder) = recorded(0.0, 8.0, 100.0);
        let mut tween = started(builder.rate(4.0).easing(Easing::EaseInQuad));
        assert_eq!(tween.properties.drive, DriveMode::Rate(4.0));

        assert!(!tween.advance(0.125));
        assert!(tween.advance(0.125));
        // Rate drive ignores easing
        assert_eq!(*log.borrow(), vec![4.0, 8.0]);
    }

    #[test]
    fn test_pingpong_flips_and_finishes() {
        let (log, builder) = recorded(0.0, 1.0, 1.0);
        let mut tween = started(builder.loops(Loops::Count(1)).pingpong());

        assert!(tween.advance(1.0));
        assert_eq!(tween.cross_boundary(), Boundary::Repeat { notify: false });
        assert_eq!(tween.state(), TweenState::Active(glide_core::Direction::Reverse));

        assert!(!tween.advance(0.5));
        assert!(tween.advance(0.5));
        assert_eq!(tween.cross_boundary(), Boundary::Finish);
        assert_eq!(*log.borrow(), vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_hard_loop_rewinds_and_notifies() {
        let (_, builder) = recorded(0.0, 1.0, 1.0);
        let mut tween = started(builder.loops(Loops::Infinite).complete_on_repeat());

        assert!(tween.advance(1.0));
        assert_eq!(tween.cross_boundary(), Boundary::Repeat { notify: true });
        assert_eq!(tween.elapsed(), 0.0);
        assert_eq!(tween.loop_counter(), 1);
    }

    #[test]
    fn test_start_from_overrides_sampling() {
        let builder = TweenBuilder::positional(
            PositionalKind::Move,
            TargetId(1),
            Vec3::ONE,
            1.0,
            |_| {},
            || Vec3::new(5.0, 5.0, 5.0),
        )
        .start_from(Vec3::ZERO);

        let tween = started(builder);
        let payload = tween
            .payload()
            .and_then(|p| p.as_any().downcast_ref::<PositionalInterpolator>())
            .unwrap();
        assert_eq!(payload.from(), Vec3::ZERO);
        assert_eq!(tween.target(), Some(TargetId(1)));
    }

    #[test]
    fn test_reset_keeps_pool_bookkeeping() {
        let (_, builder) = recorded(0.0, 1.0, 1.0);
        let mut tween = started(builder);
        tween.origin = Origin::Cache;
        tween.resurrected = true;

        tween.reset();
        assert_eq!(tween.state(), TweenState::Done);
        assert!(tween.payload().is_none());
        assert!(tween.observers.is_empty());
        assert_eq!(tween.origin(), Origin::Cache);
        assert!(tween.is_resurrected());
    }
}
