//! Per-tween playback settings
//!
//! [`TweenProperties`] holds everything about a tween that is not its payload:
//! looping, pingpong, rate, delay, curve and easing. Records are pooled
//! separately from tween shells and handed to freshly allocated shells.

use std::fmt;
use std::rc::Rc;

use crate::curve::AnimationCurve;
use crate::easing::Easing;

/// How many times a looping tween plays in total
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Loops {
    /// Total plays; `Count(0)` and `Count(1)` both play once. A pingpong
    /// play is one round trip.
    Count(u32),
    /// Repeat until cancelled
    Infinite,
}

impl Default for Loops {
    fn default() -> Self {
        Loops::NONE
    }
}

impl Loops {
    pub const NONE: Loops = Loops::Count(0);

    /// Loop boundaries (counted in full plays) before the tween finishes
    pub(crate) fn limit(self) -> Option<u32> {
        match self {
            Loops::Count(n) => Some(n.max(1)),
            Loops::Infinite => None,
        }
    }

    pub fn is_infinite(self) -> bool {
        matches!(self, Loops::Infinite)
    }
}

/// How progress is derived each tick, resolved when a tween is promoted
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DriveMode {
    /// `running_time / duration`, shaped by the curve or easing
    #[default]
    Duration,
    /// Progress moves at `rate` per second, ignoring curve and easing
    Rate(f32),
}

/// Playback settings of one tween
#[derive(Clone, Default)]
pub struct TweenProperties {
    /// Whether the tween repeats at all
    pub looping: bool,
    pub loops: Loops,
    /// Loop boundaries crossed so far
    pub loop_counter: u32,
    pub pingpong: bool,
    /// Fire complete observers on every repeat boundary
    pub on_complete_repeat: bool,
    /// `Some` selects rate drive
    pub rate: Option<f32>,
    /// Seconds left before promotion
    pub delay: f32,
    pub curve: Option<Rc<dyn AnimationCurve>>,
    pub easing: Easing,
    /// Tick on unscaled time
    pub unscaled: bool,
    pub drive: DriveMode,
}

impl TweenProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore every field to its default without dropping the record
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Resolve the drive mode from the configured rate
    pub(crate) fn resolve_drive(&mut self) {
        self.drive = match self.rate {
            Some(rate) if rate > 0.0 => DriveMode::Rate(rate),
            _ => DriveMode::Duration,
        };
    }

    /// Shape linear progress through the curve (preferred) or easing. A
    /// reversed curve is sampled with swapped endpoints.
    pub(crate) fn shape(&self, t: f32, reversed: bool) -> f32 {
        match &self.curve {
            Some(curve) if reversed => 1.0 - curve.evaluate(1.0 - t),
            Some(curve) => curve.evaluate(t),
            None => self.easing.apply(t),
        }
    }

    /// Record a loop boundary. Returns `true` when the tween should finish.
    pub(crate) fn cross_boundary(&mut self) -> bool {
        if !self.looping {
            return true;
        }
        self.loop_counter = self.loop_counter.saturating_add(1);
        match self.loops.limit() {
            Some(limit) if self.pingpong => self.loop_counter >= limit.saturating_mul(2),
            Some(limit) => self.loop_counter >= limit,
            None => false,
        }
    }
}

impl fmt::Debug for TweenProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenProperties")
            .field("looping", &self.looping)
            .field("loops", &self.loops)
            .field("loop_counter", &self.loop_counter)
            .field("pingpong", &self.pingpong)
            .field("on_complete_repeat", &self.on_complete_repeat)
            .field("rate", &self.rate)
            .field("delay", &self.delay)
            .field("curve", &self.curve.is_some())
            .field("easing", &self.easing)
            .field("unscaled", &self.unscaled)
            .field("drive", &self.drive)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looping(loops: Loops, pingpong: bool) -> TweenProperties {
        TweenProperties {
            looping: true,
            loops,
            pingpong,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_play_finishes_at_first_boundary() {
        let mut props = TweenProperties::new();
        assert!(props.cross_boundary());
        assert_eq!(props.loop_counter, 0);
    }

    #[test]
    fn test_hard_loop_limit() {
        let mut props = looping(Loops::Count(3), false);
        assert!(!props.cross_boundary());
        assert!(!props.cross_boundary());
        assert!(props.cross_boundary());
        assert_eq!(props.loop_counter, 3);
    }

    #[test]
    fn test_pingpong_counts_crossings() {
        let mut props = looping(Loops::Count(2), true);
        let finished: Vec<bool> = (0..4).map(|_| props.cross_boundary()).collect();
        assert_eq!(finished, vec![false, false, false, true]);
    }

    #[test]
    fn test_zero_count_treated_as_one() {
        let mut props = looping(Loops::NONE, true);
        assert!(!props.cross_boundary());
        assert!(props.cross_boundary());
    }

    #[test]
    fn test_count_is_total_plays() {
        for loops in [Loops::Count(0), Loops::Count(1)] {
            let mut props = looping(loops, false);
            assert!(props.cross_boundary(), "{loops:?}");
        }
        let mut twice = looping(Loops::Count(2), false);
        assert!(!twice.cross_boundary());
        assert!(twice.cross_boundary());
    }

    #[test]
    fn test_infinite_never_finishes() {
        let mut props = looping(Loops::Infinite, false);
        for _ in 0..1000 {
            assert!(!props.cross_boundary());
        }
    }

    #[test]
    fn test_resolve_drive() {
        let mut props = TweenProperties::new();
        props.resolve_drive();
        assert_eq!(props.drive, DriveMode::Duration);

        props.rate = Some(2.0);
        props.resolve_drive();
        assert_eq!(props.drive, DriveMode::Rate(2.0));
    }

    #[test]
    fn test_reversed_curve_swaps_endpoints() {
        let mut props = TweenProperties::new();
        props.curve = Some(Rc::new(|t: f32| t * t));
        assert_eq!(props.shape(0.5, false), 0.25);
        assert_eq!(props.shape(0.5, true), 0.75);
    }

    #[test]
    fn test_reset() {
        let mut props = looping(Loops::Count(4), true);
        props.loop_counter = 3;
        props.delay = 1.0;
        props.reset();
        assert!(!props.looping);
        assert_eq!(props.loop_counter, 0);
        assert_eq!(props.delay, 0.0);
    }
}
