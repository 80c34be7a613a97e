//! Animation curves
//!
//! A curve maps normalized time to eased progress and takes precedence over a
//! tween's [`Easing`] when both are set. Any `Fn(f32) -> f32` closure is a
//! curve; [`KeyframeCurve`] builds one from keyframes.

use crate::easing::Easing;

/// Maps normalized time (0.0 to 1.0) to progress
pub trait AnimationCurve {
    fn evaluate(&self, t: f32) -> f32;
}

impl<F> AnimationCurve for F
where
    F: Fn(f32) -> f32,
{
    fn evaluate(&self, t: f32) -> f32 {
        self(t)
    }
}

/// A single keyframe of a [`KeyframeCurve`]
#[derive(Clone, Debug, PartialEq)]
pub struct CurveKey {
    /// Time position (0.0 to 1.0)
    pub time: f32,
    /// Progress at this keyframe
    pub value: f32,
    /// Easing used when transitioning TO this keyframe
    pub easing: Easing,
}

/// Piecewise curve through a list of keyframes
#[derive(Clone, Debug, Default)]
pub struct KeyframeCurve {
    keys: Vec<CurveKey>,
}

impl KeyframeCurve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a keyframe. Keys are kept sorted by time.
    pub fn key(mut self, time: f32, value: f32, easing: Easing) -> Self {
        let index = self.keys.partition_point(|k| k.time <= time);
        self.keys.insert(
            index,
            CurveKey {
                time,
                value,
                easing,
            },
        );
        self
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }
}

impl AnimationCurve for KeyframeCurve {
    fn evaluate(&self, t: f32) -> f32 {
        let Some(first) = self.keys.first() else {
            return t;
        };

        let t = t.clamp(0.0, 1.0);

        // Find surrounding keyframes
        let mut prev = first;
        let mut next = first;
        for key in &self.keys {
            if key.time <= t {
                prev = key;
            }
            if key.time >= t {
                next = key;
                break;
            }
            next = key;
        }

        if (prev.time - next.time).abs() < f32::EPSILON {
            return prev.value;
        }

        let local = (t - prev.time) / (next.time - prev.time);
        let eased = next.easing.apply(local);
        prev.value + (next.value - prev.value) * eased
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_curve() {
        let curve = |t: f32| t * t;
        assert_eq!(curve.evaluate(0.5), 0.25);
    }

    #[test]
    fn test_keyframe_curve_sampling() {
        let curve = KeyframeCurve::new()
            .key(1.0, 1.0, Easing::Linear)
            .key(0.0, 0.0, Easing::Linear)
            .key(0.5, 0.8, Easing::Linear);

        assert_eq!(curve.keys()[1].time, 0.5);
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert_eq!(curve.evaluate(0.5), 0.8);
        assert!((curve.evaluate(0.25) - 0.4).abs() < 1e-6);
        assert!((curve.evaluate(0.75) - 0.9).abs() < 1e-6);
        assert_eq!(curve.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_keyframe_curve_uses_target_easing() {
        let curve = KeyframeCurve::new()
            .key(0.0, 0.0, Easing::Linear)
            .key(1.0, 1.0, Easing::EaseInQuad);
        assert!((curve.evaluate(0.5) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_empty_curve_is_identity() {
        assert_eq!(KeyframeCurve::new().evaluate(0.3), 0.3);
    }

    #[test]
    fn test_past_last_key_holds_value() {
        let curve = KeyframeCurve::new()
            .key(0.0, 0.0, Easing::Linear)
            .key(0.5, 1.0, Easing::Linear);
        assert_eq!(curve.evaluate(0.9), 1.0);
    }
}
