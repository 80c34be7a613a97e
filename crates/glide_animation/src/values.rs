//! Animatable value types
//!
//! Provides the interpolation trait and implementations for every payload a
//! value tween can carry.

use glide_core::{Color, Mat4, Quat, Rect, Vec2, Vec3, Vec4};

/// Endpoint-exact linear interpolation: returns `a` at `t = 0` and `b` at
/// `t = 1` without rounding drift.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

/// Payload tag for value tweens
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Rect,
    Mat4,
    Quat,
    Color,
}

/// A value a tween can carry and hand to a write callback
pub trait TweenValue: Interpolate + Copy + std::fmt::Debug + 'static {
    const KIND: ValueKind;

    /// No component is NaN or infinite
    fn is_finite(&self) -> bool;
}

// ============================================================================
// Scalar and vectors
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        lerp(*self, *other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl TweenValue for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn is_finite(&self) -> bool {
        f32::is_finite(*self)
    }
}

impl Interpolate for Vec2 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec2::new(lerp(self.x, other.x, t), lerp(self.y, other.y, t))
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl TweenValue for Vec2 {
    const KIND: ValueKind = ValueKind::Vec2;

    fn is_finite(&self) -> bool {
        all_finite(&self.to_array())
    }
}

impl Interpolate for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::new(
            lerp(self.x, other.x, t),
            lerp(self.y, other.y, t),
            lerp(self.z, other.z, t),
        )
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}

impl TweenValue for Vec3 {
    const KIND: ValueKind = ValueKind::Vec3;

    fn is_finite(&self) -> bool {
        all_finite(&self.to_array())
    }
}

impl Interpolate for Vec4 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec4::new(
            lerp(self.x, other.x, t),
            lerp(self.y, other.y, t),
            lerp(self.z, other.z, t),
            lerp(self.w, other.w, t),
        )
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        approx_eq_slice(&self.to_array(), &other.to_array(), epsilon)
    }
}

impl TweenValue for Vec4 {
    const KIND: ValueKind = ValueKind::Vec4;

    fn is_finite(&self) -> bool {
        all_finite(&self.to_array())
    }
}

// ============================================================================
// Rect / Mat4
// ============================================================================

impl Interpolate for Rect {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Rect::new(
            lerp(self.x, other.x, t),
            lerp(self.y, other.y, t),
            lerp(self.width, other.width, t),
            lerp(self.height, other.height, t),
        )
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        approx_eq_slice(&self.to_array(), &other.to_array(), epsilon)
    }
}

impl TweenValue for Rect {
    const KIND: ValueKind = ValueKind::Rect;

    fn is_finite(&self) -> bool {
        all_finite(&self.to_array())
    }
}

impl Interpolate for Mat4 {
    /// Component-wise; callers wanting rigid motion should tween the parts
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let mut cols = [[0.0f32; 4]; 4];
        for (c, col) in cols.iter_mut().enumerate() {
            for (r, v) in col.iter_mut().enumerate() {
                *v = lerp(self.cols[c][r], other.cols[c][r], t);
            }
        }
        Mat4 { cols }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.cols
            .iter()
            .zip(other.cols.iter())
            .all(|(a, b)| approx_eq_slice(a, b, epsilon))
    }
}

impl TweenValue for Mat4 {
    const KIND: ValueKind = ValueKind::Mat4;

    fn is_finite(&self) -> bool {
        self.cols.iter().all(|col| all_finite(col))
    }
}

// ============================================================================
// Quat
// ============================================================================

impl Interpolate for Quat {
    /// Spherical interpolation along the shorter arc
    fn lerp(&self, other: &Self, t: f32) -> Self {
        if t <= 0.0 {
            return *self;
        }
        if t >= 1.0 {
            return *other;
        }

        let mut end = *other;
        let mut cos_theta = self.dot(end);
        if cos_theta < 0.0 {
            end = Quat::new(-end.x, -end.y, -end.z, -end.w);
            cos_theta = -cos_theta;
        }

        // Nearly parallel: fall back to normalized lerp
        if cos_theta > 0.9995 {
            return Quat::new(
                lerp(self.x, end.x, t),
                lerp(self.y, end.y, t),
                lerp(self.z, end.z, t),
                lerp(self.w, end.w, t),
            )
            .normalize();
        }

        let theta = cos_theta.min(1.0).acos();
        let sin_theta = theta.sin();
        let a = ((1.0 - t) * theta).sin() / sin_theta;
        let b = (t * theta).sin() / sin_theta;
        Quat::new(
            self.x * a + end.x * b,
            self.y * a + end.y * b,
            self.z * a + end.z * b,
            self.w * a + end.w * b,
        )
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        // q and -q encode the same rotation
        (self.dot(*other).abs() - 1.0).abs() < epsilon
    }
}

impl TweenValue for Quat {
    const KIND: ValueKind = ValueKind::Quat;

    fn is_finite(&self) -> bool {
        all_finite(&[self.x, self.y, self.z, self.w])
    }
}

// ============================================================================
// Color
// ============================================================================

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::rgba(
            lerp(self.r, other.r, t),
            lerp(self.g, other.g, t),
            lerp(self.b, other.b, t),
            lerp(self.a, other.a, t),
        )
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        approx_eq_slice(&self.to_array(), &other.to_array(), epsilon)
    }
}

impl TweenValue for Color {
    const KIND: ValueKind = ValueKind::Color;

    fn is_finite(&self) -> bool {
        all_finite(&self.to_array())
    }
}

fn approx_eq_slice(a: &[f32], b: &[f32], epsilon: f32) -> bool {
    a.iter().zip(b).all(|(a, b)| (a - b).abs() < epsilon)
}

fn all_finite(components: &[f32]) -> bool {
    components.iter().all(|c| c.is_finite())
}

/// Wrap an angle difference in degrees into `-180..=180`
pub(crate) fn shortest_arc_degrees(delta: f32) -> f32 {
    let wrapped = (delta + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && delta > 0.0 {
        180.0
    } else {
        wrapped
    }
}
