//! Glide Animation System
//!
//! Frame-driven tweens with pooled instances, looping, chaining and combine
//! modes.
//!
//! # Features
//!
//! - **Easing**: the full Penner set plus spring and cubic bezier curves
//! - **Tweens**: values or positional channels, written through callbacks
//! - **Loops**: hard loops or pingpong, finite or infinite, rate or duration driven
//! - **Pooling**: fixed arena, LRU fallback cache, zero failures on exhaustion
//! - **Chaining**: queues that start each tween when the previous one is done
//! - **Combining**: concurrent positional writers reconcile, value pairs blend
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use glide_animation::{TweenBuilder, TweenEngine};
//! use glide_core::ManualClock;
//!
//! let mut engine = TweenEngine::new();
//! let mut clock = ManualClock::new();
//!
//! let value = Rc::new(Cell::new(0.0f32));
//! let sink = Rc::clone(&value);
//! engine
//!     .spawn(TweenBuilder::value(0.0f32, 10.0, 2.0, move |v| sink.set(v)))
//!     .unwrap();
//!
//! for _ in 0..4 {
//!     engine.update(clock.advance(0.5));
//! }
//! assert_eq!(value.get(), 10.0);
//! assert!(engine.is_empty());
//! ```

pub mod chain;
pub mod config;
pub mod curve;
pub mod easing;
pub mod error;
pub mod interpolator;
pub mod pool;
pub mod properties;
pub mod scheduler;
pub mod tween;
pub mod values;

pub use chain::TweenQueue;
pub use config::EngineConfig;
pub use curve::{AnimationCurve, CurveKey, KeyframeCurve};
pub use easing::Easing;
pub use error::{Result, TweenError};
pub use interpolator::{
    Interpolator, PositionalInterpolator, PositionalKind, TweenKind, ValueInterpolator,
};
pub use pool::{FixedPool, PoolStats, TweenPool};
pub use properties::{DriveMode, Loops, TweenProperties};
pub use scheduler::TweenEngine;
pub use tween::{Origin, TargetId, Tween, TweenBuilder, TweenCallback, TweenId};
pub use values::{Interpolate, TweenValue, ValueKind};
