//! Glide Core Runtime
//!
//! Foundational primitives for the Glide tween engine:
//!
//! - **Lifecycle FSM**: explicit tween states with an exhaustive transition table
//! - **Observer Lists**: ordered, re-entrancy safe callback registries
//! - **Frame Clocks**: scaled/unscaled frame timing, manual or wall-clock driven
//! - **Value Types**: vectors, rectangles, matrices, quaternions and colors
//!
//! # Example
//!
//! ```rust
//! use glide_core::fsm::{LifecycleEvent, TweenState};
//!
//! let mut state = TweenState::Done;
//! state.send(LifecycleEvent::Register);
//! state.send(LifecycleEvent::Promote);
//! assert!(state.is_active());
//!
//! // Resume is only defined from a paused state
//! assert!(!state.send(LifecycleEvent::Resume));
//! ```

pub mod clock;
pub mod events;
pub mod fsm;
pub mod math;

pub use clock::{FrameClock, ManualClock, SystemClock};
pub use events::{ObserverId, ObserverKind, ObserverList};
pub use fsm::{Direction, LifecycleEvent, TweenState};
pub use math::{Color, Mat4, Quat, Rect, Vec2, Vec3, Vec4};
