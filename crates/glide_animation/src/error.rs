//! Tween engine error types

use thiserror::Error;

use crate::tween::{TweenId, TweenKind};

/// Errors raised while building tweens, combining them or loading config
#[derive(Error, Debug)]
pub enum TweenError {
    /// Duration-driven tweens need a positive, finite duration
    #[error("Invalid tween duration: {0}")]
    InvalidDuration(f32),

    /// A rate of zero would never reach its target
    #[error("Tween rate must not be zero")]
    ZeroRate,

    #[error("Invalid tween rate: {0}")]
    InvalidRate(f32),

    /// Start delays must be finite and non-negative
    #[error("Invalid start delay: {0}")]
    InvalidDelay(f32),

    /// `from` or `to` contains NaN or infinity
    #[error("Tween endpoints must be finite")]
    NonFiniteValue,

    /// The id is stale or was never issued by this engine
    #[error("Unknown tween: {0:?}")]
    UnknownTween(TweenId),

    /// Combine-lerp requires two value tweens with the same payload type
    #[error("Cannot combine {lead:?} with {follow:?}")]
    KindMismatch { lead: TweenKind, follow: TweenKind },

    /// Combine-lerp is strictly pairwise
    #[error("Tween {0:?} is already part of a combined pair")]
    AlreadyCombined(TweenId),

    /// Failed to parse an engine configuration file
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tween operations
pub type Result<T> = std::result::Result<T, TweenError>;
