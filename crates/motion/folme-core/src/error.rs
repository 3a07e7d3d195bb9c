//! Error types for force/easing configuration and integration.

use thiserror::Error;

/// Errors produced while configuring or advancing animations.
///
/// Configuration problems are reported when a target is assigned
/// (`Manager::to`), never silently at tick time.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum MotionError {
    /// A property target was NaN or infinite.
    #[error("invalid target for '{property}': {value}")]
    InvalidTarget { property: String, value: f64 },

    /// Spring parameters outside their valid domain.
    #[error("invalid spring (damping={damping}, response={response}, mass={mass}): {reason}")]
    InvalidSpring {
        damping: f64,
        response: f64,
        mass: f64,
        reason: &'static str,
    },

    #[error("invalid friction ratio {friction_ratio}: must be finite and > 0")]
    InvalidFriction { friction_ratio: f64 },

    #[error("invalid easing duration {duration_ms}ms: must be finite and > 0")]
    InvalidEasing { duration_ms: f64 },

    /// Cubic bezier x control points must lie in [0, 1] so the curve stays a function of time.
    #[error("invalid cubic bezier ({x1}, {y1}, {x2}, {y2}): x control points must be in [0, 1]")]
    InvalidBezier { x1: f64, y1: f64, x2: f64, y2: f64 },

    #[error("force chain for '{property}' is empty")]
    EmptyForceChain { property: String },

    #[error("invalid timeline config (max_delta_ms={max_delta_ms}, time_scale={time_scale}): {reason}")]
    InvalidTimelineConfig {
        max_delta_ms: f64,
        time_scale: f64,
        reason: &'static str,
    },

    #[error("invalid time scale {factor}: must be finite and > 0")]
    InvalidTimeScale { factor: f64 },

    /// Integration produced NaN/inf; the property was stopped.
    #[error("non-finite state for '{property}' (value={value}, speed={speed})")]
    NonFinite {
        property: String,
        value: f64,
        speed: f64,
    },
}

impl MotionError {
    /// Whether the error stems from caller-supplied configuration.
    #[inline]
    pub fn is_config_error(&self) -> bool {
        !matches!(self, Self::NonFinite { .. })
    }
}
