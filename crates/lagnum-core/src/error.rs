//! Error types for lagnum-core.
//!
//! All errors are synchronous and local to the call that caused them. The
//! completion future and the event channel never carry errors.

use thiserror::Error;

/// Core error type for lagnum-core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LagError {
    /// The nominal lag must be a positive finite number of milliseconds.
    #[error("lag must be a positive finite number of milliseconds, got {lag_ms}")]
    InvalidLag { lag_ms: f64 },

    /// Fixed bounds must be finite and ordered.
    #[error("bounds must be finite with min <= max, got min={min}, max={max}")]
    InvalidBounds { min: f64, max: f64 },

    /// Transition endpoints must be finite so they can never poison the
    /// auto-scale extremes.
    #[error("value must be a finite number, got {value}")]
    NonFiniteValue { value: f64 },

    /// Explicit timestamps must be finite epoch milliseconds.
    #[error("timestamp must be a finite number of epoch milliseconds, got {ts}")]
    NonFiniteTimestamp { ts: f64 },
}

/// Result type alias for LagError.
pub type Result<T, E = LagError> = std::result::Result<T, E>;
