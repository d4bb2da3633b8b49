//! # Lagnum Core Library
//!
//! A time-lagged value source: configure a transition from a start value to
//! a stop value and read the linearly interpolated value at any timestamp.
//! Transition durations are rebased against the value range -- fixed bounds,
//! or the extremes observed so far -- so the rate of change stays constant
//! across transitions of different magnitudes.
//!
//! ## Key Components
//!
//! - [`LagValue`]: wall-clock interpolation state machine (`set`/`get`),
//!   no internal timers
//! - [`LagTimer`]: timer layer that broadcasts [`Event::TargetReached`]
//!   when a transition settles and drives periodic progress callbacks via
//!   [`LagTimer::run_with_progress`]
//! - [`LagConfig`]: construction parameters (nominal lag, optional fixed
//!   bounds)

pub mod error;
pub mod events;
pub mod lag;

pub use error::{LagError, Result};
pub use events::Event;
pub use lag::{LagConfig, LagTimer, LagValue};
