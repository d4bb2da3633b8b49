//! Interpolation state machine.
//!
//! `LagValue` is a wall-clock-based value source with no internal timers:
//! configure a transition with `set`, then read the linearly interpolated
//! value at any timestamp with `get`. `LagTimer` layers scheduling and
//! event delivery on top.
//!
//! ## Rebased durations
//!
//! A transition does not always take the nominal lag. Its duration is scaled
//! by the ratio of the transition's magnitude to the full value range, so a
//! move across a tenth of the range finishes in a tenth of the lag. The rate
//! of change stays constant across transitions of different sizes; the total
//! time does not.

use serde::{Deserialize, Serialize};

use crate::error::{LagError, Result};

/// Construction parameters for [`LagValue`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LagConfig {
    /// Nominal transition duration in milliseconds: the time a transition
    /// spanning the full value range takes.
    pub lag_ms: f64,
    /// Fixed lower bound. When either bound is absent the range auto-scales
    /// from the values observed.
    #[serde(default)]
    pub min: Option<f64>,
    /// Fixed upper bound.
    #[serde(default)]
    pub max: Option<f64>,
}

impl LagConfig {
    pub fn new(lag_ms: f64) -> Self {
        Self {
            lag_ms,
            min: None,
            max: None,
        }
    }

    /// Fix the value range instead of auto-scaling it.
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// One configured movement from a start value to a stop value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Transition {
    start_value: f64,
    stop_value: f64,
    /// Epoch milliseconds at which the transition began.
    start_ts_ms: f64,
}

/// Time-lagged value source.
///
/// Operates on wall-clock timestamps -- no internal thread. `get` is a pure
/// read and accepts timestamps in the past or future.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LagValue {
    lag_ms: f64,
    /// True when no fixed bounds were supplied; the range then grows to
    /// cover every endpoint ever seen.
    auto_scale: bool,
    min_value: Option<f64>,
    max_value: Option<f64>,
    #[serde(default)]
    transition: Option<Transition>,
}

impl LagValue {
    /// Create an idle value source with no transition configured.
    ///
    /// Fails with [`LagError::InvalidLag`] unless `lag_ms` is finite and
    /// positive, and with [`LagError::InvalidBounds`] when fixed bounds are
    /// non-finite or inverted. Supplying only one bound does not fix the
    /// range; auto-scale stays on.
    pub fn new(config: LagConfig) -> Result<Self> {
        if !config.lag_ms.is_finite() || config.lag_ms <= 0.0 {
            return Err(LagError::InvalidLag {
                lag_ms: config.lag_ms,
            });
        }
        let (auto_scale, min_value, max_value) = match (config.min, config.max) {
            (Some(min), Some(max)) => {
                if !min.is_finite() || !max.is_finite() || min > max {
                    return Err(LagError::InvalidBounds { min, max });
                }
                (false, Some(min), Some(max))
            }
            _ => (true, None, None),
        };
        Ok(Self {
            lag_ms: config.lag_ms,
            auto_scale,
            min_value,
            max_value,
            transition: None,
        })
    }

    /// Create and immediately begin a transition, as if `set` were called.
    pub fn with_initial(
        config: LagConfig,
        start_value: f64,
        stop_value: f64,
        ts_ms: Option<f64>,
    ) -> Result<Self> {
        let mut value = Self::new(config)?;
        value.set(start_value, stop_value, ts_ms)?;
        Ok(value)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn lag_ms(&self) -> f64 {
        self.lag_ms
    }

    pub fn auto_scale(&self) -> bool {
        self.auto_scale
    }

    /// Current value range: the fixed bounds, or the extremes observed so
    /// far. `None` in auto-scale mode before the first `set`.
    pub fn range(&self) -> Option<(f64, f64)> {
        Some((self.min_value?, self.max_value?))
    }

    pub fn start_value(&self) -> Option<f64> {
        Some(self.transition?.start_value)
    }

    pub fn stop_value(&self) -> Option<f64> {
        Some(self.transition?.stop_value)
    }

    /// Epoch milliseconds at which the current transition began.
    pub fn start_ts_ms(&self) -> Option<f64> {
        Some(self.transition?.start_ts_ms)
    }

    /// Actual duration of the current transition in milliseconds: the
    /// nominal lag rebased by `|delta / span|`.
    ///
    /// When the range span is zero (one distinct value ever observed, or
    /// fixed bounds with `min == max`) the nominal lag is used unrebased, so
    /// the result is always finite and positive.
    pub fn effective_lag_ms(&self) -> Option<f64> {
        Some(self.rebase(&self.transition?))
    }

    /// Interpolated value at `ts_ms` (epoch milliseconds), or at the wall
    /// clock when omitted. `None` until the first `set`.
    ///
    /// The result never leaves the closed interval between the endpoints:
    /// past the effective duration it settles at the stop value, and a
    /// timestamp before the transition began reads as the start value.
    pub fn get(&self, ts_ms: Option<f64>) -> Option<f64> {
        let t = self.transition?;
        if t.start_value == t.stop_value {
            return Some(t.start_value);
        }
        let now = ts_ms.unwrap_or_else(now_ms);
        let delta = t.stop_value - t.start_value;
        let progress = (now - t.start_ts_ms) / self.rebase(&t);
        let value = delta * progress + t.start_value;
        let (low, high) = if delta > 0.0 {
            (t.start_value, t.stop_value)
        } else {
            (t.stop_value, t.start_value)
        };
        Some(value.clamp(low, high))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a new transition, superseding the previous one.
    ///
    /// Endpoints and the optional timestamp must be finite. In auto-scale
    /// mode the observed extremes widen to cover both endpoints; they never
    /// narrow. `ts_ms` defaults to the wall clock and may lie in the past.
    pub fn set(&mut self, start_value: f64, stop_value: f64, ts_ms: Option<f64>) -> Result<()> {
        for value in [start_value, stop_value] {
            if !value.is_finite() {
                return Err(LagError::NonFiniteValue { value });
            }
        }
        if let Some(ts) = ts_ms {
            if !ts.is_finite() {
                return Err(LagError::NonFiniteTimestamp { ts });
            }
        }
        if self.auto_scale {
            let low = start_value.min(stop_value);
            let high = start_value.max(stop_value);
            self.min_value = Some(self.min_value.map_or(low, |m| m.min(low)));
            self.max_value = Some(self.max_value.map_or(high, |m| m.max(high)));
        }
        self.transition = Some(Transition {
            start_value,
            stop_value,
            start_ts_ms: ts_ms.unwrap_or_else(now_ms),
        });
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn rebase(&self, t: &Transition) -> f64 {
        let span = match (self.min_value, self.max_value) {
            (Some(min), Some(max)) => max - min,
            // Unreachable once a transition exists, but harmless.
            _ => 0.0,
        };
        if span == 0.0 {
            return self.lag_ms;
        }
        let delta = t.stop_value - t.start_value;
        (delta / span).abs() * self.lag_ms
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as f64
}
