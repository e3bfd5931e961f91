use crate::foundation::error::{ChoreoError, ChoreoResult};

/// Musical-time to wall-time mapping supplied by the audio analysis layer.
///
/// Implementations must be pure: the same bar always maps to the same millisecond.
pub trait BarClock: Send + Sync {
    /// Absolute time in milliseconds at the start of (fractional) bar `bar`.
    fn bar_to_ms(&self, bar: f64) -> f64;

    /// Duration in milliseconds of `bars` bars starting at `start_bar`.
    fn span_ms(&self, start_bar: f64, bars: f64) -> f64 {
        self.bar_to_ms(start_bar + bars) - self.bar_to_ms(start_bar)
    }
}

/// Built-in tempo maps.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TempoMap {
    /// Fixed tempo.
    Constant {
        /// Beats per minute, `> 0`.
        bpm: f64,
        /// Beats in one bar.
        #[serde(default = "default_beats_per_bar")]
        beats_per_bar: f64,
        /// Time of bar 0.
        #[serde(default)]
        offset_ms: f64,
    },
    /// Measured downbeats; fractional bars interpolate linearly inside a bar and
    /// extrapolate with the nearest bar length outside the grid.
    Grid {
        /// Start time of bar `i` at index `i`; strictly increasing.
        bar_starts_ms: Vec<f64>,
    },
}

fn default_beats_per_bar() -> f64 {
    4.0
}

impl TempoMap {
    /// Constant tempo in 4/4 starting at 0 ms.
    pub fn constant(bpm: f64) -> Self {
        Self::Constant {
            bpm,
            beats_per_bar: default_beats_per_bar(),
            offset_ms: 0.0,
        }
    }

    /// Validate tempo invariants.
    pub fn validate(&self) -> ChoreoResult<()> {
        match self {
            Self::Constant {
                bpm,
                beats_per_bar,
                offset_ms,
            } => {
                if !bpm.is_finite() || *bpm <= 0.0 {
                    return Err(ChoreoError::validation("tempo bpm must be finite and > 0"));
                }
                if !beats_per_bar.is_finite() || *beats_per_bar <= 0.0 {
                    return Err(ChoreoError::validation(
                        "tempo beats_per_bar must be finite and > 0",
                    ));
                }
                if !offset_ms.is_finite() {
                    return Err(ChoreoError::validation("tempo offset_ms must be finite"));
                }
            }
            Self::Grid { bar_starts_ms } => {
                if bar_starts_ms.len() < 2 {
                    return Err(ChoreoError::validation(
                        "tempo grid needs at least two bar starts",
                    ));
                }
                if bar_starts_ms.iter().any(|v| !v.is_finite()) {
                    return Err(ChoreoError::validation("tempo grid entries must be finite"));
                }
                if !bar_starts_ms.windows(2).all(|w| w[0] < w[1]) {
                    return Err(ChoreoError::validation(
                        "tempo grid bar starts must be strictly increasing",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Milliseconds per bar at the start of the map.
    pub fn first_bar_ms(&self) -> f64 {
        self.span_ms(0.0, 1.0)
    }
}

impl BarClock for TempoMap {
    fn bar_to_ms(&self, bar: f64) -> f64 {
        match self {
            Self::Constant {
                bpm,
                beats_per_bar,
                offset_ms,
            } => offset_ms + bar * beats_per_bar * 60_000.0 / bpm,
            Self::Grid { bar_starts_ms } => {
                let n = bar_starts_ms.len();
                if n == 0 {
                    return 0.0;
                }
                if n == 1 {
                    return bar_starts_ms[0];
                }
                let last = (n - 1) as f64;
                let (i, frac) = if bar < 0.0 {
                    (0usize, bar)
                } else if bar >= last {
                    (n - 2, bar - (n - 2) as f64)
                } else {
                    let i = bar.floor() as usize;
                    (i, bar - i as f64)
                };
                let a = bar_starts_ms[i];
                let b = bar_starts_ms[i + 1];
                a + (b - a) * frac
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/tempo.rs"]
mod tests;
