use crate::foundation::error::{ChoreoError, ChoreoResult};

/// Highest value of an 8-bit DMX channel.
pub const DMX_MAX: f64 = 255.0;

/// Half-open millisecond range `[start_ms, end_ms)` on the show timeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    /// Inclusive range start.
    pub start_ms: f64,
    /// Exclusive range end.
    pub end_ms: f64,
}

impl TimeRange {
    /// Create a validated range with finite bounds and `start <= end`.
    pub fn new(start_ms: f64, end_ms: f64) -> ChoreoResult<Self> {
        if !start_ms.is_finite() || !end_ms.is_finite() {
            return Err(ChoreoError::numeric("TimeRange bounds must be finite"));
        }
        if start_ms > end_ms {
            return Err(ChoreoError::numeric("TimeRange start must be <= end"));
        }
        Ok(Self { start_ms, end_ms })
    }

    /// Range length in milliseconds.
    pub fn len_ms(self) -> f64 {
        (self.end_ms - self.start_ms).max(0.0)
    }

    /// Return `true` when the range covers no time.
    pub fn is_empty(self) -> bool {
        self.end_ms <= self.start_ms
    }

    /// Return `true` when `t_ms` is inside `[start, end)`.
    pub fn contains(self, t_ms: f64) -> bool {
        self.start_ms <= t_ms && t_ms < self.end_ms
    }

    /// Map an absolute time to normalized progress inside the range, clamped to `[0, 1]`.
    ///
    /// Empty ranges report `1.0`.
    pub fn progress(self, t_ms: f64) -> f64 {
        let len = self.len_ms();
        if len <= 0.0 {
            return 1.0;
        }
        ((t_ms - self.start_ms) / len).clamp(0.0, 1.0)
    }

    /// Map normalized progress back to absolute time.
    pub fn at(self, u: f64) -> f64 {
        self.start_ms + self.len_ms() * u
    }

    /// Intersection of two ranges, `None` when they do not overlap.
    pub fn intersect(self, other: Self) -> Option<Self> {
        let start_ms = self.start_ms.max(other.start_ms);
        let end_ms = self.end_ms.min(other.end_ms);
        (start_ms < end_ms).then_some(Self { start_ms, end_ms })
    }
}

/// Fixture channel addressed by the compiler.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Horizontal rotation.
    Pan,
    /// Vertical rotation.
    Tilt,
    /// Brightness.
    Dimmer,
}

impl Channel {
    /// All channels in stable output order.
    pub const ALL: [Channel; 3] = [Channel::Pan, Channel::Tilt, Channel::Dimmer];

    /// How values on this channel may change between states.
    pub fn kind(self) -> ChannelKind {
        match self {
            Self::Pan | Self::Tilt => ChannelKind::ContinuousMotion,
            Self::Dimmer => ChannelKind::ContinuousIntensity,
        }
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pan => "pan",
            Self::Tilt => "tilt",
            Self::Dimmer => "dimmer",
        }
    }
}

/// Value-change behaviour of a channel; drives which blend strategies are legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelKind {
    /// Mechanical motion; intermediate values are physically travelled.
    ContinuousMotion,
    /// Light output; intermediate values are visible but nothing moves.
    ContinuousIntensity,
    /// Indexed selections (color wheel slot, gobo) that must never interpolate.
    Discrete,
}

/// Validate that a normalized value is finite and in `[0, 1]`.
pub fn check_unit(v: f64, what: &str) -> ChoreoResult<f64> {
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err(ChoreoError::numeric(format!(
            "{what} must be finite and in [0, 1], got {v}"
        )));
    }
    Ok(v)
}

/// Round and clamp a DMX-space value into a channel byte.
pub fn dmx_byte(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, DMX_MAX) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
