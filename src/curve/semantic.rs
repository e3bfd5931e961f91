use crate::{
    curve::points::{CurvePoint, PointsCurve},
    foundation::error::ChoreoResult,
};

/// What a curve value means once it reaches hardware units.
///
/// Attached by the generator that produced the curve and never inferred later;
/// [`crate::dmx_value`] matches on it exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveSemantic {
    /// `0.5` is zero displacement from the base pose.
    MovementOffset,
    /// `0` is off, `1` is full output.
    DimmerAbsolute,
}

impl CurveSemantic {
    /// Value that means "nothing happening" for this semantic.
    pub fn neutral(self) -> f64 {
        match self {
            Self::MovementOffset => 0.5,
            Self::DimmerAbsolute => 0.0,
        }
    }
}

/// A curve together with its semantic tag.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TaggedCurve {
    /// Normalized curve.
    pub curve: PointsCurve,
    /// Meaning of the values.
    pub semantic: CurveSemantic,
}

impl TaggedCurve {
    /// Tag `curve` as a movement offset.
    pub fn movement(curve: PointsCurve) -> Self {
        Self {
            curve,
            semantic: CurveSemantic::MovementOffset,
        }
    }

    /// Tag `curve` as an absolute dimmer level.
    pub fn dimmer(curve: PointsCurve) -> Self {
        Self {
            curve,
            semantic: CurveSemantic::DimmerAbsolute,
        }
    }
}

/// Shift every value by `0.5 - (min + max) / 2`, then clamp to `[0, 1]`.
pub fn center_midrange(curve: &PointsCurve) -> ChoreoResult<PointsCurve> {
    let (lo, hi) = curve.value_range();
    let shift = 0.5 - (lo + hi) / 2.0;
    curve.map_values(|v| v + shift)
}

/// Force `v(1) == v(0)`.
///
/// A curve that already ends at `t = 1` gets its last value replaced; otherwise a
/// closing point at `t = 1` is appended.
pub fn ensure_loop_ready(curve: &PointsCurve) -> ChoreoResult<PointsCurve> {
    let first = curve.first();
    let last = curve.last();
    if last.v == first.v && last.t == 1.0 {
        return Ok(curve.clone());
    }

    let mut pts = curve.points().to_vec();
    if last.t == 1.0 && pts.len() > 1 {
        let n = pts.len();
        pts[n - 1] = CurvePoint::new(1.0, first.v);
    } else {
        pts.push(CurvePoint::new(1.0, first.v));
    }
    PointsCurve::new(pts)
}

/// `true` when the curve's endpoint values match within `tol`.
pub fn is_loop_ready(curve: &PointsCurve, tol: f64) -> bool {
    (curve.first().v - curve.last().v).abs() <= tol
}

#[cfg(test)]
#[path = "../../tests/unit/curve/semantic.rs"]
mod tests;
