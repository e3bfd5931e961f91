use crate::foundation::error::{ChoreoError, ChoreoResult};

/// One normalized `(t, v)` sample; both coordinates live in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CurvePoint {
    /// Normalized time.
    pub t: f64,
    /// Normalized value.
    pub v: f64,
}

impl CurvePoint {
    /// Shorthand constructor (unchecked; validated when assembled into a curve).
    pub const fn new(t: f64, v: f64) -> Self {
        Self { t, v }
    }
}

/// Non-empty, time-monotonic sequence of [`CurvePoint`]s.
///
/// Construction validates the invariants; every transform in this crate returns a
/// fresh curve, so a `PointsCurve` never changes after it is built.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<CurvePoint>", into = "Vec<CurvePoint>")]
pub struct PointsCurve {
    points: Vec<CurvePoint>,
}

impl TryFrom<Vec<CurvePoint>> for PointsCurve {
    type Error = ChoreoError;

    fn try_from(points: Vec<CurvePoint>) -> ChoreoResult<Self> {
        Self::new(points)
    }
}

impl From<PointsCurve> for Vec<CurvePoint> {
    fn from(c: PointsCurve) -> Self {
        c.points
    }
}

impl PointsCurve {
    /// Build a curve, rejecting empty input, non-finite or out-of-range coordinates,
    /// and decreasing time.
    pub fn new(points: Vec<CurvePoint>) -> ChoreoResult<Self> {
        if points.is_empty() {
            return Err(ChoreoError::numeric("curve must have at least one point"));
        }
        for p in &points {
            if !p.t.is_finite() || !(0.0..=1.0).contains(&p.t) {
                return Err(ChoreoError::numeric(format!(
                    "curve point t must be finite and in [0, 1], got {}",
                    p.t
                )));
            }
            if !p.v.is_finite() || !(0.0..=1.0).contains(&p.v) {
                return Err(ChoreoError::numeric(format!(
                    "curve point v must be finite and in [0, 1], got {}",
                    p.v
                )));
            }
        }
        if !points.windows(2).all(|w| w[0].t <= w[1].t) {
            return Err(ChoreoError::numeric("curve points must be sorted by t"));
        }
        Ok(Self { points })
    }

    /// Two-point flat curve spanning `[0, 1]`.
    pub fn constant(v: f64) -> ChoreoResult<Self> {
        Self::new(vec![CurvePoint::new(0.0, v), CurvePoint::new(1.0, v)])
    }

    /// Sample `f` on the closed grid `i / (n - 1)`.
    ///
    /// Values produced by `f` are arithmetic results, so they are clamped into `[0, 1]`
    /// rather than rejected; a non-finite result is still an error.
    pub fn from_fn(n_samples: usize, f: impl Fn(f64) -> f64) -> ChoreoResult<Self> {
        let grid = closed_grid(n_samples)?;
        let mut points = Vec::with_capacity(grid.len());
        for t in grid {
            let v = f(t);
            if !v.is_finite() {
                return Err(ChoreoError::numeric(format!(
                    "curve generator produced non-finite value at t={t}"
                )));
            }
            points.push(CurvePoint::new(t, v.clamp(0.0, 1.0)));
        }
        Self::new(points)
    }

    /// Ordered points.
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point.
    pub fn first(&self) -> CurvePoint {
        self.points[0]
    }

    /// Last point.
    pub fn last(&self) -> CurvePoint {
        self.points[self.points.len() - 1]
    }

    /// `true` when the curve spans exactly `t = 0` to `t = 1`.
    pub fn is_finalized(&self) -> bool {
        self.first().t == 0.0 && self.last().t == 1.0
    }

    /// `(min, max)` over all point values.
    pub fn value_range(&self) -> (f64, f64) {
        self.points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.v), hi.max(p.v))
            })
    }

    /// `true` when every point carries the same value.
    pub fn is_flat(&self) -> bool {
        let (lo, hi) = self.value_range();
        hi - lo <= f64::EPSILON
    }

    /// Interpolated value at `t`; `t` outside `[0, 1]` holds the nearest endpoint.
    pub fn value_at(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t };
        interp(&self.points, t)
    }

    /// Apply `f` to every value, clamping results into `[0, 1]`.
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> ChoreoResult<Self> {
        let mut points = Vec::with_capacity(self.points.len());
        for p in &self.points {
            let v = f(p.v);
            if !v.is_finite() {
                return Err(ChoreoError::numeric("curve value mapping produced non-finite value"));
            }
            points.push(CurvePoint::new(p.t, v.clamp(0.0, 1.0)));
        }
        Self::new(points)
    }

    /// Time-reversed copy: `v'(t) = v(1 - t)`.
    pub fn reversed(&self) -> Self {
        let points = self
            .points
            .iter()
            .rev()
            .map(|p| CurvePoint::new(1.0 - p.t, p.v))
            .collect();
        Self { points }
    }

    pub(crate) fn from_points_unchecked(points: Vec<CurvePoint>) -> Self {
        debug_assert!(!points.is_empty());
        Self { points }
    }
}

/// Half-open uniform grid `[0, 1/n, ..., (n-1)/n]`.
pub fn sample_uniform_grid(n: usize) -> ChoreoResult<Vec<f64>> {
    if n < 2 {
        return Err(ChoreoError::numeric(format!(
            "uniform grid needs n >= 2, got {n}"
        )));
    }
    Ok((0..n).map(|i| i as f64 / n as f64).collect())
}

/// Closed grid `[0, 1/(n-1), ..., 1]`, used wherever a finalized curve is produced.
pub fn closed_grid(n: usize) -> ChoreoResult<Vec<f64>> {
    if n < 2 {
        return Err(ChoreoError::numeric(format!(
            "closed grid needs n >= 2, got {n}"
        )));
    }
    let denom = (n - 1) as f64;
    Ok((0..n)
        .map(|i| if i == n - 1 { 1.0 } else { i as f64 / denom })
        .collect())
}

/// Linear interpolation over raw points. Never extrapolates.
pub fn interpolate_linear(points: &[CurvePoint], t: f64) -> ChoreoResult<f64> {
    if points.is_empty() {
        return Err(ChoreoError::numeric("cannot interpolate an empty curve"));
    }
    if t.is_nan() {
        return Err(ChoreoError::numeric("interpolation time must not be NaN"));
    }
    Ok(interp(points, t))
}

fn interp(points: &[CurvePoint], t: f64) -> f64 {
    let first = points[0];
    let last = points[points.len() - 1];
    if t <= first.t {
        return first.v;
    }
    if t >= last.t {
        return last.v;
    }

    let idx = points.partition_point(|p| p.t <= t);
    let a = points[idx - 1];
    let b = points[idx];
    let denom = b.t - a.t;
    if denom <= 0.0 {
        return b.v;
    }
    let u = (t - a.t) / denom;
    a.v + (b.v - a.v) * u
}

/// How densely generators sample their patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleBudget {
    /// Samples spent on one pattern cycle.
    pub per_cycle: usize,
    /// Upper bound for one curve.
    pub max: usize,
}

impl Default for SampleBudget {
    fn default() -> Self {
        Self {
            per_cycle: 64,
            max: 4096,
        }
    }
}

impl SampleBudget {
    /// Closed-grid sample count for a curve spanning `cycles` pattern cycles.
    pub fn samples_for(self, cycles: f64) -> usize {
        let whole = if cycles.is_finite() {
            cycles.abs().ceil().max(1.0)
        } else {
            1.0
        };
        let n = (self.per_cycle.max(2) as f64 * whole) as usize + 1;
        n.clamp(3, self.max.max(3))
    }
}

/// Shift a curve in time by resampling.
///
/// Output point `i` sits at `t_i = i / (n - 1)` and samples the input at
/// `t_i + offset_norm`, wrapped modulo 1 when `wrap` is set, clamped otherwise.
/// Point timestamps are never moved directly, so the result only depends on the
/// shape of the input, not on its point density.
pub fn phase_shift(
    curve: &PointsCurve,
    offset_norm: f64,
    n_samples: usize,
    wrap: bool,
) -> ChoreoResult<PointsCurve> {
    if !offset_norm.is_finite() {
        return Err(ChoreoError::numeric("phase offset must be finite"));
    }
    let grid = closed_grid(n_samples)?;
    let points = grid
        .into_iter()
        .map(|t| {
            let src = t + offset_norm;
            let u = if wrap {
                let m = src.rem_euclid(1.0);
                // Whole positive cycles land on the end of the period, not its start.
                if m == 0.0 && src > 0.0 { 1.0 } else { m }
            } else {
                src.clamp(0.0, 1.0)
            };
            CurvePoint::new(t, interp(curve.points(), u))
        })
        .collect();
    Ok(PointsCurve::from_points_unchecked(points))
}

/// Resample both curves onto a shared closed grid and multiply pointwise.
pub fn multiply_curves(
    a: &PointsCurve,
    b: &PointsCurve,
    n_samples: usize,
) -> ChoreoResult<PointsCurve> {
    let grid = closed_grid(n_samples)?;
    let points = grid
        .into_iter()
        .map(|t| CurvePoint::new(t, (a.value_at(t) * b.value_at(t)).clamp(0.0, 1.0)))
        .collect();
    Ok(PointsCurve::from_points_unchecked(points))
}

/// Resample the window `[t0, t1]` of a curve onto a fresh `[0, 1]` curve.
pub fn crop(curve: &PointsCurve, t0: f64, t1: f64, n_samples: usize) -> ChoreoResult<PointsCurve> {
    if !t0.is_finite() || !t1.is_finite() || !(0.0..=1.0).contains(&t0) || !(0.0..=1.0).contains(&t1)
    {
        return Err(ChoreoError::numeric(format!(
            "crop window must lie in [0, 1], got [{t0}, {t1}]"
        )));
    }
    if t1 <= t0 {
        return Err(ChoreoError::numeric(format!(
            "crop window must be non-empty, got [{t0}, {t1}]"
        )));
    }
    let grid = closed_grid(n_samples)?;
    let points = grid
        .into_iter()
        .map(|t| CurvePoint::new(t, curve.value_at(t0 + (t1 - t0) * t)))
        .collect();
    Ok(PointsCurve::from_points_unchecked(points))
}

#[cfg(test)]
#[path = "../../tests/unit/curve/points.rs"]
mod tests;
