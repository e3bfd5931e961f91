use crate::{
    curve::points::{CurvePoint, PointsCurve},
    foundation::error::{ChoreoError, ChoreoResult},
};

/// One 8-bit hardware step in normalized units. Finer detail is lost on quantization anyway.
pub const DEFAULT_EPSILON: f64 = 1.0 / 255.0;

/// Ramer–Douglas–Peucker reduction in a scaled `(t * scale_t, v * scale_v)` space.
///
/// Every dropped point lies within `epsilon` (perpendicular, scaled space) of the
/// chord that replaces it. First and last points are always kept. The traversal is
/// an explicit stack visited in index order, so the result is deterministic.
pub fn simplify_rdp(
    curve: &PointsCurve,
    epsilon: f64,
    scale_t: f64,
    scale_v: f64,
) -> ChoreoResult<PointsCurve> {
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(ChoreoError::numeric(format!(
            "simplify epsilon must be finite and >= 0, got {epsilon}"
        )));
    }
    if !scale_t.is_finite() || scale_t <= 0.0 || !scale_v.is_finite() || scale_v <= 0.0 {
        return Err(ChoreoError::numeric(
            "simplify scales must be finite and > 0",
        ));
    }

    let pts = curve.points();
    if pts.len() <= 2 {
        return Ok(curve.clone());
    }

    let scaled: Vec<(f64, f64)> = pts.iter().map(|p| (p.t * scale_t, p.v * scale_v)).collect();
    let mut keep = vec![false; pts.len()];
    keep[0] = true;
    keep[pts.len() - 1] = true;

    let mut stack = vec![(0usize, pts.len() - 1)];
    while let Some((first, last)) = stack.pop() {
        if last <= first + 1 {
            continue;
        }
        let mut max_d = 0.0;
        let mut max_i = first;
        for i in (first + 1)..last {
            let d = distance_to_chord(scaled[i], scaled[first], scaled[last]);
            if d > max_d {
                max_d = d;
                max_i = i;
            }
        }
        if max_d > epsilon {
            keep[max_i] = true;
            stack.push((max_i, last));
            stack.push((first, max_i));
        }
    }

    let kept: Vec<CurvePoint> = pts
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect();
    Ok(PointsCurve::from_points_unchecked(kept))
}

/// Perpendicular distance from `p` to the line through `a` and `b`.
pub(crate) fn distance_to_chord(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lx, ly) = (b.0 - a.0, b.1 - a.1);
    let len_sq = lx * lx + ly * ly;
    let (px, py) = (p.0 - a.0, p.1 - a.1);

    // Degenerate chord: distance to the point itself.
    if len_sq < 1e-24 {
        return (px * px + py * py).sqrt();
    }

    let cross = lx * py - ly * px;
    cross.abs() / len_sq.sqrt()
}

#[cfg(test)]
#[path = "../../tests/unit/curve/simplify.rs"]
mod tests;
