use super::*;

#[test]
fn center_midrange_puts_midpoint_at_half() {
    let skewed = PointsCurve::from_fn(64, |t| 0.1 + 0.2 * (std::f64::consts::TAU * t).sin().abs())
        .unwrap();
    let centered = center_midrange(&skewed).unwrap();
    let (lo, hi) = centered.value_range();
    assert!(((lo + hi) / 2.0 - 0.5).abs() < 1e-9);
    // Shape is preserved.
    let (slo, shi) = skewed.value_range();
    assert!(((hi - lo) - (shi - slo)).abs() < 1e-9);
}

#[test]
fn center_midrange_clamps_wide_curves() {
    let wide = PointsCurve::new(vec![
        CurvePoint::new(0.0, 0.0),
        CurvePoint::new(0.5, 1.0),
        CurvePoint::new(1.0, 0.0),
    ])
    .unwrap();
    let c = center_midrange(&wide).unwrap();
    assert_eq!(c, wide);
}

#[test]
fn ensure_loop_ready_replaces_last_value() {
    let ramp = PointsCurve::new(vec![CurvePoint::new(0.0, 0.2), CurvePoint::new(1.0, 0.8)]).unwrap();
    let looped = ensure_loop_ready(&ramp).unwrap();
    assert_eq!(looped.len(), 2);
    assert_eq!(looped.last(), CurvePoint::new(1.0, 0.2));
    assert!(is_loop_ready(&looped, 0.0));
}

#[test]
fn ensure_loop_ready_appends_closing_point() {
    let open = PointsCurve::new(vec![CurvePoint::new(0.0, 0.3), CurvePoint::new(0.9, 0.7)]).unwrap();
    let looped = ensure_loop_ready(&open).unwrap();
    assert_eq!(looped.len(), 3);
    assert_eq!(looped.last(), CurvePoint::new(1.0, 0.3));
}

#[test]
fn ensure_loop_ready_handles_single_point() {
    let single = PointsCurve::new(vec![CurvePoint::new(0.0, 0.4)]).unwrap();
    let looped = ensure_loop_ready(&single).unwrap();
    assert_eq!(looped.len(), 2);
    assert!(looped.is_finalized());
    assert!(is_loop_ready(&looped, 0.0));
}

#[test]
fn neutral_values_per_semantic() {
    assert_eq!(CurveSemantic::MovementOffset.neutral(), 0.5);
    assert_eq!(CurveSemantic::DimmerAbsolute.neutral(), 0.0);
}
