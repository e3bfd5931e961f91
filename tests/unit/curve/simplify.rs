use super::*;

fn max_deviation(original: &PointsCurve, simplified: &PointsCurve) -> f64 {
    let s = simplified.points();
    let mut worst: f64 = 0.0;
    for p in original.points() {
        let idx = s.partition_point(|q| q.t <= p.t).clamp(1, s.len() - 1);
        let a = s[idx - 1];
        let b = s[idx];
        let d = distance_to_chord((p.t, p.v), (a.t, a.v), (b.t, b.v));
        worst = worst.max(d);
    }
    worst
}

#[test]
fn straight_line_collapses_to_endpoints() {
    let line = PointsCurve::from_fn(100, |t| 0.2 + 0.6 * t).unwrap();
    let s = simplify_rdp(&line, DEFAULT_EPSILON, 1.0, 1.0).unwrap();
    assert_eq!(s.len(), 2);
    assert_eq!(s.first(), line.first());
    assert_eq!(s.last(), line.last());
}

#[test]
fn deviation_is_bounded_by_epsilon() {
    let wave = PointsCurve::from_fn(512, |t| 0.5 + 0.45 * (std::f64::consts::TAU * 3.0 * t).sin())
        .unwrap();
    for eps in [DEFAULT_EPSILON, 0.01, 0.05] {
        let s = simplify_rdp(&wave, eps, 1.0, 1.0).unwrap();
        assert!(s.len() < wave.len());
        assert_eq!(s.first(), wave.first());
        assert_eq!(s.last(), wave.last());
        assert!(max_deviation(&wave, &s) <= eps + 1e-12, "eps={eps}");
    }
}

#[test]
fn zero_epsilon_keeps_every_corner() {
    let zigzag = PointsCurve::new(vec![
        CurvePoint::new(0.0, 0.0),
        CurvePoint::new(0.25, 1.0),
        CurvePoint::new(0.5, 0.0),
        CurvePoint::new(0.75, 1.0),
        CurvePoint::new(1.0, 0.0),
    ])
    .unwrap();
    let s = simplify_rdp(&zigzag, 0.0, 1.0, 1.0).unwrap();
    assert_eq!(s.len(), 5);
}

#[test]
fn simplification_is_deterministic() {
    let wave = PointsCurve::from_fn(300, |t| 0.5 + 0.3 * (std::f64::consts::TAU * t).cos()).unwrap();
    let a = simplify_rdp(&wave, 0.002, 1.0, 1.0).unwrap();
    let b = simplify_rdp(&wave, 0.002, 1.0, 1.0).unwrap();
    assert_eq!(a, b);
}

#[test]
fn rejects_bad_parameters() {
    let c = PointsCurve::constant(0.5).unwrap();
    assert!(simplify_rdp(&c, -1.0, 1.0, 1.0).is_err());
    assert!(simplify_rdp(&c, f64::NAN, 1.0, 1.0).is_err());
    assert!(simplify_rdp(&c, 0.1, 0.0, 1.0).is_err());
}

#[test]
fn value_scale_tightens_fidelity() {
    let wave = PointsCurve::from_fn(256, |t| 0.5 + 0.05 * (std::f64::consts::TAU * t).sin()).unwrap();
    let loose = simplify_rdp(&wave, 0.01, 1.0, 1.0).unwrap();
    let tight = simplify_rdp(&wave, 0.01, 1.0, 10.0).unwrap();
    assert!(tight.len() >= loose.len());
}
