use super::*;

const ALL: [Ease; 6] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::InOutCubic,
    Ease::InOutSine,
];

#[test]
fn endpoints_are_stable() {
    for ease in ALL {
        assert!(ease.apply(0.0).abs() < 1e-12, "{ease:?}");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-12, "{ease:?}");
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in ALL {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b, "{ease:?}");
        assert!(b < c, "{ease:?}");
    }
}

#[test]
fn in_out_sine_has_flat_edges() {
    let h = 1e-6;
    let d0 = (Ease::InOutSine.apply(h) - Ease::InOutSine.apply(0.0)) / h;
    let d1 = (Ease::InOutSine.apply(1.0) - Ease::InOutSine.apply(1.0 - h)) / h;
    assert!(d0.abs() < 1e-4);
    assert!(d1.abs() < 1e-4);
    assert!((Ease::InOutSine.apply(0.5) - 0.5).abs() < 1e-12);
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::InOutSine.apply(-2.0), 0.0);
    assert_eq!(Ease::Linear.apply(3.0), 1.0);
}

#[test]
fn reads_from_options_json() {
    let e: Ease = serde_json::from_str(r#""in_out_cubic""#).unwrap();
    assert_eq!(e, Ease::InOutCubic);
}
