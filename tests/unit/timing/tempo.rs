use super::*;

#[test]
fn constant_tempo_maps_bars() {
    let t = TempoMap::constant(120.0);
    assert_eq!(t.bar_to_ms(0.0), 0.0);
    assert_eq!(t.bar_to_ms(1.0), 2000.0);
    assert_eq!(t.bar_to_ms(24.0), 48000.0);
    assert_eq!(t.span_ms(4.0, 2.0), 4000.0);
    assert_eq!(t.first_bar_ms(), 2000.0);
}

#[test]
fn constant_tempo_respects_offset_and_meter() {
    let t = TempoMap::Constant {
        bpm: 90.0,
        beats_per_bar: 3.0,
        offset_ms: 500.0,
    };
    assert_eq!(t.bar_to_ms(0.0), 500.0);
    assert!((t.bar_to_ms(1.0) - 2500.0).abs() < 1e-9);
}

#[test]
fn grid_interpolates_and_extrapolates() {
    let t = TempoMap::Grid {
        bar_starts_ms: vec![0.0, 2000.0, 3900.0],
    };
    t.validate().unwrap();
    assert_eq!(t.bar_to_ms(1.0), 2000.0);
    assert_eq!(t.bar_to_ms(1.5), 2950.0);
    // Past the grid: continue with the last bar length (1900 ms).
    assert_eq!(t.bar_to_ms(3.0), 5800.0);
    // Before bar 0: continue with the first bar length.
    assert_eq!(t.bar_to_ms(-0.5), -1000.0);
}

#[test]
fn validate_rejects_bad_maps() {
    assert!(TempoMap::constant(0.0).validate().is_err());
    assert!(TempoMap::constant(f64::NAN).validate().is_err());
    assert!(
        TempoMap::Grid {
            bar_starts_ms: vec![0.0]
        }
        .validate()
        .is_err()
    );
    assert!(
        TempoMap::Grid {
            bar_starts_ms: vec![0.0, 0.0, 1.0]
        }
        .validate()
        .is_err()
    );
}

#[test]
fn serde_defaults_meter() {
    let t: TempoMap = serde_json::from_str(r#"{"kind":"constant","bpm":128.0}"#).unwrap();
    assert_eq!(
        t,
        TempoMap::Constant {
            bpm: 128.0,
            beats_per_bar: 4.0,
            offset_ms: 0.0
        }
    );
}
