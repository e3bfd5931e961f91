use super::*;
use crate::timing::tempo::TempoMap;

fn request(clock: &TempoMap, pattern: DimmerPattern) -> DimmerRequest<'_> {
    DimmerRequest {
        pattern,
        intensity: Intensity::Intense,
        level: 1.0,
        period_bars: 1.0,
        start_bar: 0.0,
        span_bars: 2.0,
        clock,
        min_norm: 0.0,
        max_norm: 1.0,
        floor_dmx: 0,
        ceiling_dmx: 255,
        seed: 3,
        budget: SampleBudget::default(),
    }
}

fn curve(out: &DimmerOutput) -> &PointsCurve {
    match &out.body {
        DimmerBody::Curve(c) => &c.curve,
        DimmerBody::Static(_) => panic!("expected a curve"),
    }
}

#[test]
fn breathe_peaks_mid_cycle_with_two_cycles_per_two_bars() {
    let clock = TempoMap::constant(120.0);
    let out = generate(&request(&clock, DimmerPattern::Breathe)).unwrap();
    let c = curve(&out);
    assert!(c.first().v.abs() < 1e-12);
    assert!((c.value_at(0.25) - 1.0).abs() < 1e-9);
    assert!(c.value_at(0.5).abs() < 1e-9);
    assert!(c.last().v.abs() < 1e-9);
}

#[test]
fn intensity_depth_then_norm_window() {
    let clock = TempoMap::constant(120.0);
    let mut req = request(&clock, DimmerPattern::Breathe);
    req.intensity = Intensity::Dramatic;
    req.min_norm = 0.1;
    req.max_norm = 0.9;
    let out = generate(&req).unwrap();
    let c = curve(&out);
    assert!((c.value_at(0.25) - (0.1 + 0.9 * 0.8)).abs() < 1e-9);
    assert!((c.first().v - 0.1).abs() < 1e-12);
}

#[test]
fn period_follows_the_tempo_map() {
    let clock = TempoMap::Grid {
        bar_starts_ms: vec![0.0, 1000.0, 3000.0],
    };
    let mut req = request(&clock, DimmerPattern::RampUp);
    req.start_bar = 1.0;
    req.span_bars = 1.0;
    req.period_bars = 0.5;
    let out = generate(&req).unwrap();
    let c = curve(&out);
    // Two ramps across the bar.
    assert!((c.value_at(0.25) - 0.5).abs() < 0.02);
    assert!((c.value_at(0.75) - 0.5).abs() < 0.02);
}

#[test]
fn static_and_off_are_levels() {
    let clock = TempoMap::constant(120.0);
    let mut req = request(&clock, DimmerPattern::Static);
    req.level = 0.5;
    req.min_norm = 0.2;
    req.max_norm = 0.6;
    match generate(&req).unwrap().body {
        DimmerBody::Static(v) => assert!((v - 0.4).abs() < 1e-12),
        DimmerBody::Curve(_) => panic!("expected a level"),
    }

    req.level = 1.5;
    let err = generate(&req).unwrap_err();
    assert!(err.to_string().contains("dimmer.level"), "{err}");
}

#[test]
fn off_drops_below_the_floor() {
    let clock = TempoMap::constant(120.0);
    let mut req = request(&clock, DimmerPattern::Off);
    req.floor_dmx = 40;
    let out = generate(&req).unwrap();
    assert_eq!(out.body, DimmerBody::Static(0.0));
    assert_eq!(out.floor_dmx, 0);
}

#[test]
fn flicker_is_seeded() {
    let clock = TempoMap::constant(120.0);
    let a = generate(&request(&clock, DimmerPattern::Flicker)).unwrap();
    let b = generate(&request(&clock, DimmerPattern::Flicker)).unwrap();
    assert_eq!(a, b);
    let mut req = request(&clock, DimmerPattern::Flicker);
    req.seed = 4;
    assert_ne!(a, generate(&req).unwrap());
}

#[test]
fn invalid_ranges_are_config_errors() {
    let clock = TempoMap::constant(120.0);
    let mut req = request(&clock, DimmerPattern::Breathe);
    req.min_norm = 0.8;
    req.max_norm = 0.2;
    let err = generate(&req).unwrap_err();
    assert!(matches!(err, ChoreoError::Config { .. }));
    assert!(err.to_string().contains("dimmer.max_norm"));

    let mut req = request(&clock, DimmerPattern::Breathe);
    req.floor_dmx = 200;
    req.ceiling_dmx = 100;
    assert!(generate(&req).is_err());

    let mut req = request(&clock, DimmerPattern::Pulse);
    req.period_bars = 0.0;
    assert!(generate(&req).is_err());
}

#[test]
fn pulse_decays_within_each_cycle() {
    let clock = TempoMap::constant(120.0);
    let out = generate(&request(&clock, DimmerPattern::Pulse)).unwrap();
    let c = curve(&out);
    assert!((c.first().v - 1.0).abs() < 1e-12);
    assert!(c.value_at(0.2) < c.value_at(0.05));
}

#[test]
fn names_parse() {
    assert_eq!(
        DimmerPattern::parse("fade_in", "dimmer.type").unwrap(),
        DimmerPattern::RampUp
    );
    assert!(DimmerPattern::Off.is_static());
    assert!(DimmerPattern::parse("disco", "dimmer.type").is_err());
}
