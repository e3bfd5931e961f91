use super::*;
use crate::{
    curve::points::{CurvePoint, PointsCurve},
    foundation::core::TimeRange,
};

fn range(a: f64, b: f64) -> TimeRange {
    TimeRange::new(a, b).unwrap()
}

fn pan(base: f64, amp: f64, body: SegmentBody) -> FixtureSegment {
    FixtureSegment::movement("mh1", Channel::Pan, range(0.0, 1000.0), body, base, amp, 0.0, 255.0)
        .unwrap()
}

#[test]
fn movement_offset_scenario() {
    let seg = pan(96.0, 60.0, SegmentBody::Static(0.65));
    assert!((dmx_value(&seg, 0.65).unwrap() - 105.0).abs() < 1e-9);
}

#[test]
fn dimmer_absolute_scenario() {
    let seg =
        FixtureSegment::dimmer("mh1", range(0.0, 1000.0), SegmentBody::Static(0.65), 60.0, 255.0)
            .unwrap();
    let v = dmx_value(&seg, 0.65).unwrap();
    assert!((v - 186.75).abs() < 1e-9);
    assert_eq!(dmx_byte(v), 187);
}

#[test]
fn neutral_offset_lands_on_base_and_inversion_flips() {
    let seg = pan(120.0, -200.0, SegmentBody::Static(0.5));
    assert_eq!(dmx_value(&seg, 0.5).unwrap(), 120.0);
    assert!((dmx_value(&seg, 0.6).unwrap() - 100.0).abs() < 1e-9);
}

#[test]
fn results_are_clamped_to_segment_bounds() {
    let mut seg = pan(250.0, 255.0, SegmentBody::Static(1.0));
    seg.clamp_max = 240.0;
    assert_eq!(dmx_value(&seg, 1.0).unwrap(), 240.0);
    assert!(dmx_value(&seg, f64::NAN).is_err());

    let mut broken = seg.clone();
    broken.base_dmx = None;
    assert!(dmx_value(&broken, 0.5).is_err());
}

#[test]
fn export_collapses_flat_runs() {
    let curve = PointsCurve::new(vec![
        CurvePoint::new(0.0, 0.0),
        CurvePoint::new(0.25, 0.0),
        CurvePoint::new(0.5, 0.0),
        CurvePoint::new(1.0, 1.0),
    ])
    .unwrap();
    let seg =
        FixtureSegment::dimmer("mh1", range(0.0, 1000.0), SegmentBody::Curve(curve), 0.0, 255.0)
            .unwrap();
    let out = to_dmx_segment(&seg).unwrap();
    match out.values {
        DmxValues::Points(p) => {
            let ts: Vec<f64> = p.iter().map(|x| x.t_ms).collect();
            assert_eq!(ts, vec![0.0, 500.0, 1000.0]);
            assert_eq!(p[2].value, 255);
        }
        DmxValues::Static(_) => panic!("expected points"),
    }

    let flat = PointsCurve::new(vec![CurvePoint::new(0.0, 0.5), CurvePoint::new(1.0, 0.5)]).unwrap();
    let seg =
        FixtureSegment::dimmer("mh1", range(0.0, 10.0), SegmentBody::Curve(flat), 0.0, 255.0)
            .unwrap();
    assert_eq!(to_dmx_segment(&seg).unwrap().values, DmxValues::Static(128));
}

#[test]
fn resolve_at_prefers_higher_layers() {
    let base =
        FixtureSegment::dimmer("mh1", range(0.0, 1000.0), SegmentBody::Static(1.0), 0.0, 255.0)
            .unwrap();
    let over =
        FixtureSegment::dimmer("mh1", range(400.0, 600.0), SegmentBody::Static(0.0), 0.0, 255.0)
            .unwrap()
            .into_transition();
    let segs = vec![base, over];
    assert_eq!(resolve_at(&segs, "mh1", Channel::Dimmer, 100.0).unwrap(), Some(255.0));
    assert_eq!(resolve_at(&segs, "mh1", Channel::Dimmer, 500.0).unwrap(), Some(0.0));
    assert_eq!(resolve_at(&segs, "mh1", Channel::Dimmer, 1000.0).unwrap(), None);
    assert_eq!(resolve_at(&segs, "mh2", Channel::Dimmer, 100.0).unwrap(), None);
}

#[test]
fn held_value_extends_edges() {
    let ramp = PointsCurve::new(vec![CurvePoint::new(0.0, 0.2), CurvePoint::new(1.0, 0.8)]).unwrap();
    let seg = FixtureSegment::dimmer("mh1", range(100.0, 200.0), SegmentBody::Curve(ramp), 0.0, 100.0)
        .unwrap();
    let segs = vec![seg];
    let after = held_value_at(&segs, "mh1", Channel::Dimmer, 500.0).unwrap().unwrap();
    assert!((after - 80.0).abs() < 1e-9);
    let before = held_value_at(&segs, "mh1", Channel::Dimmer, 0.0).unwrap().unwrap();
    assert!((before - 20.0).abs() < 1e-9);
    assert!(held_value_at(&segs, "mh9", Channel::Dimmer, 0.0).unwrap().is_none());
}
