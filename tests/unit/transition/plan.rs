use super::*;
use crate::foundation::error::ChoreoError;

fn r(a: f64, b: f64) -> TimeRange {
    TimeRange::new(a, b).unwrap()
}

#[test]
fn only_exact_edges_are_boundaries() {
    let regions = [r(0.0, 48000.0), r(48000.0, 80000.0), r(80000.5, 90000.0)];
    let b = detect_boundaries(&regions);
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].t_ms, 48000.0);
    assert_eq!((b[0].left, b[0].right), (0, 1));
}

#[test]
fn window_is_centered_on_the_boundary() {
    let b = Boundary {
        t_ms: 48000.0,
        left: 0,
        right: 1,
    };
    let plan = plan_transition(&b, r(0.0, 48000.0), r(48000.0, 96000.0), &CompileOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(plan.window, r(47600.0, 48400.0));
    assert_eq!(plan.strategies[&Channel::Tilt], BlendStrategy::SmoothInterpolation);
    assert_eq!(plan.strategies[&Channel::Dimmer], BlendStrategy::FadeViaBlack);
}

#[test]
fn window_shrinks_for_short_regions() {
    let b = Boundary {
        t_ms: 1000.0,
        left: 0,
        right: 1,
    };
    let plan = plan_transition(&b, r(0.0, 1000.0), r(1000.0, 1300.0), &CompileOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(plan.window, r(850.0, 1150.0));

    let none = CompileOptions {
        transition_window_ms: 0.0,
        ..CompileOptions::default()
    };
    assert!(plan_transition(&b, r(0.0, 1000.0), r(1000.0, 1300.0), &none).unwrap().is_none());
}

#[test]
fn illegal_override_fails_planning() {
    let b = Boundary {
        t_ms: 1000.0,
        left: 0,
        right: 1,
    };
    let mut o = CompileOptions::default();
    o.strategies.insert(Channel::Pan, BlendStrategy::Snap);
    let err = plan_transition(&b, r(0.0, 1000.0), r(1000.0, 2000.0), &o).unwrap_err();
    assert!(matches!(err, ChoreoError::Config { .. }));
}
