use super::*;
use crate::rig::calibration::{PoseAnchor, TiltDirection};

fn roles(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn chevron_splits_halves_around_center() {
    let roles = roles(&["lo", "li", "ri", "ro"]);
    let spec = GeometrySpec::new(
        "chevron",
        serde_json::json!({ "pan_spread": 0.3, "inner_tilt_bias": 0.1, "outer_tilt_bias": -0.1 }),
    );
    let f = parse_formation(&spec, &roles).unwrap();
    let rig = RigCalibration::default();
    let poses: Vec<BasePose> = roles
        .iter()
        .map(|r| resolve(r, &roles, &f, &rig).unwrap())
        .collect();

    assert!(close(poses[0].pan, 0.2));
    assert!(close(poses[1].pan, 0.5));
    assert!(close(poses[2].pan, 0.5));
    assert!(close(poses[3].pan, 0.8));
    assert!(close(poses[0].tilt, 0.4));
    assert!(close(poses[1].tilt, 0.6));
}

#[test]
fn chevron_tilt_bias_follows_mounting() {
    let roles = roles(&["lo", "li", "ri", "ro"]);
    let spec = GeometrySpec::new(
        "chevron",
        serde_json::json!({ "inner_roles": ["li", "ri"], "inner_tilt_bias": 0.1 }),
    );
    let f = parse_formation(&spec, &roles).unwrap();
    let rig = RigCalibration {
        tilt_up: TiltDirection::Decreasing,
        ..RigCalibration::default()
    };
    let p = resolve("li", &roles, &f, &rig).unwrap();
    assert!(close(p.tilt, 0.4));
}

#[test]
fn chevron_odd_middle_role_sits_on_center() {
    let roles = roles(&["a", "b", "c", "d", "e"]);
    let f = parse_formation(&GeometrySpec::new("chevron", serde_json::Value::Null), &roles).unwrap();
    let p = resolve("c", &roles, &f, &RigCalibration::default()).unwrap();
    assert!(close(p.pan, 0.5));
}

#[test]
fn fan_is_linear_and_single_role_uses_start() {
    let rs = roles(&["a", "b", "c"]);
    let spec = GeometrySpec::new("fan", serde_json::json!({ "pan_start": 0.1, "pan_end": 0.9 }));
    let f = parse_formation(&spec, &rs).unwrap();
    let rig = RigCalibration::default();
    assert!(close(resolve("b", &rs, &f, &rig).unwrap().pan, 0.5));

    let single = roles(&["solo"]);
    let f = parse_formation(&spec, &single).unwrap();
    assert!(close(resolve("solo", &single, &f, &rig).unwrap().pan, 0.1));
}

#[test]
fn role_pose_and_aim_zone_read_the_rig() {
    let rs = roles(&["a", "b"]);
    let mut rig = RigCalibration::default();
    rig.pose_anchors
        .insert("stage_left".to_string(), PoseAnchor { pan: 0.1, tilt: 0.7 });
    rig.aim_zones
        .insert("crowd".to_string(), PoseAnchor { pan: 0.5, tilt: 0.3 });

    let spec = GeometrySpec::new(
        "role_pose",
        serde_json::json!({ "poses": { "a": "stage_left", "b": "stage_left" } }),
    );
    let f = parse_formation(&spec, &rs).unwrap();
    assert_eq!(resolve("b", &rs, &f, &rig).unwrap(), BasePose::new(0.1, 0.7));

    let f = parse_formation(
        &GeometrySpec::new("aim_zone", serde_json::json!({ "zone": "crowd" })),
        &rs,
    )
    .unwrap();
    assert_eq!(resolve("a", &rs, &f, &rig).unwrap(), BasePose::new(0.5, 0.3));

    let f = parse_formation(
        &GeometrySpec::new("aim_zone", serde_json::json!({ "zone": "nowhere" })),
        &rs,
    )
    .unwrap();
    assert!(resolve("a", &rs, &f, &rig).is_err());
}

#[test]
fn unknown_role_is_a_config_error() {
    let rs = roles(&["a", "b"]);
    let f = parse_formation(&GeometrySpec::new("fan", serde_json::Value::Null), &rs).unwrap();
    let err = resolve("zz", &rs, &f, &RigCalibration::default()).unwrap_err();
    assert!(matches!(err, ChoreoError::Config { .. }));
    assert!(err.to_string().contains("zz"));
}

#[test]
fn unknown_formation_and_bad_params_fail() {
    let rs = roles(&["a"]);
    let err = parse_formation(&GeometrySpec::new("zigzag", serde_json::Value::Null), &rs)
        .unwrap_err();
    assert!(err.to_string().contains("zigzag"));
    assert!(
        parse_formation(
            &GeometrySpec::new("fan", serde_json::json!({ "pan_start": 2.0 })),
            &rs
        )
        .is_err()
    );
    assert!(
        parse_formation(
            &GeometrySpec::new("fan", serde_json::json!({ "bogus": 1 })),
            &rs
        )
        .is_err()
    );
    assert!(
        parse_formation(
            &GeometrySpec::new("chevron", serde_json::json!({ "inner_roles": ["x"] })),
            &rs
        )
        .is_err()
    );
}
