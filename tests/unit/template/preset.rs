use super::*;
use crate::{
    geometry::resolver::GeometrySpec,
    template::model::{DimmerSpec, Step},
};

fn template() -> Template {
    Template {
        id: "t".to_string(),
        roles: vec!["a".to_string()],
        seed: 0,
        defaults: Default::default(),
        repeat: Default::default(),
        steps: vec![Step {
            id: "s".to_string(),
            start_bar: 0.0,
            duration_bars: None,
            geometry: GeometrySpec::new("fan", serde_json::Value::Null),
            movement: Default::default(),
            dimmer: DimmerSpec {
                kind: "breathe".to_string(),
                ceiling_dmx: Some(200),
                ..DimmerSpec::default()
            },
            phase: None,
        }],
    }
}

#[test]
fn preset_overrides_defaults_but_not_steps() {
    let preset = Preset {
        id: "club".to_string(),
        intensity: Some(Intensity::Intense),
        dimmer_floor_dmx: Some(40),
        dimmer_ceiling_dmx: Some(250),
        repeat_mode: Some(RepeatMode::PingPong),
        ..Preset::default()
    };
    let patched = preset.apply(&template()).unwrap();
    assert_eq!(patched.repeat.mode, RepeatMode::PingPong);

    let resolved = patched.resolve().unwrap();
    let d = &resolved.steps[0].dimmer;
    assert_eq!(d.intensity, Intensity::Intense);
    assert_eq!(d.floor_dmx, Some(40));
    // The step's own ceiling beats the preset.
    assert_eq!(d.ceiling_dmx, Some(200));
}

#[test]
fn invalid_preset_is_rejected() {
    let preset = Preset {
        id: "bad".to_string(),
        dimmer_max_norm: Some(1.5),
        ..Preset::default()
    };
    assert!(preset.apply(&template()).is_err());
    assert!(Preset::default().validate().is_err());
}
