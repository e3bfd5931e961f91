use super::*;
use crate::{
    foundation::core::Channel,
    motion::phase::PhaseSpec,
    rig::calibration::FixtureCalibration,
    schedule::repeat::RepeatMode,
    template::dsl::{StepBuilder, TemplateBuilder},
};

fn rig() -> RigCalibration {
    RigCalibration {
        fixtures: ["mh1", "mh2"]
            .into_iter()
            .map(|k| (k.to_string(), FixtureCalibration::default()))
            .collect(),
        ..RigCalibration::default()
    }
}

fn fixtures() -> Vec<FixtureAssignment> {
    [("mh2", "right"), ("mh1", "left")]
        .into_iter()
        .map(|(f, r)| FixtureAssignment {
            fixture_id: f.to_string(),
            role: r.to_string(),
        })
        .collect()
}

fn template(id: &str, movement: &str) -> Template {
    TemplateBuilder::new(id, ["left", "right"])
        .cycle_bars(4.0)
        .mode(RepeatMode::PingPong)
        .step(
            StepBuilder::new("main", "chevron")
                .movement(movement, None)
                .dimmer("breathe", 1.0)
                .build()
                .unwrap(),
        )
        .unwrap()
        .build()
        .unwrap()
}

fn window(a: f64, b: f64) -> BarSpan {
    BarSpan {
        start_bar: a,
        end_bar: b,
    }
}

#[test]
fn compiles_every_fixture_channel_per_cycle() {
    let clock = TempoMap::constant(120.0);
    let (rig, fixtures) = (rig(), fixtures());
    let ctx = CompileContext {
        clock: &clock,
        fixtures: &fixtures,
        rig: &rig,
    };
    let c = Compiler::new(CompileOptions::default()).unwrap();
    let out = c
        .compile_template(&ctx, &template("t", "sweep"), None, window(0.0, 8.0))
        .unwrap();
    assert_eq!(out.range, TimeRange::new(0.0, 16000.0).unwrap());
    assert_eq!(out.segments.len(), 2 * 2 * 3);
    assert_eq!(out.segments[0].fixture_id, "mh1");
    assert_eq!(out.segments[0].channel, Channel::Pan);
    assert_eq!(out.segments[0].t0_ms, 0.0);
    assert_eq!(out.segments[1].t0_ms, 8000.0);
    assert!(out.segments.iter().all(|s| !s.is_transition));
}

#[test]
fn preset_patches_a_copy() {
    let clock = TempoMap::constant(120.0);
    let (rig, fixtures) = (rig(), fixtures());
    let ctx = CompileContext {
        clock: &clock,
        fixtures: &fixtures,
        rig: &rig,
    };
    let t = template("t", "hold");
    let preset = Preset {
        id: "dim".to_string(),
        dimmer_ceiling_dmx: Some(100),
        ..Preset::default()
    };
    let c = Compiler::new(CompileOptions::default()).unwrap();
    let out = c
        .compile_template(&ctx, &t, Some(&preset), window(0.0, 4.0))
        .unwrap();
    let dim = out
        .segments
        .iter()
        .find(|s| s.channel == Channel::Dimmer)
        .unwrap();
    assert_eq!(dim.ceiling_dmx, Some(100.0));
    assert_eq!(t.defaults.dimmer_ceiling_dmx, None);
}

#[test]
fn unknown_role_is_a_config_error() {
    let clock = TempoMap::constant(120.0);
    let rig = rig();
    let fixtures = vec![FixtureAssignment {
        fixture_id: "mh1".to_string(),
        role: "center".to_string(),
    }];
    let ctx = CompileContext {
        clock: &clock,
        fixtures: &fixtures,
        rig: &rig,
    };
    let c = Compiler::new(CompileOptions::default()).unwrap();
    let err = c
        .compile_template(&ctx, &template("t", "hold"), None, window(0.0, 4.0))
        .unwrap_err();
    assert!(matches!(err, ChoreoError::Config { .. }));
    assert!(err.to_string().contains("fixtures"));
}

#[test]
fn parallel_output_matches_serial() {
    let clock = TempoMap::constant(128.0);
    let (rig, fixtures) = (rig(), fixtures());
    let ctx = CompileContext {
        clock: &clock,
        fixtures: &fixtures,
        rig: &rig,
    };
    let t = template("t", "random_walk");
    let serial = Compiler::new(CompileOptions::default()).unwrap();
    let parallel = Compiler::new(CompileOptions {
        parallel: true,
        threads: Some(3),
        ..CompileOptions::default()
    })
    .unwrap();
    let a = serial.compile_template(&ctx, &t, None, window(0.0, 10.0)).unwrap();
    let b = parallel.compile_template(&ctx, &t, None, window(0.0, 10.0)).unwrap();
    assert_eq!(fingerprint_segments(&a.segments), fingerprint_segments(&b.segments));
}

#[test]
fn adjacent_placements_get_a_transition() {
    let clock = TempoMap::constant(120.0);
    let (rig, fixtures) = (rig(), fixtures());
    let ctx = CompileContext {
        clock: &clock,
        fixtures: &fixtures,
        rig: &rig,
    };
    let placements = vec![
        Placement {
            template: template("a", "sweep"),
            preset: None,
            start_bar: 0.0,
            end_bar: 8.0,
        },
        Placement {
            template: template("b", "circle"),
            preset: None,
            start_bar: 8.0,
            end_bar: 16.0,
        },
    ];
    let c = Compiler::new(CompileOptions::default()).unwrap();
    let show = c.compile_show(&ctx, &placements).unwrap();
    assert_eq!(show.regions.len(), 2);
    assert_eq!(show.boundaries.len(), 1);
    assert_eq!(show.boundaries[0].t_ms, 16000.0);

    let transitions: Vec<_> = show.segments.iter().filter(|s| s.is_transition).collect();
    assert_eq!(transitions.len(), 2 * 3);
    assert!(transitions.iter().all(|s| s.t0_ms == 15600.0 && s.t1_ms == 16400.0));
    assert!(transitions.iter().all(|s| s.source.template_id == "a->b"));
    assert_eq!(show.to_dmx().unwrap().len(), show.segments.len());
}

#[test]
fn show_document_requires_fixtures_and_placements() {
    let doc = ShowDocument {
        tempo: TempoMap::constant(120.0),
        fixtures: Vec::new(),
        placements: Vec::new(),
    };
    assert!(doc.validate().is_err());

    let doc = ShowDocument {
        fixtures: fixtures(),
        placements: vec![Placement {
            template: template("a", "hold"),
            preset: None,
            start_bar: 0.0,
            end_bar: 4.0,
        }],
        ..doc
    };
    doc.validate().unwrap();
}

#[test]
fn zero_threads_is_rejected() {
    assert!(build_thread_pool(Some(0)).is_err());
}

#[test]
fn chase_spread_is_measured_in_pattern_cycles() {
    let clock = TempoMap::constant(120.0);
    let (rig, fixtures) = (rig(), fixtures());
    let ctx = CompileContext {
        clock: &clock,
        fixtures: &fixtures,
        rig: &rig,
    };
    let c = Compiler::new(CompileOptions {
        simplify: false,
        ..CompileOptions::default()
    })
    .unwrap();
    let pan_of = |spread: f64| {
        let t = TemplateBuilder::new("t", ["left", "right"])
            .cycle_bars(4.0)
            .step(
                StepBuilder::new("main", "fan")
                    .span(0.0, 4.0)
                    .movement("sweep", None)
                    .movement_period(1.0)
                    .dimmer("static", 1.0)
                    .phase(PhaseSpec {
                        spread,
                        ..PhaseSpec::default()
                    })
                    .build()
                    .unwrap(),
            )
            .unwrap()
            .build()
            .unwrap();
        let out = c.compile_template(&ctx, &t, None, window(0.0, 4.0)).unwrap();
        out.segments
            .into_iter()
            .find(|s| s.fixture_id == "mh2" && s.channel == Channel::Pan)
            .unwrap()
            .body
    };
    // Four sweeps in the step; the trailing fixture is a quarter sweep behind.
    let still = pan_of(0.0);
    let chased = pan_of(0.25);
    let apart = (0..=40)
        .map(|i| i as f64 / 40.0)
        .map(|t| (chased.value_at(t) - still.value_at(t)).abs())
        .fold(0.0, f64::max);
    assert!(apart > 0.05, "trailing fixture did not lag: {apart}");
    for t in [0.3, 0.5, 0.7] {
        assert!((chased.value_at(t) - still.value_at(t - 0.0625)).abs() < 1e-2);
    }
}

#[test]
fn unknown_scheduled_step_is_an_error() {
    let t = template("t", "sweep").resolve().unwrap();
    assert_eq!(step_index(&t, "main").unwrap(), 0);
    let err = step_index(&t, "ghost").unwrap_err();
    assert!(matches!(err, ChoreoError::Validation(_)));
    assert!(err.to_string().contains("ghost"));
}
