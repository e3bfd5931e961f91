use super::*;
use crate::motion::phase::PhaseOrder;

#[test]
fn builders_create_expected_structure() {
    let t = TemplateBuilder::new("wave", ["a", "b", "c"])
        .seed(5)
        .intensity(Intensity::Dramatic)
        .cycle_bars(2.0)
        .mode(RepeatMode::PingPong)
        .loop_steps(["sweep"])
        .step(
            StepBuilder::new("sweep", "fan")
                .span(0.0, 2.0)
                .movement("sweep", None)
                .dimmer("breathe", 1.0)
                .phase(PhaseSpec {
                    order: PhaseOrder::CenterOut,
                    spread: 0.5,
                    ..PhaseSpec::default()
                })
                .build()
                .unwrap(),
        )
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(t.roles.len(), 3);
    assert_eq!(t.repeat.cycle_bars, 2.0);
    assert_eq!(t.steps[0].movement.kind, "sweep");
    assert_eq!(t.steps[0].dimmer.kind, "breathe");
    assert!(t.steps[0].phase.is_some());
}

#[test]
fn duplicate_step_is_rejected() {
    let step = || StepBuilder::new("s", "fan").build().unwrap();
    let res = TemplateBuilder::new("t", ["a"]).step(step()).unwrap().step(step());
    assert!(res.is_err());
}

#[test]
fn build_runs_template_validation() {
    let res = TemplateBuilder::new("t", ["a"])
        .step(
            StepBuilder::new("s", "fan")
                .movement("moonwalk", None)
                .build()
                .unwrap(),
        )
        .unwrap()
        .build();
    assert!(matches!(res, Err(ChoreoError::Config { .. })));
}
