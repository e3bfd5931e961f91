use std::collections::BTreeSet;

use crate::{
    foundation::error::{ChoreoError, ChoreoResult},
    geometry::resolver::GeometrySpec,
    motion::{intensity::Intensity, phase::PhaseSpec},
    schedule::repeat::{RemainderPolicy, RepeatContract, RepeatMode},
    template::model::{DimmerSpec, MovementSpec, Step, Template, TemplateDefaults},
};

pub struct TemplateBuilder {
    id: String,
    roles: Vec<String>,
    seed: u64,
    defaults: TemplateDefaults,
    repeat: RepeatContract,
    steps: Vec<Step>,
}

impl TemplateBuilder {
    pub fn new<S: Into<String>>(id: impl Into<String>, roles: impl IntoIterator<Item = S>) -> Self {
        Self {
            id: id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
            seed: 0,
            defaults: TemplateDefaults::default(),
            repeat: RepeatContract::default(),
            steps: Vec::new(),
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn intensity(mut self, intensity: Intensity) -> Self {
        self.defaults.intensity = intensity;
        self
    }

    pub fn dimmer_dmx(mut self, floor: u8, ceiling: u8) -> Self {
        self.defaults.dimmer_floor_dmx = Some(floor);
        self.defaults.dimmer_ceiling_dmx = Some(ceiling);
        self
    }

    pub fn cycle_bars(mut self, bars: f64) -> Self {
        self.repeat.cycle_bars = bars;
        self
    }

    pub fn mode(mut self, mode: RepeatMode) -> Self {
        self.repeat.mode = mode;
        self
    }

    pub fn remainder(mut self, policy: RemainderPolicy) -> Self {
        self.repeat.remainder_policy = policy;
        self
    }

    pub fn one_shot(mut self) -> Self {
        self.repeat.repeatable = false;
        self
    }

    pub fn loop_steps<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.repeat.loop_step_ids = ids.into_iter().map(Into::into).collect::<BTreeSet<_>>();
        self
    }

    pub fn step(mut self, step: Step) -> ChoreoResult<Self> {
        if self.steps.iter().any(|s| s.id == step.id) {
            return Err(ChoreoError::validation(format!(
                "duplicate step id '{}'",
                step.id
            )));
        }
        self.steps.push(step);
        Ok(self)
    }

    pub fn build(self) -> ChoreoResult<Template> {
        let t = Template {
            id: self.id,
            roles: self.roles,
            seed: self.seed,
            defaults: self.defaults,
            repeat: self.repeat,
            steps: self.steps,
        };
        t.validate()?;
        Ok(t)
    }
}

pub struct StepBuilder {
    id: String,
    start_bar: f64,
    duration_bars: Option<f64>,
    geometry: GeometrySpec,
    movement: MovementSpec,
    dimmer: DimmerSpec,
    phase: Option<PhaseSpec>,
}

impl StepBuilder {
    pub fn new(id: impl Into<String>, formation: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start_bar: 0.0,
            duration_bars: None,
            geometry: GeometrySpec::new(formation, serde_json::Value::Null),
            movement: MovementSpec::default(),
            dimmer: DimmerSpec::default(),
            phase: None,
        }
    }

    pub fn formation_params(mut self, params: serde_json::Value) -> Self {
        self.geometry.params = params;
        self
    }

    pub fn span(mut self, start_bar: f64, duration_bars: f64) -> Self {
        self.start_bar = start_bar;
        self.duration_bars = Some(duration_bars);
        self
    }

    pub fn movement(mut self, kind: impl Into<String>, intensity: Option<Intensity>) -> Self {
        self.movement.kind = kind.into();
        self.movement.intensity = intensity;
        self
    }

    pub fn movement_period(mut self, bars: f64) -> Self {
        self.movement.period_bars = Some(bars);
        self
    }

    pub fn dimmer(mut self, kind: impl Into<String>, period_bars: f64) -> Self {
        self.dimmer.kind = kind.into();
        self.dimmer.period_bars = period_bars;
        self
    }

    pub fn dimmer_spec(mut self, spec: DimmerSpec) -> Self {
        self.dimmer = spec;
        self
    }

    pub fn phase(mut self, phase: PhaseSpec) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn build(self) -> ChoreoResult<Step> {
        if self.id.trim().is_empty() {
            return Err(ChoreoError::validation("step id must be non-empty"));
        }
        Ok(Step {
            id: self.id,
            start_bar: self.start_bar,
            duration_bars: self.duration_bars,
            geometry: self.geometry,
            movement: self.movement,
            dimmer: self.dimmer,
            phase: self.phase,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/dsl.rs"]
mod tests;
