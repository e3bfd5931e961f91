use std::collections::BTreeSet;

use crate::{
    foundation::error::{ChoreoError, ChoreoResult, ConfigLocation},
    geometry::resolver::{Formation, GeometrySpec, parse_formation},
    motion::{
        dimmer::DimmerPattern, intensity::Intensity, movement::MovementPattern, phase::PhaseSpec,
    },
    schedule::repeat::{RepeatContract, StepSlot},
};

const BAR_EPS: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Template {
    pub id: String,
    pub roles: Vec<String>, // stage left to stage right
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub defaults: TemplateDefaults,
    #[serde(default)]
    pub repeat: RepeatContract,
    pub steps: Vec<Step>,
}

/// Template-wide fallbacks. Presets patch these; step fields override them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TemplateDefaults {
    pub intensity: Intensity,
    pub dimmer_floor_dmx: Option<u8>, // None: fixture calibration
    pub dimmer_ceiling_dmx: Option<u8>,
    pub dimmer_min_norm: f64,
    pub dimmer_max_norm: f64,
}

impl Default for TemplateDefaults {
    fn default() -> Self {
        Self {
            intensity: Intensity::Smooth,
            dimmer_floor_dmx: None,
            dimmer_ceiling_dmx: None,
            dimmer_min_norm: 0.0,
            dimmer_max_norm: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(default)]
    pub start_bar: f64, // offset inside the cycle
    #[serde(default)]
    pub duration_bars: Option<f64>, // None: until the cycle ends
    pub geometry: GeometrySpec,
    #[serde(default)]
    pub movement: MovementSpec,
    #[serde(default)]
    pub dimmer: DimmerSpec,
    #[serde(default)]
    pub phase: Option<PhaseSpec>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MovementSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub intensity: Option<Intensity>,
    pub period_bars: Option<f64>, // None: one period per step
}

impl Default for MovementSpec {
    fn default() -> Self {
        Self {
            kind: "hold".to_string(),
            intensity: None,
            period_bars: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DimmerSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub intensity: Option<Intensity>,
    pub period_bars: f64,
    pub level: f64, // static pattern only
    pub min_norm: Option<f64>,
    pub max_norm: Option<f64>,
    pub floor_dmx: Option<u8>,
    pub ceiling_dmx: Option<u8>,
}

impl Default for DimmerSpec {
    fn default() -> Self {
        Self {
            kind: "static".to_string(),
            intensity: None,
            period_bars: 1.0,
            level: 1.0,
            min_norm: None,
            max_norm: None,
            floor_dmx: None,
            ceiling_dmx: None,
        }
    }
}

/// A template with every name parsed and every fallback applied.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedTemplate {
    pub id: String,
    pub roles: Vec<String>,
    pub seed: u64,
    pub repeat: RepeatContract,
    pub steps: Vec<ResolvedStep>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStep {
    pub slot: StepSlot,
    pub formation: Formation,
    pub movement: ResolvedMovement,
    pub dimmer: ResolvedDimmer,
    pub phase: Option<PhaseSpec>,
}

impl ResolvedStep {
    pub fn id(&self) -> &str {
        &self.slot.step_id
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedMovement {
    pub pattern: MovementPattern,
    pub intensity: Intensity,
    pub period_bars: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedDimmer {
    pub pattern: DimmerPattern,
    pub intensity: Intensity,
    pub period_bars: f64,
    pub level: f64,
    pub min_norm: f64,
    pub max_norm: f64,
    pub floor_dmx: Option<u8>,
    pub ceiling_dmx: Option<u8>,
}

fn field_error(field: &str, msg: impl Into<String>) -> ChoreoError {
    ChoreoError::config(ConfigLocation::default().field(field), msg)
}

fn positive(v: f64, field: &str) -> ChoreoResult<f64> {
    if !v.is_finite() || v <= 0.0 {
        return Err(field_error(field, format!("must be finite and > 0, got {v}")));
    }
    Ok(v)
}

impl Template {
    /// Parse and check everything; errors carry template, step and field.
    pub fn validate(&self) -> ChoreoResult<()> {
        self.resolve().map(|_| ())
    }

    #[tracing::instrument(skip(self), fields(template = %self.id))]
    pub fn resolve(&self) -> ChoreoResult<ResolvedTemplate> {
        self.resolve_inner().map_err(|e| e.in_template(&self.id))
    }

    fn resolve_inner(&self) -> ChoreoResult<ResolvedTemplate> {
        if self.id.trim().is_empty() {
            return Err(field_error("id", "template id must be non-empty"));
        }
        if self.roles.is_empty() {
            return Err(field_error("roles", "template needs at least one role"));
        }
        let mut seen = BTreeSet::new();
        for r in &self.roles {
            if r.trim().is_empty() || !seen.insert(r.as_str()) {
                return Err(field_error("roles", format!("empty or duplicate role '{r}'")));
            }
        }
        if self.steps.is_empty() {
            return Err(field_error("steps", "template needs at least one step"));
        }
        let mut ids = BTreeSet::new();
        for s in &self.steps {
            if s.id.trim().is_empty() || !ids.insert(s.id.as_str()) {
                return Err(field_error(
                    "steps",
                    format!("empty or duplicate step id '{}'", s.id),
                ));
            }
        }

        self.repeat.validate()?;
        for id in &self.repeat.loop_step_ids {
            if !ids.contains(id.as_str()) {
                return Err(field_error(
                    "repeat.loop_step_ids",
                    format!("loop step '{id}' does not exist"),
                ));
            }
        }

        let d = &self.defaults;
        for (v, f) in [
            (d.dimmer_min_norm, "defaults.dimmer_min_norm"),
            (d.dimmer_max_norm, "defaults.dimmer_max_norm"),
        ] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(field_error(f, format!("must be finite and in [0, 1], got {v}")));
            }
        }

        let steps = self
            .steps
            .iter()
            .map(|s| self.resolve_step(s).map_err(|e| e.in_step(&s.id)))
            .collect::<ChoreoResult<Vec<_>>>()?;

        Ok(ResolvedTemplate {
            id: self.id.clone(),
            roles: self.roles.clone(),
            seed: self.seed,
            repeat: self.repeat.clone(),
            steps,
        })
    }

    fn resolve_step(&self, step: &Step) -> ChoreoResult<ResolvedStep> {
        let cycle = self.repeat.cycle_bars;
        if !step.start_bar.is_finite() || step.start_bar < 0.0 {
            return Err(field_error(
                "start_bar",
                format!("must be finite and >= 0, got {}", step.start_bar),
            ));
        }
        let duration = positive(
            step.duration_bars.unwrap_or(cycle - step.start_bar),
            "duration_bars",
        )?;
        if step.start_bar + duration > cycle + BAR_EPS {
            return Err(field_error(
                "duration_bars",
                format!(
                    "step ends at bar {} past the {cycle}-bar cycle",
                    step.start_bar + duration
                ),
            ));
        }

        let formation = parse_formation(&step.geometry, &self.roles)?;

        let movement = ResolvedMovement {
            pattern: MovementPattern::parse(&step.movement.kind, "movement.type")?,
            intensity: step.movement.intensity.unwrap_or(self.defaults.intensity),
            period_bars: positive(
                step.movement.period_bars.unwrap_or(duration),
                "movement.period_bars",
            )?,
        };

        let ds = &step.dimmer;
        let min_norm = ds.min_norm.unwrap_or(self.defaults.dimmer_min_norm);
        let max_norm = ds.max_norm.unwrap_or(self.defaults.dimmer_max_norm);
        for (v, f) in [(min_norm, "dimmer.min_norm"), (max_norm, "dimmer.max_norm")] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(field_error(f, format!("must be finite and in [0, 1], got {v}")));
            }
        }
        if max_norm < min_norm {
            return Err(field_error(
                "dimmer.max_norm",
                format!("max_norm ({max_norm}) must be >= min_norm ({min_norm})"),
            ));
        }
        if !ds.level.is_finite() || !(0.0..=1.0).contains(&ds.level) {
            return Err(field_error(
                "dimmer.level",
                format!("must be finite and in [0, 1], got {}", ds.level),
            ));
        }
        let floor_dmx = ds.floor_dmx.or(self.defaults.dimmer_floor_dmx);
        let ceiling_dmx = ds.ceiling_dmx.or(self.defaults.dimmer_ceiling_dmx);
        if let (Some(lo), Some(hi)) = (floor_dmx, ceiling_dmx)
            && hi < lo
        {
            return Err(field_error(
                "dimmer.ceiling_dmx",
                format!("ceiling_dmx ({hi}) must be >= floor_dmx ({lo})"),
            ));
        }
        let dimmer = ResolvedDimmer {
            pattern: DimmerPattern::parse(&ds.kind, "dimmer.type")?,
            intensity: ds.intensity.unwrap_or(self.defaults.intensity),
            period_bars: positive(ds.period_bars, "dimmer.period_bars")?,
            level: ds.level,
            min_norm,
            max_norm,
            floor_dmx,
            ceiling_dmx,
        };

        if let Some(p) = &step.phase {
            p.validate()?;
        }

        let loops = self.repeat.loop_step_ids.is_empty()
            || self.repeat.loop_step_ids.contains(&step.id);
        Ok(ResolvedStep {
            slot: StepSlot {
                step_id: step.id.clone(),
                start_bar: step.start_bar,
                duration_bars: duration,
                loops,
            },
            formation,
            movement,
            dimmer,
            phase: step.phase.clone(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/model.rs"]
mod tests;
