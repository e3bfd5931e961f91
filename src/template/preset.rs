use crate::{
    foundation::error::{ChoreoError, ChoreoResult},
    motion::intensity::Intensity,
    schedule::repeat::{RemainderPolicy, RepeatMode},
    template::model::Template,
};

/// Named patch over a template's defaults.
///
/// Precedence, lowest first: template defaults, preset, step fields, then the
/// hardware safety clamp applied at DMX conversion.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Preset {
    pub id: String,
    pub intensity: Option<Intensity>,
    pub dimmer_floor_dmx: Option<u8>,
    pub dimmer_ceiling_dmx: Option<u8>,
    pub dimmer_min_norm: Option<f64>,
    pub dimmer_max_norm: Option<f64>,
    pub repeat_mode: Option<RepeatMode>,
    pub remainder_policy: Option<RemainderPolicy>,
}

impl Preset {
    pub fn validate(&self) -> ChoreoResult<()> {
        if self.id.trim().is_empty() {
            return Err(ChoreoError::validation("preset id must be non-empty"));
        }
        for v in [self.dimmer_min_norm, self.dimmer_max_norm].into_iter().flatten() {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(ChoreoError::validation(format!(
                    "preset '{}' dimmer norms must be finite and in [0, 1]",
                    self.id
                )));
            }
        }
        Ok(())
    }

    /// Copy of `template` with this preset's fields written over its defaults.
    pub fn apply(&self, template: &Template) -> ChoreoResult<Template> {
        self.validate()?;
        let mut out = template.clone();
        let d = &mut out.defaults;
        if let Some(i) = self.intensity {
            d.intensity = i;
        }
        if let Some(v) = self.dimmer_floor_dmx {
            d.dimmer_floor_dmx = Some(v);
        }
        if let Some(v) = self.dimmer_ceiling_dmx {
            d.dimmer_ceiling_dmx = Some(v);
        }
        if let Some(v) = self.dimmer_min_norm {
            d.dimmer_min_norm = v;
        }
        if let Some(v) = self.dimmer_max_norm {
            d.dimmer_max_norm = v;
        }
        if let Some(m) = self.repeat_mode {
            out.repeat.mode = m;
        }
        if let Some(p) = self.remainder_policy {
            out.repeat.remainder_policy = p;
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/preset.rs"]
mod tests;
