use crate::{
    curve::{
        points::{PointsCurve, SampleBudget},
        semantic::{TaggedCurve, center_midrange},
    },
    foundation::{
        error::{ChoreoError, ChoreoResult, ConfigLocation},
        math::{periodic_value_noise, stable_seed},
    },
    motion::intensity::Intensity,
    timing::tempo::BarClock,
};

/// Dimmer pattern identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimmerPattern {
    /// Blackout at DMX 0, below any floor.
    Off,
    /// Constant level.
    Static,
    /// `0.5 - 0.5 cos(2πp)`: dark at the cycle start, peak in the middle.
    Breathe,
    /// Hit at the cycle start with an exponential decay.
    Pulse,
    /// Square wave at 50% duty.
    Strobe,
    /// Linear rise per cycle.
    RampUp,
    /// Linear fall per cycle.
    RampDown,
    /// Seeded smooth noise.
    Flicker,
}

const PULSE_DECAY: f64 = 5.0;
const FLICKER_CELLS_PER_CYCLE: u64 = 8;

impl DimmerPattern {
    /// Resolve a pattern name, accepting common aliases.
    pub fn parse(name: &str, field: &str) -> ChoreoResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "off" | "blackout" => Ok(Self::Off),
            "static" | "hold" | "full" | "on" => Ok(Self::Static),
            "breathe" | "breath" => Ok(Self::Breathe),
            "pulse" => Ok(Self::Pulse),
            "strobe" => Ok(Self::Strobe),
            "ramp_up" | "rampup" | "fade_in" => Ok(Self::RampUp),
            "ramp_down" | "rampdown" | "fade_out" => Ok(Self::RampDown),
            "flicker" => Ok(Self::Flicker),
            other => Err(ChoreoError::config(
                ConfigLocation::default().field(field),
                format!("unknown dimmer type '{other}'"),
            )),
        }
    }

    /// `true` for patterns that produce a single level instead of a curve.
    pub fn is_static(self) -> bool {
        matches!(self, Self::Off | Self::Static)
    }

    /// Modulation depth for an intensity level.
    pub fn depth(self, intensity: Intensity) -> f64 {
        let table: [f64; 4] = match self {
            Self::Off | Self::Static => [1.0; 4],
            Self::Breathe => [0.5, 0.75, 0.9, 1.0],
            Self::Pulse | Self::RampUp | Self::RampDown => [0.6, 0.8, 1.0, 1.0],
            Self::Strobe => [0.7, 0.85, 1.0, 1.0],
            Self::Flicker => [0.4, 0.6, 0.8, 1.0],
        };
        table[intensity.index()]
    }

    fn raw(self, phase: f64, seed: u64, noise_period: u64) -> f64 {
        let frac = phase.rem_euclid(1.0);
        match self {
            Self::Off => 0.0,
            Self::Static => 1.0,
            Self::Breathe => 0.5 - 0.5 * (std::f64::consts::TAU * phase).cos(),
            Self::Pulse => {
                let end = (-PULSE_DECAY).exp();
                ((-PULSE_DECAY * frac).exp() - end) / (1.0 - end)
            }
            Self::Strobe => {
                if frac < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::RampUp => frac,
            Self::RampDown => 1.0 - frac,
            Self::Flicker => {
                0.5 + 0.5
                    * periodic_value_noise(
                        seed,
                        phase * FLICKER_CELLS_PER_CYCLE as f64,
                        noise_period,
                    )
            }
        }
    }
}

/// Everything one dimmer generation needs.
pub struct DimmerRequest<'a> {
    /// Pattern to generate.
    pub pattern: DimmerPattern,
    /// Modulation depth selector.
    pub intensity: Intensity,
    /// Level for [`DimmerPattern::Static`].
    pub level: f64,
    /// Pattern period in bars.
    pub period_bars: f64,
    /// First bar covered by the curve.
    pub start_bar: f64,
    /// Bars covered by the curve.
    pub span_bars: f64,
    /// Tempo mapping used to convert bars to milliseconds.
    pub clock: &'a dyn BarClock,
    /// Lower normalized bound after scaling.
    pub min_norm: f64,
    /// Upper normalized bound after scaling.
    pub max_norm: f64,
    /// DMX value of normalized `0`.
    pub floor_dmx: u8,
    /// DMX value of normalized `1`.
    pub ceiling_dmx: u8,
    /// Seed for [`DimmerPattern::Flicker`].
    pub seed: u64,
    /// Sampling density.
    pub budget: SampleBudget,
}

/// Shape of a generated dimmer channel.
#[derive(Clone, Debug, PartialEq)]
pub enum DimmerBody {
    /// Single normalized level.
    Static(f64),
    /// Time-varying absolute curve.
    Curve(TaggedCurve),
}

/// Generated dimmer channel with its DMX mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct DimmerOutput {
    /// Level or curve.
    pub body: DimmerBody,
    /// DMX value of normalized `0`.
    pub floor_dmx: u8,
    /// DMX value of normalized `1`.
    pub ceiling_dmx: u8,
}

fn dimmer_error(field: &str, msg: impl Into<String>) -> ChoreoError {
    ChoreoError::config(ConfigLocation::default().field(field), msg)
}

/// Generate a dimmer channel.
///
/// Raw pattern values are scaled by the intensity depth, clamped, and then
/// mapped into `[min_norm, max_norm]`.
pub fn generate(req: &DimmerRequest<'_>) -> ChoreoResult<DimmerOutput> {
    for (v, f) in [(req.min_norm, "dimmer.min_norm"), (req.max_norm, "dimmer.max_norm")] {
        if !v.is_finite() || !(0.0..=1.0).contains(&v) {
            return Err(dimmer_error(f, format!("must be finite and in [0, 1], got {v}")));
        }
    }
    if req.max_norm < req.min_norm {
        return Err(dimmer_error(
            "dimmer.max_norm",
            format!(
                "max_norm ({}) must be >= min_norm ({})",
                req.max_norm, req.min_norm
            ),
        ));
    }
    if req.ceiling_dmx < req.floor_dmx {
        return Err(dimmer_error(
            "dimmer.ceiling_dmx",
            format!(
                "ceiling_dmx ({}) must be >= floor_dmx ({})",
                req.ceiling_dmx, req.floor_dmx
            ),
        ));
    }

    if req.pattern == DimmerPattern::Off {
        // Blackout ignores the floor and sits at hardware zero.
        return Ok(DimmerOutput {
            body: DimmerBody::Static(0.0),
            floor_dmx: 0,
            ceiling_dmx: req.ceiling_dmx,
        });
    }

    let span = req.max_norm - req.min_norm;
    let to_range = |scaled: f64| req.min_norm + scaled.clamp(0.0, 1.0) * span;
    let body = match req.pattern {
        DimmerPattern::Static => {
            if !req.level.is_finite() || !(0.0..=1.0).contains(&req.level) {
                return Err(dimmer_error(
                    "dimmer.level",
                    format!("must be finite and in [0, 1], got {}", req.level),
                ));
            }
            DimmerBody::Static(to_range(req.level))
        }
        pattern => {
            if !req.period_bars.is_finite() || req.period_bars <= 0.0 {
                return Err(dimmer_error(
                    "dimmer.period_bars",
                    format!("must be finite and > 0, got {}", req.period_bars),
                ));
            }
            let duration_ms = req.clock.span_ms(req.start_bar, req.span_bars);
            let period_ms = req.clock.span_ms(req.start_bar, req.period_bars);
            if !(duration_ms > 0.0 && period_ms > 0.0) {
                return Err(ChoreoError::numeric(format!(
                    "dimmer span and period must map to positive durations, got {duration_ms} ms / {period_ms} ms"
                )));
            }
            let cycles = duration_ms / period_ms;
            let depth = pattern.depth(req.intensity);
            let seed = stable_seed(req.seed, &["dimmer"]);
            let noise_period = (cycles.ceil().max(1.0) as u64) * FLICKER_CELLS_PER_CYCLE;
            let n = req.budget.samples_for(cycles);
            let raw = PointsCurve::from_fn(n, |t| pattern.raw(cycles * t, seed, noise_period))?;
            let raw = if pattern == DimmerPattern::Flicker {
                center_midrange(&raw)?
            } else {
                raw
            };
            let curve = raw.map_values(|r| to_range(r * depth))?;
            DimmerBody::Curve(TaggedCurve::dimmer(curve))
        }
    };

    Ok(DimmerOutput {
        body,
        floor_dmx: req.floor_dmx,
        ceiling_dmx: req.ceiling_dmx,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/motion/dimmer.rs"]
mod tests;
