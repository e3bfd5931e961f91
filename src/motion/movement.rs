use crate::{
    curve::{
        points::{PointsCurve, SampleBudget},
        semantic::{TaggedCurve, center_midrange},
    },
    foundation::{
        error::{ChoreoError, ChoreoResult, ConfigLocation},
        math::{periodic_value_noise, stable_seed},
    },
    geometry::resolver::BasePose,
    motion::intensity::Intensity,
};

/// Largest center shift a pattern may apply, in normalized units.
pub const MAX_CENTER_OFFSET: f64 = 0.25;

const NOISE_CELLS_PER_CYCLE: u64 = 4;

/// Movement pattern identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPattern {
    /// No motion; the fixture rests at its base pose.
    Hold,
    /// Pan back and forth.
    Sweep,
    /// Tilt up and down.
    Nod,
    /// Pan and tilt a quarter cycle apart.
    Circle,
    /// Tilt at twice the pan rate.
    FigureEight,
    /// Small, fast pan/tilt jitter.
    Shake,
    /// Seeded wandering on both axes.
    RandomWalk,
}

/// Waveform driving one axis, in `[-1, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wave {
    /// `sin(2πp)`.
    Sine,
    /// Triangle with the same zero crossings and peaks as the sine.
    Triangle,
    /// Smooth seeded value noise.
    Noise,
}

impl Wave {
    fn sample(self, phase: f64, seed: u64, noise_period: u64) -> f64 {
        match self {
            Self::Sine => (std::f64::consts::TAU * phase).sin(),
            Self::Triangle => 4.0 * ((phase + 0.75).rem_euclid(1.0) - 0.5).abs() - 1.0,
            Self::Noise => periodic_value_noise(
                seed,
                phase * NOISE_CELLS_PER_CYCLE as f64,
                noise_period,
            ),
        }
    }
}

/// How one axis follows the pattern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisDriver {
    /// Waveform.
    pub wave: Wave,
    /// Multiplier on the pattern frequency.
    pub harmonic: f64,
    /// Phase of the waveform at `t = 0`, in cycles.
    pub phase: f64,
    /// Multiplier on the level amplitude.
    pub weight: f64,
    /// Multiplier on the level center offset.
    pub offset_weight: f64,
}

/// Numbers behind one intensity level of one pattern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelParams {
    /// Requested amplitude in normalized units, before clamping.
    pub amplitude: f64,
    /// Pattern cycles per movement period.
    pub frequency: f64,
    /// Shift of the swing center away from the base pose.
    pub center_offset: f64,
}

const fn level(amplitude: f64, frequency: f64, center_offset: f64) -> LevelParams {
    LevelParams {
        amplitude,
        frequency,
        center_offset,
    }
}

const fn drive(wave: Wave, harmonic: f64, phase: f64, offset_weight: f64) -> AxisDriver {
    AxisDriver {
        wave,
        harmonic,
        phase,
        weight: 1.0,
        offset_weight,
    }
}

/// Table entry for a pattern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatternDef {
    /// Pan driver, `None` when pan stays at rest.
    pub pan: Option<AxisDriver>,
    /// Tilt driver, `None` when tilt stays at rest.
    pub tilt: Option<AxisDriver>,
    /// Re-center the raw shape before scaling (noise is not symmetric).
    pub needs_centering: bool,
    /// Levels indexed by [`Intensity::index`].
    pub levels: [LevelParams; 4],
}

impl PatternDef {
    /// Parameters for an intensity level.
    pub fn level(&self, intensity: Intensity) -> LevelParams {
        self.levels[intensity.index()]
    }
}

const HOLD: PatternDef = PatternDef {
    pan: None,
    tilt: None,
    needs_centering: false,
    levels: [level(0.0, 1.0, 0.0); 4],
};

const SWEEP: PatternDef = PatternDef {
    pan: Some(drive(Wave::Sine, 1.0, 0.0, 0.0)),
    tilt: None,
    needs_centering: false,
    levels: [
        level(0.06, 1.0, 0.0),
        level(0.12, 1.0, 0.0),
        level(0.22, 1.0, 0.0),
        level(0.30, 2.0, 0.0),
    ],
};

const NOD: PatternDef = PatternDef {
    pan: None,
    tilt: Some(drive(Wave::Triangle, 1.0, 0.0, 1.0)),
    needs_centering: false,
    levels: [
        level(0.04, 1.0, 0.0),
        level(0.08, 1.0, 0.0),
        level(0.14, 2.0, 0.03),
        level(0.20, 2.0, 0.05),
    ],
};

const CIRCLE: PatternDef = PatternDef {
    pan: Some(drive(Wave::Sine, 1.0, 0.25, 0.0)),
    tilt: Some(drive(Wave::Sine, 1.0, 0.0, 1.0)),
    needs_centering: false,
    levels: [
        level(0.05, 1.0, 0.0),
        level(0.10, 1.0, 0.0),
        level(0.18, 1.0, 0.02),
        level(0.25, 2.0, 0.04),
    ],
};

const FIGURE_EIGHT: PatternDef = PatternDef {
    pan: Some(drive(Wave::Sine, 1.0, 0.0, 0.0)),
    tilt: Some(AxisDriver {
        weight: 0.6,
        ..drive(Wave::Sine, 2.0, 0.0, 1.0)
    }),
    needs_centering: false,
    levels: [
        level(0.05, 1.0, 0.0),
        level(0.10, 1.0, 0.0),
        level(0.16, 1.0, 0.0),
        level(0.22, 1.0, 0.03),
    ],
};

const SHAKE: PatternDef = PatternDef {
    pan: Some(drive(Wave::Sine, 1.0, 0.0, 0.0)),
    tilt: Some(AxisDriver {
        weight: 0.5,
        ..drive(Wave::Sine, 1.0, 0.25, 0.0)
    }),
    needs_centering: false,
    levels: [
        level(0.02, 4.0, 0.0),
        level(0.03, 6.0, 0.0),
        level(0.05, 8.0, 0.0),
        level(0.07, 12.0, 0.0),
    ],
};

const RANDOM_WALK: PatternDef = PatternDef {
    pan: Some(drive(Wave::Noise, 1.0, 0.0, 0.0)),
    tilt: Some(AxisDriver {
        weight: 0.7,
        ..drive(Wave::Noise, 1.0, 0.0, 0.0)
    }),
    needs_centering: true,
    levels: [
        level(0.05, 1.0, 0.0),
        level(0.10, 1.0, 0.0),
        level(0.15, 2.0, 0.0),
        level(0.22, 2.0, 0.0),
    ],
};

impl MovementPattern {
    /// Resolve a pattern name, accepting common aliases.
    pub fn parse(name: &str, field: &str) -> ChoreoResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hold" | "static" | "none" => Ok(Self::Hold),
            "sweep" | "sweep_lr" | "pan_sweep" => Ok(Self::Sweep),
            "nod" | "tilt_sweep" | "tilt_rock" => Ok(Self::Nod),
            "circle" => Ok(Self::Circle),
            "figure_eight" | "figure8" | "figureeight" => Ok(Self::FigureEight),
            "shake" | "jitter" => Ok(Self::Shake),
            "random_walk" | "randomwalk" | "random" => Ok(Self::RandomWalk),
            other => Err(ChoreoError::config(
                ConfigLocation::default().field(field),
                format!("unknown movement type '{other}'"),
            )),
        }
    }

    /// Static table entry for this pattern.
    pub fn def(self) -> &'static PatternDef {
        match self {
            Self::Hold => &HOLD,
            Self::Sweep => &SWEEP,
            Self::Nod => &NOD,
            Self::Circle => &CIRCLE,
            Self::FigureEight => &FIGURE_EIGHT,
            Self::Shake => &SHAKE,
            Self::RandomWalk => &RANDOM_WALK,
        }
    }
}

/// Largest amplitude that keeps `base ± amplitude` inside `[0, 1]`.
pub fn effective_amplitude(requested: f64, base_norm: f64) -> f64 {
    if !requested.is_finite() || !base_norm.is_finite() {
        return 0.0;
    }
    let base = base_norm.clamp(0.0, 1.0);
    requested.max(0.0).min(base).min(1.0 - base)
}

/// Everything one movement generation needs.
#[derive(Clone, Copy, Debug)]
pub struct MovementRequest {
    /// Pattern to generate.
    pub pattern: MovementPattern,
    /// Energy level.
    pub intensity: Intensity,
    /// Base pose the offsets are relative to.
    pub pose: BasePose,
    /// Movement periods covered by the curve.
    pub cycles: f64,
    /// Seed for noise-driven patterns.
    pub seed: u64,
    /// Sampling density.
    pub budget: SampleBudget,
}

/// One animated axis.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisMotion {
    /// Movement-offset curve.
    pub curve: TaggedCurve,
    /// Amplitude after clamping.
    pub amplitude: f64,
    /// Center offset after clamping.
    pub center_offset: f64,
}

/// Generated pan/tilt curves. `None` means the axis rests at its base pose.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovementCurves {
    /// Pan axis.
    pub pan: Option<AxisMotion>,
    /// Tilt axis.
    pub tilt: Option<AxisMotion>,
}

fn axis_motion(
    driver: AxisDriver,
    params: LevelParams,
    base: f64,
    req: &MovementRequest,
    needs_centering: bool,
    seed: u64,
) -> ChoreoResult<AxisMotion> {
    let requested_offset =
        (params.center_offset * driver.offset_weight).clamp(-MAX_CENTER_OFFSET, MAX_CENTER_OFFSET);
    let center = (base + requested_offset).clamp(0.0, 1.0);
    let offset = center - base;
    let amplitude = effective_amplitude(params.amplitude * driver.weight, center)
        .min(0.5 - offset.abs())
        .max(0.0);
    let requested = params.amplitude * driver.weight;
    if amplitude + 1e-12 < requested {
        tracing::debug!(
            pattern = ?req.pattern,
            base,
            requested,
            effective = amplitude,
            "amplitude limited by base pose"
        );
    }

    let total_cycles = params.frequency * driver.harmonic * req.cycles;
    let n = req.budget.samples_for(total_cycles);
    let noise_period = (total_cycles.ceil().max(1.0) as u64) * NOISE_CELLS_PER_CYCLE;
    let shape = PointsCurve::from_fn(n, |t| {
        0.5 + 0.5 * driver.wave.sample(driver.phase + total_cycles * t, seed, noise_period)
    })?;
    let shape = if needs_centering {
        center_midrange(&shape)?
    } else {
        shape
    };

    let curve = shape.map_values(|s| 0.5 + offset + amplitude * (2.0 * s - 1.0))?;
    Ok(AxisMotion {
        curve: TaggedCurve::movement(curve),
        amplitude,
        center_offset: offset,
    })
}

/// Generate movement-offset curves for one fixture instance.
///
/// Amplitudes are clamped against the base pose before sampling, so every
/// curve value maps to a position inside `[0, 1]`.
pub fn generate(req: &MovementRequest) -> ChoreoResult<MovementCurves> {
    if !req.cycles.is_finite() || req.cycles <= 0.0 {
        return Err(ChoreoError::numeric(format!(
            "movement cycles must be finite and > 0, got {}",
            req.cycles
        )));
    }
    let def = req.pattern.def();
    let params = def.level(req.intensity);

    let pan = def
        .pan
        .map(|d| {
            axis_motion(
                d,
                params,
                req.pose.pan,
                req,
                def.needs_centering,
                stable_seed(req.seed, &["pan"]),
            )
        })
        .transpose()?;
    let tilt = def
        .tilt
        .map(|d| {
            axis_motion(
                d,
                params,
                req.pose.tilt,
                req,
                def.needs_centering,
                stable_seed(req.seed, &["tilt"]),
            )
        })
        .transpose()?;

    Ok(MovementCurves { pan, tilt })
}

#[cfg(test)]
#[path = "../../tests/unit/motion/movement.rs"]
mod tests;
