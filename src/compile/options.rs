use std::collections::BTreeMap;

use crate::{
    animation::ease::Ease,
    curve::{points::SampleBudget, simplify::DEFAULT_EPSILON},
    foundation::{
        core::Channel,
        error::{ChoreoError, ChoreoResult},
    },
    transition::blend::{BlendStrategy, CrossfadeCurve},
};

/// Compiler knobs. Every field has a default, so `{}` is a valid options file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub samples_per_cycle: usize,
    pub max_samples: usize, // per curve
    pub simplify: bool,
    pub simplify_epsilon: f64, // normalized units
    pub transition_window_ms: f64,
    pub transition_samples: usize, // rounded up to odd so the midpoint is sampled
    pub strategies: BTreeMap<Channel, BlendStrategy>,
    pub sequence_proportions: [f64; 3], // down, hold, up
    pub crossfade_curve: CrossfadeCurve,
    pub transition_ease: Ease, // smooth interpolation and fades
    pub parallel: bool,
    pub threads: Option<usize>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            samples_per_cycle: 64,
            max_samples: 4096,
            simplify: true,
            simplify_epsilon: DEFAULT_EPSILON,
            transition_window_ms: 800.0,
            transition_samples: 65,
            strategies: BTreeMap::new(),
            sequence_proportions: [0.3, 0.4, 0.3],
            crossfade_curve: CrossfadeCurve::EqualPower,
            transition_ease: Ease::InOutSine,
            parallel: false,
            threads: None,
        }
    }
}

impl CompileOptions {
    pub fn validate(&self) -> ChoreoResult<()> {
        if self.samples_per_cycle < 2 {
            return Err(ChoreoError::validation("samples_per_cycle must be >= 2"));
        }
        if self.max_samples < 3 {
            return Err(ChoreoError::validation("max_samples must be >= 3"));
        }
        if self.transition_samples < 3 {
            return Err(ChoreoError::validation("transition_samples must be >= 3"));
        }
        if !self.simplify_epsilon.is_finite() || self.simplify_epsilon < 0.0 {
            return Err(ChoreoError::validation(
                "simplify_epsilon must be finite and >= 0",
            ));
        }
        if !self.transition_window_ms.is_finite() || self.transition_window_ms < 0.0 {
            return Err(ChoreoError::validation(
                "transition_window_ms must be finite and >= 0",
            ));
        }
        let p = self.sequence_proportions;
        if p.iter().any(|v| !v.is_finite() || *v <= 0.0) || (p.iter().sum::<f64>() - 1.0).abs() > 1e-9
        {
            return Err(ChoreoError::validation(
                "sequence_proportions must be positive and sum to 1",
            ));
        }
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(ChoreoError::validation("threads must be >= 1 when set"));
        }
        for channel in self.strategies.keys() {
            self.strategy_for(*channel)?;
        }
        Ok(())
    }

    pub fn budget(&self) -> SampleBudget {
        SampleBudget {
            per_cycle: self.samples_per_cycle,
            max: self.max_samples,
        }
    }

    /// Configured or default strategy for `channel`, checked against its kind.
    pub fn strategy_for(&self, channel: Channel) -> ChoreoResult<BlendStrategy> {
        let s = self
            .strategies
            .get(&channel)
            .copied()
            .unwrap_or_else(|| BlendStrategy::default_for(channel.kind()));
        s.check(channel.kind(), &format!("strategies.{}", channel.as_str()))?;
        Ok(s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/options.rs"]
mod tests;
