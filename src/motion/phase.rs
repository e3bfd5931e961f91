use crate::foundation::error::{ChoreoError, ChoreoResult, ConfigLocation};

/// Order in which fixtures pick up a chase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseOrder {
    /// Role order, first role leads.
    #[default]
    AsListed,
    /// Role order, last role leads.
    Reversed,
    /// Middle roles lead, mirrored pairs share a phase.
    CenterOut,
    /// Outermost roles lead, mirrored pairs share a phase.
    OutsideIn,
}

/// How ranks are spread over the phase range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    /// `rank / (m - 1)`: first and last rank span the whole spread.
    #[default]
    Linear,
    /// `rank / m`: equal spacing that closes a full cycle when `spread = 1`.
    Even,
}

/// Phase settings of a step.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PhaseSpec {
    /// Fixture ordering.
    pub order: PhaseOrder,
    /// Total spread as a fraction of the pattern cycle: the movement period, or
    /// the dimmer period when the head holds still.
    pub spread: f64,
    /// Rank spacing.
    pub distribution: Distribution,
    /// Wrap offsets into `[0, 1)`. Defaults to the template's repeatability.
    pub wrap: Option<bool>,
}

impl PhaseSpec {
    /// Check numeric bounds.
    pub fn validate(&self) -> ChoreoResult<()> {
        if !self.spread.is_finite() || self.spread.abs() > 1.0 {
            return Err(ChoreoError::config(
                ConfigLocation::default().field("phase.spread"),
                format!("must be finite and within [-1, 1], got {}", self.spread),
            ));
        }
        Ok(())
    }
}

fn rank_fraction(rank: usize, ranks: usize, distribution: Distribution) -> f64 {
    match distribution {
        Distribution::Linear if ranks > 1 => rank as f64 / (ranks - 1) as f64,
        Distribution::Linear => 0.0,
        Distribution::Even => rank as f64 / ranks.max(1) as f64,
    }
}

fn finish(raw: f64, wrap: bool) -> f64 {
    if wrap { raw.rem_euclid(1.0) } else { raw }
}

/// Phase offsets for fixtures already in chase order.
///
/// With the linear distribution fixture `i` of `n` gets `spread * i / (n - 1)`;
/// a single fixture gets `0`.
pub fn compute_offsets(
    ordered: &[&str],
    spread: f64,
    distribution: Distribution,
    wrap: bool,
) -> ChoreoResult<Vec<(String, f64)>> {
    if !spread.is_finite() {
        return Err(ChoreoError::numeric("phase spread must be finite"));
    }
    let n = ordered.len();
    Ok(ordered
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let raw = spread * rank_fraction(i, n, distribution);
            (id.to_string(), finish(raw, wrap))
        })
        .collect())
}

/// Rank of position `i` of `n` under `order`, plus the number of distinct ranks.
fn rank(i: usize, n: usize, order: PhaseOrder) -> (usize, usize) {
    match order {
        PhaseOrder::AsListed => (i, n),
        PhaseOrder::Reversed => (n - 1 - i, n),
        PhaseOrder::CenterOut | PhaseOrder::OutsideIn => {
            // Distance from the middle in whole steps; mirrored pairs tie.
            let from_center = i.min(n - 1 - i);
            let ranks = n.div_ceil(2);
            let outside_in = from_center;
            let center_out = ranks - 1 - from_center;
            if order == PhaseOrder::CenterOut {
                (center_out, ranks)
            } else {
                (outside_in, ranks)
            }
        }
    }
}

/// Phase offsets for fixtures in spatial (role) order, applying a [`PhaseOrder`].
pub fn compute_ordered(
    spatial: &[&str],
    spec: &PhaseSpec,
    wrap: bool,
) -> ChoreoResult<Vec<(String, f64)>> {
    spec.validate()?;
    let n = spatial.len();
    Ok(spatial
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let (r, m) = rank(i, n, spec.order);
            let raw = spec.spread * rank_fraction(r, m, spec.distribution);
            (id.to_string(), finish(raw, wrap))
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/motion/phase.rs"]
mod tests;
