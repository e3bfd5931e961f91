use std::collections::BTreeMap;

use crate::{
    compile::options::CompileOptions,
    foundation::{
        core::{Channel, TimeRange},
        error::ChoreoResult,
    },
    transition::blend::BlendStrategy,
};

/// Point where one compiled template ends exactly where another begins.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Boundary {
    pub t_ms: f64,
    /// Index of the outgoing region.
    pub left: usize,
    /// Index of the incoming region.
    pub right: usize,
}

/// Boundaries between regions, ordered by time.
///
/// Only exact edge matches count; gaps and overlaps get no transition.
pub fn detect_boundaries(regions: &[TimeRange]) -> Vec<Boundary> {
    let mut out = Vec::new();
    for (i, l) in regions.iter().enumerate() {
        for (j, r) in regions.iter().enumerate() {
            if i != j && l.end_ms == r.start_ms && !l.is_empty() && !r.is_empty() {
                out.push(Boundary {
                    t_ms: l.end_ms,
                    left: i,
                    right: j,
                });
            }
        }
    }
    out.sort_by(|a, b| a.t_ms.total_cmp(&b.t_ms).then(a.left.cmp(&b.left)));
    out
}

/// Window and per-channel strategy of one transition.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionPlan {
    pub boundary_ms: f64,
    pub window: TimeRange,
    pub strategies: BTreeMap<Channel, BlendStrategy>,
}

/// Plan the transition around `boundary`.
///
/// The window is centered on the boundary and shrunk so it never covers more
/// than half of either region. `None` when nothing is left of it.
pub fn plan_transition(
    boundary: &Boundary,
    left: TimeRange,
    right: TimeRange,
    options: &CompileOptions,
) -> ChoreoResult<Option<TransitionPlan>> {
    let half = (options.transition_window_ms / 2.0)
        .min(left.len_ms() / 2.0)
        .min(right.len_ms() / 2.0);
    if half <= 0.0 {
        return Ok(None);
    }
    let window = TimeRange::new(boundary.t_ms - half, boundary.t_ms + half)?;

    let mut strategies = BTreeMap::new();
    for channel in Channel::ALL {
        strategies.insert(channel, options.strategy_for(channel)?);
    }
    tracing::debug!(
        boundary_ms = boundary.t_ms,
        start_ms = window.start_ms,
        end_ms = window.end_ms,
        "transition planned"
    );
    Ok(Some(TransitionPlan {
        boundary_ms: boundary.t_ms,
        window,
        strategies,
    }))
}

#[cfg(test)]
#[path = "../../tests/unit/transition/plan.rs"]
mod tests;
