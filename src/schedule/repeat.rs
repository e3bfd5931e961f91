use std::collections::BTreeSet;

use crate::{
    foundation::error::{ChoreoError, ChoreoResult, ConfigLocation},
    timing::tempo::BarClock,
};

const BAR_EPS: f64 = 1e-9;

/// Direction rule applied per cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    /// Every cycle plays forward.
    #[default]
    Forward,
    /// Odd cycles play reversed.
    PingPong,
}

/// What fills a window that is not a whole number of cycles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Freeze the last computed values until the window ends.
    #[default]
    HoldLastPose,
    /// Hold the pose and fade the dimmer to its floor.
    FadeOut,
    /// Start another cycle and cut it at the window end. Produces a visible
    /// mid-motion cut; prefer the other policies.
    Truncate,
}

/// How a template repeats over a placement window.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RepeatContract {
    /// Whether the cycle repeats at all.
    pub repeatable: bool,
    /// Per-cycle direction rule.
    pub mode: RepeatMode,
    /// Cycle length in bars, `> 0`.
    pub cycle_bars: f64,
    /// Steps that play in every cycle. Empty means all of them; the others play
    /// in the first cycle only.
    pub loop_step_ids: BTreeSet<String>,
    /// Remainder handling.
    pub remainder_policy: RemainderPolicy,
}

impl Default for RepeatContract {
    fn default() -> Self {
        Self {
            repeatable: true,
            mode: RepeatMode::Forward,
            cycle_bars: 4.0,
            loop_step_ids: BTreeSet::new(),
            remainder_policy: RemainderPolicy::HoldLastPose,
        }
    }
}

impl RepeatContract {
    /// Check the cycle length.
    pub fn validate(&self) -> ChoreoResult<()> {
        if !self.cycle_bars.is_finite() || self.cycle_bars <= 0.0 {
            return Err(ChoreoError::config(
                ConfigLocation::default().field("repeat.cycle_bars"),
                format!("cycle_bars must be finite and > 0, got {}", self.cycle_bars),
            ));
        }
        Ok(())
    }

    /// Direction of cycle `c`.
    pub fn direction(&self, cycle_index: usize) -> Direction {
        match self.mode {
            RepeatMode::PingPong if cycle_index % 2 == 1 => Direction::Reverse,
            _ => Direction::Forward,
        }
    }
}

/// Playback direction of an instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Curves sampled as generated.
    Forward,
    /// Curves sampled with `t' = 1 - t`.
    Reverse,
}

/// Role an instance plays in the window.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstanceKind {
    /// A whole step inside a whole cycle.
    Cycle,
    /// A step cut at the window end; only `[0, fraction]` of it plays.
    Partial {
        /// Visible share of the step.
        fraction: f64,
    },
    /// Frozen end state of the last step.
    Hold,
    /// Frozen end pose with the dimmer fading to its floor.
    FadeOut,
}

/// A step's position inside one cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct StepSlot {
    /// Step id.
    pub step_id: String,
    /// Offset from the cycle start, in bars.
    pub start_bar: f64,
    /// Length in bars, `> 0`.
    pub duration_bars: f64,
    /// Plays in every cycle (otherwise in the first one only).
    pub loops: bool,
}

/// Bar range `[start_bar, end_bar)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BarSpan {
    /// First bar.
    pub start_bar: f64,
    /// End bar (exclusive).
    pub end_bar: f64,
}

impl BarSpan {
    /// Length in bars.
    pub fn bars(self) -> f64 {
        self.end_bar - self.start_bar
    }
}

/// One time-bounded playback of a step.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScheduledInstance {
    /// Step id.
    pub step_id: String,
    /// Absolute start.
    pub start_ms: f64,
    /// Absolute end.
    pub end_ms: f64,
    /// Bars covered by this instance.
    pub span: BarSpan,
    /// Bars the step's curves are generated over. Differs from `span` for
    /// partial, hold and fade-out instances.
    pub source: BarSpan,
    /// Playback direction.
    pub direction: Direction,
    /// Cycle the instance belongs to.
    pub cycle_index: usize,
    /// Cycle, partial or remainder filler.
    pub kind: InstanceKind,
}

fn place(slot: &StepSlot, cycle_start: f64, cycle_bars: f64, direction: Direction) -> BarSpan {
    match direction {
        Direction::Forward => BarSpan {
            start_bar: cycle_start + slot.start_bar,
            end_bar: cycle_start + slot.start_bar + slot.duration_bars,
        },
        Direction::Reverse => BarSpan {
            start_bar: cycle_start + cycle_bars - slot.start_bar - slot.duration_bars,
            end_bar: cycle_start + cycle_bars - slot.start_bar,
        },
    }
}

/// Expand step slots into instances over `window`.
///
/// Full cycles come first; a non-integer remainder is filled according to the
/// contract's [`RemainderPolicy`]. A window shorter than one cycle yields a
/// single truncated pass. Instances are ordered by start time, then slot order.
pub fn schedule(
    contract: &RepeatContract,
    slots: &[StepSlot],
    window: BarSpan,
    clock: &dyn BarClock,
) -> ChoreoResult<Vec<ScheduledInstance>> {
    contract.validate()?;
    let window_bars = window.bars();
    if !window.start_bar.is_finite() || !window_bars.is_finite() || window_bars <= 0.0 {
        return Err(ChoreoError::validation(format!(
            "placement window must be finite and non-empty, got [{}, {}]",
            window.start_bar, window.end_bar
        )));
    }
    let cycle = contract.cycle_bars;
    let mut full = (window_bars / cycle + BAR_EPS).floor() as usize;
    if !contract.repeatable {
        full = full.min(1);
    }

    let instance = |slot: &StepSlot, span: BarSpan, source: BarSpan, c: usize, d, kind| {
        ScheduledInstance {
            step_id: slot.step_id.clone(),
            start_ms: clock.bar_to_ms(span.start_bar),
            end_ms: clock.bar_to_ms(span.end_bar),
            span,
            source,
            direction: d,
            cycle_index: c,
            kind,
        }
    };

    let mut out = Vec::new();
    for c in 0..full {
        let direction = contract.direction(c);
        let cycle_start = window.start_bar + c as f64 * cycle;
        for slot in slots.iter().filter(|s| c == 0 || s.loops) {
            let span = place(slot, cycle_start, cycle, direction);
            out.push(instance(slot, span, span, c, direction, InstanceKind::Cycle));
        }
    }

    let rest_start = window.start_bar + full as f64 * cycle;
    if window.end_bar - rest_start > BAR_EPS {
        let truncate = full == 0 || contract.remainder_policy == RemainderPolicy::Truncate;
        if truncate {
            // A one-shot template that already played stays silent afterwards.
            if contract.repeatable || full == 0 {
                let direction = contract.direction(full);
                for slot in slots.iter().filter(|s| full == 0 || s.loops) {
                    let source = place(slot, rest_start, cycle, direction);
                    let end_bar = source.end_bar.min(window.end_bar);
                    if end_bar - source.start_bar <= BAR_EPS {
                        continue;
                    }
                    let span = BarSpan {
                        start_bar: source.start_bar,
                        end_bar,
                    };
                    let kind = if end_bar < source.end_bar - BAR_EPS {
                        InstanceKind::Partial {
                            fraction: span.bars() / source.bars(),
                        }
                    } else {
                        InstanceKind::Cycle
                    };
                    out.push(instance(slot, span, source, full, direction, kind));
                }
            }
        } else if let Some(last) = out
            .iter()
            .filter(|i| i.cycle_index + 1 == full)
            .max_by(|a, b| a.span.end_bar.total_cmp(&b.span.end_bar))
            .cloned()
        {
            let span = BarSpan {
                start_bar: rest_start,
                end_bar: window.end_bar,
            };
            let kind = match contract.remainder_policy {
                RemainderPolicy::FadeOut => InstanceKind::FadeOut,
                _ => InstanceKind::Hold,
            };
            out.push(ScheduledInstance {
                start_ms: clock.bar_to_ms(span.start_bar),
                end_ms: clock.bar_to_ms(span.end_bar),
                span,
                cycle_index: full,
                kind,
                ..last
            });
        }
    }

    // Stable sort keeps slot order for simultaneous starts.
    out.sort_by(|a, b| a.span.start_bar.total_cmp(&b.span.start_bar));
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/repeat.rs"]
mod tests;
