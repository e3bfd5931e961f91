use std::collections::BTreeSet;

use crate::{
    compile::{
        ir::{FixtureSegment, SegmentBody, SegmentSource},
        options::CompileOptions,
    },
    curve::{
        points::{CurvePoint, PointsCurve, closed_grid},
        simplify::simplify_rdp,
    },
    dmx::convert::held_value_at,
    foundation::{
        core::{Channel, ChannelKind},
        error::{ChoreoError, ChoreoResult, ConfigLocation},
        math::lerp,
    },
    transition::plan::TransitionPlan,
};

/// How a channel travels from the outgoing to the incoming template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendStrategy {
    /// Switch at the boundary. Only for channels that must never interpolate.
    Snap,
    /// Ease from the outgoing value at the window start to the incoming value at its end.
    SmoothInterpolation,
    /// Mix both live values.
    Crossfade,
    /// Fade the live outgoing value to the floor, then up to the live incoming value.
    FadeViaBlack,
    /// Fade down, hold at the floor, fade up; proportions from the options.
    Sequence,
}

impl BlendStrategy {
    /// Strategy used when the options do not override a channel.
    pub fn default_for(kind: ChannelKind) -> Self {
        match kind {
            ChannelKind::ContinuousMotion => Self::SmoothInterpolation,
            ChannelKind::ContinuousIntensity => Self::FadeViaBlack,
            ChannelKind::Discrete => Self::Snap,
        }
    }

    /// Reject strategies that are illegal for a channel kind.
    pub fn check(self, kind: ChannelKind, field: &str) -> ChoreoResult<()> {
        let ok = match kind {
            ChannelKind::ContinuousMotion => self != Self::Snap,
            ChannelKind::ContinuousIntensity => true,
            ChannelKind::Discrete => self == Self::Snap,
        };
        if !ok {
            return Err(ChoreoError::config(
                ConfigLocation::default().field(field),
                format!("blend strategy {self:?} is not allowed on a {kind:?} channel"),
            ));
        }
        Ok(())
    }
}

/// Mixing law for [`BlendStrategy::Crossfade`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossfadeCurve {
    Linear,
    /// `cos`/`sin` gains; keeps perceived power constant.
    #[default]
    EqualPower,
}

impl CrossfadeCurve {
    /// Law applied on a channel kind. Equal-power gains sum above one, so positions mix linearly.
    pub fn for_kind(self, kind: ChannelKind) -> Self {
        match kind {
            ChannelKind::ContinuousIntensity => self,
            ChannelKind::ContinuousMotion | ChannelKind::Discrete => Self::Linear,
        }
    }
}

/// Values a blend is computed from, all in DMX units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendInputs {
    /// Outgoing value at the sample time.
    pub a_live: f64,
    /// Incoming value at the sample time.
    pub b_live: f64,
    /// Outgoing value frozen at the window start.
    pub a_start: f64,
    /// Incoming value frozen at the window end.
    pub b_end: f64,
    /// Channel floor.
    pub floor: f64,
}

/// Blend a `kind` channel at window progress `u` in `[0, 1]`.
pub fn blend_value(
    strategy: BlendStrategy,
    kind: ChannelKind,
    u: f64,
    x: &BlendInputs,
    options: &CompileOptions,
) -> f64 {
    let u = u.clamp(0.0, 1.0);
    let ease = |p: f64| options.transition_ease.apply(p);
    match strategy {
        BlendStrategy::Snap => {
            if u < 0.5 {
                x.a_live
            } else {
                x.b_live
            }
        }
        BlendStrategy::SmoothInterpolation => lerp(x.a_start, x.b_end, ease(u)),
        BlendStrategy::Crossfade => match options.crossfade_curve.for_kind(kind) {
            CrossfadeCurve::Linear => lerp(x.a_live, x.b_live, u),
            CrossfadeCurve::EqualPower => {
                let q = u * std::f64::consts::FRAC_PI_2;
                q.cos() * x.a_live + q.sin() * x.b_live
            }
        },
        BlendStrategy::FadeViaBlack => {
            if u <= 0.5 {
                lerp(x.a_live, x.floor, ease(2.0 * u))
            } else {
                lerp(x.floor, x.b_live, ease(2.0 * u - 1.0))
            }
        }
        BlendStrategy::Sequence => {
            let [down, hold, up] = options.sequence_proportions;
            if u < down {
                lerp(x.a_live, x.floor, ease(u / down))
            } else if u < down + hold {
                x.floor
            } else {
                lerp(x.floor, x.b_live, ease(((u - down - hold) / up).min(1.0)))
            }
        }
    }
}

fn fixtures_of(segments: &[FixtureSegment]) -> BTreeSet<&str> {
    segments.iter().map(|s| s.fixture_id.as_str()).collect()
}

/// Last outgoing segment touching the boundary and first incoming one.
fn reference<'a>(
    segments: &'a [FixtureSegment],
    fixture_id: &str,
    channel: Channel,
    pick_last: bool,
) -> Option<&'a FixtureSegment> {
    let own = segments
        .iter()
        .filter(|s| s.fixture_id == fixture_id && s.channel == channel && !s.is_transition);
    if pick_last {
        own.max_by(|a, b| a.t1_ms.total_cmp(&b.t1_ms))
    } else {
        own.min_by(|a, b| a.t0_ms.total_cmp(&b.t0_ms))
    }
}

/// DMX mapping of a transition segment for one fixture channel.
enum Mapping {
    Offset { lo: f64, hi: f64 },
    Absolute { floor: f64, ceiling: f64 },
}

impl Mapping {
    fn floor(&self) -> f64 {
        match self {
            Self::Offset { lo, .. } => *lo,
            Self::Absolute { floor, .. } => *floor,
        }
    }

    fn normalize(&self, dmx: f64) -> f64 {
        let (base, span) = match self {
            Self::Offset { lo, hi } => ((lo + hi) / 2.0, hi - lo),
            Self::Absolute { floor, ceiling } => (*floor, ceiling - floor),
        };
        if span <= 0.0 {
            return match self {
                Self::Offset { .. } => 0.5,
                Self::Absolute { .. } => 0.0,
            };
        }
        let v = (dmx - base) / span;
        match self {
            Self::Offset { .. } => (0.5 + v).clamp(0.0, 1.0),
            Self::Absolute { .. } => v.clamp(0.0, 1.0),
        }
    }
}

/// Build transition segments for every fixture present on both sides.
///
/// Values are blended in DMX units from the two sides' base segments (outside a
/// side's coverage its edge value is held), then re-encoded under the channel's
/// semantic. Base segments are only read.
#[tracing::instrument(skip(plan, left, right, options), fields(boundary_ms = plan.boundary_ms))]
pub fn compile_transition(
    plan: &TransitionPlan,
    left: &[FixtureSegment],
    right: &[FixtureSegment],
    source: &SegmentSource,
    options: &CompileOptions,
) -> ChoreoResult<Vec<FixtureSegment>> {
    let n = options.transition_samples | 1;
    let grid = closed_grid(n)?;
    let window = plan.window;
    let right_fixtures = fixtures_of(right);
    let shared: Vec<&str> = fixtures_of(left)
        .into_iter()
        .filter(|f| right_fixtures.contains(f))
        .collect();

    let mut out = Vec::new();
    for fixture in shared {
        for (&channel, &strategy) in &plan.strategies {
            let (Some(l), Some(r)) = (
                reference(left, fixture, channel, true),
                reference(right, fixture, channel, false),
            ) else {
                continue;
            };
            let mapping = match channel.kind() {
                ChannelKind::ContinuousIntensity => Mapping::Absolute {
                    floor: l
                        .floor_dmx
                        .unwrap_or(0.0)
                        .min(r.floor_dmx.unwrap_or(0.0)),
                    ceiling: l
                        .ceiling_dmx
                        .unwrap_or(0.0)
                        .max(r.ceiling_dmx.unwrap_or(0.0)),
                },
                _ => Mapping::Offset {
                    lo: r.clamp_min,
                    hi: r.clamp_max,
                },
            };

            let side = |segs: &[FixtureSegment], t: f64| -> ChoreoResult<f64> {
                held_value_at(segs, fixture, channel, t)?.ok_or_else(|| {
                    ChoreoError::numeric(format!(
                        "no {} values for fixture '{fixture}'",
                        channel.as_str()
                    ))
                })
            };
            let a_start = side(left, window.start_ms)?;
            let b_end = side(right, window.end_ms)?;

            let mut points = Vec::with_capacity(grid.len());
            for &u in &grid {
                let t = window.at(u);
                let inputs = BlendInputs {
                    a_live: side(left, t)?,
                    b_live: side(right, t)?,
                    a_start,
                    b_end,
                    floor: mapping.floor(),
                };
                let dmx = blend_value(strategy, channel.kind(), u, &inputs, options);
                points.push(CurvePoint::new(u, mapping.normalize(dmx)));
            }
            let mut curve = PointsCurve::new(points)?;
            if options.simplify {
                curve = simplify_rdp(&curve, options.simplify_epsilon, 1.0, 1.0)?;
            }

            let body = SegmentBody::Curve(curve);
            let seg = match mapping {
                Mapping::Offset { lo, hi } => FixtureSegment::movement(
                    fixture,
                    channel,
                    window,
                    body,
                    (lo + hi) / 2.0,
                    hi - lo,
                    lo,
                    hi,
                )?,
                Mapping::Absolute { floor, ceiling } => {
                    FixtureSegment::dimmer(fixture, window, body, floor, ceiling)?
                }
            };
            out.push(seg.with_source(source.clone()).into_transition());
        }
    }
    tracing::debug!(segments = out.len(), "transition compiled");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/transition/blend.rs"]
mod tests;
