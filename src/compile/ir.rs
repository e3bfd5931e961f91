use crate::{
    curve::{
        points::{PointsCurve, crop},
        semantic::CurveSemantic,
    },
    foundation::{
        core::{Channel, DMX_MAX, TimeRange},
        error::{ChoreoError, ChoreoResult},
    },
};

/// Layer of segments produced by template compilation.
pub const BASE_LAYER: i32 = 0;
/// Layer of boundary transitions; wins over [`BASE_LAYER`] where both cover a time.
pub const TRANSITION_LAYER: i32 = 1;

/// Curve or constant carried by a segment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SegmentBody {
    /// Normalized curve over the segment's time range.
    Curve(PointsCurve),
    /// Normalized constant.
    Static(f64),
}

impl SegmentBody {
    /// Normalized value at progress `u` in `[0, 1]`.
    pub fn value_at(&self, u: f64) -> f64 {
        match self {
            Self::Curve(c) => c.value_at(u),
            Self::Static(v) => *v,
        }
    }
}

/// Where a segment came from.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SegmentSource {
    /// Template id, or `left->right` for transitions.
    pub template_id: String,
    /// Step id for template segments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    /// Repeat cycle for template segments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_index: Option<usize>,
}

/// One fixture channel over one time range: the compiler's output unit.
///
/// Segments are immutable once built; stages that need a variation produce a
/// new segment ([`FixtureSegment::clipped`]).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FixtureSegment {
    pub fixture_id: String,
    pub channel: Channel,
    pub t0_ms: f64,
    pub t1_ms: f64,
    pub body: SegmentBody,
    pub semantic: CurveSemantic,
    /// DMX of the base pose (movement offsets).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dmx: Option<f64>,
    /// DMX covered by a full offset swing; negative on inverted axes (movement offsets).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplitude_dmx: Option<f64>,
    /// DMX of normalized `0` (dimmer levels).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_dmx: Option<f64>,
    /// DMX of normalized `1` (dimmer levels).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling_dmx: Option<f64>,
    pub clamp_min: f64,
    pub clamp_max: f64,
    pub is_transition: bool,
    pub layer: i32,
    #[serde(default)]
    pub source: SegmentSource,
}

fn check_range(range: TimeRange) -> ChoreoResult<()> {
    if range.is_empty() {
        return Err(ChoreoError::numeric(format!(
            "segment range must be non-empty, got [{}, {})",
            range.start_ms, range.end_ms
        )));
    }
    Ok(())
}

impl FixtureSegment {
    /// Movement-offset segment for a pan/tilt channel.
    #[allow(clippy::too_many_arguments)]
    pub fn movement(
        fixture_id: impl Into<String>,
        channel: Channel,
        range: TimeRange,
        body: SegmentBody,
        base_dmx: f64,
        amplitude_dmx: f64,
        clamp_min: f64,
        clamp_max: f64,
    ) -> ChoreoResult<Self> {
        check_range(range)?;
        Ok(Self {
            fixture_id: fixture_id.into(),
            channel,
            t0_ms: range.start_ms,
            t1_ms: range.end_ms,
            body,
            semantic: CurveSemantic::MovementOffset,
            base_dmx: Some(base_dmx),
            amplitude_dmx: Some(amplitude_dmx),
            floor_dmx: None,
            ceiling_dmx: None,
            clamp_min,
            clamp_max,
            is_transition: false,
            layer: BASE_LAYER,
            source: SegmentSource::default(),
        })
    }

    /// Absolute dimmer segment.
    pub fn dimmer(
        fixture_id: impl Into<String>,
        range: TimeRange,
        body: SegmentBody,
        floor_dmx: f64,
        ceiling_dmx: f64,
    ) -> ChoreoResult<Self> {
        check_range(range)?;
        Ok(Self {
            fixture_id: fixture_id.into(),
            channel: Channel::Dimmer,
            t0_ms: range.start_ms,
            t1_ms: range.end_ms,
            body,
            semantic: CurveSemantic::DimmerAbsolute,
            base_dmx: None,
            amplitude_dmx: None,
            floor_dmx: Some(floor_dmx),
            ceiling_dmx: Some(ceiling_dmx),
            clamp_min: 0.0,
            clamp_max: DMX_MAX,
            is_transition: false,
            layer: BASE_LAYER,
            source: SegmentSource::default(),
        })
    }

    pub fn with_source(mut self, source: SegmentSource) -> Self {
        self.source = source;
        self
    }

    /// Mark as a boundary transition on [`TRANSITION_LAYER`].
    pub fn into_transition(mut self) -> Self {
        self.is_transition = true;
        self.layer = TRANSITION_LAYER;
        self
    }

    pub fn range(&self) -> TimeRange {
        TimeRange {
            start_ms: self.t0_ms,
            end_ms: self.t1_ms,
        }
    }

    /// Normalized value at absolute time `t_ms` (clamped to the segment).
    pub fn value_at(&self, t_ms: f64) -> f64 {
        self.body.value_at(self.range().progress(t_ms))
    }

    pub fn start_value(&self) -> f64 {
        self.body.value_at(0.0)
    }

    pub fn end_value(&self) -> f64 {
        self.body.value_at(1.0)
    }

    /// New segment covering `window ∩ range`, resampled onto `n_samples` points.
    ///
    /// `None` when the windows do not overlap.
    pub fn clipped(&self, window: TimeRange, n_samples: usize) -> ChoreoResult<Option<Self>> {
        let Some(r) = self.range().intersect(window) else {
            return Ok(None);
        };
        let body = match &self.body {
            SegmentBody::Static(v) => SegmentBody::Static(*v),
            SegmentBody::Curve(c) => {
                let own = self.range();
                let (u0, u1) = (own.progress(r.start_ms), own.progress(r.end_ms));
                if u0 <= 0.0 && u1 >= 1.0 {
                    SegmentBody::Curve(c.clone())
                } else {
                    SegmentBody::Curve(crop(c, u0, u1, n_samples)?)
                }
            }
        };
        Ok(Some(Self {
            t0_ms: r.start_ms,
            t1_ms: r.end_ms,
            body,
            ..self.clone()
        }))
    }
}

/// Stable output order: fixture, channel, start time, layer.
pub fn sort_segments(segments: &mut [FixtureSegment]) {
    segments.sort_by(|a, b| {
        a.fixture_id
            .cmp(&b.fixture_id)
            .then(a.channel.cmp(&b.channel))
            .then(a.t0_ms.total_cmp(&b.t0_ms))
            .then(a.layer.cmp(&b.layer))
    });
}

#[cfg(test)]
#[path = "../../tests/unit/compile/ir.rs"]
mod tests;
