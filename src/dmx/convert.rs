use crate::{
    compile::ir::{FixtureSegment, SegmentBody},
    curve::semantic::CurveSemantic,
    foundation::{
        core::{Channel, DMX_MAX, dmx_byte},
        error::{ChoreoError, ChoreoResult},
    },
};

/// `base + (v - 0.5) * amplitude`, clamped to the DMX range.
pub fn movement_offset_dmx(v: f64, base_dmx: f64, amplitude_dmx: f64) -> f64 {
    (base_dmx + (v - 0.5) * amplitude_dmx).clamp(0.0, DMX_MAX)
}

/// `floor + v * (ceiling - floor)`, clamped to the DMX range.
pub fn dimmer_absolute_dmx(v: f64, floor_dmx: f64, ceiling_dmx: f64) -> f64 {
    (floor_dmx + v * (ceiling_dmx - floor_dmx)).clamp(0.0, DMX_MAX)
}

fn mapping(name: &str, v: Option<f64>, segment: &FixtureSegment) -> ChoreoResult<f64> {
    v.filter(|x| x.is_finite()).ok_or_else(|| {
        ChoreoError::numeric(format!(
            "{} {} segment is missing a finite {name}",
            segment.fixture_id,
            segment.channel.as_str()
        ))
    })
}

/// Convert a normalized value of `segment` to DMX units (unrounded).
///
/// The formula is chosen by the segment's semantic tag, never by its channel;
/// the result is clamped to the segment's `[clamp_min, clamp_max]`.
pub fn dmx_value(segment: &FixtureSegment, v: f64) -> ChoreoResult<f64> {
    if !v.is_finite() {
        return Err(ChoreoError::numeric(format!(
            "normalized value must be finite, got {v}"
        )));
    }
    let raw = match segment.semantic {
        CurveSemantic::MovementOffset => movement_offset_dmx(
            v,
            mapping("base_dmx", segment.base_dmx, segment)?,
            mapping("amplitude_dmx", segment.amplitude_dmx, segment)?,
        ),
        CurveSemantic::DimmerAbsolute => dimmer_absolute_dmx(
            v,
            mapping("floor_dmx", segment.floor_dmx, segment)?,
            mapping("ceiling_dmx", segment.ceiling_dmx, segment)?,
        ),
    };
    let lo = segment.clamp_min.clamp(0.0, DMX_MAX);
    let hi = segment.clamp_max.clamp(lo, DMX_MAX);
    Ok(raw.clamp(lo, hi))
}

/// One quantized sample.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DmxPoint {
    pub t_ms: f64,
    pub value: u8,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DmxValues {
    Static(u8),
    Points(Vec<DmxPoint>),
}

/// A segment in hardware units, ready for a sequencer exporter.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DmxSegment {
    pub fixture_id: String,
    pub channel: Channel,
    pub t0_ms: f64,
    pub t1_ms: f64,
    pub layer: i32,
    pub is_transition: bool,
    pub values: DmxValues,
}

/// Quantize one segment. Runs of equal bytes keep only their first and last point.
pub fn to_dmx_segment(segment: &FixtureSegment) -> ChoreoResult<DmxSegment> {
    let values = match &segment.body {
        SegmentBody::Static(v) => DmxValues::Static(dmx_byte(dmx_value(segment, *v)?)),
        SegmentBody::Curve(c) => {
            let len = segment.t1_ms - segment.t0_ms;
            let samples = c
                .points()
                .iter()
                .map(|p| {
                    Ok(DmxPoint {
                        t_ms: segment.t0_ms + p.t * len,
                        value: dmx_byte(dmx_value(segment, p.v)?),
                    })
                })
                .collect::<ChoreoResult<Vec<_>>>()?;
            let mut points = Vec::with_capacity(samples.len());
            for (i, p) in samples.iter().enumerate() {
                let prev = i.checked_sub(1).map(|j| samples[j].value);
                let next = samples.get(i + 1).map(|n| n.value);
                if prev != Some(p.value) || next != Some(p.value) {
                    points.push(*p);
                }
            }
            let flat = points.len() <= 2 && points.iter().all(|p| p.value == points[0].value);
            if flat {
                DmxValues::Static(points[0].value)
            } else {
                DmxValues::Points(points)
            }
        }
    };
    Ok(DmxSegment {
        fixture_id: segment.fixture_id.clone(),
        channel: segment.channel,
        t0_ms: segment.t0_ms,
        t1_ms: segment.t1_ms,
        layer: segment.layer,
        is_transition: segment.is_transition,
        values,
    })
}

/// Quantize every segment, keeping input order.
#[tracing::instrument(skip(segments), fields(count = segments.len()))]
pub fn export(segments: &[FixtureSegment]) -> ChoreoResult<Vec<DmxSegment>> {
    segments.iter().map(to_dmx_segment).collect()
}

fn covering<'a>(
    segments: &'a [FixtureSegment],
    fixture_id: &str,
    channel: Channel,
    t_ms: f64,
) -> Option<&'a FixtureSegment> {
    segments
        .iter()
        .filter(|s| s.fixture_id == fixture_id && s.channel == channel && s.range().contains(t_ms))
        .max_by(|a, b| a.layer.cmp(&b.layer).then(a.t0_ms.total_cmp(&b.t0_ms)))
}

/// Effective DMX value (unrounded) at `t_ms`.
///
/// The highest layer covering the time wins; among equal layers the latest
/// starting segment wins. `None` when nothing covers the time.
pub fn resolve_at(
    segments: &[FixtureSegment],
    fixture_id: &str,
    channel: Channel,
    t_ms: f64,
) -> ChoreoResult<Option<f64>> {
    covering(segments, fixture_id, channel, t_ms)
        .map(|s| dmx_value(s, s.value_at(t_ms)))
        .transpose()
}

/// Like [`resolve_at`], but outside all segments the nearest segment edge is held.
pub(crate) fn held_value_at(
    segments: &[FixtureSegment],
    fixture_id: &str,
    channel: Channel,
    t_ms: f64,
) -> ChoreoResult<Option<f64>> {
    if let Some(s) = covering(segments, fixture_id, channel, t_ms) {
        return dmx_value(s, s.value_at(t_ms)).map(Some);
    }
    let own = || {
        segments
            .iter()
            .filter(|s| s.fixture_id == fixture_id && s.channel == channel)
    };
    if let Some(before) = own()
        .filter(|s| s.t1_ms <= t_ms)
        .max_by(|a, b| a.t1_ms.total_cmp(&b.t1_ms).then(a.layer.cmp(&b.layer)))
    {
        return dmx_value(before, before.end_value()).map(Some);
    }
    own()
        .filter(|s| s.t0_ms >= t_ms)
        .min_by(|a, b| a.t0_ms.total_cmp(&b.t0_ms).then(b.layer.cmp(&a.layer)))
        .map(|after| dmx_value(after, after.start_value()))
        .transpose()
}

#[cfg(test)]
#[path = "../../tests/unit/dmx/convert.rs"]
mod tests;
