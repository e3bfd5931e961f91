use crate::{
    compile::{
        ir::{FixtureSegment, SegmentBody, SegmentSource},
        options::CompileOptions,
    },
    curve::{
        points::{CurvePoint, PointsCurve, crop, phase_shift},
        semantic::ensure_loop_ready,
        simplify::simplify_rdp,
    },
    foundation::{
        core::{Channel, TimeRange},
        error::ChoreoResult,
        math::stable_seed,
    },
    geometry::resolver::resolve,
    motion::{
        dimmer::{self, DimmerBody, DimmerRequest},
        movement::{self, MovementPattern, MovementRequest},
    },
    rig::calibration::RigCalibration,
    schedule::repeat::{Direction, InstanceKind, ScheduledInstance},
    template::model::{ResolvedStep, ResolvedTemplate},
    timing::tempo::BarClock,
};

/// Everything needed to compile one fixture for one scheduled instance.
pub struct FixtureJob<'a> {
    pub template: &'a ResolvedTemplate,
    pub step: &'a ResolvedStep,
    pub instance: &'a ScheduledInstance,
    pub fixture_id: &'a str,
    pub role: &'a str,
    /// Phase lag in pattern cycles.
    pub phase: f64,
    /// Wrap the phase shift around the curve instead of clamping.
    pub wrap: bool,
    pub rig: &'a RigCalibration,
    pub clock: &'a dyn BarClock,
    pub options: &'a CompileOptions,
}

impl FixtureJob<'_> {
    /// Bars in one pattern cycle: the movement's, or the dimmer's when the head holds.
    fn cycle_bars(&self) -> f64 {
        if self.step.movement.pattern == MovementPattern::Hold {
            self.step.dimmer.period_bars
        } else {
            self.step.movement.period_bars
        }
    }

    /// Phase lag as a fraction of the instance curve. Every channel shifts by this.
    fn lag(&self) -> f64 {
        let bars = self.instance.source.bars();
        if self.phase == 0.0 || bars <= 0.0 {
            return 0.0;
        }
        self.phase * self.cycle_bars() / bars
    }

    /// Phase, direction and loop closure, in that order.
    fn shape(&self, curve: &PointsCurve) -> ChoreoResult<PointsCurve> {
        let lag = self.lag();
        let mut c = if lag != 0.0 {
            phase_shift(curve, -lag, curve.len(), self.wrap)?
        } else {
            curve.clone()
        };
        if self.instance.direction == Direction::Reverse {
            c = c.reversed();
        }
        if self.template.repeat.repeatable && self.step.slot.loops {
            c = ensure_loop_ready(&c)?;
        }
        Ok(c)
    }

    /// Shaped curve as it should play during the instance.
    fn body(&self, curve: &PointsCurve) -> ChoreoResult<SegmentBody> {
        let shaped = self.shape(curve)?;
        let played = match self.instance.kind {
            InstanceKind::Cycle => shaped,
            InstanceKind::Partial { fraction } => {
                crop(&shaped, 0.0, fraction.clamp(f64::EPSILON, 1.0), shaped.len())?
            }
            InstanceKind::Hold | InstanceKind::FadeOut => {
                return Ok(SegmentBody::Static(shaped.last().v));
            }
        };
        if played.is_flat() {
            return Ok(SegmentBody::Static(played.first().v));
        }
        let out = if self.options.simplify {
            simplify_rdp(&played, self.options.simplify_epsilon, 1.0, 1.0)?
        } else {
            played
        };
        Ok(SegmentBody::Curve(out))
    }
}

/// Requested floor/ceiling, limited by the fixture's calibrated ceiling.
fn dimmer_window(job: &FixtureJob<'_>, cal_floor: u8, cal_ceiling: u8) -> (u8, u8) {
    let dm = &job.step.dimmer;
    let want_floor = dm.floor_dmx.unwrap_or(cal_floor);
    let want_ceiling = dm.ceiling_dmx.unwrap_or(cal_ceiling);
    let ceiling = want_ceiling.min(cal_ceiling);
    let floor = want_floor.min(ceiling);
    if (floor, ceiling) != (want_floor, want_ceiling) {
        tracing::debug!(
            fixture = job.fixture_id,
            step = job.step.id(),
            want_floor,
            want_ceiling,
            floor,
            ceiling,
            "dimmer window clamped to calibration"
        );
    }
    (floor, ceiling)
}

fn fade_to_floor(from: f64) -> ChoreoResult<SegmentBody> {
    if from <= 0.0 {
        return Ok(SegmentBody::Static(0.0));
    }
    Ok(SegmentBody::Curve(PointsCurve::new(vec![
        CurvePoint::new(0.0, from),
        CurvePoint::new(1.0, 0.0),
    ])?))
}

/// Compile pan, tilt and dimmer segments of one fixture for one instance.
pub fn compile_fixture(job: &FixtureJob<'_>) -> ChoreoResult<Vec<FixtureSegment>> {
    let range = TimeRange::new(job.instance.start_ms, job.instance.end_ms)?;
    if range.is_empty() {
        return Ok(Vec::new());
    }
    let cal = job.rig.fixture(job.fixture_id)?;
    let pose = resolve(job.role, &job.template.roles, &job.step.formation, job.rig)?;
    let seed = stable_seed(
        job.template.seed,
        &[job.template.id.as_str(), job.step.id(), job.fixture_id],
    );
    let source_bars = job.instance.source.bars();

    let mv = &job.step.movement;
    let motion = movement::generate(&MovementRequest {
        pattern: mv.pattern,
        intensity: mv.intensity,
        pose,
        cycles: source_bars / mv.period_bars,
        seed,
        budget: job.options.budget(),
    })?;

    let dm = &job.step.dimmer;
    let (floor_dmx, ceiling_dmx) = dimmer_window(job, cal.dimmer_floor_dmx, cal.dimmer_ceiling_dmx);
    let dimmer_out = dimmer::generate(&DimmerRequest {
        pattern: dm.pattern,
        intensity: dm.intensity,
        level: dm.level,
        period_bars: dm.period_bars,
        start_bar: job.instance.source.start_bar,
        span_bars: source_bars,
        clock: job.clock,
        min_norm: dm.min_norm,
        max_norm: dm.max_norm,
        floor_dmx,
        ceiling_dmx,
        seed,
        budget: job.options.budget(),
    })?;

    let source = SegmentSource {
        template_id: job.template.id.clone(),
        step_id: Some(job.step.id().to_string()),
        cycle_index: Some(job.instance.cycle_index),
    };

    let mut out = Vec::with_capacity(3);
    for (channel, axis_motion, base_norm) in [
        (Channel::Pan, &motion.pan, pose.pan),
        (Channel::Tilt, &motion.tilt, pose.tilt),
    ] {
        let axis = cal.axis(channel);
        let body = match axis_motion {
            Some(m) => job.body(&m.curve.curve)?,
            None => SegmentBody::Static(0.5),
        };
        out.push(
            FixtureSegment::movement(
                job.fixture_id,
                channel,
                range,
                body,
                axis.base_dmx(base_norm),
                axis.amplitude_dmx(),
                axis.min_dmx,
                axis.max_dmx,
            )?
            .with_source(source.clone()),
        );
    }

    let dimmer_body = match (&dimmer_out.body, job.instance.kind) {
        (DimmerBody::Static(v), InstanceKind::FadeOut) => fade_to_floor(*v)?,
        (DimmerBody::Static(v), _) => SegmentBody::Static(*v),
        (DimmerBody::Curve(c), InstanceKind::FadeOut) => {
            fade_to_floor(job.shape(&c.curve)?.last().v)?
        }
        (DimmerBody::Curve(c), _) => job.body(&c.curve)?,
    };
    out.push(
        FixtureSegment::dimmer(
            job.fixture_id,
            range,
            dimmer_body,
            f64::from(dimmer_out.floor_dmx),
            f64::from(dimmer_out.ceiling_dmx),
        )?
        .with_source(source),
    );

    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/compile/fixture.rs"]
mod tests;
