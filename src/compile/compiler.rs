use std::{borrow::Cow, collections::BTreeMap};

use rayon::prelude::*;

use crate::{
    compile::{
        fingerprint::{IrFingerprint, fingerprint_segments},
        fixture::{FixtureJob, compile_fixture},
        ir::{FixtureSegment, SegmentSource, sort_segments},
        options::CompileOptions,
    },
    dmx::convert::{DmxSegment, export},
    foundation::{
        core::TimeRange,
        error::{ChoreoError, ChoreoResult, ConfigLocation},
    },
    motion::phase::compute_ordered,
    rig::calibration::RigCalibration,
    schedule::repeat::{BarSpan, schedule},
    template::{
        model::{ResolvedTemplate, Template},
        preset::Preset,
    },
    timing::tempo::{BarClock, TempoMap},
    transition::{
        blend::compile_transition,
        plan::{Boundary, detect_boundaries, plan_transition},
    },
};

/// A physical fixture bound to one of the template roles.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FixtureAssignment {
    pub fixture_id: String,
    pub role: String,
}

/// Caller-supplied collaborators. Nothing here is mutated.
#[derive(Clone, Copy)]
pub struct CompileContext<'a> {
    pub clock: &'a dyn BarClock,
    pub fixtures: &'a [FixtureAssignment], // stage left to stage right
    pub rig: &'a RigCalibration,
}

/// A template played over a bar window, optionally patched by a preset.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    pub template: Template,
    #[serde(default)]
    pub preset: Option<Preset>,
    pub start_bar: f64,
    pub end_bar: f64,
}

/// Show file read by the CLI.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShowDocument {
    pub tempo: TempoMap,
    pub fixtures: Vec<FixtureAssignment>,
    pub placements: Vec<Placement>,
}

impl ShowDocument {
    pub fn validate(&self) -> ChoreoResult<()> {
        self.tempo.validate()?;
        if self.fixtures.is_empty() {
            return Err(ChoreoError::validation("show needs at least one fixture"));
        }
        let mut seen = std::collections::BTreeSet::new();
        for f in &self.fixtures {
            if !seen.insert(f.fixture_id.as_str()) {
                return Err(ChoreoError::validation(format!(
                    "fixture '{}' is assigned twice",
                    f.fixture_id
                )));
            }
        }
        if self.placements.is_empty() {
            return Err(ChoreoError::validation("show needs at least one placement"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CompiledTemplate {
    pub template_id: String,
    pub range: TimeRange,
    pub segments: Vec<FixtureSegment>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ShowRegion {
    pub template_id: String,
    pub range: TimeRange,
}

/// Compiled show: base segments plus transition overlays, sorted.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ShowIr {
    pub regions: Vec<ShowRegion>,
    pub boundaries: Vec<Boundary>,
    pub segments: Vec<FixtureSegment>,
}

impl ShowIr {
    pub fn fingerprint(&self) -> IrFingerprint {
        fingerprint_segments(&self.segments)
    }

    pub fn to_dmx(&self) -> ChoreoResult<Vec<DmxSegment>> {
        export(&self.segments)
    }
}

#[derive(Clone, Debug)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> ChoreoResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile one template over `window`.
    ///
    /// The template is never modified; a preset patches a private copy.
    #[tracing::instrument(skip(self, ctx, template, preset), fields(template = %template.id))]
    pub fn compile_template(
        &self,
        ctx: &CompileContext<'_>,
        template: &Template,
        preset: Option<&Preset>,
        window: BarSpan,
    ) -> ChoreoResult<CompiledTemplate> {
        ctx.rig.validate()?;
        let patched = match preset {
            Some(p) => Cow::Owned(p.apply(template)?),
            None => Cow::Borrowed(template),
        };
        let resolved = patched.resolve()?;
        let fixtures = spatial_order(&resolved, ctx.fixtures)?;

        let slots: Vec<_> = resolved.steps.iter().map(|s| s.slot.clone()).collect();
        let instances = schedule(&resolved.repeat, &slots, window, ctx.clock)?;
        tracing::debug!(instances = instances.len(), "scheduled");

        // Phase per step, keyed by fixture id.
        let ids: Vec<&str> = fixtures.iter().map(|f| f.fixture_id.as_str()).collect();
        let mut phases = Vec::with_capacity(resolved.steps.len());
        for step in &resolved.steps {
            let loops = resolved.repeat.repeatable && step.slot.loops;
            let (offsets, wrap) = match &step.phase {
                Some(spec) => {
                    let wrap = spec.wrap.unwrap_or(loops);
                    let offsets = compute_ordered(&ids, spec, wrap).map_err(|e| {
                        e.in_step(step.id()).in_template(&resolved.id)
                    })?;
                    (offsets.into_iter().collect::<BTreeMap<_, _>>(), wrap)
                }
                None => (BTreeMap::new(), loops),
            };
            phases.push((offsets, wrap));
        }

        let mut jobs = Vec::with_capacity(instances.len() * fixtures.len());
        for instance in &instances {
            let si = step_index(&resolved, &instance.step_id)?;
            let (offsets, wrap) = &phases[si];
            for f in &fixtures {
                jobs.push(FixtureJob {
                    template: &resolved,
                    step: &resolved.steps[si],
                    instance,
                    fixture_id: &f.fixture_id,
                    role: &f.role,
                    phase: offsets.get(&f.fixture_id).copied().unwrap_or(0.0),
                    wrap: *wrap,
                    rig: ctx.rig,
                    clock: ctx.clock,
                    options: &self.options,
                });
            }
        }

        let results: Vec<ChoreoResult<Vec<FixtureSegment>>> = if self.options.parallel {
            let pool = build_thread_pool(self.options.threads)?;
            pool.install(|| jobs.par_iter().map(compile_fixture).collect())
        } else {
            jobs.iter().map(compile_fixture).collect()
        };

        let mut segments = Vec::new();
        for (job, r) in jobs.iter().zip(results) {
            let segs = r.map_err(|e| e.in_step(job.step.id()).in_template(&resolved.id))?;
            segments.extend(segs);
        }
        sort_segments(&mut segments);

        let range = TimeRange::new(
            ctx.clock.bar_to_ms(window.start_bar),
            ctx.clock.bar_to_ms(window.end_bar),
        )?;
        Ok(CompiledTemplate {
            template_id: resolved.id,
            range,
            segments,
        })
    }

    /// Compile placements in order, then blend every exact boundary.
    #[tracing::instrument(skip(self, ctx, placements), fields(placements = placements.len()))]
    pub fn compile_show(
        &self,
        ctx: &CompileContext<'_>,
        placements: &[Placement],
    ) -> ChoreoResult<ShowIr> {
        let compiled = placements
            .iter()
            .map(|p| {
                self.compile_template(
                    ctx,
                    &p.template,
                    p.preset.as_ref(),
                    BarSpan {
                        start_bar: p.start_bar,
                        end_bar: p.end_bar,
                    },
                )
            })
            .collect::<ChoreoResult<Vec<_>>>()?;

        let ranges: Vec<TimeRange> = compiled.iter().map(|c| c.range).collect();
        let boundaries = detect_boundaries(&ranges);
        tracing::debug!(boundaries = boundaries.len(), "detected boundaries");

        let mut segments: Vec<FixtureSegment> = Vec::new();
        for b in &boundaries {
            let (l, r) = (&compiled[b.left], &compiled[b.right]);
            let Some(plan) = plan_transition(b, l.range, r.range, &self.options)? else {
                continue;
            };
            tracing::debug!(
                at_ms = b.t_ms,
                from = %l.template_id,
                to = %r.template_id,
                "planned transition"
            );
            let source = SegmentSource {
                template_id: format!("{}->{}", l.template_id, r.template_id),
                ..SegmentSource::default()
            };
            segments.extend(compile_transition(
                &plan,
                &l.segments,
                &r.segments,
                &source,
                &self.options,
            )?);
        }

        let regions = compiled
            .iter()
            .map(|c| ShowRegion {
                template_id: c.template_id.clone(),
                range: c.range,
            })
            .collect();
        for c in compiled {
            segments.extend(c.segments);
        }
        sort_segments(&mut segments);

        Ok(ShowIr {
            regions,
            boundaries,
            segments,
        })
    }
}

fn step_index(template: &ResolvedTemplate, step_id: &str) -> ChoreoResult<usize> {
    template
        .steps
        .iter()
        .position(|s| s.id() == step_id)
        .ok_or_else(|| {
            ChoreoError::validation(format!(
                "scheduled step '{step_id}' is not in template '{}'",
                template.id
            ))
        })
}

/// Assigned fixtures ordered by role position; fixtures sharing a role keep input order.
fn spatial_order<'a>(
    template: &ResolvedTemplate,
    fixtures: &'a [FixtureAssignment],
) -> ChoreoResult<Vec<&'a FixtureAssignment>> {
    let mut keyed = Vec::with_capacity(fixtures.len());
    for (i, f) in fixtures.iter().enumerate() {
        let Some(r) = template.roles.iter().position(|r| *r == f.role) else {
            return Err(ChoreoError::config(
                ConfigLocation::template(&template.id).field("fixtures"),
                format!(
                    "fixture '{}' has role '{}' which the template does not define",
                    f.fixture_id, f.role
                ),
            ));
        };
        keyed.push((r, i, f));
    }
    keyed.sort_by_key(|(r, i, _)| (*r, *i));
    Ok(keyed.into_iter().map(|(_, _, f)| f).collect())
}

fn build_thread_pool(threads: Option<usize>) -> ChoreoResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ChoreoError::validation(
            "compile threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ChoreoError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/compile/compiler.rs"]
mod tests;
