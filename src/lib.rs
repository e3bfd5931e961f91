//! Choreo compiles moving-head choreography templates into DMX-safe curves.
//!
//! A [`Template`] describes roles, steps and a repeat contract in musical time.
//! The [`Compiler`] resolves it against a [`RigCalibration`] and a [`BarClock`],
//! and emits [`FixtureSegment`]s:
//!
//! - movement curves as offsets around a base pose, clamped to the room the pose leaves
//! - dimmer curves as absolute levels between a fixture's floor and ceiling
//! - transition overlays wherever one placement ends exactly where the next begins
//!
//! Output is deterministic: the same inputs give byte-identical segments,
//! serial or parallel.
#![forbid(unsafe_code)]

pub mod animation;
pub mod compile;
pub mod curve;
pub mod dmx;
pub mod foundation;
pub mod geometry;
pub mod motion;
pub mod rig;
pub mod schedule;
pub mod template;
pub mod timing;
pub mod transition;

pub use crate::animation::ease::Ease;
pub use crate::compile::compiler::{
    CompileContext, CompiledTemplate, Compiler, FixtureAssignment, Placement, ShowDocument,
    ShowIr, ShowRegion,
};
pub use crate::compile::fingerprint::{IrFingerprint, fingerprint_segments};
pub use crate::compile::ir::{FixtureSegment, SegmentBody, SegmentSource};
pub use crate::compile::options::CompileOptions;
pub use crate::curve::points::{CurvePoint, PointsCurve, SampleBudget};
pub use crate::curve::semantic::{CurveSemantic, TaggedCurve};
pub use crate::dmx::convert::{DmxPoint, DmxSegment, DmxValues, dmx_value, export, resolve_at};
pub use crate::foundation::core::{Channel, ChannelKind, TimeRange};
pub use crate::foundation::error::{ChoreoError, ChoreoResult, ConfigLocation};
pub use crate::geometry::resolver::{BasePose, Formation, GeometrySpec};
pub use crate::motion::dimmer::DimmerPattern;
pub use crate::motion::intensity::Intensity;
pub use crate::motion::movement::MovementPattern;
pub use crate::motion::phase::{Distribution, PhaseOrder, PhaseSpec};
pub use crate::rig::calibration::{FixtureCalibration, RigCalibration, TiltDirection};
pub use crate::schedule::repeat::{
    BarSpan, Direction, RemainderPolicy, RepeatContract, RepeatMode, ScheduledInstance,
};
pub use crate::template::dsl::{StepBuilder, TemplateBuilder};
pub use crate::template::model::{DimmerSpec, MovementSpec, Step, Template, TemplateDefaults};
pub use crate::template::preset::Preset;
pub use crate::timing::tempo::{BarClock, TempoMap};
pub use crate::transition::blend::{BlendStrategy, CrossfadeCurve};
