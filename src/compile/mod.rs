//! Template compilation: options, per-fixture jobs, the orchestrator and its IR.

/// Orchestrator: template and show compilation.
pub mod compiler;
/// Stable IR digest.
pub mod fingerprint;
/// One fixture, one scheduled instance.
pub mod fixture;
/// `FixtureSegment` IR.
pub mod ir;
/// Compiler configuration.
pub mod options;
