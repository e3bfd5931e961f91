//! Pattern generators: movement offsets, dimmer levels and per-fixture phase.

/// Dimmer pattern table and generator.
pub mod dimmer;
/// Shared intensity levels.
pub mod intensity;
/// Movement pattern table and generator.
pub mod movement;
/// Chase ordering and phase offsets.
pub mod phase;
