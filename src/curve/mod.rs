//! Normalized `(t, v)` curves and the operations the compiler builds on.

/// Point curves, sampling grids, interpolation, phase shift, composition.
pub mod points;
/// Curve semantics: tags, centering, loop-readiness.
pub mod semantic;
/// Douglas–Peucker simplification.
pub mod simplify;
