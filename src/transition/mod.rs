//! Hand-offs between adjacent compiled templates.

/// Blend strategies and transition segment compilation.
pub mod blend;
/// Boundary detection and window planning.
pub mod plan;
