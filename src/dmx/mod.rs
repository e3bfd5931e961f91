//! Hardware units: semantic-driven DMX formulas, export segments and layer resolution.

/// DMX conversion and export.
pub mod convert;
