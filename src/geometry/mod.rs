//! Formations: where each role points before any movement is applied.

/// Formation parsing and base-pose resolution.
pub mod resolver;
