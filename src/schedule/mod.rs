//! Cycle expansion of a template's steps over a placement window.

/// Repeat contract and the instance scheduler.
pub mod repeat;
