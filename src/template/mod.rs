//! Template documents, presets and the builder DSL.

/// Builder DSL for templates in code.
pub mod dsl;
/// Template document and its resolved form.
pub mod model;
/// Named patches over template defaults.
pub mod preset;
