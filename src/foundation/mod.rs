/// Time ranges, channels and DMX helpers.
pub mod core;
/// Error taxonomy.
pub mod error;
pub(crate) mod math;
