/// Bar-to-millisecond mapping.
pub mod tempo;
