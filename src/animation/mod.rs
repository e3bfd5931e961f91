/// Easing curves for transitions and fades.
pub mod ease;
