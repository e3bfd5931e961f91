/// Per-fixture hardware calibration.
pub mod calibration;
