use std::collections::BTreeMap;

use crate::foundation::{
    core::Channel,
    error::{ChoreoError, ChoreoResult},
};

/// Read-only description of the physical rig.
///
/// Supplied by the caller; the compiler never mutates it.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct RigCalibration {
    /// Calibration keyed by fixture id.
    pub fixtures: BTreeMap<String, FixtureCalibration>,
    /// Named poses that templates may reference (role-pose formations).
    #[serde(default)]
    pub pose_anchors: BTreeMap<String, PoseAnchor>,
    /// Named aim zones (all fixtures point at one place).
    #[serde(default)]
    pub aim_zones: BTreeMap<String, PoseAnchor>,
    /// Which way increasing normalized tilt moves the beam.
    #[serde(default)]
    pub tilt_up: TiltDirection,
}

/// Normalized pan/tilt pair stored in the rig.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PoseAnchor {
    /// Normalized pan.
    pub pan: f64,
    /// Normalized tilt.
    pub tilt: f64,
}

/// Mounting-dependent tilt orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiltDirection {
    /// Higher normalized tilt raises the beam.
    #[default]
    Increasing,
    /// Higher normalized tilt lowers the beam (truss-hung fixtures).
    Decreasing,
}

impl TiltDirection {
    /// `+1` or `-1`, multiplied into "raise the beam" biases.
    pub fn sign(self) -> f64 {
        match self {
            Self::Increasing => 1.0,
            Self::Decreasing => -1.0,
        }
    }
}

/// DMX limits and defaults for one fixture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FixtureCalibration {
    /// Lowest usable pan value.
    #[serde(default)]
    pub pan_min_dmx: u8,
    /// Highest usable pan value.
    #[serde(default = "dmx_full")]
    pub pan_max_dmx: u8,
    /// Lowest usable tilt value.
    #[serde(default)]
    pub tilt_min_dmx: u8,
    /// Highest usable tilt value.
    #[serde(default = "dmx_full")]
    pub tilt_max_dmx: u8,
    /// Mirror the pan axis.
    #[serde(default)]
    pub invert_pan: bool,
    /// Mirror the tilt axis.
    #[serde(default)]
    pub invert_tilt: bool,
    /// Lowest dimmer value that reads as "on" for this fixture.
    #[serde(default)]
    pub dimmer_floor_dmx: u8,
    /// Highest dimmer value the fixture should be driven to.
    #[serde(default = "dmx_full")]
    pub dimmer_ceiling_dmx: u8,
}

fn dmx_full() -> u8 {
    255
}

impl Default for FixtureCalibration {
    fn default() -> Self {
        Self {
            pan_min_dmx: 0,
            pan_max_dmx: 255,
            tilt_min_dmx: 0,
            tilt_max_dmx: 255,
            invert_pan: false,
            invert_tilt: false,
            dimmer_floor_dmx: 0,
            dimmer_ceiling_dmx: 255,
        }
    }
}

/// Resolved DMX window of one channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisBounds {
    /// Lowest DMX value.
    pub min_dmx: f64,
    /// Highest DMX value.
    pub max_dmx: f64,
    /// Whether normalized 0 maps to `max_dmx`.
    pub inverted: bool,
}

impl AxisBounds {
    /// Width of the window in DMX units.
    pub fn span(self) -> f64 {
        self.max_dmx - self.min_dmx
    }

    /// DMX value of a normalized position.
    pub fn base_dmx(self, norm: f64) -> f64 {
        if self.inverted {
            self.max_dmx - norm * self.span()
        } else {
            self.min_dmx + norm * self.span()
        }
    }

    /// DMX units covered by a full normalized offset swing; negative when inverted.
    pub fn amplitude_dmx(self) -> f64 {
        if self.inverted {
            -self.span()
        } else {
            self.span()
        }
    }
}

impl FixtureCalibration {
    /// DMX window for a movement channel. Dimmer bounds come from floor/ceiling.
    pub fn axis(&self, channel: Channel) -> AxisBounds {
        match channel {
            Channel::Pan => AxisBounds {
                min_dmx: f64::from(self.pan_min_dmx),
                max_dmx: f64::from(self.pan_max_dmx),
                inverted: self.invert_pan,
            },
            Channel::Tilt => AxisBounds {
                min_dmx: f64::from(self.tilt_min_dmx),
                max_dmx: f64::from(self.tilt_max_dmx),
                inverted: self.invert_tilt,
            },
            Channel::Dimmer => AxisBounds {
                min_dmx: f64::from(self.dimmer_floor_dmx),
                max_dmx: f64::from(self.dimmer_ceiling_dmx),
                inverted: false,
            },
        }
    }

    fn validate(&self, id: &str) -> ChoreoResult<()> {
        if self.pan_max_dmx < self.pan_min_dmx {
            return Err(ChoreoError::validation(format!(
                "fixture '{id}' pan_max_dmx must be >= pan_min_dmx"
            )));
        }
        if self.tilt_max_dmx < self.tilt_min_dmx {
            return Err(ChoreoError::validation(format!(
                "fixture '{id}' tilt_max_dmx must be >= tilt_min_dmx"
            )));
        }
        if self.dimmer_ceiling_dmx < self.dimmer_floor_dmx {
            return Err(ChoreoError::validation(format!(
                "fixture '{id}' dimmer_ceiling_dmx must be >= dimmer_floor_dmx"
            )));
        }
        Ok(())
    }
}

impl RigCalibration {
    /// Validate every fixture and anchor.
    pub fn validate(&self) -> ChoreoResult<()> {
        for (id, cal) in &self.fixtures {
            cal.validate(id)?;
        }
        for (kind, table) in [("pose anchor", &self.pose_anchors), ("aim zone", &self.aim_zones)] {
            for (name, a) in table {
                let ok = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
                if !ok(a.pan) || !ok(a.tilt) {
                    return Err(ChoreoError::validation(format!(
                        "{kind} '{name}' pan/tilt must be finite and in [0, 1]"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Calibration for one fixture.
    pub fn fixture(&self, id: &str) -> ChoreoResult<&FixtureCalibration> {
        self.fixtures
            .get(id)
            .ok_or_else(|| ChoreoError::validation(format!("no calibration for fixture '{id}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rig/calibration.rs"]
mod tests;
