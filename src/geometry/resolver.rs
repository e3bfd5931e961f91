use std::collections::BTreeMap;

use crate::{
    foundation::error::{ChoreoError, ChoreoResult, ConfigLocation},
    rig::calibration::RigCalibration,
};

/// Normalized resting pose of one fixture. Movement curves are offsets from it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BasePose {
    /// Normalized pan in `[0, 1]`.
    pub pan: f64,
    /// Normalized tilt in `[0, 1]`.
    pub tilt: f64,
}

impl BasePose {
    /// Pose clamped to the unit square.
    pub fn new(pan: f64, tilt: f64) -> Self {
        Self {
            pan: pan.clamp(0.0, 1.0),
            tilt: tilt.clamp(0.0, 1.0),
        }
    }
}

/// Formation reference as written in a template: a type name plus free-form params.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeometrySpec {
    /// Formation identifier (`chevron`, `fan`, `role_pose`, `aim_zone`).
    pub formation: String,
    /// Formation-specific parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl GeometrySpec {
    /// Spec with the given formation and parameters.
    pub fn new(formation: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            formation: formation.into(),
            params,
        }
    }
}

/// V-shape around a pan center.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChevronParams {
    /// Pan of the innermost fixtures.
    pub pan_center: f64,
    /// Pan distance from the center to the widest fixtures.
    pub pan_spread: f64,
    /// Shared base tilt.
    pub tilt: f64,
    /// Roles treated as inner. Empty means "the half closer to the center".
    pub inner_roles: Vec<String>,
    /// Tilt added to inner roles, in "beam up" direction.
    pub inner_tilt_bias: f64,
    /// Tilt added to outer roles, in "beam up" direction.
    pub outer_tilt_bias: f64,
}

impl Default for ChevronParams {
    fn default() -> Self {
        Self {
            pan_center: 0.5,
            pan_spread: 0.3,
            tilt: 0.5,
            inner_roles: Vec::new(),
            inner_tilt_bias: 0.0,
            outer_tilt_bias: 0.0,
        }
    }
}

/// Fixtures spread evenly across a pan range.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FanParams {
    /// Pan of the first role.
    pub pan_start: f64,
    /// Pan of the last role.
    pub pan_end: f64,
    /// Shared base tilt.
    pub tilt: f64,
}

impl Default for FanParams {
    fn default() -> Self {
        Self {
            pan_start: 0.2,
            pan_end: 0.8,
            tilt: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RolePoseParams {
    poses: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct AimZoneParams {
    zone: String,
}

/// Parsed formation.
#[derive(Clone, Debug, PartialEq)]
pub enum Formation {
    /// Left/right halves fanning out from a center.
    Chevron(ChevronParams),
    /// Linear fan.
    Fan(FanParams),
    /// Each role points at a named rig anchor.
    RolePose {
        /// Role to anchor name.
        poses: BTreeMap<String, String>,
    },
    /// Every role points at one named aim zone.
    AimZone {
        /// Zone name in the rig calibration.
        zone: String,
    },
}

fn geometry_error(field: &str, msg: impl Into<String>) -> ChoreoError {
    ChoreoError::config(ConfigLocation::default().field(field), msg)
}

fn params_as<T: serde::de::DeserializeOwned + Default>(
    params: &serde_json::Value,
    formation: &str,
) -> ChoreoResult<T> {
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params.clone())
        .map_err(|e| geometry_error("geometry.params", format!("{formation} params: {e}")))
}

fn check_norm(v: f64, field: &str) -> ChoreoResult<()> {
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err(geometry_error(
            field,
            format!("must be finite and in [0, 1], got {v}"),
        ));
    }
    Ok(())
}

fn check_roles<'a>(
    names: impl IntoIterator<Item = &'a String>,
    roles: &[String],
    field: &str,
) -> ChoreoResult<()> {
    for name in names {
        if !roles.iter().any(|r| r == name) {
            return Err(geometry_error(field, format!("unknown role '{name}'")));
        }
    }
    Ok(())
}

/// Parse a [`GeometrySpec`] against the template's ordered role list.
pub fn parse_formation(spec: &GeometrySpec, roles: &[String]) -> ChoreoResult<Formation> {
    let kind = spec.formation.trim().to_ascii_lowercase();
    match kind.as_str() {
        "chevron" | "v" => {
            let p: ChevronParams = params_as(&spec.params, "chevron")?;
            check_norm(p.pan_center, "geometry.params.pan_center")?;
            check_norm(p.tilt, "geometry.params.tilt")?;
            if !p.pan_spread.is_finite() || p.pan_spread.abs() > 1.0 {
                return Err(geometry_error(
                    "geometry.params.pan_spread",
                    "must be finite and within [-1, 1]",
                ));
            }
            for (v, f) in [
                (p.inner_tilt_bias, "geometry.params.inner_tilt_bias"),
                (p.outer_tilt_bias, "geometry.params.outer_tilt_bias"),
            ] {
                if !v.is_finite() || v.abs() > 1.0 {
                    return Err(geometry_error(f, "must be finite and within [-1, 1]"));
                }
            }
            check_roles(&p.inner_roles, roles, "geometry.params.inner_roles")?;
            Ok(Formation::Chevron(p))
        }
        "fan" | "line" => {
            let p: FanParams = params_as(&spec.params, "fan")?;
            check_norm(p.pan_start, "geometry.params.pan_start")?;
            check_norm(p.pan_end, "geometry.params.pan_end")?;
            check_norm(p.tilt, "geometry.params.tilt")?;
            Ok(Formation::Fan(p))
        }
        "role_pose" | "rolepose" | "poses" => {
            if spec.params.is_null() {
                return Err(geometry_error(
                    "geometry.params.poses",
                    "role_pose needs a poses map",
                ));
            }
            let p: RolePoseParams = serde_json::from_value(spec.params.clone()).map_err(|e| {
                geometry_error("geometry.params", format!("role_pose params: {e}"))
            })?;
            check_roles(p.poses.keys(), roles, "geometry.params.poses")?;
            Ok(Formation::RolePose { poses: p.poses })
        }
        "aim_zone" | "aimzone" | "aim" => {
            if spec.params.is_null() {
                return Err(geometry_error(
                    "geometry.params.zone",
                    "aim_zone needs a zone name",
                ));
            }
            let p: AimZoneParams = serde_json::from_value(spec.params.clone()).map_err(|e| {
                geometry_error("geometry.params", format!("aim_zone params: {e}"))
            })?;
            Ok(Formation::AimZone { zone: p.zone })
        }
        "" => Err(geometry_error(
            "geometry.formation",
            "formation type must be non-empty",
        )),
        other => Err(geometry_error(
            "geometry.formation",
            format!("unknown formation type '{other}'"),
        )),
    }
}

/// Fractional position inside a group of `n`: `i / (n - 1)`, `0` for a single member.
fn fraction(i: usize, n: usize) -> f64 {
    if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 }
}

/// Resolve the base pose of `role` under `formation`.
///
/// `roles` is the template's ordered role list (stage left to stage right).
pub fn resolve(
    role: &str,
    roles: &[String],
    formation: &Formation,
    rig: &RigCalibration,
) -> ChoreoResult<BasePose> {
    let Some(index) = roles.iter().position(|r| r == role) else {
        return Err(geometry_error(
            "roles",
            format!("role '{role}' is not part of the formation's role set"),
        ));
    };
    let n = roles.len();

    match formation {
        Formation::Chevron(p) => {
            let half = n / 2;
            // Distance from the center measured in the role's own half; an odd
            // middle role sits on the center.
            let (pan, frac) = if index < half {
                let f = fraction(half - 1 - index, half);
                (p.pan_center - p.pan_spread * f, f)
            } else if index >= n - half {
                let f = fraction(index - (n - half), half);
                (p.pan_center + p.pan_spread * f, f)
            } else {
                (p.pan_center, 0.0)
            };
            let inner = if p.inner_roles.is_empty() {
                frac < 0.5
            } else {
                p.inner_roles.iter().any(|r| r == role)
            };
            let bias = if inner {
                p.inner_tilt_bias
            } else {
                p.outer_tilt_bias
            };
            Ok(BasePose::new(pan, p.tilt + bias * rig.tilt_up.sign()))
        }
        Formation::Fan(p) => {
            let f = fraction(index, n);
            Ok(BasePose::new(
                p.pan_start + (p.pan_end - p.pan_start) * f,
                p.tilt,
            ))
        }
        Formation::RolePose { poses } => {
            let anchor_name = poses.get(role).ok_or_else(|| {
                geometry_error(
                    "geometry.params.poses",
                    format!("no pose anchor for role '{role}'"),
                )
            })?;
            let a = rig.pose_anchors.get(anchor_name).ok_or_else(|| {
                geometry_error(
                    "geometry.params.poses",
                    format!("unknown pose anchor '{anchor_name}'"),
                )
            })?;
            Ok(BasePose::new(a.pan, a.tilt))
        }
        Formation::AimZone { zone } => {
            let a = rig.aim_zones.get(zone).ok_or_else(|| {
                geometry_error("geometry.params.zone", format!("unknown aim zone '{zone}'"))
            })?;
            Ok(BasePose::new(a.pan, a.tilt))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/resolver.rs"]
mod tests;
