use std::fmt;

/// Convenience result type used across choreo.
pub type ChoreoResult<T> = Result<T, ChoreoError>;

/// Where in a template document a configuration error was found.
///
/// Every part is optional; the orchestrator fills in as much as it knows at the
/// point of resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigLocation {
    /// Template identifier.
    pub template: Option<String>,
    /// Step identifier inside the template.
    pub step: Option<String>,
    /// Offending field name (dotted path).
    pub field: Option<String>,
}

impl ConfigLocation {
    /// Location scoped to a template.
    pub fn template(id: impl Into<String>) -> Self {
        Self {
            template: Some(id.into()),
            ..Self::default()
        }
    }

    /// Narrow this location to a step.
    pub fn step(mut self, id: impl Into<String>) -> Self {
        self.step = Some(id.into());
        self
    }

    /// Narrow this location to a field.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.field = Some(name.into());
        self
    }
}

impl fmt::Display for ConfigLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        for (label, value) in [
            ("template", &self.template),
            ("step", &self.step),
            ("field", &self.field),
        ] {
            if let Some(v) = value {
                if wrote {
                    f.write_str(" ")?;
                }
                write!(f, "{label} '{v}'")?;
                wrote = true;
            }
        }
        if !wrote {
            f.write_str("<unknown>")?;
        }
        Ok(())
    }
}

/// Top-level error taxonomy used by compiler APIs.
#[derive(thiserror::Error, Debug)]
pub enum ChoreoError {
    /// Unknown role/formation/pattern, bad loop step, bad cycle or clamp range.
    #[error("configuration error at {location}: {message}")]
    Config {
        /// Template/step/field that failed to resolve.
        location: ConfigLocation,
        /// Human readable description.
        message: String,
    },

    /// Guard failures in the numeric primitives (empty curves, `n < 2`, bad inputs).
    #[error("numeric error: {0}")]
    Numeric(String),

    /// Invalid documents not tied to a template location (shows, options, rigs).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChoreoError {
    /// Build a [`ChoreoError::Config`] value.
    pub fn config(location: ConfigLocation, msg: impl Into<String>) -> Self {
        Self::Config {
            location,
            message: msg.into(),
        }
    }

    /// Build a [`ChoreoError::Numeric`] value.
    pub fn numeric(msg: impl Into<String>) -> Self {
        Self::Numeric(msg.into())
    }

    /// Build a [`ChoreoError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ChoreoError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Attach a template id to a configuration error that does not carry one yet.
    pub fn in_template(self, template_id: &str) -> Self {
        match self {
            Self::Config {
                mut location,
                message,
            } => {
                if location.template.is_none() {
                    location.template = Some(template_id.to_string());
                }
                Self::Config { location, message }
            }
            other => other,
        }
    }

    /// Attach a step id to a configuration error that does not carry one yet.
    pub fn in_step(self, step_id: &str) -> Self {
        match self {
            Self::Config {
                mut location,
                message,
            } => {
                if location.step.is_none() {
                    location.step = Some(step_id.to_string());
                }
                Self::Config { location, message }
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for ChoreoError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
