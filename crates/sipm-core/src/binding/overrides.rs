//! User overrides of parameter defaults, bounds and fixing.
//!
//! A JSON object keyed either by base name (`"lambda_"`, applied to every
//! illumination) or by expanded name (`"lambda_1"`):
//!
//! ```json
//! { "spe": { "default": 30.0, "upper": 45.0 }, "norm1": { "fixed": false } }
//! ```

use super::schema::FitParameter;
use crate::domain::SipmError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterOverride {
    #[serde(default)]
    pub default: Option<f64>,
    #[serde(default)]
    pub lower: Option<f64>,
    #[serde(default)]
    pub upper: Option<f64>,
    #[serde(default)]
    pub fixed: Option<bool>,
}

impl ParameterOverride {
    pub(crate) fn apply_to(&self, parameter: &mut FitParameter) {
        if let Some(default) = self.default {
            parameter.default = Some(default);
        }
        if let Some(lower) = self.lower {
            parameter.lower = lower;
        }
        if let Some(upper) = self.upper {
            parameter.upper = upper;
        }
        if let Some(fixed) = self.fixed {
            parameter.fixed = fixed;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterOverrides {
    entries: BTreeMap<String, ParameterOverride>,
}

impl ParameterOverrides {
    pub fn insert(&mut self, name: impl Into<String>, entry: ParameterOverride) {
        self.entries.insert(name.into(), entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &ParameterOverride)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OverrideError {
    #[error("failed to read parameter overrides '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse parameter overrides '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<OverrideError> for SipmError {
    fn from(error: OverrideError) -> Self {
        match error {
            OverrideError::Read { .. } => SipmError::io_system("IO.OVERRIDES", error.to_string()),
            OverrideError::Parse { .. } => {
                SipmError::input_validation("INPUT.OVERRIDES", error.to_string())
            }
        }
    }
}

pub fn parse_parameter_overrides(source: &str) -> Result<ParameterOverrides, serde_json::Error> {
    serde_json::from_str(source)
}

pub fn load_parameter_overrides(
    path: impl AsRef<Path>,
) -> Result<ParameterOverrides, OverrideError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| OverrideError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_parameter_overrides(&source).map_err(|source| OverrideError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
