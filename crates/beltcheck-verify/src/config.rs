use serde::{Deserialize, Serialize};

use crate::error::VerifyError;

/// Tunables for a verification run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Producer ids always reported, even with zero insertions.
    pub roster: Vec<u64>,
    /// When `true`, a removal naming an undeclared truck declares it on the
    /// spot instead of failing the run.
    pub tolerate_undeclared: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            roster: vec![1, 2, 3],
            tolerate_undeclared: false,
        }
    }
}

impl VerifyConfig {
    /// Parse a TOML configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self, VerifyError> {
        toml::from_str(text).map_err(|e| VerifyError::Config(e.to_string()))
    }
}
