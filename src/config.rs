// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh configuration

use crate::geometry::MeshError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning knobs shared by every mesh
///
/// `tolerance` is an absolute distance. It is never derived from the extent of the
/// geometry, so callers working at very large or very small scales should set it
/// explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Vertices closer than this are considered the same point
    pub tolerance: f64,
    /// Edge length of a vertex pool hash cell
    pub cell_size: f64,
    /// Run the full consistency check after every structural edit
    pub validate_edits: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-5,
            cell_size: 1e-3,
            validate_edits: cfg!(debug_assertions),
        }
    }
}

impl MeshConfig {
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: MeshConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), MeshError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(MeshError::Config(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(MeshError::Config(format!(
                "cell_size must be positive and finite, got {}",
                self.cell_size
            )));
        }
        Ok(())
    }
}
