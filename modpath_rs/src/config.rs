//! Configuration file support for modpath.
//!
//! Loads optional `.modpath/config.toml` from the directory holding the
//! compilation database. Every key is optional; missing keys keep defaults.
//!
//! ```toml
//! top = 15
//! project_root = "."
//!
//! [scan]
//! include_directive = "include"
//! define_directive = "define"
//! header_suffixes = ["h", "hpp"]
//!
//! [risk]
//! macro_per_define = 4
//! cycle_penalty = 30
//! macro_heavy_threshold = 8
//!
//! [plan]
//! p1_limit = 5
//! p2_limit = 5
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::analyzer::risk::RiskWeights;
use crate::analyzer::scan::ScanRules;
use crate::migration_plan::PlanLimits;
use crate::types::DEFAULT_TOP;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModpathConfig {
    /// Number of top candidates in the report
    pub top: usize,
    /// Override for the inferred project root (relative to the database directory)
    pub project_root: Option<PathBuf>,
    pub scan: ScanRules,
    pub risk: RiskWeights,
    pub plan: PlanLimits,
}

impl Default for ModpathConfig {
    fn default() -> Self {
        Self {
            top: DEFAULT_TOP,
            project_root: None,
            scan: ScanRules::default(),
            risk: RiskWeights::default(),
            plan: PlanLimits::default(),
        }
    }
}

impl ModpathConfig {
    /// Load config from `.modpath/config.toml` in the given directory.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load(dir: &Path) -> Self {
        let config_path = dir.join(".modpath").join("config.toml");
        Self::load_from_path(&config_path)
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::debug!("loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
