//! # Settings Module
//!
//! ## Purpose
//! Configuration of the balancer: which null space strategies are tried and in what order,
//! whether exact rational arithmetic is available, and the numeric limits of the rationalizer.
//! Settings are chosen once at startup and handed to `EquationBalancer::new`; nothing is global.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "exact_arithmetic": true,
//!   "solver_chain": ["Rational", "Qr", "Svd"],
//!   "max_denominator": 1000,
//!   "approximation_tolerance": 1e-6,
//!   "rank_tolerance": 1e-10,
//!   "log_level": "info"
//! }
//! ```
//! Missing fields take their default values, a missing file means default settings.
//!
//! ## Usage
//! ```rust
//! use ChemBalance::settings::BalancerSettings;
//! use ChemBalance::Balancer::nullspace_solver::SolverKind;
//!
//! let mut settings = BalancerSettings::default();
//! settings.exact_arithmetic = false;
//! assert_eq!(settings.effective_chain(), vec![SolverKind::Qr, SolverKind::Svd]);
//! ```

use crate::Balancer::nullspace_solver::SolverKind;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// default name of the settings file
pub const DEFAULT_CONFIG_FILE: &str = "balancer_config.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error on settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerSettings {
    /// exact rational elimination is available; when false `Rational` is skipped in the chain
    pub exact_arithmetic: bool,
    /// strategies in the order they are tried
    pub solver_chain: Vec<SolverKind>,
    /// denominator cap of the float-to-rational approximation
    pub max_denominator: i64,
    /// accepted relative error of the float-to-rational approximation
    pub approximation_tolerance: f64,
    /// relative threshold below which singular values / R diagonal entries count as zero
    pub rank_tolerance: f64,
    pub log_level: String,
}

impl Default for BalancerSettings {
    fn default() -> Self {
        Self {
            exact_arithmetic: true,
            solver_chain: vec![SolverKind::Rational, SolverKind::Qr, SolverKind::Svd],
            max_denominator: 1000,
            approximation_tolerance: 1e-6,
            rank_tolerance: 1e-10,
            log_level: "info".to_string(),
        }
    }
}

impl BalancerSettings {
    /// Loads settings from a JSON file, default settings if the file does not exist
    pub fn load(path: &str) -> Result<Self, SettingsError> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_string(),
            source,
        })?;
        let settings: BalancerSettings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> Result<(), SettingsError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| SettingsError::Io {
            path: path.to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.effective_chain().is_empty() {
            return Err(SettingsError::Invalid(
                "no solver left in the chain".to_string(),
            ));
        }
        if self.max_denominator < 1 {
            return Err(SettingsError::Invalid(format!(
                "max_denominator must be >= 1, got {}",
                self.max_denominator
            )));
        }
        if !(self.approximation_tolerance > 0.0) || !(self.rank_tolerance > 0.0) {
            return Err(SettingsError::Invalid(
                "tolerances must be positive".to_string(),
            ));
        }
        self.level_filter()?;
        Ok(())
    }

    /// the chain with `Rational` removed when exact arithmetic is not available
    pub fn effective_chain(&self) -> Vec<SolverKind> {
        self.solver_chain
            .iter()
            .copied()
            .filter(|kind| self.exact_arithmetic || *kind != SolverKind::Rational)
            .collect()
    }

    pub fn level_filter(&self) -> Result<LevelFilter, SettingsError> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| SettingsError::Invalid(format!("unknown log level '{}'", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_settings() {
        let settings = BalancerSettings::default();
        assert!(settings.exact_arithmetic);
        assert_eq!(settings.max_denominator, 1000);
        assert_eq!(
            settings.effective_chain(),
            vec![SolverKind::Rational, SolverKind::Qr, SolverKind::Svd]
        );
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = BalancerSettings::load("no_such_balancer_config.json").unwrap();
        assert_eq!(settings, BalancerSettings::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"exact_arithmetic": false, "solver_chain": ["Svd", "Qr"], "log_level": "debug"}}"#
        )
        .unwrap();
        let settings = BalancerSettings::load(file.path().to_str().unwrap()).unwrap();
        assert!(!settings.exact_arithmetic);
        assert_eq!(settings.effective_chain(), vec![SolverKind::Svd, SolverKind::Qr]);
        assert_eq!(settings.max_denominator, 1000);
        assert_eq!(settings.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        let settings = BalancerSettings {
            max_denominator: 500,
            solver_chain: vec![SolverKind::Qr],
            ..Default::default()
        };
        settings.save(path).unwrap();
        assert_eq!(BalancerSettings::load(path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_settings() {
        let settings = BalancerSettings {
            exact_arithmetic: false,
            solver_chain: vec![SolverKind::Rational],
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        let settings = BalancerSettings {
            max_denominator: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = BalancerSettings {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            BalancerSettings::load(file.path().to_str().unwrap()),
            Err(SettingsError::Json(_))
        ));
    }
}
