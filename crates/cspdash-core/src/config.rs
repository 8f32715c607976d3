#![forbid(unsafe_code)]

//! Dashboard configuration.
//!
//! Every field has a default, so an empty file is a valid configuration.
//!
//! ```toml
//! default_scenario = "matrix"
//! default_speed = "fast"
//! log_capacity = 200
//! log_filter = "cspdash=debug"
//!
//! [tutor]
//! fallback_message = "offline"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_SCENARIO;
use crate::engine::{EngineConfig, Speed};
use crate::error::{DashError, Result};
use crate::scenario::ScenarioKind;
use crate::tutor::TutorConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Scenario key loaded when none is requested.
    pub default_scenario: String,
    pub default_speed: Speed,
    /// Playback diagnostic entries retained per engine; zero disables the log.
    pub log_capacity: usize,
    /// `EnvFilter` directive used when neither the CLI nor `RUST_LOG` sets one.
    pub log_filter: String,
    pub tutor: TutorConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_scenario: DEFAULT_SCENARIO.key().to_owned(),
            default_speed: Speed::default(),
            log_capacity: EngineConfig::default().log_capacity,
            log_filter: "info".to_owned(),
            tutor: TutorConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load by extension: `.json` as JSON, anything else as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DashError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Human-readable problems; empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if ScenarioKind::from_key(&self.default_scenario).is_none() {
            problems.push(format!(
                "default_scenario '{}' is not a known scenario",
                self.default_scenario
            ));
        }
        if self.log_filter.trim().is_empty() {
            problems.push("log_filter must not be empty".to_owned());
        }
        problems
    }

    pub fn validated(self) -> Result<Self> {
        let problems = self.validate();
        if problems.is_empty() {
            Ok(self)
        } else {
            Err(DashError::InvalidConfig { problems })
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            speed: self.default_speed,
            log_capacity: self.log_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.default_scenario, "binary_search");
        assert_eq!(config.default_speed, Speed::Normal);
        assert_eq!(config.engine_config().log_capacity, 500);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        assert_eq!(
            DashboardConfig::from_toml_str("").unwrap(),
            DashboardConfig::default()
        );
    }

    #[test]
    fn toml_overrides_fields() {
        let config = DashboardConfig::from_toml_str(
            r#"
            default_scenario = "matrix"
            default_speed = "fast"
            log_capacity = 10

            [tutor]
            fallback_message = "offline"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_scenario, "matrix");
        assert_eq!(config.default_speed, Speed::Fast);
        assert_eq!(config.tutor.fallback_message, "offline");
        assert_eq!(config.tutor.greeting, TutorConfig::default().greeting);
    }

    #[test]
    fn unknown_speed_is_a_parse_error() {
        let err = DashboardConfig::from_toml_str("default_speed = \"warp\"").unwrap_err();
        assert!(matches!(err, DashError::Toml(_)));
    }

    #[test]
    fn validate_collects_every_problem() {
        let config = DashboardConfig {
            default_scenario: "heap".into(),
            log_filter: " ".into(),
            ..DashboardConfig::default()
        };
        let problems = config.validate();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("heap"));
        assert!(problems[1].contains("log_filter"));

        let err = config.validated().unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn zero_log_capacity_disables_diagnostics() {
        let config = DashboardConfig::from_toml_str("log_capacity = 0")
            .unwrap()
            .validated()
            .unwrap();
        assert_eq!(config.engine_config().log_capacity, 0);
    }

    #[test]
    fn loads_toml_and_json_files() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("cspdash.toml");
        let mut file = std::fs::File::create(&toml_path).unwrap();
        writeln!(file, "default_scenario = \"graph\"").unwrap();
        assert_eq!(
            DashboardConfig::from_file(&toml_path).unwrap().default_scenario,
            "graph"
        );

        let json_path = dir.path().join("cspdash.json");
        std::fs::write(&json_path, r#"{"default_speed": "slow"}"#).unwrap();
        assert_eq!(
            DashboardConfig::from_file(&json_path).unwrap().default_speed,
            Speed::Slow
        );
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = DashboardConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
