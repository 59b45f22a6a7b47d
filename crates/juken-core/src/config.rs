//! juken configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{check_tolerance, ConfigError};
use crate::judge::{Feedback, JudgeOptions, DEFAULT_TOLERANCE};
use crate::normalize::ParseMode;

/// Top-level juken configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JukenConfig {
    /// Absolute tolerance for numeric answers.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Number parsing mode for text answers.
    #[serde(default)]
    pub parse_mode: ParseMode,
    /// Fraction of a problem's points awarded for a close answer.
    #[serde(default = "default_close_credit")]
    pub close_credit: f64,
    /// Max answer sheets loaded concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for grading reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Learner-facing messages.
    #[serde(default)]
    pub feedback: Feedback,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}
fn default_close_credit() -> f64 {
    0.5
}
fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./juken-results")
}

impl Default for JukenConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            parse_mode: ParseMode::default(),
            close_credit: default_close_credit(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
            feedback: Feedback::default(),
        }
    }
}

impl JukenConfig {
    /// Reject settings that would make grading meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_tolerance(self.tolerance)?;
        if !(0.0..=1.0).contains(&self.close_credit) {
            return Err(ConfigError::InvalidCloseCredit(self.close_credit));
        }
        if self.parallelism == 0 {
            return Err(ConfigError::InvalidParallelism);
        }
        Ok(())
    }

    /// Judge options derived from this configuration.
    pub fn judge_options(&self) -> JudgeOptions {
        JudgeOptions::default()
            .with_tolerance(self.tolerance)
            .with_parse_mode(self.parse_mode)
            .with_feedback(self.feedback.clone())
    }

    /// Apply `JUKEN_TOLERANCE` and `JUKEN_PARSE_MODE` overrides.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("JUKEN_TOLERANCE") {
            self.tolerance = value
                .trim()
                .parse::<f64>()
                .with_context(|| format!("invalid JUKEN_TOLERANCE: '{value}'"))?;
        }
        if let Ok(value) = std::env::var("JUKEN_PARSE_MODE") {
            self.parse_mode = value
                .parse()
                .map_err(|_| ConfigError::UnknownParseMode(value.clone()))?;
        }
        Ok(())
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `juken.toml` in the current directory
/// 2. `~/.config/juken/config.toml`
///
/// Environment variable overrides: `JUKEN_TOLERANCE`, `JUKEN_PARSE_MODE`.
pub fn load_config() -> Result<JukenConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<JukenConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("juken.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            parse_config_file(&path)?
        }
        None => JukenConfig::default(),
    };

    config.apply_env_overrides()?;
    config.validate()?;

    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<JukenConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<JukenConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("juken"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = JukenConfig::default();
        assert_eq!(config.tolerance, 0.0001);
        assert_eq!(config.parse_mode, ParseMode::Strict);
        assert_eq!(config.close_credit, 0.5);
        assert_eq!(config.parallelism, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
tolerance = 0.01
parse_mode = "lax"
close_credit = 0.25
parallelism = 2
output_dir = "out"

[feedback]
correct = "Great!"
"#;
        let config: JukenConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.tolerance, 0.01);
        assert_eq!(config.parse_mode, ParseMode::Lax);
        assert_eq!(config.close_credit, 0.25);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.feedback.correct, "Great!");
        assert_eq!(config.feedback.close, Feedback::default().close);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: JukenConfig = toml::from_str("").unwrap();
        assert_eq!(config, JukenConfig::default());
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let config = JukenConfig {
            tolerance: -0.1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTolerance(-0.1)));

        let config = JukenConfig {
            close_credit: 1.5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidCloseCredit(1.5)));

        let config = JukenConfig {
            parallelism: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidParallelism));
    }

    #[test]
    fn judge_options_follow_config() {
        let config = JukenConfig {
            tolerance: 0.5,
            parse_mode: ParseMode::Lax,
            ..Default::default()
        };
        let options = config.judge_options();
        assert_eq!(options.tolerance, 0.5);
        assert_eq!(options.parse_mode, ParseMode::Lax);
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("juken.toml");
        std::fs::write(&path, "close_credit = 0.0\n").unwrap();
        let config = parse_config_file(&path).unwrap();
        assert_eq!(config.close_credit, 0.0);
    }

    #[test]
    fn load_missing_explicit_path_fails() {
        let result = load_config_from(Some(Path::new("/nonexistent/juken.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "tolerance = \"not a number\"").unwrap();
        assert!(parse_config_file(&path).is_err());
    }
}
