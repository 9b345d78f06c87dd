use crate::config::{PartialConfig, TimingConfig, DEFAULT_REQUEST_TIMEOUT};
use crate::core::retry::RetryPolicy;
use crate::utils::error::{LoadTestError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub target: Option<TargetSection>,
    pub files: Option<FilesSection>,
    pub run: Option<RunSection>,
    pub timing: Option<TimingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetSection {
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub postback_url: Option<String>,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilesSection {
    pub pairs: Option<String>,
    pub report: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSection {
    pub rounds: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingSection {
    pub create: Option<PhaseSection>,
    pub process: Option<PhaseSection>,
    pub poll: Option<PhaseSection>,
    pub terminal: Option<PhaseSection>,
    pub empty_round_delay_seconds: Option<u64>,
    pub max_empty_rounds: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseSection {
    pub max_attempts: Option<u32>,
    pub delay_seconds: Option<f64>,
}

impl PhaseSection {
    fn apply(&self, field: &str, base: RetryPolicy) -> Result<RetryPolicy> {
        let delay = match self.delay_seconds {
            Some(secs) => Duration::try_from_secs_f64(secs).map_err(|e| {
                LoadTestError::InvalidConfigValueError {
                    field: format!("timing.{}.delay_seconds", field),
                    value: secs.to_string(),
                    reason: e.to_string(),
                }
            })?,
            None => base.delay,
        };
        Ok(RetryPolicy::new(self.max_attempts.unwrap_or(base.max_attempts), delay))
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LoadTestError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LoadTestError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LoadTestError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Connection and file settings, with unresolved `${VAR}` placeholders treated as unset.
    pub fn partial(&self) -> PartialConfig {
        fn resolved(value: Option<&String>) -> Option<String> {
            value.filter(|v| !v.contains("${")).cloned()
        }

        let target = self.target.clone().unwrap_or_default();
        let files = self.files.clone().unwrap_or_default();
        PartialConfig {
            host: resolved(target.host.as_ref()),
            api_key: resolved(target.api_key.as_ref()),
            postback_url: resolved(target.postback_url.as_ref()),
            pairs_file: resolved(files.pairs.as_ref()),
            report_file: resolved(files.report.as_ref()),
            rounds: self.run.as_ref().and_then(|r| r.rounds),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.target
            .as_ref()
            .and_then(|t| t.request_timeout_seconds)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn timing(&self) -> Result<TimingConfig> {
        let mut timing = TimingConfig::default();
        let Some(section) = &self.timing else {
            return Ok(timing);
        };

        let phases = &mut timing.phases;
        for (name, overrides, policy) in [
            ("create", &section.create, &mut phases.create),
            ("process", &section.process, &mut phases.process),
            ("poll", &section.poll, &mut phases.poll),
            ("terminal", &section.terminal, &mut phases.terminal),
        ] {
            if let Some(overrides) = overrides {
                *policy = overrides.apply(name, *policy)?;
            }
        }
        if let Some(secs) = section.empty_round_delay_seconds {
            timing.empty_round_delay = Duration::from_secs(secs);
        }
        if let Some(max) = section.max_empty_rounds {
            timing.max_empty_rounds = max;
        }
        Ok(timing)
    }
}
