#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::core::driver::PhasePolicies;
use crate::core::scheduler::SchedulePolicy;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_api_host, validate_api_key, validate_attempts, validate_csv_path,
    validate_postback_url, validate_required_field, Validate,
};
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings from one source (flags/env or a config file). Unset means "ask the next source".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialConfig {
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub postback_url: Option<String>,
    pub pairs_file: Option<String>,
    pub report_file: Option<String>,
    pub rounds: Option<usize>,
}

impl PartialConfig {
    /// Fills every unset field from `fallback`.
    pub fn or(self, fallback: PartialConfig) -> PartialConfig {
        PartialConfig {
            host: self.host.or(fallback.host),
            api_key: self.api_key.or(fallback.api_key),
            postback_url: self.postback_url.or(fallback.postback_url),
            pairs_file: self.pairs_file.or(fallback.pairs_file),
            report_file: self.report_file.or(fallback.report_file),
            rounds: self.rounds.or(fallback.rounds),
        }
    }
}

/// Where and how to reach the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    pub host: String,
    pub api_key: String,
    pub postback_url: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    pub phases: PhasePolicies,
    pub empty_round_delay: Duration,
    pub max_empty_rounds: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        let schedule = SchedulePolicy::new(0);
        Self {
            phases: PhasePolicies::default(),
            empty_round_delay: schedule.empty_round_delay,
            max_empty_rounds: schedule.max_empty_rounds,
        }
    }
}

/// Immutable run configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub target: TargetConfig,
    pub pairs_file: String,
    pub report_file: String,
    pub rounds: usize,
    pub timing: TimingConfig,
}

impl RunConfig {
    /// Merges flags/env over the config file and checks the result.
    pub fn resolve(overrides: PartialConfig, file: Option<&TomlConfig>) -> Result<Self> {
        let (merged, timing, request_timeout) = match file {
            Some(file) => (overrides.or(file.partial()), file.timing()?, file.request_timeout()),
            None => (overrides, TimingConfig::default(), DEFAULT_REQUEST_TIMEOUT),
        };

        let config = RunConfig {
            target: TargetConfig {
                host: validate_required_field("host", merged.host)?,
                api_key: validate_required_field("api_key", merged.api_key)?,
                postback_url: validate_required_field("postback_url", merged.postback_url)?,
                request_timeout,
            },
            pairs_file: validate_required_field("pairs_file", merged.pairs_file)?,
            report_file: validate_required_field("report_file", merged.report_file)?,
            rounds: validate_required_field("rounds", merged.rounds)?,
            timing,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn schedule_policy(&self) -> SchedulePolicy {
        SchedulePolicy {
            rounds: self.rounds,
            empty_round_delay: self.timing.empty_round_delay,
            max_empty_rounds: self.timing.max_empty_rounds,
        }
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        validate_api_host("host", &self.target.host)?;
        validate_postback_url("postback_url", &self.target.postback_url)?;
        validate_api_key("api_key", &self.target.api_key)?;
        validate_csv_path("pairs_file", &self.pairs_file)?;
        validate_csv_path("report_file", &self.report_file)?;

        let phases = &self.timing.phases;
        for (field, policy) in [
            ("timing.create.max_attempts", phases.create),
            ("timing.process.max_attempts", phases.process),
            ("timing.poll.max_attempts", phases.poll),
            ("timing.terminal.max_attempts", phases.terminal),
        ] {
            validate_attempts(field, policy.max_attempts)?;
        }
        validate_attempts("timing.max_empty_rounds", self.timing.max_empty_rounds)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::LoadTestError;

    fn complete() -> PartialConfig {
        PartialConfig {
            host: Some("https://api.example.com".to_string()),
            api_key: Some("secret".to_string()),
            postback_url: Some("https://hooks.example.com/pb".to_string()),
            pairs_file: Some("mid_tid.csv".to_string()),
            report_file: Some("report.csv".to_string()),
            rounds: Some(3),
        }
    }

    #[test]
    fn test_resolve_without_file_uses_default_timing() {
        let config = RunConfig::resolve(complete(), None).unwrap();

        assert_eq!(config.rounds, 3);
        assert_eq!(config.timing.phases.create.max_attempts, 10);
        assert_eq!(config.timing.phases.poll.delay, Duration::from_secs(10));
        assert_eq!(config.target.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.schedule_policy(), SchedulePolicy::new(3));
    }

    #[test]
    fn test_missing_field_is_reported_by_name() {
        let partial = PartialConfig {
            api_key: None,
            ..complete()
        };

        let err = RunConfig::resolve(partial, None).unwrap_err();

        assert!(matches!(err, LoadTestError::MissingConfigError { field } if field == "api_key"));
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let partial = PartialConfig {
            host: Some("not a url".to_string()),
            ..complete()
        };
        assert!(RunConfig::resolve(partial, None).is_err());
    }

    #[test]
    fn test_host_with_query_is_rejected() {
        let partial = PartialConfig {
            host: Some("https://api.example.com/?region=eu".to_string()),
            ..complete()
        };

        let err = RunConfig::resolve(partial, None).unwrap_err();

        assert!(matches!(
            err,
            LoadTestError::InvalidConfigValueError { field, .. } if field == "host"
        ));
    }

    #[test]
    fn test_overrides_win_over_fallback() {
        let merged = PartialConfig {
            rounds: Some(7),
            ..PartialConfig::default()
        }
        .or(complete());

        assert_eq!(merged.rounds, Some(7));
        assert_eq!(merged.host.as_deref(), Some("https://api.example.com"));
    }
}
