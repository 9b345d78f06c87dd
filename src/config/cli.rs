use crate::config::PartialConfig;
use crate::utils::logger::LogFormat;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "intent-loadtest")]
#[command(about = "Drive payment intents through create, process and poll across a terminal pool")]
pub struct CliConfig {
    #[arg(long, env = "HOST", help = "Base URL of the payment-intent API")]
    pub host: Option<String>,

    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "POSTBACK_URL")]
    pub postback_url: Option<String>,

    #[arg(long, env = "MID_TID_FILE_NAME", help = "CSV of merchant,terminal pairs")]
    pub pairs_file: Option<String>,

    #[arg(long, env = "REPORT_FILE_NAME", help = "CSV timing log to append to")]
    pub report_file: Option<String>,

    #[arg(long, env = "NO_OF_TESTS", help = "Number of rounds to run")]
    pub rounds: Option<usize>,

    #[arg(long, help = "TOML config file; flags and env vars take precedence")]
    pub config: Option<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage after each round")]
    pub monitor: bool,
}

impl CliConfig {
    pub fn partial(&self) -> PartialConfig {
        PartialConfig {
            host: self.host.clone(),
            api_key: self.api_key.clone(),
            postback_url: self.postback_url.clone(),
            pairs_file: self.pairs_file.clone(),
            report_file: self.report_file.clone(),
            rounds: self.rounds,
        }
    }
}
