use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Console output for a load test run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LogFormat {
    /// One line per event, prefixed with the `txn{pair=M/T}` span.
    #[default]
    Compact,
    /// JSON lines; each event carries the pair of the transaction it belongs to.
    Json,
}

/// Verbose runs surface every retry attempt; otherwise only phase outcomes,
/// dropped pairs and round summaries are shown.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "intent_loadtest=debug,reqwest=info,warn"
    } else {
        "intent_loadtest=info,warn"
    }
}

pub fn init_logger(format: LogFormat, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let output = tracing_subscriber::fmt::layer().with_target(false);
    let output = match format {
        LogFormat::Compact => output.compact().boxed(),
        LogFormat::Json => output
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
    };

    tracing_subscriber::registry().with(output.with_filter(filter)).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for verbose in [false, true] {
            assert!(default_directives(verbose).parse::<EnvFilter>().is_ok());
        }
        assert!(default_directives(true).contains("intent_loadtest=debug"));
        assert!(!default_directives(false).contains("debug"));
    }

    #[test]
    fn test_compact_is_the_default_format() {
        assert_eq!(LogFormat::default(), LogFormat::Compact);
    }
}
