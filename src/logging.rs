use crate::config::LogFormat;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "rosterd=info";

/// Installs the global subscriber. Stdout carries protocol lines only, so
/// every format writes to stderr.
pub fn init(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder
            .with_ansi(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .init(),
        LogFormat::Compact => builder.with_ansi(false).compact().init(),
        LogFormat::Json => builder
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .flatten_event(true)
            .init(),
    }
}
