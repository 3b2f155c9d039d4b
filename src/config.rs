use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rosterd")]
#[command(about = "Student records sidecar speaking JSON lines on stdin/stdout", long_about = None)]
pub struct Config {
    /// Workspace directory to open at startup
    #[arg(long, env = "ROSTERD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Log output format (logs always go to stderr)
    #[arg(long, env = "ROSTERD_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}
