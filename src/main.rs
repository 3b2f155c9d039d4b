mod calc;
mod config;
mod db;
mod error;
mod ipc;
mod logging;
mod model;
mod query;
mod store;
mod validate;

use clap::Parser;
use serde_json::json;
use std::io::{self, BufRead, Write};

fn main() -> anyhow::Result<()> {
    let cfg = config::Config::parse();
    logging::init(cfg.log_format);

    let mut state = ipc::AppState::default();
    if let Some(path) = cfg.workspace.as_deref() {
        state.open_workspace(path)?;
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "rosterd ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            // No id to echo back.
            Err(e) => json!({
                "ok": false,
                "error": { "code": "bad_json", "message": e.to_string() }
            }),
        };
        writeln!(stdout, "{}", resp)?;
        stdout.flush()?;
    }
    Ok(())
}
