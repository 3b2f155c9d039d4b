use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::Deserialize;

use crate::db;

#[derive(Debug, Deserialize)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
}

impl AppState {
    /// Opens (creating if needed) the roster database in `path` and makes it
    /// the current workspace. The previous workspace stays selected on error.
    pub fn open_workspace(&mut self, path: &Path) -> anyhow::Result<()> {
        let conn = db::open_db(path)?;
        self.workspace = Some(path.to_path_buf());
        self.db = Some(conn);
        tracing::info!(workspace = %path.display(), "workspace opened");
        Ok(())
    }
}
