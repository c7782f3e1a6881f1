//! `/database/server` and `/status`

use std::path::Path;

use serde::Serialize;

use crate::client::UbkgClient;
use crate::metrics::MetricsSnapshot;
use crate::models::DatabaseServer;

pub fn database_server(client: &UbkgClient) -> DatabaseServer {
    let info = client.database();
    DatabaseServer {
        version: info.version.clone(),
        edition: info.edition.clone(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub version: String,
    pub build: String,
    pub neo4j_connection: bool,
    pub open_sessions: usize,
    pub query_stats: MetricsSnapshot,
}

/// Service status. `VERSION` and `BUILD` are read from `package_base_dir`;
/// when a file cannot be read its field carries the error text instead.
pub async fn status(client: &UbkgClient, package_base_dir: &Path) -> Status {
    Status {
        version: read_marker(package_base_dir, "VERSION"),
        build: read_marker(package_base_dir, "BUILD"),
        neo4j_connection: client.check_connection().await,
        open_sessions: client.executor().sessions().open_sessions(),
        query_stats: client.executor().metrics().snapshot(),
    }
}

fn read_marker(dir: &Path, name: &str) -> String {
    let path = dir.join(name);
    match std::fs::read_to_string(&path) {
        Ok(text) => text.trim().to_string(),
        Err(e) => format!("{}: {e}", path.display()),
    }
}
