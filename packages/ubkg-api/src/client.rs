//! The long-lived handle every request uses to reach the database

use std::sync::Arc;

use crate::connection::ConnectionError;
use crate::cypher::{Bindings, TemplateStore};
use crate::error::Result;
use crate::executor::{CypherBackend, QueryExecutor};
use crate::graph::{GraphValue, Record};

/// Name, version and edition of the connected instance, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatabaseInfo {
    pub name: String,
    pub version: String,
    pub edition: String,
}

impl DatabaseInfo {
    /// Pick the kernel component out of `dbms.components()` rows; falls back
    /// to the first row.
    pub fn from_components(records: &[Record]) -> Option<Self> {
        let text = |record: &Record, key: &str| {
            record
                .get(key)
                .and_then(GraphValue::as_str)
                .map(str::to_string)
                .unwrap_or_default()
        };
        let record = records
            .iter()
            .find(|r| r.get("name").and_then(GraphValue::as_str) == Some("Neo4j Kernel"))
            .or_else(|| records.first())?;
        Some(Self {
            name: text(record, "name"),
            version: text(record, "version"),
            edition: text(record, "edition"),
        })
    }
}

pub struct UbkgClient {
    templates: TemplateStore,
    executor: QueryExecutor,
    timeout_ms: u64,
    database: DatabaseInfo,
}

impl UbkgClient {
    pub fn new(
        backend: Arc<dyn CypherBackend>,
        templates: TemplateStore,
        timeout_ms: u64,
        database: DatabaseInfo,
    ) -> Self {
        Self {
            templates,
            executor: QueryExecutor::new(backend),
            timeout_ms,
            database,
        }
    }

    /// Build a client and read the instance description from the database.
    pub async fn connect(
        backend: Arc<dyn CypherBackend>,
        templates: TemplateStore,
        timeout_ms: u64,
    ) -> std::result::Result<Self, ConnectionError> {
        let request = templates
            .render("database_components", &Bindings::new(), timeout_ms)
            .map_err(|e| ConnectionError::UnexpectedResult(e.to_string()))?;
        let records = backend.run(&request).await?;
        let database = DatabaseInfo::from_components(&records)
            .ok_or_else(|| ConnectionError::UnexpectedResult("dbms.components() returned no rows".to_string()))?;
        tracing::info!(
            name = %database.name,
            version = %database.version,
            edition = %database.edition,
            "connected to graph database"
        );
        Ok(Self::new(backend, templates, timeout_ms, database))
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn database(&self) -> &DatabaseInfo {
        &self.database
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// Render `template` with `bindings` and run it under the configured timeout.
    pub async fn query(&self, template: &str, bindings: Bindings) -> Result<Vec<Record>> {
        let request = self.templates.render(template, &bindings, self.timeout_ms)?;
        self.executor.execute(&request).await
    }

    /// `true` when the database answers `RETURN 1`.
    pub async fn check_connection(&self) -> bool {
        match self.query("check_connection", Bindings::new()).await {
            Ok(records) => records
                .first()
                .and_then(|r| r.get("result"))
                .and_then(GraphValue::as_i64)
                == Some(1),
            Err(e) => {
                tracing::warn!(error = %e, "connection check failed");
                false
            }
        }
    }
}
