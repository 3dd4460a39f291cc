// [libs/infra/db-turso/src/repositories/metrics.rs]
/*!
 * =================================================================
 * APARATO: QUERY PERFORMANCE LEDGER (V3.0 - LATENCY TRACE)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: RASTRO DE LATENCIA DE OPERACIONES DEL LEDGER
 * =================================================================
 */

use chrono::Utc;
use libsql::{params, Connection};

use crate::errors::DbError;

const INSERT_METRIC: &str = r#"
    INSERT INTO query_performance_metrics (operation, duration_ms, recorded_at)
    VALUES (?1, ?2, ?3)
"#;

pub struct QueryMetricsRepository {
    database_connection: Connection,
}

impl QueryMetricsRepository {
    pub fn new(connection: Connection) -> Self {
        Self { database_connection: connection }
    }

    /// Registra la latencia observada de una operación del Ledger.
    pub async fn record(&self, operation: &str, duration_ms: u64) -> Result<(), DbError> {
        self.database_connection
            .execute(
                INSERT_METRIC,
                params![operation, duration_ms as i64, Utc::now().to_rfc3339()],
            )
            .await?;
        Ok(())
    }
}
