// [libs/infra/db-turso/src/repositories/phase.rs]
/*!
 * =================================================================
 * APARATO: PHASE EXECUTION LEDGER (V3.1 - RESUME CURSOR)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DE CURSORES Y ESTADOS DE FASE
 * =================================================================
 */

use chrono::Utc;
use libsql::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use dominion_domain_models::events::PipelinePhase;

use crate::errors::DbError;

const UPSERT_PHASE: &str = r#"
    INSERT INTO phase_executions (campaign_id, phase, status, cursor_value, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT (campaign_id, phase) DO UPDATE SET
        status = excluded.status,
        cursor_value = excluded.cursor_value,
        updated_at = excluded.updated_at
"#;

const GET_PHASE: &str = r#"
    SELECT status, cursor_value FROM phase_executions
    WHERE campaign_id = ?1 AND phase = ?2
"#;

/// Estado persistido de una fase con su cursor de reanudación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseCheckpoint {
    pub status: String,
    /// Offset de generación o frontera de lote DNS/HTTP.
    pub cursor_value: u64,
}

pub struct PhaseExecutionRepository {
    database_connection: Connection,
}

impl PhaseExecutionRepository {
    pub fn new(connection: Connection) -> Self {
        Self { database_connection: connection }
    }

    /// Sella el checkpoint de la fase (upsert idempotente).
    #[instrument(skip(self))]
    pub async fn checkpoint(
        &self,
        campaign_id: Uuid,
        phase: PipelinePhase,
        status: &str,
        cursor_value: u64,
    ) -> Result<(), DbError> {
        self.database_connection
            .execute(
                UPSERT_PHASE,
                params![
                    campaign_id.to_string(),
                    phase.as_str(),
                    status,
                    cursor_value as i64,
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }

    /// Recupera el checkpoint persistido de la fase, si existe.
    pub async fn load(
        &self,
        campaign_id: Uuid,
        phase: PipelinePhase,
    ) -> Result<Option<PhaseCheckpoint>, DbError> {
        let mut rows = self
            .database_connection
            .query(GET_PHASE, params![campaign_id.to_string(), phase.as_str()])
            .await?;

        match rows.next().await? {
            Some(row) => {
                let status: String = row.get(0)?;
                let cursor_value: i64 = row.get(1)?;
                Ok(Some(PhaseCheckpoint { status, cursor_value: cursor_value as u64 }))
            }
            None => Ok(None),
        }
    }
}
