// [libs/infra/db-turso/src/repositories/snapshot.rs]
/*!
 * =================================================================
 * APARATO: SCORING SNAPSHOT REPOSITORY (V3.4 - ATOMIC ACTIVATION)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: LINAJE TRANSACCIONAL DE SNAPSHOTS DE SCORING
 *
 * # Mathematical Proof (Single Active Invariant):
 * El retiro del predecesor y la inserción del sucesor comparten la misma
 * transacción; ninguna lectura concurrente puede observar dos snapshots
 * activos ni un hueco sin activo entre ambas operaciones.
 * =================================================================
 */

use chrono::Utc;
use libsql::{params, Connection};
use tracing::{info, instrument};
use uuid::Uuid;

use dominion_domain_models::scoring::ScoringProfileSnapshot;

use crate::errors::DbError;
use crate::repositories::campaign::parse_timestamp;

const GET_ACTIVE: &str = r#"
    SELECT id, campaign_id, profile_version, feature_weights_json, algorithm_version,
           parameters_json, is_active, created_at, replaced_at, replaced_by
    FROM scoring_profile_snapshots
    WHERE campaign_id = ?1 AND is_active = 1
"#;

const GET_MAX_VERSION: &str = r#"
    SELECT COALESCE(MAX(profile_version), 0)
    FROM scoring_profile_snapshots
    WHERE campaign_id = ?1
"#;

const RETIRE_ACTIVE: &str = r#"
    UPDATE scoring_profile_snapshots
    SET is_active = 0, replaced_at = ?1, replaced_by = ?2
    WHERE campaign_id = ?3 AND is_active = 1
"#;

const INSERT_SNAPSHOT: &str = r#"
    INSERT INTO scoring_profile_snapshots
        (id, campaign_id, profile_version, feature_weights_json, algorithm_version,
         parameters_json, is_active, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)
"#;

const HISTORY: &str = r#"
    SELECT id, campaign_id, profile_version, feature_weights_json, algorithm_version,
           parameters_json, is_active, created_at, replaced_at, replaced_by
    FROM scoring_profile_snapshots
    WHERE campaign_id = ?1
    ORDER BY profile_version DESC
"#;

pub struct SnapshotRepository {
    database_connection: Connection,
}

impl SnapshotRepository {
    pub fn new(connection: Connection) -> Self {
        Self { database_connection: connection }
    }

    /// Activa un nuevo snapshot retirando atómicamente al predecesor.
    #[instrument(skip(self, draft))]
    pub async fn create_snapshot(
        &self,
        mut draft: ScoringProfileSnapshot,
    ) -> Result<ScoringProfileSnapshot, DbError> {
        let weights_json = serde_json::to_string(&draft.feature_weights)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;
        let parameters_json = serde_json::to_string(&draft.parameters)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;

        let database_transaction = self
            .database_connection
            .transaction()
            .await
            .map_err(|_| DbError::TransactionError)?;

        // 1. VERSIÓN MONOTÓNICA: max(prev) + 1
        let mut version_rows = database_transaction
            .query(GET_MAX_VERSION, params![draft.campaign_id.to_string()])
            .await?;
        let max_version: i64 = version_rows
            .next()
            .await?
            .map(|row| row.get::<i64>(0))
            .transpose()?
            .unwrap_or(0);

        // 2. RETIRO DEL PREDECESOR EN LA MISMA UNIDAD DE TRABAJO
        database_transaction
            .execute(
                RETIRE_ACTIVE,
                params![
                    Utc::now().to_rfc3339(),
                    draft.id.to_string(),
                    draft.campaign_id.to_string()
                ],
            )
            .await?;

        // 3. INSERCIÓN DEL SUCESOR ACTIVO
        draft.profile_version = max_version + 1;
        draft.is_active = true;
        database_transaction
            .execute(
                INSERT_SNAPSHOT,
                params![
                    draft.id.to_string(),
                    draft.campaign_id.to_string(),
                    draft.profile_version,
                    weights_json,
                    draft.algorithm_version as i64,
                    parameters_json,
                    draft.created_at.to_rfc3339()
                ],
            )
            .await?;

        database_transaction.commit().await.map_err(|_| DbError::TransactionError)?;

        info!(
            "📸 [SNAPSHOT]: Profile v{} activated for campaign [{}].",
            draft.profile_version, draft.campaign_id
        );
        Ok(draft)
    }

    pub async fn get_active(
        &self,
        campaign_id: Uuid,
    ) -> Result<Option<ScoringProfileSnapshot>, DbError> {
        let mut rows = self
            .database_connection
            .query(GET_ACTIVE, params![campaign_id.to_string()])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(map_snapshot_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Historial completo, versión más reciente primero.
    pub async fn snapshot_history(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<ScoringProfileSnapshot>, DbError> {
        let mut rows = self
            .database_connection
            .query(HISTORY, params![campaign_id.to_string()])
            .await?;

        let mut history = Vec::new();
        while let Some(row) = rows.next().await? {
            history.push(map_snapshot_row(&row)?);
        }
        Ok(history)
    }
}

fn map_snapshot_row(row: &libsql::Row) -> Result<ScoringProfileSnapshot, DbError> {
    let id_text: String = row.get(0)?;
    let campaign_text: String = row.get(1)?;
    let profile_version: i64 = row.get(2)?;
    let weights_json: String = row.get(3)?;
    let algorithm_version: i64 = row.get(4)?;
    let parameters_json: String = row.get(5)?;
    let is_active: i64 = row.get(6)?;
    let created_at_text: String = row.get(7)?;
    let replaced_at_text: Option<String> = row.get::<String>(8).ok();
    let replaced_by_text: Option<String> = row.get::<String>(9).ok();

    Ok(ScoringProfileSnapshot {
        id: Uuid::parse_str(&id_text).map_err(|fault| DbError::MappingError(fault.to_string()))?,
        campaign_id: Uuid::parse_str(&campaign_text)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?,
        profile_version,
        feature_weights: serde_json::from_str(&weights_json)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?,
        algorithm_version: algorithm_version as u32,
        parameters: serde_json::from_str(&parameters_json)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?,
        is_active: is_active != 0,
        created_at: parse_timestamp(&created_at_text)?,
        replaced_at: replaced_at_text.map(|text| parse_timestamp(&text)).transpose()?,
        replaced_by: replaced_by_text
            .map(|text| Uuid::parse_str(&text))
            .transpose()
            .map_err(|fault| DbError::MappingError(fault.to_string()))?,
    })
}
