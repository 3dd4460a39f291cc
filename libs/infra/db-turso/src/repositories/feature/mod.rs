// [libs/infra/db-turso/src/repositories/feature/mod.rs]
/*!
 * =================================================================
 * APARATO: FEATURE ROW REPOSITORY (V3.5 - STATE MACHINE GUARD)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CICLO DE VIDA PERSISTIDO DE FILAS DE FEATURES
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CAS OWNERSHIP: pending→building se adjudica por compare-and-set;
 *    la afectación 0 certifica la derrota en la carrera.
 * 2. NO PARTIAL WRITES: Una agregación cancelada jamás sella ready; la
 *    fila queda en building hasta la pasada del reconciliador.
 * 3. NARROW RESET: El reset de zombies apunta por identidad de fila.
 * =================================================================
 */

pub mod queries;

use chrono::{Duration, Utc};
use libsql::{params, Connection};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use dominion_domain_models::features::{FeatureAggregate, FeatureRow, PageArchetype, ProcessingState};

use crate::errors::DbError;
use crate::repositories::campaign::parse_timestamp;
use self::queries as sql_registry;

/// Proyección de una fila con score obsoleto lista para el re-score.
#[derive(Debug, Clone)]
pub struct StaleScoreRow {
    pub domain_id: Uuid,
    pub feature_vector: std::collections::BTreeMap<String, f64>,
}

pub struct FeatureRepository {
    database_connection: Connection,
}

impl FeatureRepository {
    pub fn new(connection: Connection) -> Self {
        Self { database_connection: connection }
    }

    /// Siembra idempotente de la fila pendiente.
    pub async fn ensure_pending(&self, campaign_id: Uuid, domain_id: Uuid) -> Result<(), DbError> {
        self.database_connection
            .execute(
                sql_registry::ENSURE_PENDING,
                params![campaign_id.to_string(), domain_id.to_string(), Utc::now().to_rfc3339()],
            )
            .await?;
        Ok(())
    }

    /// Reclama hasta `limit` filas pendientes mediante CAS individual.
    ///
    /// Devuelve las identidades efectivamente adjudicadas a este worker.
    #[instrument(skip(self))]
    pub async fn claim_pending(
        &self,
        campaign_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Uuid>, DbError> {
        let mut candidate_rows = self
            .database_connection
            .query(
                sql_registry::FIND_PENDING,
                params![campaign_id.to_string(), limit as i64],
            )
            .await?;

        let mut candidates = Vec::new();
        while let Some(row) = candidate_rows.next().await? {
            let domain_id_text: String = row.get(0)?;
            candidates.push(
                Uuid::parse_str(&domain_id_text)
                    .map_err(|fault| DbError::MappingError(fault.to_string()))?,
            );
        }

        let mut claimed = Vec::with_capacity(candidates.len());
        let now = Utc::now().to_rfc3339();
        for domain_id in candidates {
            let rows_affected = self
                .database_connection
                .execute(
                    sql_registry::CLAIM_ROW,
                    params![now.clone(), campaign_id.to_string(), domain_id.to_string()],
                )
                .await?;
            if rows_affected == 1 {
                claimed.push(domain_id);
            }
        }

        debug!("🔒 [FEATURE_CLAIM]: {} rows adjudicated.", claimed.len());
        Ok(claimed)
    }

    /// Sella el agregado con el upsert idempotente building → ready.
    #[instrument(skip(self, aggregate))]
    pub async fn complete(
        &self,
        campaign_id: Uuid,
        domain_id: Uuid,
        aggregate: &FeatureAggregate,
        extraction_version: u32,
        keyword_dictionary_version: u32,
        snapshot_id: Option<Uuid>,
        lead_score: Option<f64>,
    ) -> Result<(), DbError> {
        let top3_json = serde_json::to_string(&aggregate.top3)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;
        let distribution_json = serde_json::to_string(&aggregate.signal_distribution)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;
        let vector_json = serde_json::to_string(&aggregate.feature_vector)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;
        let archetype_label = serde_json::to_value(aggregate.page_archetype)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());

        self.database_connection
            .execute(
                sql_registry::COMPLETE_ROW,
                params![
                    campaign_id.to_string(),
                    domain_id.to_string(),
                    aggregate.kw_unique_count as i64,
                    aggregate.kw_total_occurrences as i64,
                    aggregate.kw_weight_sum,
                    top3_json,
                    distribution_json,
                    aggregate.content_richness_score,
                    archetype_label,
                    aggregate.is_parked as i64,
                    aggregate.parked_confidence,
                    vector_json,
                    extraction_version as i64,
                    keyword_dictionary_version as i64,
                    snapshot_id.map(|id| id.to_string()),
                    lead_score,
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }

    /// Transición building → error con rastro del fallo.
    pub async fn fail(
        &self,
        campaign_id: Uuid,
        domain_id: Uuid,
        error_message: &str,
    ) -> Result<bool, DbError> {
        let rows_affected = self
            .database_connection
            .execute(
                sql_registry::FAIL_ROW,
                params![
                    error_message,
                    Utc::now().to_rfc3339(),
                    campaign_id.to_string(),
                    domain_id.to_string()
                ],
            )
            .await?;
        Ok(rows_affected == 1)
    }

    /// Reset de zombies building → pending en lotes por identidad.
    ///
    /// Devuelve el total de filas ajustadas en la pasada completa.
    #[instrument(skip(self))]
    pub async fn reset_stuck(
        &self,
        older_than: Duration,
        batch_size: usize,
    ) -> Result<u64, DbError> {
        let threshold = (Utc::now() - older_than).to_rfc3339();
        let mut total_adjusted = 0u64;

        loop {
            // 1. LOCALIZACIÓN DEL LOTE DE ZOMBIES
            let mut stuck_rows = self
                .database_connection
                .query(
                    sql_registry::FIND_STUCK_BUILDING,
                    params![threshold.clone(), batch_size as i64],
                )
                .await?;

            let mut identities = Vec::new();
            while let Some(row) = stuck_rows.next().await? {
                let campaign_text: String = row.get(0)?;
                let domain_text: String = row.get(1)?;
                identities.push((campaign_text, domain_text));
            }
            if identities.is_empty() {
                break;
            }

            // 2. RESET DIRIGIDO POR IDENTIDAD DE FILA
            let now = Utc::now().to_rfc3339();
            let mut batch_adjusted = 0u64;
            for (campaign_text, domain_text) in identities {
                batch_adjusted += self
                    .database_connection
                    .execute(
                        sql_registry::RESET_STUCK_ROW,
                        params![now.clone(), campaign_text, domain_text],
                    )
                    .await?;
            }
            total_adjusted += batch_adjusted;

            // Reset a pending desplaza updated_at; el lote siguiente ya no
            // re-observa estas filas bajo el umbral.
            if batch_adjusted == 0 {
                break;
            }
        }

        if total_adjusted > 0 {
            info!("♻️  [RECONCILER]: {} stuck rows returned to pending.", total_adjusted);
        }
        Ok(total_adjusted)
    }

    /// Re-encola error|stale → pending bajo el presupuesto de reintentos.
    pub async fn requeue_failed(
        &self,
        campaign_id: Uuid,
        max_retries: u32,
    ) -> Result<u64, DbError> {
        let rows_affected = self
            .database_connection
            .execute(
                sql_registry::REQUEUE_FAILED,
                params![Utc::now().to_rfc3339(), campaign_id.to_string(), max_retries as i64],
            )
            .await?;
        Ok(rows_affected)
    }

    /// Variante global del re-encolado, usada por el daemon reconciliador.
    pub async fn requeue_failed_global(&self, max_retries: u32) -> Result<u64, DbError> {
        let rows_affected = self
            .database_connection
            .execute(
                sql_registry::REQUEUE_FAILED_GLOBAL,
                params![Utc::now().to_rfc3339(), max_retries as i64],
            )
            .await?;
        Ok(rows_affected)
    }

    /// Marca is_stale_score en toda fila ready ajena al snapshot vigente.
    ///
    /// Idempotente: una segunda pasada sobre el mismo snapshot no altera
    /// el estado final.
    #[instrument(skip(self))]
    pub async fn mark_stale_scores(
        &self,
        campaign_id: Uuid,
        current_snapshot_id: Option<Uuid>,
    ) -> Result<u64, DbError> {
        let now = Utc::now().to_rfc3339();
        let rows_affected = match current_snapshot_id {
            Some(snapshot_id) => {
                self.database_connection
                    .execute(
                        sql_registry::MARK_STALE_SCORES,
                        params![now, campaign_id.to_string(), snapshot_id.to_string()],
                    )
                    .await?
            }
            None => {
                self.database_connection
                    .execute(
                        sql_registry::MARK_ALL_STALE_SCORES,
                        params![now, campaign_id.to_string()],
                    )
                    .await?
            }
        };

        info!("🏷️  [MARK_STALE]: {} ready rows flagged for rescore.", rows_affected);
        Ok(rows_affected)
    }

    /// Obsolescencia de extracción ante una versión superior del extractor.
    pub async fn mark_stale_extraction(
        &self,
        campaign_id: Uuid,
        current_extraction_version: u32,
    ) -> Result<u64, DbError> {
        let rows_affected = self
            .database_connection
            .execute(
                sql_registry::MARK_STALE_EXTRACTION,
                params![
                    Utc::now().to_rfc3339(),
                    campaign_id.to_string(),
                    current_extraction_version as i64
                ],
            )
            .await?;
        Ok(rows_affected)
    }

    /// Filas con score obsoleto listas para el re-score.
    pub async fn stale_score_rows(
        &self,
        campaign_id: Uuid,
        limit: usize,
    ) -> Result<Vec<StaleScoreRow>, DbError> {
        let mut rows = self
            .database_connection
            .query(
                sql_registry::FIND_STALE_SCORES,
                params![campaign_id.to_string(), limit as i64],
            )
            .await?;

        let mut stale_rows = Vec::new();
        while let Some(row) = rows.next().await? {
            let domain_id_text: String = row.get(0)?;
            let vector_json: String = row.get(1)?;
            stale_rows.push(StaleScoreRow {
                domain_id: Uuid::parse_str(&domain_id_text)
                    .map_err(|fault| DbError::MappingError(fault.to_string()))?,
                feature_vector: serde_json::from_str(&vector_json)
                    .map_err(|fault| DbError::MappingError(fault.to_string()))?,
            });
        }
        Ok(stale_rows)
    }

    /// Sella el score recalculado bajo el snapshot activo.
    pub async fn write_score(
        &self,
        campaign_id: Uuid,
        domain_id: Uuid,
        lead_score: f64,
        snapshot_id: Uuid,
    ) -> Result<(), DbError> {
        let rows_affected = self
            .database_connection
            .execute(
                sql_registry::WRITE_SCORE,
                params![
                    lead_score,
                    snapshot_id.to_string(),
                    Utc::now().to_rfc3339(),
                    campaign_id.to_string(),
                    domain_id.to_string()
                ],
            )
            .await?;

        if rows_affected == 0 {
            return Err(DbError::FeatureRowNotFound);
        }
        Ok(())
    }

    pub async fn count_in_state(
        &self,
        campaign_id: Uuid,
        state: ProcessingState,
    ) -> Result<u64, DbError> {
        let mut rows = self
            .database_connection
            .query(
                sql_registry::COUNT_BY_STATE,
                params![campaign_id.to_string(), state.as_str()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DbError::MappingError("count query yielded no row".to_string()))?;
        Ok(row.get::<i64>(0)? as u64)
    }

    /// Materializa la fila completa del Ledger.
    pub async fn get(&self, campaign_id: Uuid, domain_id: Uuid) -> Result<FeatureRow, DbError> {
        let mut rows = self
            .database_connection
            .query(
                sql_registry::GET_ROW,
                params![campaign_id.to_string(), domain_id.to_string()],
            )
            .await?;

        let row = rows.next().await?.ok_or(DbError::FeatureRowNotFound)?;
        map_feature_row(campaign_id, domain_id, &row)
    }
}

fn map_feature_row(
    campaign_id: Uuid,
    domain_id: Uuid,
    row: &libsql::Row,
) -> Result<FeatureRow, DbError> {
    let state_text: String = row.get(0)?;
    let attempt_count: i64 = row.get(1)?;
    // NULL en columnas opcionales se degrada a None vía .ok().
    let last_error: Option<String> = row.get::<String>(2).ok();
    let kw_unique_count: i64 = row.get(3)?;
    let kw_total_occurrences: i64 = row.get(4)?;
    let kw_weight_sum: f64 = row.get(5)?;
    let top3_json: String = row.get(6)?;
    let distribution_json: String = row.get(7)?;
    let content_richness_score: f64 = row.get(8)?;
    let archetype_text: String = row.get(9)?;
    let is_parked: i64 = row.get(10)?;
    let parked_confidence: f64 = row.get(11)?;
    let vector_json: String = row.get(12)?;
    let extraction_version: i64 = row.get(13)?;
    let keyword_dictionary_version: i64 = row.get(14)?;
    let snapshot_id_text: Option<String> = row.get::<String>(15).ok();
    let is_stale_score: i64 = row.get(16)?;
    let updated_at_text: String = row.get(18)?;

    let aggregate = FeatureAggregate {
        kw_unique_count: kw_unique_count as u32,
        kw_total_occurrences: kw_total_occurrences as u32,
        kw_weight_sum,
        top3: serde_json::from_str(&top3_json)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?,
        signal_distribution: serde_json::from_str(&distribution_json)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?,
        content_richness_score,
        page_archetype: serde_json::from_value(serde_json::Value::String(archetype_text))
            .unwrap_or(PageArchetype::Unknown),
        is_parked: is_parked != 0,
        parked_confidence,
        feature_vector: serde_json::from_str(&vector_json)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?,
    };

    Ok(FeatureRow {
        campaign_id,
        domain_id,
        processing_state: ProcessingState::parse(&state_text)
            .ok_or_else(|| DbError::MappingError(format!("unknown state {}", state_text)))?,
        attempt_count: attempt_count as u32,
        last_error,
        aggregate,
        extraction_version: extraction_version as u32,
        keyword_dictionary_version: keyword_dictionary_version as u32,
        scoring_profile_snapshot_id: snapshot_id_text
            .map(|text| Uuid::parse_str(&text))
            .transpose()
            .map_err(|fault| DbError::MappingError(fault.to_string()))?,
        is_stale_score: is_stale_score != 0,
        updated_at: parse_timestamp(&updated_at_text)?,
    })
}

