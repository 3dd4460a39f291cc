// [libs/domain/pipeline/src/snapshots.rs]
/*!
 * =================================================================
 * APARATO: SNAPSHOT LIFECYCLE SERVICE (V3.2 - SCORING LINEAGE)
 * CLASIFICACIÓN: DOMAIN ORCHESTRATION (ESTRATO L2)
 * RESPONSABILIDAD: ACTIVACIÓN, MARK-STALE Y RE-SCORE BAJO SNAPSHOT
 * =================================================================
 */

use std::collections::BTreeMap;

use tracing::{info, instrument};
use uuid::Uuid;

use dominion_domain_models::scoring::ScoringProfileSnapshot;
use dominion_infra_db::{FeatureRepository, SnapshotRepository};

use crate::errors::PipelineError;

/// Tamaño de lote del bucle de re-score.
const RESCORE_BATCH_SIZE: usize = 200;

/// Pesos del perfil de scoring por defecto de una campaña nueva.
fn default_feature_weights() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("richness".to_string(), 0.60),
        ("kw_unique".to_string(), 0.015),
        ("kw_hits_total".to_string(), 0.004),
        ("microcrawl_gain_ratio".to_string(), 0.10),
        ("parked_confidence".to_string(), -0.40),
    ])
}

pub struct SnapshotLifecycle {
    snapshots: SnapshotRepository,
    features: FeatureRepository,
}

impl SnapshotLifecycle {
    pub fn new(snapshots: SnapshotRepository, features: FeatureRepository) -> Self {
        Self { snapshots, features }
    }

    /// Activa un nuevo snapshot y marca obsoleto todo score ajeno a él.
    #[instrument(skip(self, feature_weights, parameters))]
    pub async fn create_snapshot(
        &self,
        campaign_id: Uuid,
        feature_weights: BTreeMap<String, f64>,
        algorithm_version: u32,
        parameters: serde_json::Value,
    ) -> Result<ScoringProfileSnapshot, PipelineError> {
        let activated = self
            .snapshots
            .create_snapshot(ScoringProfileSnapshot::draft(
                campaign_id,
                feature_weights,
                algorithm_version,
                parameters,
            ))
            .await?;

        self.mark_stale(campaign_id, Some(activated.id)).await?;
        Ok(activated)
    }

    /// Snapshot activo, creando el perfil por defecto si no existe.
    pub async fn ensure_active(
        &self,
        campaign_id: Uuid,
    ) -> Result<ScoringProfileSnapshot, PipelineError> {
        if let Some(active) = self.snapshots.get_active(campaign_id).await? {
            return Ok(active);
        }

        info!("📸 [SNAPSHOT]: No active profile, forging campaign default.");
        let activated = self
            .snapshots
            .create_snapshot(ScoringProfileSnapshot::draft(
                campaign_id,
                default_feature_weights(),
                2,
                serde_json::json!({ "origin": "campaign_default" }),
            ))
            .await?;
        Ok(activated)
    }

    pub async fn get_active(
        &self,
        campaign_id: Uuid,
    ) -> Result<Option<ScoringProfileSnapshot>, PipelineError> {
        Ok(self.snapshots.get_active(campaign_id).await?)
    }

    pub async fn snapshot_history(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<ScoringProfileSnapshot>, PipelineError> {
        Ok(self.snapshots.snapshot_history(campaign_id).await?)
    }

    /// Marca is_stale_score en toda fila ready ajena al snapshot dado.
    /// Idempotente por construcción.
    pub async fn mark_stale(
        &self,
        campaign_id: Uuid,
        current_snapshot_id: Option<Uuid>,
    ) -> Result<u64, PipelineError> {
        Ok(self.features.mark_stale_scores(campaign_id, current_snapshot_id).await?)
    }

    /// Re-score de filas obsoletas bajo el snapshot activo.
    ///
    /// Devuelve el número de filas re-selladas.
    #[instrument(skip(self))]
    pub async fn rescore(&self, campaign_id: Uuid) -> Result<u64, PipelineError> {
        let active = self
            .snapshots
            .get_active(campaign_id)
            .await?
            .ok_or(dominion_infra_db::DbError::NoActiveSnapshot)?;

        let mut rescored_total = 0u64;
        loop {
            let stale_rows =
                self.features.stale_score_rows(campaign_id, RESCORE_BATCH_SIZE).await?;
            if stale_rows.is_empty() {
                break;
            }

            for stale_row in stale_rows {
                let recomputed_score = active.score_vector(&stale_row.feature_vector);
                self.features
                    .write_score(campaign_id, stale_row.domain_id, recomputed_score, active.id)
                    .await?;
                rescored_total += 1;
            }
        }

        if rescored_total > 0 {
            info!(
                "🧮 [RESCORE]: {} rows re-sealed under profile v{}.",
                rescored_total, active.profile_version
            );
        }
        Ok(rescored_total)
    }
}
