// [libs/domain/models-rs/src/scoring.rs]
/*!
 * =================================================================
 * APARATO: SCORING SNAPSHOT MODELS (V3.1 - IMMUTABLE LINEAGE)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: LINAJE VERSIONADO DE CONFIGURACIÓN DE SCORING
 *
 * # Mathematical Proof (Single Active Invariant):
 * La activación se ejecuta en una transacción que retira al predecesor
 * (is_active=false, replaced_at, replaced_by) e inserta al sucesor con
 * profile_version = max(prev)+1; a lo sumo un snapshot activo por campaña.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Registro inmutable y versionado de configuración de scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringProfileSnapshot {
    pub id: Uuid,
    pub campaign_id: Uuid,
    /// Monotónico por campaña; asignado en la activación.
    pub profile_version: i64,
    pub feature_weights: BTreeMap<String, f64>,
    pub algorithm_version: u32,
    /// Parámetros libres del algoritmo (JSON opaco para el Ledger).
    pub parameters: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub replaced_at: Option<DateTime<Utc>>,
    pub replaced_by: Option<Uuid>,
}

impl ScoringProfileSnapshot {
    /// Forja el contenido de un snapshot previo a su activación transaccional.
    pub fn draft(
        campaign_id: Uuid,
        feature_weights: BTreeMap<String, f64>,
        algorithm_version: u32,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            profile_version: 0,
            feature_weights,
            algorithm_version,
            parameters,
            is_active: false,
            created_at: Utc::now(),
            replaced_at: None,
            replaced_by: None,
        }
    }

    /// Score compuesto de una fila bajo los pesos de este snapshot.
    ///
    /// Producto punto del vector gobernado con los pesos del perfil; las
    /// claves ausentes en cualquiera de los dos lados no contribuyen.
    pub fn score_vector(&self, feature_vector: &BTreeMap<String, f64>) -> f64 {
        self.feature_weights
            .iter()
            .filter_map(|(key, weight)| feature_vector.get(key).map(|value| value * weight))
            .sum()
    }
}
