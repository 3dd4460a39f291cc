// [libs/domain/models-rs/src/features.rs]
/*!
 * =================================================================
 * APARATO: FEATURE DOMAIN MODELS (V3.4 - GOVERNED VECTOR)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: AGREGADOS DE RIQUEZA Y MÁQUINA DE ESTADOS DE FILAS
 *
 * # Mathematical Proof (Top3 Ordering):
 * 'TopKeyword' se ordena por peso descendente con desempate por
 * keyword_id ascendente; el agregador materializa a lo sumo 3 entradas,
 * por lo que el invariante de orden es verificable por inspección local.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::signals::SignalType;

/// Arquetipo de página inferido de la distribución de señales.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageArchetype {
    ContentRich,
    Navigational,
    Thin,
    Parked,
    Unknown,
}

impl Default for PageArchetype {
    fn default() -> Self {
        PageArchetype::Unknown
    }
}

/// Entrada del podio top3 de palabras clave por peso acumulado.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopKeyword {
    pub keyword_id: u64,
    pub weight_sum: f64,
    pub occurrences: u32,
}

/// Agregado acotado y gobernado producido por el agregador puro (C7).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeatureAggregate {
    pub kw_unique_count: u32,
    pub kw_total_occurrences: u32,
    pub kw_weight_sum: f64,
    /// Podio ordenado por peso desc, keyword_id asc; longitud ≤ 3.
    pub top3: Vec<TopKeyword>,
    pub signal_distribution: BTreeMap<SignalType, u32>,
    /// Score compuesto de riqueza en [0,1].
    pub content_richness_score: f64,
    #[serde(default)]
    pub page_archetype: PageArchetype,
    pub is_parked: bool,
    pub parked_confidence: f64,
    /// Vector acotado bajo gobernanza de allowlist.
    pub feature_vector: BTreeMap<String, f64>,
}

/// Estado de procesamiento de una fila de features persistida.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    Pending,
    Building,
    Ready,
    Error,
    Stale,
}

impl ProcessingState {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessingState::Pending => "pending",
            ProcessingState::Building => "building",
            ProcessingState::Ready => "ready",
            ProcessingState::Error => "error",
            ProcessingState::Stale => "stale",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(ProcessingState::Pending),
            "building" => Some(ProcessingState::Building),
            "ready" => Some(ProcessingState::Ready),
            "error" => Some(ProcessingState::Error),
            "stale" => Some(ProcessingState::Stale),
            _ => None,
        }
    }
}

/// Fila de features persistida; clave idempotente (campaign_id, domain_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    pub campaign_id: Uuid,
    pub domain_id: Uuid,
    pub processing_state: ProcessingState,
    pub attempt_count: u32,
    pub last_error: Option<String>,
    pub aggregate: FeatureAggregate,
    pub extraction_version: u32,
    pub keyword_dictionary_version: u32,
    /// Snapshot bajo el cual se calculó el último score (referencia débil).
    pub scoring_profile_snapshot_id: Option<Uuid>,
    pub is_stale_score: bool,
    pub updated_at: DateTime<Utc>,
}

impl FeatureRow {
    /// Forja una fila pendiente lista para la reclamación por un worker.
    pub fn pending(campaign_id: Uuid, domain_id: Uuid) -> Self {
        Self {
            campaign_id,
            domain_id,
            processing_state: ProcessingState::Pending,
            attempt_count: 0,
            last_error: None,
            aggregate: FeatureAggregate::default(),
            extraction_version: 1,
            keyword_dictionary_version: 1,
            scoring_profile_snapshot_id: None,
            is_stale_score: false,
            updated_at: Utc::now(),
        }
    }
}
