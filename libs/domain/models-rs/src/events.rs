// [libs/domain/models-rs/src/events.rs]
/*!
 * =================================================================
 * APARATO: PHASE EVENT MODELS (V3.2 - BROADCAST CONTRACTS)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: TRAMAS DE PROGRESO DEL DUCTO PARA EL BROADCASTER
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fase del ducto de prospección, en orden de ejecución.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    Generation,
    DnsValidation,
    HttpKeywordValidation,
    FeatureAggregation,
    Scoring,
}

impl PipelinePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelinePhase::Generation => "generation",
            PipelinePhase::DnsValidation => "dns_validation",
            PipelinePhase::HttpKeywordValidation => "http_keyword_validation",
            PipelinePhase::FeatureAggregation => "feature_aggregation",
            PipelinePhase::Scoring => "scoring",
        }
    }

    /// Secuencia canónica de fases para el modo FullPipeline.
    pub fn ordered() -> [PipelinePhase; 5] {
        [
            PipelinePhase::Generation,
            PipelinePhase::DnsValidation,
            PipelinePhase::HttpKeywordValidation,
            PipelinePhase::FeatureAggregation,
            PipelinePhase::Scoring,
        ]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseEventType {
    PhaseStart,
    PhaseProgress,
    PhaseComplete,
    PhaseFailed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseEventStatus {
    Ok,
    Warning,
    Error,
}

/// Trama de progreso emitida por el orquestador de fases.
///
/// `event_id = campaign_id + "-" + unix_nanos`; entrega best-effort con
/// descarte bajo presión del limitador.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseEvent {
    pub event_id: String,
    pub campaign_id: Uuid,
    pub domain_id: Option<Uuid>,
    pub event_type: PhaseEventType,
    pub phase: PipelinePhase,
    pub sub_step: String,
    pub status: PhaseEventStatus,
    /// Progreso normalizado en [0,1] cuando la fase lo puede estimar.
    pub progress: Option<f64>,
    pub message: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub processing_time_ms: Option<u64>,
}

impl PhaseEvent {
    pub fn new(
        campaign_id: Uuid,
        event_type: PhaseEventType,
        phase: PipelinePhase,
        sub_step: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let unix_nanos = now.timestamp_nanos_opt().unwrap_or_default();
        Self {
            event_id: format!("{}-{}", campaign_id, unix_nanos),
            campaign_id,
            domain_id: None,
            event_type,
            phase,
            sub_step: sub_step.into(),
            status: PhaseEventStatus::Ok,
            progress: None,
            message: None,
            metadata: serde_json::Value::Null,
            timestamp: now,
            processing_time_ms: None,
        }
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress.clamp(0.0, 1.0));
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_status(mut self, status: PhaseEventStatus) -> Self {
        self.status = status;
        self
    }
}
