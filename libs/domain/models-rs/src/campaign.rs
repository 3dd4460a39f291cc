// [libs/domain/models-rs/src/campaign.rs]
/*!
 * =================================================================
 * APARATO: CAMPAIGN DOMAIN MODELS (V3.1 - MONOTONIC GUARD)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CICLO DE VIDA SOBERANO DE CAMPAÑAS DE PROSPECCIÓN
 *
 * # Mathematical Proof (Monotonic Lifecycle):
 * Las transiciones de estado son monótonas salvo el par explícito
 * pause/resume. 'is_transition_allowed' actúa como autómata finito:
 * ningún estado terminal (Completed/Failed) admite sucesor.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Estado operacional de una campaña dentro del ducto de prospección.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignState {
    Draft,
    Running,
    Paused,
    Completed,
    Failed,
}

impl CampaignState {
    /// Valida la legalidad de una transición del autómata de campaña.
    ///
    /// Monotonía estricta con la única excepción del par pause/resume.
    pub fn is_transition_allowed(self, next: CampaignState) -> bool {
        use CampaignState::*;
        matches!(
            (self, next),
            (Draft, Running)
                | (Running, Paused)
                | (Paused, Running)
                | (Running, Completed)
                | (Running, Failed)
                | (Paused, Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CampaignState::Draft => "draft",
            CampaignState::Running => "running",
            CampaignState::Paused => "paused",
            CampaignState::Completed => "completed",
            CampaignState::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "draft" => Some(CampaignState::Draft),
            "running" => Some(CampaignState::Running),
            "paused" => Some(CampaignState::Paused),
            "completed" => Some(CampaignState::Completed),
            "failed" => Some(CampaignState::Failed),
            _ => None,
        }
    }
}

/// Modalidad de ejecución del ducto para una campaña.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignMode {
    /// Secuencia completa: generación → dns → http → features → scoring.
    FullPipeline,
    /// Detiene el ducto tras la validación DNS.
    DnsOnly,
    /// Omite la generación (dominios pre-sembrados) y ejecuta el sondeo HTTP.
    HttpOnly,
}

impl Default for CampaignMode {
    fn default() -> Self {
        CampaignMode::FullPipeline
    }
}

/// Unidad autónoma de prospección con parámetros, estado y salidas propias.
///
/// Una campaña posee en exclusiva sus dominios generados, resultados de
/// validación, filas de features y snapshots de scoring. Personas y Proxies
/// son recursos compartidos referenciados por identidad, nunca poseídos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub state: CampaignState,
    #[serde(default)]
    pub mode: CampaignMode,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Campaign {
    /// Forja una campaña en estado Draft lista para la ignición del ducto.
    pub fn new_draft(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            state: CampaignState::Draft,
            mode: CampaignMode::default(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}
