// [libs/domain/models-rs/src/signals.rs]
/*!
 * =================================================================
 * APARATO: RAW SIGNAL MODELS (V3.1 - EVIDENCE SUBSTRATE)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: SEÑALES CRUDAS DE SONDEO PARA EL AGREGADOR
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Origen estructural de una coincidencia de palabra clave.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    Title,
    H1,
    Body,
    Anchor,
    Meta,
    Microcrawl,
    Derived,
}

impl SignalType {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalType::Title => "title",
            SignalType::H1 => "h1",
            SignalType::Body => "body",
            SignalType::Anchor => "anchor",
            SignalType::Meta => "meta",
            SignalType::Microcrawl => "microcrawl",
            SignalType::Derived => "derived",
        }
    }
}

/// Coincidencia individual de palabra clave con su evidencia posicional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordHit {
    pub keyword_id: u64,
    pub surface_form: String,
    pub signal_type: SignalType,
    pub position: u32,
    pub base_weight: f64,
    /// Valor semántico; 0 se trata como 1 en la suma ponderada.
    pub value_score: f64,
}

/// Evidencia añadida por el microcrawl secundario, si se ejecutó.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MicrocrawlSignals {
    /// Coincidencias únicas añadidas sobre la base.
    pub added_unique: u32,
    /// Únicas observadas en la página base (denominador relativo).
    pub base_unique: u32,
    /// Señal de retornos decrecientes detectada durante el crawl.
    pub diminishing_returns: bool,
}

/// Entrada pura del agregador de features (C7).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawSignals {
    pub html_bytes: u64,
    pub http_status: u16,
    pub fetch_latency_ms: u64,
    pub content_hash: Option<String>,
    pub content_bytes: u64,
    pub language: Option<String>,
    pub parsed_keyword_hits: Vec<KeywordHit>,
    pub microcrawl: Option<MicrocrawlSignals>,
    pub is_parked: bool,
    pub parked_confidence: f64,
}
