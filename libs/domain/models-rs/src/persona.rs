// [libs/domain/models-rs/src/persona.rs]
/*!
 * =================================================================
 * APARATO: PERSONA DOMAIN MODELS (V3.2 - POLYMORPHIC PROBE PROFILES)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: PERFILES DE COMPORTAMIENTO DE SONDEO HTTP / DNS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TAGGED DISPATCH: Enum etiquetado 'persona_type'/'config' espejo del
 *    despacho polimórfico de estrategias del Ledger.
 * 2. SHARED RESOURCE: Las personas se referencian por identidad desde las
 *    campañas; jamás se poseen ni se mutan durante una fase.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Política de selección de resolutores para una persona DNS.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResolverStrategy {
    RandomRotation,
    SequentialFailover,
    WeightedRotation,
}

impl Default for ResolverStrategy {
    fn default() -> Self {
        ResolverStrategy::RandomRotation
    }
}

/// Modo de gestión de cookies del cliente HTTP por-fetch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CookieMode {
    None,
    Session,
}

impl Default for CookieMode {
    fn default() -> Self {
        CookieMode::None
    }
}

/// Perfil de sondeo HTTP: cabeceras, redirecciones y política de aceptación.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HttpPersonaConfig {
    pub user_agent: Option<String>,
    /// Mapa ordenado de cabeceras; la última escritura por clave prevalece.
    #[serde(default)]
    pub default_headers: Vec<(String, String)>,
    pub follow_redirects: Option<bool>,
    #[serde(default)]
    pub max_redirects: u32,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    pub http2_enabled: Option<bool>,
    #[serde(default)]
    pub cookie_mode: CookieMode,
    /// Conjunto de códigos aceptados; vacío ⇒ regla 2xx.
    #[serde(default)]
    pub accepted_status_codes: Vec<u16>,
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

/// Perfil de sondeo DNS: resolutores, estrategia de rotación y cadencia.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsPersonaConfig {
    /// Secuencia ordenada de direcciones de resolutores (ip, ip:puerto o URL DoH).
    pub resolvers: Vec<String>,
    #[serde(default)]
    pub strategy: ResolverStrategy,
    /// Pesos positivos por resolutor para la rotación ponderada.
    #[serde(default)]
    pub weights: HashMap<String, u32>,
    /// Subsecuencia de 'resolvers' que define el orden de failover.
    #[serde(default)]
    pub preferred_order: Vec<String>,
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
    #[serde(default = "default_concurrent_queries")]
    pub concurrent_queries_per_domain: u32,
    /// Jitter uniforme previo a cada ciclo de consulta. Invariante: min ≤ max.
    #[serde(default)]
    pub query_delay_min_ms: u64,
    #[serde(default)]
    pub query_delay_max_ms: u64,
}

fn default_query_timeout_ms() -> u64 {
    5_000
}

fn default_concurrent_queries() -> u32 {
    2
}

impl Default for DnsPersonaConfig {
    fn default() -> Self {
        Self {
            resolvers: Vec::new(),
            strategy: ResolverStrategy::default(),
            weights: HashMap::new(),
            preferred_order: Vec::new(),
            query_timeout_ms: default_query_timeout_ms(),
            concurrent_queries_per_domain: default_concurrent_queries(),
            query_delay_min_ms: 0,
            query_delay_max_ms: 0,
        }
    }
}

/// Persona polimórfica adjuntable a una campaña.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "persona_type", content = "config", rename_all = "snake_case")]
pub enum PersonaKind {
    Http(HttpPersonaConfig),
    Dns(DnsPersonaConfig),
}

/// Persona nominada y referenciable por las campañas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: Uuid,
    pub name: String,
    pub kind: PersonaKind,
}

impl Persona {
    pub fn http(name: impl Into<String>, config: HttpPersonaConfig) -> Self {
        Self { id: Uuid::new_v4(), name: name.into(), kind: PersonaKind::Http(config) }
    }

    pub fn dns(name: impl Into<String>, config: DnsPersonaConfig) -> Self {
        Self { id: Uuid::new_v4(), name: name.into(), kind: PersonaKind::Dns(config) }
    }
}
