// [libs/domain/models-rs/src/config.rs]
/*!
 * =================================================================
 * APARATO: FLAG-DRIVEN CONFIG STRATA (V3.5 - IMMUTABLE SNAPSHOT)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONFIGURACIÓN INMUTABLE CARGADA UNA VEZ POR CAMPAÑA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SINGLE LOAD: Los flags de entorno se materializan una única vez en
 *    structs inmutables; ninguna fase re-consulta el entorno.
 * 2. NOMINAL KEYS: Las claves de entorno preservan los nombres canónicos
 *    del contrato operacional (RICHNESS_*, MICROCRAWL_*).
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;

use crate::signals::SignalType;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|raw| raw.trim().parse::<T>().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key).ok().map(|raw| {
        matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
    })
}

/// Configuración del validador DNS (C3) y su pool de resolutores (C2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsValidatorConfig {
    pub resolvers: Vec<String>,
    pub use_system_resolvers: bool,
    pub query_timeout_ms: u64,
    pub max_domains_per_request: usize,
    pub max_concurrent_goroutines: usize,
    /// Límite de dominios por segundo; 0 desactiva el token bucket.
    pub rate_limit_dps: u32,
    pub rate_limit_burst: u32,
}

impl Default for DnsValidatorConfig {
    fn default() -> Self {
        Self {
            resolvers: Vec::new(),
            use_system_resolvers: true,
            query_timeout_ms: 5_000,
            max_domains_per_request: 100,
            max_concurrent_goroutines: 10,
            rate_limit_dps: 0,
            rate_limit_burst: 0,
        }
    }
}

/// Configuración del sondeo HTTP (C4/C5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpValidatorConfig {
    pub default_user_agent: String,
    pub default_headers: Vec<(String, String)>,
    pub request_timeout_ms: u64,
    pub max_redirects: u32,
    pub follow_redirects: bool,
    pub max_domains_per_request: usize,
    pub allow_insecure_tls: bool,
    pub max_concurrent_goroutines: usize,
    pub max_body_read_bytes: usize,
}

impl Default for HttpValidatorConfig {
    fn default() -> Self {
        Self {
            default_user_agent: "DominionProbe/3.0".to_string(),
            default_headers: Vec::new(),
            request_timeout_ms: 15_000,
            max_redirects: 7,
            follow_redirects: true,
            max_domains_per_request: 50,
            allow_insecure_tls: false,
            max_concurrent_goroutines: 15,
            max_body_read_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Gobernanza del reconciliador y detección de scores obsoletos (C10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub reconcile_enabled: bool,
    pub reconcile_interval_secs: u64,
    pub stuck_running_max_age_secs: u64,
    pub stuck_pending_max_age_secs: u64,
    pub missing_feature_grace_secs: u64,
    pub max_retries: u32,
    pub stale_score_detection_enabled: bool,
    pub stale_score_max_age_secs: u64,
    /// Cobertura mínima exigida para sellar una fase, en [0,1].
    pub coverage_min: f64,
    pub reconcile_batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reconcile_enabled: true,
            reconcile_interval_secs: 600,
            stuck_running_max_age_secs: 1_800,
            stuck_pending_max_age_secs: 3_600,
            missing_feature_grace_secs: 300,
            max_retries: 3,
            stale_score_detection_enabled: true,
            stale_score_max_age_secs: 86_400,
            coverage_min: 0.95,
            reconcile_batch_size: 200,
        }
    }
}

/// Pesos por señal del término de prominencia de richness v2.
pub fn default_signal_weights() -> BTreeMap<SignalType, f64> {
    BTreeMap::from([
        (SignalType::Title, 10.0),
        (SignalType::H1, 7.0),
        (SignalType::Meta, 5.0),
        (SignalType::Anchor, 4.0),
        (SignalType::Body, 2.0),
        (SignalType::Microcrawl, 1.0),
    ])
}

/// Pesos de los componentes del score compuesto richness v2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RichnessWeights {
    pub diversity: f64,
    pub prominence: f64,
    pub density: f64,
    pub entropy: f64,
    pub length: f64,
    pub bonus_max: f64,
}

impl Default for RichnessWeights {
    fn default() -> Self {
        Self {
            diversity: 0.30,
            prominence: 0.25,
            density: 0.15,
            entropy: 0.15,
            length: 0.15,
            bonus_max: 0.25,
        }
    }
}

/// Configuración inmutable del agregador de riqueza (C7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RichnessConfig {
    pub v2_enabled: bool,
    /// Modo canario: calcula v2 y legacy, emitiendo el diff muestreado.
    pub canary_diff: bool,
    pub weights: RichnessWeights,
    pub signal_weights: BTreeMap<SignalType, f64>,
    pub diversity_target: f64,
    pub canary_sample_denominator: u32,
    /// Umbral de divergencia |v2 − legacy| que dispara el log canario.
    pub canary_diff_threshold: f64,
}

impl Default for RichnessConfig {
    fn default() -> Self {
        Self {
            v2_enabled: true,
            canary_diff: false,
            weights: RichnessWeights::default(),
            signal_weights: default_signal_weights(),
            diversity_target: 12.0,
            canary_sample_denominator: 20,
            canary_diff_threshold: 0.15,
        }
    }
}

impl RichnessConfig {
    /// Materializa la configuración desde el entorno (una sola lectura).
    ///
    /// Claves: RICHNESS_V2_ENABLED, RICHNESS_V2_CANARY_DIFF,
    /// RICHNESS_WEIGHT_JSON, RICHNESS_SIGNAL_WEIGHT_JSON,
    /// RICHNESS_DIVERSITY_TARGET, RICHNESS_CANARY_SAMPLE_DENOM.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(flag) = env_flag("RICHNESS_V2_ENABLED") {
            config.v2_enabled = flag;
        }
        if let Some(flag) = env_flag("RICHNESS_V2_CANARY_DIFF") {
            config.canary_diff = flag;
        }
        if let Ok(raw_weights) = env::var("RICHNESS_WEIGHT_JSON") {
            if let Ok(weights) = serde_json::from_str::<RichnessWeights>(&raw_weights) {
                config.weights = weights;
            }
        }
        if let Ok(raw_signal_weights) = env::var("RICHNESS_SIGNAL_WEIGHT_JSON") {
            if let Ok(signal_weights) =
                serde_json::from_str::<BTreeMap<SignalType, f64>>(&raw_signal_weights)
            {
                config.signal_weights = signal_weights;
            }
        }
        if let Some(target) = env_parse::<f64>("RICHNESS_DIVERSITY_TARGET") {
            if target > 0.0 {
                config.diversity_target = target;
            }
        }
        if let Some(denominator) = env_parse::<u32>("RICHNESS_CANARY_SAMPLE_DENOM") {
            if denominator > 0 {
                config.canary_sample_denominator = denominator;
            }
        }

        config
    }
}

/// Configuración inmutable de la compuerta de microcrawl (C8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicrocrawlConfig {
    pub stop_richness_ceiling: f64,
    pub stop_unique_ceiling: u32,
    pub min_relative_gain: f64,
    pub lambda: f64,
    pub budget_pages: u32,
    pub composite_ceiling: f64,
    pub diversity_target: f64,
}

impl Default for MicrocrawlConfig {
    fn default() -> Self {
        Self {
            stop_richness_ceiling: 0.72,
            stop_unique_ceiling: 20,
            min_relative_gain: 0.10,
            lambda: 0.25,
            budget_pages: 3,
            composite_ceiling: 0.62,
            diversity_target: 12.0,
        }
    }
}

impl MicrocrawlConfig {
    /// Claves: MICROCRAWL_STOP_RICHNESS, MICROCRAWL_STOP_UNIQUE,
    /// MICROCRAWL_MIN_REL_GAIN, MICROCRAWL_LAMBDA, MICROCRAWL_BUDGET_PAGES,
    /// MICROCRAWL_COMPOSITE_CEIL.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ceiling) = env_parse::<f64>("MICROCRAWL_STOP_RICHNESS") {
            config.stop_richness_ceiling = ceiling;
        }
        if let Some(ceiling) = env_parse::<u32>("MICROCRAWL_STOP_UNIQUE") {
            config.stop_unique_ceiling = ceiling;
        }
        if let Some(gain) = env_parse::<f64>("MICROCRAWL_MIN_REL_GAIN") {
            config.min_relative_gain = gain;
        }
        if let Some(lambda) = env_parse::<f64>("MICROCRAWL_LAMBDA") {
            config.lambda = lambda;
        }
        if let Some(pages) = env_parse::<u32>("MICROCRAWL_BUDGET_PAGES") {
            config.budget_pages = pages;
        }
        if let Some(ceiling) = env_parse::<f64>("MICROCRAWL_COMPOSITE_CEIL") {
            config.composite_ceiling = ceiling;
        }

        config
    }
}

/// Estrategia de barajado del selector sigiloso (C6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleStrategy {
    FullShuffle,
    BlockShuffle,
    Weighted,
    Interleaved,
}

/// Configuración por-fase del selector sigiloso.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StealthPhaseConfig {
    pub strategy: ShuffleStrategy,
    pub block_size: usize,
    /// Pistas de prioridad activas para la estrategia ponderada.
    pub priority_hints: Vec<String>,
    /// Fracción del universo a sondear; None ⇒ todo.
    pub subset_pct: Option<f64>,
    pub jitter_min_ms: u64,
    pub jitter_max_ms: u64,
}

impl StealthPhaseConfig {
    /// Defaults de la fase DNS: barajado completo, jitter corto.
    pub fn dns_defaults() -> Self {
        Self {
            strategy: ShuffleStrategy::FullShuffle,
            block_size: 100,
            priority_hints: Vec::new(),
            subset_pct: None,
            jitter_min_ms: 50,
            jitter_max_ms: 500,
        }
    }

    /// Defaults de la fase HTTP-keyword: intercalado, jitter amplio.
    pub fn http_defaults() -> Self {
        Self {
            strategy: ShuffleStrategy::Interleaved,
            block_size: 100,
            priority_hints: Vec::new(),
            subset_pct: None,
            jitter_min_ms: 150,
            jitter_max_ms: 2_500,
        }
    }
}
