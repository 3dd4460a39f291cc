// [apps/orchestrator/src/bootstrap.rs]
/*!
 * =================================================================
 * APARATO: ENVIRONMENT BOOTSTRAP (V3.4 - SINGLE LOAD STRATA)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L4)
 * RESPONSABILIDAD: MATERIALIZACIÓN ÚNICA DE LA CONFIGURACIÓN DEL DUCTO
 *
 * Los flags de entorno se leen una sola vez en la ignición y se congelan
 * en structs inmutables; ninguna fase re-consulta el entorno.
 * =================================================================
 */

use std::collections::HashMap;
use std::env;

use dominion_domain_models::config::{DnsValidatorConfig, HttpValidatorConfig, PipelineConfig};
use dominion_domain_models::persona::{DnsPersonaConfig, ResolverStrategy};
use dominion_domain_pipeline::KeywordSpec;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|raw| raw.trim().parse::<T>().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key).ok().map(|raw| {
        matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
    })
}

fn env_list(key: &str) -> Vec<String> {
    env::var(key)
        .ok()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Configuración del validador DNS desde el entorno.
pub fn dns_config_from_env() -> DnsValidatorConfig {
    let mut config = DnsValidatorConfig::default();

    config.resolvers = env_list("DNS_RESOLVERS");
    if let Some(flag) = env_flag("DNS_USE_SYSTEM_RESOLVERS") {
        config.use_system_resolvers = flag;
    }
    if let Some(timeout) = env_parse::<u64>("DNS_QUERY_TIMEOUT_MS") {
        config.query_timeout_ms = timeout;
    }
    if let Some(batch) = env_parse::<usize>("DNS_MAX_DOMAINS_PER_REQUEST") {
        config.max_domains_per_request = batch;
    }
    if let Some(concurrency) = env_parse::<usize>("DNS_MAX_CONCURRENT_GOROUTINES") {
        config.max_concurrent_goroutines = concurrency;
    }
    if let Some(rate) = env_parse::<u32>("DNS_RATE_LIMIT_DPS") {
        config.rate_limit_dps = rate;
    }
    if let Some(burst) = env_parse::<u32>("DNS_RATE_LIMIT_BURST") {
        config.rate_limit_burst = burst;
    }

    config
}

/// Persona DNS de la campaña desde el entorno.
pub fn dns_persona_from_env() -> DnsPersonaConfig {
    let mut persona = DnsPersonaConfig::default();

    persona.resolvers = env_list("DNS_RESOLVERS");
    persona.strategy = match env::var("DNS_RESOLVER_STRATEGY").ok().as_deref() {
        Some("sequential_failover") => ResolverStrategy::SequentialFailover,
        Some("weighted_rotation") => ResolverStrategy::WeightedRotation,
        _ => ResolverStrategy::RandomRotation,
    };
    if let Ok(raw_weights) = env::var("DNS_RESOLVERS_WEIGHTED") {
        if let Ok(weights) = serde_json::from_str::<HashMap<String, u32>>(&raw_weights) {
            persona.weights = weights;
        }
    }
    persona.preferred_order = env_list("DNS_RESOLVERS_PREFERRED_ORDER");
    if let Some(timeout) = env_parse::<u64>("DNS_QUERY_TIMEOUT_MS") {
        persona.query_timeout_ms = timeout;
    }
    if let Some(concurrency) = env_parse::<u32>("DNS_CONCURRENT_QUERIES_PER_DOMAIN") {
        persona.concurrent_queries_per_domain = concurrency;
    }
    if let Some(delay_min) = env_parse::<u64>("DNS_QUERY_DELAY_MIN_MS") {
        persona.query_delay_min_ms = delay_min;
    }
    if let Some(delay_max) = env_parse::<u64>("DNS_QUERY_DELAY_MAX_MS") {
        persona.query_delay_max_ms = delay_max.max(persona.query_delay_min_ms);
    }

    persona
}

/// Configuración del sondeo HTTP desde el entorno.
pub fn http_config_from_env() -> HttpValidatorConfig {
    let mut config = HttpValidatorConfig::default();

    if let Ok(user_agent) = env::var("HTTP_DEFAULT_USER_AGENT") {
        if !user_agent.trim().is_empty() {
            config.default_user_agent = user_agent;
        }
    }
    if let Ok(raw_headers) = env::var("HTTP_DEFAULT_HEADERS") {
        if let Ok(headers) = serde_json::from_str::<Vec<(String, String)>>(&raw_headers) {
            config.default_headers = headers;
        }
    }
    if let Some(timeout) = env_parse::<u64>("HTTP_REQUEST_TIMEOUT_MS") {
        config.request_timeout_ms = timeout;
    }
    if let Some(redirects) = env_parse::<u32>("HTTP_MAX_REDIRECTS") {
        config.max_redirects = redirects;
    }
    if let Some(flag) = env_flag("HTTP_FOLLOW_REDIRECTS") {
        config.follow_redirects = flag;
    }
    if let Some(batch) = env_parse::<usize>("HTTP_MAX_DOMAINS_PER_REQUEST") {
        config.max_domains_per_request = batch;
    }
    if let Some(flag) = env_flag("HTTP_ALLOW_INSECURE_TLS") {
        config.allow_insecure_tls = flag;
    }
    if let Some(concurrency) = env_parse::<usize>("HTTP_MAX_CONCURRENT_GOROUTINES") {
        config.max_concurrent_goroutines = concurrency;
    }
    if let Some(body_cap) = env_parse::<usize>("HTTP_MAX_BODY_READ_BYTES") {
        config.max_body_read_bytes = body_cap;
    }

    config
}

/// Gobernanza del reconciliador y detección de scores obsoletos.
pub fn pipeline_config_from_env() -> PipelineConfig {
    let mut config = PipelineConfig::default();

    if let Some(flag) = env_flag("RECONCILE_ENABLED") {
        config.reconcile_enabled = flag;
    }
    if let Some(interval) = env_parse::<u64>("RECONCILE_INTERVAL_SECS") {
        config.reconcile_interval_secs = interval;
    }
    if let Some(age) = env_parse::<u64>("STUCK_RUNNING_MAX_AGE_SECS") {
        config.stuck_running_max_age_secs = age;
    }
    if let Some(age) = env_parse::<u64>("STUCK_PENDING_MAX_AGE_SECS") {
        config.stuck_pending_max_age_secs = age;
    }
    if let Some(grace) = env_parse::<u64>("MISSING_FEATURE_GRACE_SECS") {
        config.missing_feature_grace_secs = grace;
    }
    if let Some(retries) = env_parse::<u32>("MAX_RETRIES") {
        config.max_retries = retries;
    }
    if let Some(flag) = env_flag("STALE_SCORE_DETECTION_ENABLED") {
        config.stale_score_detection_enabled = flag;
    }
    if let Some(age) = env_parse::<u64>("STALE_SCORE_MAX_AGE_SECS") {
        config.stale_score_max_age_secs = age;
    }
    if let Some(coverage) = env_parse::<f64>("COVERAGE_MIN") {
        config.coverage_min = coverage.clamp(0.0, 1.0);
    }

    config
}

/// Diccionario de la campaña: `forma[:peso[:valor]]` separado por comas.
pub fn parse_keyword_dictionary(raw: &str) -> Vec<KeywordSpec> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(index, entry)| {
            let mut segments = entry.split(':');
            let surface_form = segments.next().unwrap_or(entry).to_string();
            let base_weight =
                segments.next().and_then(|w| w.parse::<f64>().ok()).unwrap_or(1.0);
            let value_score =
                segments.next().and_then(|v| v.parse::<f64>().ok()).unwrap_or(1.0);
            KeywordSpec { id: index as u64 + 1, surface_form, base_weight, value_score }
        })
        .collect()
}
