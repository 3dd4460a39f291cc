// [libs/domain/features/src/governance.rs]
/*!
 * =================================================================
 * APARATO: FEATURE VECTOR GOVERNANCE LINT (V2.2 - ALLOWLIST GUARD)
 * CLASIFICACIÓN: DOMAIN GOVERNANCE (ESTRATO L2)
 * RESPONSABILIDAD: CONTENCIÓN DEL VECTOR DE FEATURES BAJO ALLOWLIST
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. FAIL-OPEN PERSISTENCE: Una violación se registra y contabiliza, pero
 *    la fila se persiste si el resto del agregado es válido.
 * 2. CANARY SANCTIONED: 'richness_legacy_canary' está admitida de forma
 *    nominal como clave de observabilidad del canario V2.
 * =================================================================
 */

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

/// Claves admitidas de forma nominal en el vector gobernado.
const ALLOWED_KEYS: &[&str] = &[
    "kw_unique",
    "kw_hits_total",
    "content_bytes",
    "richness",
    "microcrawl_gain_ratio",
    "parked_confidence",
    "richness_weights_version",
    "richness_legacy_canary",
];

/// Prefijo experimental exento de la allowlist nominal.
const EXPERIMENTAL_PREFIX: &str = "exp_";

/// Contadores globales de violaciones y muestreo de ejemplos.
static VIOLATION_COUNTER: AtomicU64 = AtomicU64::new(0);
static VIOLATION_SAMPLE_COUNTER: AtomicU64 = AtomicU64::new(0);
const VIOLATION_SAMPLE_DENOMINATOR: u64 = 10;

/// Veredicto del lint de gobernanza sobre un vector de features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernanceVerdict {
    /// Claves rechazadas, en orden lexicográfico.
    pub disallowed_keys: Vec<String>,
}

impl GovernanceVerdict {
    pub fn is_clean(&self) -> bool {
        self.disallowed_keys.is_empty()
    }
}

/// Valida cada clave del vector contra la allowlist + prefijo experimental.
///
/// Las violaciones se contabilizan y un ejemplo muestreado se emite como
/// línea JSON estructurada; la decisión de persistencia pertenece al caller.
pub fn validate_feature_vector(feature_vector: &BTreeMap<String, f64>) -> GovernanceVerdict {
    let disallowed_keys: Vec<String> = feature_vector
        .keys()
        .filter(|key| !is_key_allowed(key))
        .cloned()
        .collect();

    if !disallowed_keys.is_empty() {
        VIOLATION_COUNTER.fetch_add(disallowed_keys.len() as u64, Ordering::Relaxed);

        let sample_index = VIOLATION_SAMPLE_COUNTER.fetch_add(1, Ordering::Relaxed);
        if sample_index % VIOLATION_SAMPLE_DENOMINATOR == 0 {
            warn!(
                target: "feature_governance",
                disallowed = %serde_json::json!(disallowed_keys),
                vector_len = feature_vector.len(),
                "🛡️  [GOVERNANCE_VIOLATION]: Feature vector carries keys outside the allowlist."
            );
        }
    }

    GovernanceVerdict { disallowed_keys }
}

pub fn is_key_allowed(key: &str) -> bool {
    key.starts_with(EXPERIMENTAL_PREFIX) || ALLOWED_KEYS.contains(&key)
}

/// Total acumulado de violaciones observadas por el proceso.
pub fn violation_total() -> u64 {
    VIOLATION_COUNTER.load(Ordering::Relaxed)
}
