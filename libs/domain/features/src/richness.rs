// [libs/domain/features/src/richness.rs]
/*!
 * =================================================================
 * APARATO: RICHNESS SCORING ENGINE (V2.6 - COMPOSITE MASTER)
 * CLASIFICACIÓN: DOMAIN ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: SCORE COMPUESTO DE RIQUEZA CON PENALIZACIONES Y BONUS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. V2 DEFAULT: El compuesto V2 es la única ruta de producción; legacy
 *    sobrevive exclusivamente como canal lateral del canario.
 * 2. PURE MATH: Ninguna rama consulta el entorno; la configuración llega
 *    materializada e inmutable desde el arranque de la campaña.
 *
 * # Mathematical Proof (Boundedness):
 * Cada componente x_i ∈ [0,1] y Σw_i ≤ 1 ⇒ base ≤ 1. El bonus escala por
 * (1 + bonus_max·G) ≤ 1.25 y el clip final [0,1] sella el codominio.
 * =================================================================
 */

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use dominion_domain_models::config::RichnessConfig;
use dominion_domain_models::signals::{KeywordHit, MicrocrawlSignals, RawSignals, SignalType};

/// Contribución máxima de ocurrencias de título al término de prominencia.
const TITLE_OCCURRENCE_CAP: f64 = 2.0;
/// Umbral de participación que activa la penalización por stuffing.
const STUFFING_SHARE_FLOOR: f64 = 0.30;
const STUFFING_PENALTY_CAP: f64 = 0.15;
const REPETITION_SHARE_CEILING: f64 = 0.35;
const REPETITION_PENALTY: f64 = 0.04;
const ANCHOR_SHARE_CEILING: f64 = 0.55;
const ANCHOR_PENALTY: f64 = 0.03;

/// Contador global del muestreo canario (1 de cada N divergencias).
static CANARY_SAMPLE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Descomposición auditable del score V2.
#[derive(Debug, Clone, Default)]
pub struct RichnessBreakdown {
    pub diversity: f64,
    pub prominence: f64,
    pub density: f64,
    pub entropy: f64,
    pub length_quality: f64,
    pub stuffing_penalty: f64,
    pub repetition_penalty: f64,
    pub anchor_penalty: f64,
    pub microcrawl_gain: f64,
    pub final_score: f64,
}

/// Score legacy: densidad simple con bonus por pluralidad de señales.
///
/// `min(1, (total / max(1, content_kb)) / 5) × (1.05 si |hits| > 3)`,
/// acotado inferiormente en 0.
pub fn legacy_score(signals: &RawSignals) -> f64 {
    let total_occurrences = signals.parsed_keyword_hits.len() as f64;
    let content_kb = (signals.content_bytes as f64 / 1024.0).max(1.0);

    let base = ((total_occurrences / content_kb) / 5.0).min(1.0);
    let plurality_bonus = if signals.parsed_keyword_hits.len() > 3 { 1.05 } else { 1.0 };

    (base * plurality_bonus).max(0.0)
}

/// Score compuesto richness v2 con su descomposición completa.
///
/// Entradas degeneradas (`content_bytes = 0 ∨ total = 0`) producen el
/// agregado de score cero sin fallo.
pub fn v2_score(signals: &RawSignals, config: &RichnessConfig) -> RichnessBreakdown {
    let hits = &signals.parsed_keyword_hits;
    let total = hits.len() as f64;

    if signals.content_bytes == 0 || hits.is_empty() {
        return RichnessBreakdown::default();
    }

    let per_keyword_counts = keyword_counts(hits);
    let per_signal_counts = signal_counts(hits);
    let content_kb = (signals.content_bytes as f64 / 1024.0).max(1.0);

    // 1. DIVERSIDAD EFECTIVA: claves con evidencia repetida o multi-señal.
    let effective_unique = effective_unique_count(hits, &per_keyword_counts) as f64;
    let diversity = 1.0 - (-effective_unique / config.diversity_target).exp();

    // 2. PROMINENCIA: suma ponderada por señal con tope de título.
    let mut prominence_numerator = 0.0;
    for (signal, occurrences) in &per_signal_counts {
        let weight = config.signal_weights.get(signal).copied().unwrap_or(0.0);
        let effective_occurrences = if *signal == SignalType::Title {
            (*occurrences as f64).min(TITLE_OCCURRENCE_CAP)
        } else {
            *occurrences as f64
        };
        prominence_numerator += effective_occurrences * weight;
    }
    let mut prominence = (prominence_numerator / (total * 10.0)).min(1.0);
    if total < 3.0 && prominence < 0.15 {
        // Amortiguación de evidencia escasa.
        prominence = prominence * 0.5 + 0.075;
    }

    // 3. DENSIDAD ACOTADA
    let density = (total / content_kb).min(6.0) / 6.0;

    // 4. ENTROPÍA DE SEÑALES NORMALIZADA
    let signal_cardinality = per_signal_counts.len();
    let entropy = if signal_cardinality > 1 {
        let mut shannon = 0.0;
        for occurrences in per_signal_counts.values() {
            let p = *occurrences as f64 / total;
            shannon -= p * p.log2();
        }
        shannon / (signal_cardinality as f64).log2()
    } else {
        0.0
    };

    // 5. CALIDAD DE LONGITUD con degradación por sobre-extensión.
    let capped_kb = content_kb.min(200.0);
    let mut length_quality = (capped_kb / 80.0).min(1.0);
    if content_kb > 160.0 {
        length_quality *= 0.8;
    } else if content_kb > 80.0 {
        length_quality *= 0.9;
    }

    // 6. PENALIZACIONES ADITIVAS ACOTADAS
    let max_share = per_keyword_counts
        .values()
        .map(|count| *count as f64 / total)
        .fold(0.0, f64::max);
    let stuffing_penalty = ((max_share - STUFFING_SHARE_FLOOR) * 0.5).max(0.0).min(STUFFING_PENALTY_CAP);
    let repetition_penalty =
        if max_share > REPETITION_SHARE_CEILING { REPETITION_PENALTY } else { 0.0 };
    let anchor_occurrences = per_signal_counts.get(&SignalType::Anchor).copied().unwrap_or(0) as f64;
    let anchor_share = anchor_occurrences / total;
    let anchor_penalty = if anchor_share > ANCHOR_SHARE_CEILING { ANCHOR_PENALTY } else { 0.0 };

    // 7. GANANCIA DE ENRIQUECIMIENTO (microcrawl)
    let microcrawl_gain = signals
        .microcrawl
        .as_ref()
        .map(enrichment_gain)
        .unwrap_or(0.0);

    // 8. COMPOSICIÓN FINAL
    let weights = &config.weights;
    let base = weights.diversity * diversity
        + weights.prominence * prominence
        + weights.density * density
        + weights.entropy * entropy
        + weights.length * length_quality;
    let bonus = weights.bonus_max * microcrawl_gain;
    let penalties = stuffing_penalty + repetition_penalty + anchor_penalty;
    let final_score = (base * (1.0 + bonus) - penalties).clamp(0.0, 1.0);

    RichnessBreakdown {
        diversity,
        prominence,
        density,
        entropy,
        length_quality,
        stuffing_penalty,
        repetition_penalty,
        anchor_penalty,
        microcrawl_gain,
        final_score,
    }
}

/// Ganancia relativa+absoluta del microcrawl, amortiguada en retornos
/// decrecientes.
fn enrichment_gain(microcrawl: &MicrocrawlSignals) -> f64 {
    let added = microcrawl.added_unique as f64;
    let base = microcrawl.base_unique as f64;

    let relative = added / (base + 4.0);
    let absolute = added / 40.0;
    let mut gain = (0.5 * relative + 0.5 * absolute).min(1.0);
    if microcrawl.diminishing_returns {
        gain *= 0.7;
    }
    gain
}

/// Evalúa el canario legacy↔v2 y devuelve el score legacy para el vector.
///
/// Divergencias |v2 − legacy| sobre el umbral emiten un log estructurado
/// muestreado de forma determinista (1 de cada `canary_sample_denominator`).
pub fn canary_probe(signals: &RawSignals, config: &RichnessConfig, v2: f64) -> f64 {
    let legacy = legacy_score(signals);
    let divergence = (v2 - legacy).abs();

    if divergence > config.canary_diff_threshold {
        let sample_index = CANARY_SAMPLE_COUNTER.fetch_add(1, Ordering::Relaxed);
        if sample_index % config.canary_sample_denominator.max(1) as u64 == 0 {
            info!(
                target: "richness_canary",
                richness_v2 = v2,
                richness_legacy = legacy,
                divergence,
                content_bytes = signals.content_bytes,
                hit_count = signals.parsed_keyword_hits.len(),
                "🕯️  [RICHNESS_CANARY]: Divergence above threshold."
            );
        }
    }

    legacy
}

pub(crate) fn keyword_counts(hits: &[KeywordHit]) -> HashMap<u64, u32> {
    let mut counts: HashMap<u64, u32> = HashMap::new();
    for hit in hits {
        *counts.entry(hit.keyword_id).or_insert(0) += 1;
    }
    counts
}

pub(crate) fn signal_counts(hits: &[KeywordHit]) -> BTreeMap<SignalType, u32> {
    let mut counts: BTreeMap<SignalType, u32> = BTreeMap::new();
    for hit in hits {
        *counts.entry(hit.signal_type).or_insert(0) += 1;
    }
    counts
}

/// Únicas efectivas: claves con ≥ 2 ocurrencias o presentes en ≥ 2 señales.
fn effective_unique_count(hits: &[KeywordHit], counts: &HashMap<u64, u32>) -> usize {
    let mut signals_per_keyword: HashMap<u64, HashSet<SignalType>> = HashMap::new();
    for hit in hits {
        signals_per_keyword.entry(hit.keyword_id).or_default().insert(hit.signal_type);
    }

    counts
        .iter()
        .filter(|(keyword_id, count)| {
            **count >= 2
                || signals_per_keyword
                    .get(keyword_id)
                    .map(|signals| signals.len() >= 2)
                    .unwrap_or(false)
        })
        .count()
}
