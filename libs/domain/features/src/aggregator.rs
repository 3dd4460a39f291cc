// [libs/domain/features/src/aggregator.rs]
/*!
 * =================================================================
 * APARATO: FEATURE AGGREGATION ENGINE (V2.7 - PURE BUILDER)
 * CLASIFICACIÓN: DOMAIN ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: SEÑALES CRUDAS → AGREGADO GOBERNADO DE FEATURES
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TOTAL FUNCTION: La agregación jamás falla; entradas degeneradas
 *    producen el agregado de score cero con el marcador de versión V2.
 * 2. GOVERNED EMISSION: Toda clave emitida pasa por el lint de allowlist
 *    antes de abandonar el aparato.
 *
 * # Mathematical Proof (Top3 Invariant):
 * La ordenación (peso desc, keyword_id asc) es un orden total sobre los
 * candidatos; truncar a 3 tras ordenar preserva el invariante del podio.
 * =================================================================
 */

use std::collections::{BTreeMap, HashMap};

use dominion_domain_models::config::RichnessConfig;
use dominion_domain_models::features::{FeatureAggregate, PageArchetype, TopKeyword};
use dominion_domain_models::signals::{RawSignals, SignalType};

use crate::governance;
use crate::richness::{self, RichnessBreakdown};

/// Marcador de versión de pesos emitido en todo vector V2.
const RICHNESS_WEIGHTS_VERSION: f64 = 2.0;

/// Parámetros inmutables del constructor de features para una campaña.
#[derive(Debug, Clone)]
pub struct FeatureBuilderParams {
    pub richness: RichnessConfig,
    /// Emisión de la descomposición V2 bajo el prefijo experimental.
    pub emit_experimental_extras: bool,
}

impl Default for FeatureBuilderParams {
    fn default() -> Self {
        Self { richness: RichnessConfig::default(), emit_experimental_extras: false }
    }
}

/// Función pura señales → agregado de features gobernado.
pub fn build_features(signals: &RawSignals, params: &FeatureBuilderParams) -> FeatureAggregate {
    let hits = &signals.parsed_keyword_hits;

    // 1. CONTEOS FUNDAMENTALES
    let per_keyword_counts = richness::keyword_counts(hits);
    let signal_distribution = richness::signal_counts(hits);
    let kw_unique_count = per_keyword_counts.len() as u32;
    let kw_total_occurrences = hits.len() as u32;

    // 2. SUMA PONDERADA POR CLAVE (value_score 0 se trata como 1)
    let mut per_keyword_weights: HashMap<u64, f64> = HashMap::new();
    for hit in hits {
        let effective_value = if hit.value_score == 0.0 { 1.0 } else { hit.value_score };
        *per_keyword_weights.entry(hit.keyword_id).or_insert(0.0) +=
            hit.base_weight * effective_value;
    }
    let kw_weight_sum: f64 = per_keyword_weights.values().sum();

    // 3. PODIO TOP3 (peso desc, keyword_id asc)
    let mut podium: Vec<TopKeyword> = per_keyword_weights
        .iter()
        .map(|(keyword_id, weight_sum)| TopKeyword {
            keyword_id: *keyword_id,
            weight_sum: *weight_sum,
            occurrences: per_keyword_counts.get(keyword_id).copied().unwrap_or(0),
        })
        .collect();
    podium.sort_by(|a, b| {
        b.weight_sum
            .partial_cmp(&a.weight_sum)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.keyword_id.cmp(&b.keyword_id))
    });
    podium.truncate(3);

    // 4. SCORE DE RIQUEZA (V2 por defecto, legacy sólo vía canario)
    let breakdown = richness::v2_score(signals, &params.richness);
    let content_richness_score = if params.richness.v2_enabled || params.richness.canary_diff {
        breakdown.final_score
    } else {
        richness::legacy_score(signals)
    };
    let legacy_canary = if params.richness.canary_diff {
        Some(richness::canary_probe(signals, &params.richness, breakdown.final_score))
    } else {
        None
    };

    // 5. EMISIÓN GOBERNADA DEL VECTOR
    let feature_vector = emit_vector(
        signals,
        kw_unique_count,
        kw_total_occurrences,
        content_richness_score,
        &breakdown,
        legacy_canary,
        params,
    );
    governance::validate_feature_vector(&feature_vector);

    let page_archetype = infer_archetype(signals, content_richness_score, &signal_distribution);

    FeatureAggregate {
        kw_unique_count,
        kw_total_occurrences,
        kw_weight_sum,
        top3: podium,
        signal_distribution,
        content_richness_score,
        page_archetype,
        is_parked: signals.is_parked,
        parked_confidence: signals.parked_confidence,
        feature_vector,
    }
}

fn emit_vector(
    signals: &RawSignals,
    kw_unique_count: u32,
    kw_total_occurrences: u32,
    richness_score: f64,
    breakdown: &RichnessBreakdown,
    legacy_canary: Option<f64>,
    params: &FeatureBuilderParams,
) -> BTreeMap<String, f64> {
    let mut vector = BTreeMap::from([
        ("kw_unique".to_string(), kw_unique_count as f64),
        ("kw_hits_total".to_string(), kw_total_occurrences as f64),
        ("content_bytes".to_string(), signals.content_bytes as f64),
        ("richness_weights_version".to_string(), RICHNESS_WEIGHTS_VERSION),
    ]);

    if richness_score > 0.0 {
        vector.insert("richness".to_string(), richness_score);
    }
    if signals.microcrawl.is_some() {
        vector.insert("microcrawl_gain_ratio".to_string(), breakdown.microcrawl_gain);
    }
    if signals.parked_confidence > 0.0 {
        vector.insert("parked_confidence".to_string(), signals.parked_confidence);
    }
    if let Some(legacy) = legacy_canary {
        vector.insert("richness_legacy_canary".to_string(), legacy);
    }

    // Descomposición V2 bajo el prefijo experimental sancionado.
    let v2_ran = signals.content_bytes > 0 && !signals.parsed_keyword_hits.is_empty();
    if params.emit_experimental_extras && v2_ran {
        vector.insert("exp_rich_diversity".to_string(), breakdown.diversity);
        vector.insert("exp_rich_prominence".to_string(), breakdown.prominence);
        vector.insert("exp_rich_density".to_string(), breakdown.density);
        vector.insert("exp_rich_entropy".to_string(), breakdown.entropy);
        vector.insert("exp_rich_length".to_string(), breakdown.length_quality);
        vector.insert("exp_rich_stuffing_penalty".to_string(), breakdown.stuffing_penalty);
        vector.insert("exp_rich_repetition_penalty".to_string(), breakdown.repetition_penalty);
        vector.insert("exp_rich_anchor_penalty".to_string(), breakdown.anchor_penalty);
    }

    vector
}

/// Arquetipo de página inferido de la evidencia disponible.
fn infer_archetype(
    signals: &RawSignals,
    richness_score: f64,
    distribution: &BTreeMap<SignalType, u32>,
) -> PageArchetype {
    if signals.is_parked {
        return PageArchetype::Parked;
    }

    let total: u32 = distribution.values().sum();
    if total == 0 {
        return if signals.content_bytes == 0 { PageArchetype::Unknown } else { PageArchetype::Thin };
    }

    let anchor_share =
        distribution.get(&SignalType::Anchor).copied().unwrap_or(0) as f64 / total as f64;
    if anchor_share > 0.5 {
        PageArchetype::Navigational
    } else if richness_score >= 0.5 {
        PageArchetype::ContentRich
    } else if total < 3 || signals.content_bytes < 2_048 {
        PageArchetype::Thin
    } else {
        PageArchetype::Unknown
    }
}
