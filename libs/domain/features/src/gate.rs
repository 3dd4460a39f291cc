// [libs/domain/features/src/gate.rs]
/*!
 * =================================================================
 * APARATO: ADAPTIVE MICROCRAWL GATE (V2.3 - SATURATION MODEL)
 * CLASIFICACIÓN: DOMAIN ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: DECISIÓN COSTO/GANANCIA DEL CRAWL SECUNDARIO
 *
 * # Mathematical Proof (Saturation Monotonicity):
 * La ganancia esperada gap/target · (1 − e^{−λ·presupuesto}) decrece de
 * forma monótona con la riqueza y las únicas acumuladas; todo techo
 * superado mantiene la denegación bajo crecimiento posterior.
 * =================================================================
 */

use dominion_domain_models::config::MicrocrawlConfig;
use dominion_domain_models::features::FeatureAggregate;

/// Decide si el microcrawl secundario justifica su costo.
///
/// Deniega cuando cualquier condición de saturación se cumple; la compuerta
/// es pura y consume la configuración inmutable de la campaña.
pub fn should_microcrawl(aggregate: &FeatureAggregate, config: &MicrocrawlConfig) -> bool {
    let unique = aggregate.kw_unique_count as f64;
    let total = aggregate.kw_total_occurrences;
    let richness = aggregate.content_richness_score;

    // 1. SIN EVIDENCIA BASE: nada que enriquecer.
    if total == 0 && aggregate.kw_unique_count == 0 {
        return false;
    }

    // 2. TECHOS ABSOLUTOS DE SATURACIÓN
    if richness >= config.stop_richness_ceiling {
        return false;
    }
    if aggregate.kw_unique_count >= config.stop_unique_ceiling {
        return false;
    }

    // 3. BRECHA DE DIVERSIDAD AGOTADA
    let diversity_gap = config.diversity_target - unique;
    if diversity_gap <= 0.0 {
        return false;
    }

    // 4. GANANCIA RELATIVA ESPERADA BAJO EL MODELO DE SATURACIÓN
    let saturation = 1.0 - (-config.lambda * config.budget_pages as f64).exp();
    let expected_relative_gain = (diversity_gap / config.diversity_target) * saturation;
    if expected_relative_gain < config.min_relative_gain {
        return false;
    }

    // 5. TECHO COMPUESTO RIQUEZA/DIVERSIDAD
    let composite = 0.6 * richness + 0.4 * (unique / config.diversity_target).min(1.0);
    if composite >= config.composite_ceiling {
        return false;
    }

    true
}
