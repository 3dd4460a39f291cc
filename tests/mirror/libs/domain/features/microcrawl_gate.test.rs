/**
 * CERTIFICACIÓN: Monotonía de la compuerta de microcrawl — cruzar el techo
 * de riqueza voltea la decisión a falso y la mantiene falsa.
 */
use dominion_domain_features::should_microcrawl;
use dominion_domain_models::config::MicrocrawlConfig;
use dominion_domain_models::features::FeatureAggregate;

fn aggregate(unique: u32, total: u32, richness: f64) -> FeatureAggregate {
    FeatureAggregate {
        kw_unique_count: unique,
        kw_total_occurrences: total,
        content_richness_score: richness,
        ..FeatureAggregate::default()
    }
}

#[test]
fn certify_richness_sweep_is_monotonic() {
    println!("\n🚀 [AUDIT]: Initiating Microcrawl Gate Monotonicity Sweep...");
    let config = MicrocrawlConfig::default();

    let mut previous_decision = true;
    let mut flips = 0;

    // Barrido ascendente de riqueza con el resto de entradas fijas.
    for step in 0..=100 {
        let richness = step as f64 / 100.0;
        let decision = should_microcrawl(&aggregate(4, 8, richness), &config);

        if decision != previous_decision {
            flips += 1;
            println!("   🎯 Flip at richness = {:.2} -> {}", richness, decision);
            assert!(!decision, "decision may only flip from true to false");
        }
        previous_decision = decision;
    }

    assert_eq!(flips, 1, "exactly one true→false flip across the sweep");
    assert!(!should_microcrawl(&aggregate(4, 8, 0.99), &config));
}

#[test]
fn certify_ceiling_boundary_is_inclusive() {
    let config = MicrocrawlConfig::default();
    assert!(should_microcrawl(&aggregate(4, 8, config.stop_richness_ceiling - 0.01), &config));
    assert!(!should_microcrawl(&aggregate(4, 8, config.stop_richness_ceiling), &config));
}

#[test]
fn certify_overrides_shift_the_flip_point() {
    let mut config = MicrocrawlConfig::default();
    config.stop_richness_ceiling = 0.40;

    assert!(should_microcrawl(&aggregate(4, 8, 0.39), &config));
    assert!(!should_microcrawl(&aggregate(4, 8, 0.40), &config));
}
