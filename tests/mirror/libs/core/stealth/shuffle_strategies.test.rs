/**
 * CERTIFICACIÓN: Integridad de multiconjunto, prioridad de cubos y
 * cobertura de ronda del intercalado sigiloso.
 */
use std::collections::HashSet;

use dominion_core_stealth::{classify_label, interleaved_shuffle, randomize, LabelPattern};
use dominion_domain_models::config::{ShuffleStrategy, StealthPhaseConfig};

fn seeded_universe() -> Vec<String> {
    let mut universe = Vec::new();
    for index in 0..40 {
        universe.push(format!("{:03}.com", index)); // numeric
        universe.push(format!("cloud{}.com", index)); // mixed
        universe.push(format!("qx{}.com", "z".repeat(20 + index % 3))); // random
    }
    universe.push("shop.com".to_string()); // dictionary
    universe.push("zp.com".to_string()); // short
    universe
}

#[test]
fn certify_randomize_preserves_universe_under_every_strategy() {
    println!("\n🚀 [AUDIT]: Initiating Stealth Shuffle Multiset Audit...");
    let mut technical_error_accumulator = 0;

    let strategies = [
        ShuffleStrategy::FullShuffle,
        ShuffleStrategy::BlockShuffle,
        ShuffleStrategy::Weighted,
        ShuffleStrategy::Interleaved,
    ];

    for strategy in strategies {
        let mut config = StealthPhaseConfig::dns_defaults();
        config.strategy = strategy;
        config.priority_hints = vec!["short".to_string(), "dictionary".to_string()];

        let universe = seeded_universe();
        let mut expected = universe.clone();
        let mut randomized = randomize(universe, &config);

        expected.sort();
        randomized.sort();

        if expected == randomized {
            println!("   ✅ Strategy {:?}: multiset preserved.", strategy);
        } else {
            println!("   ❌ ERROR: Strategy {:?} dropped or duplicated candidates.", strategy);
            technical_error_accumulator += 1;
        }
    }

    assert_eq!(technical_error_accumulator, 0, "Shuffle multiset integrity compromised.");
}

#[test]
fn certify_subset_truncation_before_shuffle() {
    let mut config = StealthPhaseConfig::http_defaults();
    config.subset_pct = Some(0.25);

    let universe = seeded_universe();
    let expected_len = ((universe.len() as f64) * 0.25).floor() as usize;
    let randomized = randomize(universe, &config);

    assert_eq!(randomized.len(), expected_len.max(1));
}

#[test]
fn certify_interleaved_head_spans_distinct_patterns() {
    // Con los 5 grupos poblados, la primera ronda extrae uno de cada patrón.
    let universe = vec![
        "123.com".to_string(),
        "456.com".to_string(),
        "cloud.com".to_string(),
        "shop.com".to_string(),
        "abc9.com".to_string(),
        "xyz7.com".to_string(),
        "qwrtz.com".to_string(),
        "zzzzzzzzzzzzzzzzzzzz.com".to_string(),
    ];

    let interleaved = interleaved_shuffle(universe);
    let head_patterns: HashSet<LabelPattern> = interleaved
        .iter()
        .take(5)
        .map(|domain| classify_label(domain.split('.').next().unwrap()))
        .collect();

    assert_eq!(head_patterns.len(), 5, "first round must span every populated group");
}
