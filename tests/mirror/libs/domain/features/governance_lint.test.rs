/**
 * CERTIFICACIÓN: Lint de gobernanza del vector de features — allowlist
 * nominal, prefijo experimental y nominación de claves rechazadas.
 */
use std::collections::BTreeMap;

use dominion_domain_features::validate_feature_vector;

#[test]
fn certify_full_allowlist_is_admitted() {
    let vector = BTreeMap::from([
        ("kw_unique".to_string(), 4.0),
        ("kw_hits_total".to_string(), 9.0),
        ("content_bytes".to_string(), 2048.0),
        ("richness".to_string(), 0.42),
        ("microcrawl_gain_ratio".to_string(), 0.10),
        ("parked_confidence".to_string(), 0.05),
        ("richness_weights_version".to_string(), 2.0),
        ("richness_legacy_canary".to_string(), 0.33),
        ("exp_entropy_probe".to_string(), 0.7),
        ("exp_rich_diversity".to_string(), 0.5),
    ]);

    let verdict = validate_feature_vector(&vector);
    assert!(verdict.is_clean(), "allowlist + exp_* must pass: {:?}", verdict.disallowed_keys);
}

#[test]
fn certify_foreign_keys_are_rejected_by_name() {
    let vector = BTreeMap::from([
        ("kw_unique".to_string(), 4.0),
        ("rogue_metric".to_string(), 1.0),
        ("another_leak".to_string(), 2.0),
    ]);

    let verdict = validate_feature_vector(&vector);
    assert!(!verdict.is_clean());
    assert_eq!(
        verdict.disallowed_keys,
        vec!["another_leak".to_string(), "rogue_metric".to_string()],
        "every foreign key must be named in the verdict"
    );
}

#[test]
fn certify_prefix_matching_is_exact() {
    // 'experiment' no porta el prefijo 'exp_'; debe ser rechazada.
    let vector = BTreeMap::from([("experiment".to_string(), 1.0)]);
    let verdict = validate_feature_vector(&vector);
    assert_eq!(verdict.disallowed_keys, vec!["experiment".to_string()]);
}
