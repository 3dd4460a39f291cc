/**
 * CERTIFICACIÓN: Extractor de evidencia — separación de señales por
 * superficie, pesos del diccionario y detección léxica de parking.
 */
use dominion_domain_models::signals::SignalType;
use dominion_domain_pipeline::{detect_parked, KeywordExtractor, KeywordSpec};

fn campaign_dictionary() -> KeywordExtractor {
    KeywordExtractor::new(vec![
        KeywordSpec::simple(10, "solar"),
        KeywordSpec { id: 20, surface_form: "inverter".into(), base_weight: 3.0, value_score: 2.0 },
        KeywordSpec::simple(30, "battery"),
    ])
}

#[test]
fn certify_signal_separation_and_weights() {
    let extractor = campaign_dictionary();
    let hits = extractor.extract(
        Some("Solar Inverter Specialists"),
        "We install solar panels, inverter arrays and battery walls. Solar since 2009.",
    );

    let title_ids: Vec<u64> = hits
        .iter()
        .filter(|hit| hit.signal_type == SignalType::Title)
        .map(|hit| hit.keyword_id)
        .collect();
    assert_eq!(title_ids, vec![10, 20]);

    let weighted_hit = hits.iter().find(|hit| hit.keyword_id == 20).unwrap();
    assert_eq!(weighted_hit.base_weight, 3.0);
    assert_eq!(weighted_hit.value_score, 2.0);

    let body_solar = hits
        .iter()
        .filter(|hit| hit.keyword_id == 10 && hit.signal_type == SignalType::Body)
        .count();
    assert_eq!(body_solar, 2, "case-insensitive body scan");
}

#[test]
fn certify_microcrawl_scan_carries_enrichment_signal() {
    let extractor = campaign_dictionary();
    let hits = extractor.extract_microcrawl("battery storage systems for solar homes");

    assert!(!hits.is_empty());
    assert!(hits.iter().all(|hit| hit.signal_type == SignalType::Microcrawl));
}

#[test]
fn certify_parking_markers_raise_confidence_monotonically() {
    let (clean, zero) = detect_parked("legitimate product catalogue");
    assert!(!clean);
    assert_eq!(zero, 0.0);

    let (single, low) = detect_parked("this domain is parked");
    let (double, high) = detect_parked("this domain is parked — buy this domain today");
    assert!(single && double);
    assert!(high > low, "more markers must raise confidence");
    assert!(high <= 0.95);
}
