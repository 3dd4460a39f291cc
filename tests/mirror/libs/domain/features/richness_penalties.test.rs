/**
 * CERTIFICACIÓN: Penalizaciones del compuesto richness V2 — stuffing por
 * participación dominante y castigo por saturación de anchors.
 */
use dominion_domain_features::v2_score;
use dominion_domain_models::config::RichnessConfig;
use dominion_domain_models::signals::{KeywordHit, RawSignals, SignalType};

fn hit(keyword_id: u64, signal: SignalType) -> KeywordHit {
    KeywordHit {
        keyword_id,
        surface_form: format!("kw{}", keyword_id),
        signal_type: signal,
        position: 0,
        base_weight: 1.0,
        value_score: 1.0,
    }
}

fn signals_with(hits: Vec<KeywordHit>) -> RawSignals {
    RawSignals { content_bytes: 16 * 1024, parsed_keyword_hits: hits, ..RawSignals::default() }
}

#[test]
fn certify_stuffing_penalty_on_dominant_share() {
    // 6 de 10 ocurrencias pertenecen a k1 (share 0.6 > 0.30).
    let mut hits = Vec::new();
    for _ in 0..6 {
        hits.push(hit(1, SignalType::Body));
    }
    for keyword_id in 2..6u64 {
        hits.push(hit(keyword_id, SignalType::Body));
    }

    let breakdown = v2_score(&signals_with(hits), &RichnessConfig::default());

    assert!(breakdown.stuffing_penalty > 0.0, "dominant share must trigger stuffing");
    assert!(breakdown.stuffing_penalty <= 0.15, "stuffing penalty is capped");
    // share 0.6 ⇒ (0.6 − 0.30) × 0.5 = 0.15 exacto en el tope.
    assert!((breakdown.stuffing_penalty - 0.15).abs() < 1e-9);
    // share 0.6 > 0.35 también dispara la penalización por repetición.
    assert!((breakdown.repetition_penalty - 0.04).abs() < 1e-9);
}

#[test]
fn certify_balanced_page_has_no_stuffing() {
    let hits: Vec<KeywordHit> =
        (0..10u64).map(|keyword_id| hit(keyword_id, SignalType::Body)).collect();
    let breakdown = v2_score(&signals_with(hits), &RichnessConfig::default());
    assert_eq!(breakdown.stuffing_penalty, 0.0);
    assert_eq!(breakdown.repetition_penalty, 0.0);
}

#[test]
fn certify_anchor_saturation_costs_at_least_three_points() {
    // Base: 10 hits distribuidos en body; variante: 6 de 10 en anchors.
    let body_hits: Vec<KeywordHit> =
        (0..10u64).map(|keyword_id| hit(keyword_id, SignalType::Body)).collect();
    let mut anchor_hits: Vec<KeywordHit> =
        (0..6u64).map(|keyword_id| hit(keyword_id, SignalType::Anchor)).collect();
    anchor_hits.extend((6..10u64).map(|keyword_id| hit(keyword_id, SignalType::Body)));

    let config = RichnessConfig::default();
    let baseline = v2_score(&signals_with(body_hits), &config);
    let saturated = v2_score(&signals_with(anchor_hits), &config);

    assert_eq!(baseline.anchor_penalty, 0.0);
    assert!((saturated.anchor_penalty - 0.03).abs() < 1e-9, "anchor share 0.6 > 0.55");
}

#[test]
fn certify_title_occurrence_cap_limits_prominence() {
    let config = RichnessConfig::default();

    // 2 títulos + 8 body vs 6 títulos + 4 body: el tope de título (2) y el
    // clip a 1 del término de prominencia igualan ambos numeradores por
    // encima del denominador común.
    let two_titles: Vec<KeywordHit> = (0..2u64)
        .map(|keyword_id| hit(keyword_id, SignalType::Title))
        .chain((2..10u64).map(|keyword_id| hit(keyword_id, SignalType::Body)))
        .collect();
    let six_titles: Vec<KeywordHit> = (0..6u64)
        .map(|keyword_id| hit(keyword_id, SignalType::Title))
        .chain((6..10u64).map(|keyword_id| hit(keyword_id, SignalType::Body)))
        .collect();

    let capped = v2_score(&signals_with(six_titles), &config);
    let reference = v2_score(&signals_with(two_titles), &config);

    // Con el tope: 2×10 + 4×2 = 28 < 2×10 + 8×2 = 36; el exceso de títulos
    // no aporta más prominencia que su tope.
    assert!(capped.prominence <= reference.prominence + 1e-9);
}
