/**
 * CERTIFICACIÓN: Paridad de serialización de los contratos soberanos —
 * etiquetas snake_case, despacho polimórfico de personas y estabilidad
 * del identificador de eventos.
 */
use dominion_domain_models::config::ShuffleStrategy;
use dominion_domain_models::events::{PhaseEvent, PhaseEventType, PipelinePhase};
use dominion_domain_models::persona::{
    DnsPersonaConfig, HttpPersonaConfig, Persona, PersonaKind, ResolverStrategy,
};
use dominion_domain_models::validation::DnsValidationStatus;
use uuid::Uuid;

#[test]
fn certify_status_labels_are_snake_case() {
    assert_eq!(
        serde_json::to_value(DnsValidationStatus::NotFound).unwrap(),
        serde_json::json!("not_found")
    );
    assert_eq!(
        serde_json::to_value(ResolverStrategy::SequentialFailover).unwrap(),
        serde_json::json!("sequential_failover")
    );
    assert_eq!(
        serde_json::to_value(ShuffleStrategy::BlockShuffle).unwrap(),
        serde_json::json!("block_shuffle")
    );
}

#[test]
fn certify_persona_polymorphic_dispatch() {
    let dns_persona = Persona::dns(
        "stealth-dns",
        DnsPersonaConfig {
            resolvers: vec!["1.1.1.1".to_string()],
            strategy: ResolverStrategy::WeightedRotation,
            ..DnsPersonaConfig::default()
        },
    );

    let wire_frame = serde_json::to_value(&dns_persona).unwrap();
    assert_eq!(wire_frame["kind"]["persona_type"], "dns");
    assert_eq!(wire_frame["kind"]["config"]["strategy"], "weighted_rotation");

    let rehydrated: Persona = serde_json::from_value(wire_frame).unwrap();
    match rehydrated.kind {
        PersonaKind::Dns(config) => assert_eq!(config.resolvers, vec!["1.1.1.1".to_string()]),
        PersonaKind::Http(_) => panic!("polymorphic tag drifted"),
    }
}

#[test]
fn certify_http_persona_defaults_survive_partial_json() {
    // Una persona mínima hereda los defaults serde del contrato.
    let partial: HttpPersonaConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(partial.request_timeout_ms, 15_000);
    assert!(partial.accepted_status_codes.is_empty());
    assert!(partial.default_headers.is_empty());
}

#[test]
fn certify_event_identity_format() {
    let campaign_id = Uuid::new_v4();
    let event = PhaseEvent::new(
        campaign_id,
        PhaseEventType::PhaseStart,
        PipelinePhase::Generation,
        "ignition",
    );

    // event_id = campaign_id + "-" + unix_nanos
    let (prefix, nanos) = event.event_id.split_at(campaign_id.to_string().len());
    assert_eq!(prefix, campaign_id.to_string());
    assert!(nanos.starts_with('-'));
    assert!(nanos[1..].parse::<i64>().is_ok(), "suffix must be unix nanos");
}
