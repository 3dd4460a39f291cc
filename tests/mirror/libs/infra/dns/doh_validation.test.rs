/**
 * CERTIFICACIÓN: Canal DoH contra fixtures simulados — resolución dual
 * A/AAAA (E3), NXDOMAIN (E4), timeout de presupuesto (E5) y cancelación
 * durante el jitter de consulta.
 */
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dominion_domain_models::config::DnsValidatorConfig;
use dominion_domain_models::persona::DnsPersonaConfig;
use dominion_domain_models::validation::DnsValidationStatus;
use dominion_infra_dns::DnsValidator;

fn persona_for(endpoint: String, query_timeout_ms: u64) -> DnsPersonaConfig {
    DnsPersonaConfig {
        resolvers: vec![endpoint],
        query_timeout_ms,
        ..DnsPersonaConfig::default()
    }
}

fn base_config() -> DnsValidatorConfig {
    DnsValidatorConfig { use_system_resolvers: false, ..DnsValidatorConfig::default() }
}

#[tokio::test]
async fn certify_dual_stack_resolution_via_doh() {
    println!("\n🚀 [AUDIT]: Initiating DoH Resolution Audit (E3)...");
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dns-query"))
        .and(query_param("name", "example.com."))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Status": 0,
            "Answer": [
                { "name": "example.com.", "type": 1, "TTL": 300, "data": "1.2.3.4" },
                { "name": "example.com.", "type": 28, "TTL": 300, "data": "2606:2800::1" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/dns-query", mock_server.uri());
    let validator =
        DnsValidator::new(&base_config(), persona_for(endpoint, 2_000)).expect("validator ignition");

    let result = validator.validate("example.com", &CancellationToken::new()).await;

    assert_eq!(result.status, DnsValidationStatus::Resolved);
    assert!(result.ips.contains(&"1.2.3.4".to_string()), "A record harvested");
    assert!(result.ips.contains(&"2606:2800::1".to_string()), "AAAA record harvested");
    assert_eq!(result.ips.len(), 2, "union must be deduplicated");
    assert!(result.resolver_used.is_some());
    println!("   ✅ Dual-stack verdict sealed: {:?}", result.ips);
}

#[tokio::test]
async fn certify_nxdomain_maps_to_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dns-query"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "Status": 3 })),
        )
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/dns-query", mock_server.uri());
    let validator =
        DnsValidator::new(&base_config(), persona_for(endpoint, 2_000)).expect("validator ignition");

    let result = validator.validate("example.com", &CancellationToken::new()).await;

    assert_eq!(result.status, DnsValidationStatus::NotFound);
    assert!(result.ips.is_empty());
}

#[tokio::test]
async fn certify_slow_resolver_times_out() {
    let mock_server = MockServer::start().await;

    // El fixture duerme 3 s; el presupuesto de consulta es 1 s.
    Mock::given(method("GET"))
        .and(path("/dns-query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "Status": 0, "Answer": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/dns-query", mock_server.uri());
    let validator =
        DnsValidator::new(&base_config(), persona_for(endpoint, 1_000)).expect("validator ignition");

    let result = validator.validate("example.com", &CancellationToken::new()).await;

    assert_eq!(result.status, DnsValidationStatus::Timeout);
}

#[tokio::test]
async fn certify_cancellation_during_query_delay() {
    let mock_server = MockServer::start().await;
    let endpoint = format!("{}/dns-query", mock_server.uri());

    let mut persona = persona_for(endpoint, 2_000);
    persona.query_delay_min_ms = 5_000;
    persona.query_delay_max_ms = 5_000;

    let validator = DnsValidator::new(&base_config(), persona).expect("validator ignition");

    let cancellation_token = CancellationToken::new();
    let trigger = cancellation_token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = validator.validate("example.com", &cancellation_token).await;

    assert_eq!(result.status, DnsValidationStatus::Error);
    assert_eq!(result.error.as_deref(), Some("Context canceled during query delay"));
}

#[tokio::test]
async fn certify_batch_preserves_input_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dns-query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Status": 0,
            "Answer": [ { "name": "x.", "type": 1, "TTL": 60, "data": "203.0.113.7" } ]
        })))
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/dns-query", mock_server.uri());
    let validator =
        DnsValidator::new(&base_config(), persona_for(endpoint, 2_000)).expect("validator ignition");

    let domains =
        vec!["alpha.com".to_string(), "beta.com".to_string(), "gamma.com".to_string()];
    let results = validator.validate_many(&domains, &CancellationToken::new()).await;

    assert_eq!(results.len(), 3);
    for (domain, result) in domains.iter().zip(&results) {
        assert_eq!(&result.domain, domain);
        assert_eq!(result.status, DnsValidationStatus::Resolved);
    }
}
