/**
 * CERTIFICACIÓN: Gate sintáctico previo al consumo de resolutores —
 * el rechazo no registra resolutor y porta el mensaje nominal.
 */
use tokio_util::sync::CancellationToken;

use dominion_domain_models::config::DnsValidatorConfig;
use dominion_domain_models::persona::DnsPersonaConfig;
use dominion_domain_models::validation::DnsValidationStatus;
use dominion_infra_dns::{is_valid_domain, DnsValidator};

#[tokio::test]
async fn certify_syntax_rejection_consumes_no_resolver() {
    let config = DnsValidatorConfig {
        resolvers: vec!["203.0.113.53".to_string()],
        use_system_resolvers: false,
        ..DnsValidatorConfig::default()
    };
    let validator =
        DnsValidator::new(&config, DnsPersonaConfig::default()).expect("validator ignition");

    let malformed = ["no-tld", "double..dot.com", "-edge.com", "edge-.com", "digits.123"];
    for domain in malformed {
        let result = validator.validate(domain, &CancellationToken::new()).await;
        assert_eq!(result.status, DnsValidationStatus::Error, "domain: {}", domain);
        assert_eq!(result.error.as_deref(), Some("Invalid domain format"));
        assert!(result.resolver_used.is_none(), "no resolver may be consumed");
        assert_eq!(result.duration_ms, 0);
    }
}

#[test]
fn certify_syntax_gate_shape() {
    assert!(is_valid_domain("example.com"));
    assert!(is_valid_domain("deep.sub.example.org"));
    assert!(is_valid_domain("a1-b2.example.io"));

    assert!(!is_valid_domain("example"));
    assert!(!is_valid_domain(".leading.com"));
    assert!(!is_valid_domain("trailing.com."));
    assert!(!is_valid_domain("under_score.com"));
    assert!(!is_valid_domain("sp ace.com"));
}
