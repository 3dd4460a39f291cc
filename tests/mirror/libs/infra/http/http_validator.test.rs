/**
 * CERTIFICACIÓN: Validador HTTP por lotes — reglas de aceptación, cadena
 * de evidencia (hash/título/snippet) y sellado por cancelación.
 */
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dominion_domain_models::config::HttpValidatorConfig;
use dominion_domain_models::persona::HttpPersonaConfig;
use dominion_domain_models::validation::HttpValidationStatus;
use dominion_infra_http::{content_hash, HttpFetcher, HttpValidator};

fn validator() -> HttpValidator {
    HttpValidator::new(HttpFetcher::new(HttpValidatorConfig::default(), None))
}

#[tokio::test]
async fn certify_default_acceptance_is_2xx() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/found"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("void"))
        .mount(&mock_server)
        .await;

    let validator = validator();
    let persona = HttpPersonaConfig::default();
    let token = CancellationToken::new();

    let accepted = validator
        .validate("found.example", &format!("{}/found", mock_server.uri()), &persona, None, None, &token)
        .await;
    assert!(accepted.is_success);
    assert_eq!(accepted.status, HttpValidationStatus::Validated);

    let rejected = validator
        .validate("missing.example", &format!("{}/missing", mock_server.uri()), &persona, None, None, &token)
        .await;
    assert!(!rejected.is_success);
    assert_eq!(rejected.status, HttpValidationStatus::FailedValidation);
}

#[tokio::test]
async fn certify_explicit_acceptance_set_overrides_2xx() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let validator = validator();
    let persona =
        HttpPersonaConfig { accepted_status_codes: vec![404], ..HttpPersonaConfig::default() };

    let result = validator
        .validate("gone.example", &format!("{}/gone", mock_server.uri()), &persona, None, None, &CancellationToken::new())
        .await;

    assert!(result.is_success, "404 must be accepted under the explicit set");
    assert_eq!(result.status, HttpValidationStatus::Validated);
}

#[tokio::test]
async fn certify_evidence_chain_title_snippet_hash() {
    println!("\n🚀 [AUDIT]: Initiating HTTP Evidence Chain Audit...");
    let mock_server = MockServer::start().await;

    let html_body =
        "<html><head><title>Dominio Premium</title></head><body>Lorem ipsum evidence body</body></html>";
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_body)
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let validator = validator();
    let result = validator
        .validate(
            "premium.example",
            &format!("{}/page", mock_server.uri()),
            &HttpPersonaConfig::default(),
            None,
            None,
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(result.extracted_title.as_deref(), Some("Dominio Premium"));
    assert_eq!(result.content_hash.as_deref(), Some(content_hash(html_body.as_bytes()).as_str()));
    assert!(result.extracted_snippet.as_deref().unwrap_or_default().starts_with("<html>"));
    assert!(result.response_headers.contains_key("content-type"), "headers must be canonical");
    assert_eq!(result.status_code, 200);
}

#[tokio::test]
async fn certify_cancelled_batch_fills_remaining_slots() {
    let validator = validator();
    let cancellation_token = CancellationToken::new();
    cancellation_token.cancel();

    let domains = vec![
        "alpha.example".to_string(),
        "beta.example".to_string(),
        "gamma.example".to_string(),
    ];
    let results = validator
        .validate_many(
            &domains,
            2,
            &HttpPersonaConfig::default(),
            None,
            None,
            &cancellation_token,
        )
        .await;

    assert_eq!(results.len(), 3, "every slot must be sealed");
    for (domain, result) in domains.iter().zip(&results) {
        assert_eq!(&result.domain, domain);
        assert_eq!(result.status, HttpValidationStatus::ErrorCancelled);
        assert_eq!(result.status_code, 0, "no network attempt may occur");
    }
}

#[tokio::test]
async fn certify_unparseable_url_is_classified() {
    let validator = validator();
    let result = validator
        .validate(
            "broken.example",
            "https://exa mple.com/",
            &HttpPersonaConfig::default(),
            None,
            None,
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(result.status, HttpValidationStatus::ErrorInvalidUrl);
    assert!(!result.is_success);
}
