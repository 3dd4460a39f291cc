/**
 * CERTIFICACIÓN: Política de redirecciones por persona y lectura acotada
 * del cuerpo con hash sobre los bytes efectivamente leídos.
 */
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dominion_domain_models::config::HttpValidatorConfig;
use dominion_domain_models::persona::HttpPersonaConfig;
use dominion_infra_http::{content_hash, HttpFetcher};

fn fetcher_with(max_body: usize) -> HttpFetcher {
    let config = HttpValidatorConfig { max_body_read_bytes: max_body, ..HttpValidatorConfig::default() };
    HttpFetcher::new(config, None)
}

#[tokio::test]
async fn certify_no_follow_returns_redirect_as_is() {
    println!("\n🚀 [AUDIT]: Initiating Redirect Policy Audit...");
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/elsewhere"))
        .mount(&mock_server)
        .await;

    let persona =
        HttpPersonaConfig { follow_redirects: Some(false), ..HttpPersonaConfig::default() };
    let fetcher = fetcher_with(1024 * 1024);

    let outcome = fetcher
        .fetch(
            &format!("{}/landing", mock_server.uri()),
            &persona,
            None,
            None,
            &CancellationToken::new(),
        )
        .await
        .expect("fetch must succeed");

    assert_eq!(outcome.status_code, 302, "302 must be returned without chasing");
    assert!(outcome.final_url.ends_with("/landing"));
}

#[tokio::test]
async fn certify_redirect_budget_yields_last_response() {
    let mock_server = MockServer::start().await;

    // Cadena /hop/1 → /hop/2 → /hop/3 → /hop/4 → /hop/5.
    for hop in 1..=5u32 {
        Mock::given(method("GET"))
            .and(path(format!("/hop/{}", hop)))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("/hop/{}", hop + 1)),
            )
            .mount(&mock_server)
            .await;
    }

    let persona = HttpPersonaConfig {
        follow_redirects: Some(true),
        max_redirects: 2,
        ..HttpPersonaConfig::default()
    };
    let fetcher = fetcher_with(1024 * 1024);

    let outcome = fetcher
        .fetch(
            &format!("{}/hop/1", mock_server.uri()),
            &persona,
            None,
            None,
            &CancellationToken::new(),
        )
        .await
        .expect("fetch must succeed");

    // Presupuesto agotado: la última respuesta 302 se entrega al llamador.
    assert_eq!(outcome.status_code, 302);
}

#[tokio::test]
async fn certify_followed_redirect_lands_on_final_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/entry"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/destination"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/destination"))
        .respond_with(ResponseTemplate::new(200).set_body_string("arrived"))
        .mount(&mock_server)
        .await;

    let persona = HttpPersonaConfig {
        follow_redirects: Some(true),
        max_redirects: 5,
        ..HttpPersonaConfig::default()
    };
    let fetcher = fetcher_with(1024 * 1024);

    let outcome = fetcher
        .fetch(
            &format!("{}/entry", mock_server.uri()),
            &persona,
            None,
            None,
            &CancellationToken::new(),
        )
        .await
        .expect("fetch must succeed");

    assert_eq!(outcome.status_code, 200);
    assert!(outcome.final_url.ends_with("/destination"));
    assert_eq!(outcome.body, b"arrived".to_vec());
}

#[tokio::test]
async fn certify_body_cap_and_hash_over_read_bytes() {
    let mock_server = MockServer::start().await;

    let oversized_payload = vec![b'z'; 8 * 1024];
    Mock::given(method("GET"))
        .and(path("/payload"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(oversized_payload.clone()))
        .mount(&mock_server)
        .await;

    let fetcher = fetcher_with(1024);
    let outcome = fetcher
        .fetch(
            &format!("{}/payload", mock_server.uri()),
            &HttpPersonaConfig::default(),
            None,
            None,
            &CancellationToken::new(),
        )
        .await
        .expect("fetch must succeed");

    assert_eq!(outcome.body.len(), 1024, "body must honor MaxBodyReadBytes");
    assert_eq!(
        content_hash(&outcome.body),
        content_hash(&oversized_payload[..1024]),
        "hash must cover exactly the bytes read"
    );
}
