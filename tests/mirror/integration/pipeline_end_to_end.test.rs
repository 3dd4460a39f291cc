/**
 * CERTIFICACIÓN END-TO-END: Conducción completa de una campaña —
 * generación determinista, validación DNS vía DoH simulado, sondeo HTTP,
 * fase de features y sellado de scoring con snapshot por defecto.
 */
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dominion_domain_features::FeatureBuilderParams;
use dominion_domain_models::campaign::{Campaign, CampaignState};
use dominion_domain_models::config::{
    DnsValidatorConfig, HttpValidatorConfig, MicrocrawlConfig, PipelineConfig, StealthPhaseConfig,
};
use dominion_domain_models::events::PipelinePhase;
use dominion_domain_models::generation::{DomainGenerationParams, PatternType};
use dominion_domain_models::persona::{DnsPersonaConfig, HttpPersonaConfig};
use dominion_domain_models::validation::DnsValidationStatus;
use dominion_domain_pipeline::{
    CampaignBlueprint, KeywordSpec, NoopMetricsSink, PhaseEventBroadcaster, PipelineOrchestrator,
};
use dominion_infra_db::{
    CampaignRepository, GeneratedDomainRepository, PhaseExecutionRepository, SnapshotRepository,
    TursoClient, ValidationResultRepository,
};

async fn doh_mock_answering_loopback() -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dns-query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Status": 0,
            "Answer": [
                { "name": "candidate.", "type": 1, "TTL": 60, "data": "127.0.0.1" }
            ]
        })))
        .mount(&mock_server)
        .await;
    mock_server
}

fn blueprint_for(campaign_id: uuid::Uuid, doh_endpoint: String) -> CampaignBlueprint {
    CampaignBlueprint {
        campaign_id,
        generation: DomainGenerationParams {
            pattern: PatternType::Prefix,
            prefix_var_len: 2,
            suffix_var_len: 0,
            character_set: "ab".to_string(),
            constant_string: "-x".to_string(),
            tld: ".io".to_string(),
        },
        http_persona: HttpPersonaConfig {
            request_timeout_ms: 1_000,
            ..HttpPersonaConfig::default()
        },
        dns_persona: DnsPersonaConfig {
            resolvers: vec![doh_endpoint],
            query_timeout_ms: 2_000,
            ..DnsPersonaConfig::default()
        },
        keywords: vec![KeywordSpec::simple(1, "solar")],
        dns_stealth: StealthPhaseConfig::dns_defaults(),
        http_stealth: StealthPhaseConfig::http_defaults(),
    }
}

#[tokio::test]
async fn certify_full_campaign_drive() {
    println!("\n🚀 [AUDIT]: Initiating Full Pipeline Drive Certification...");
    let workspace = tempfile::tempdir().expect("tempdir ignition");
    let database_path = workspace.path().join("dominion.db");
    let client = TursoClient::connect(database_path.to_str().unwrap(), None)
        .await
        .expect("client ignition");

    // 1. SETUP: campaña draft + resolutor DoH simulado.
    let campaigns = CampaignRepository::new(client.get_connection().unwrap());
    let campaign = Campaign::new_draft("e2e-drive");
    campaigns.create(&campaign).await.unwrap();

    let doh = doh_mock_answering_loopback().await;
    let blueprint = blueprint_for(campaign.id, format!("{}/dns-query", doh.uri()));

    let broadcaster = Arc::new(PhaseEventBroadcaster::new(Some(1_000)));
    let mut event_stream = broadcaster.subscribe();

    let orchestrator = PipelineOrchestrator::new(
        client.clone(),
        DnsValidatorConfig {
            use_system_resolvers: false,
            max_domains_per_request: 10,
            max_concurrent_goroutines: 4,
            ..DnsValidatorConfig::default()
        },
        HttpValidatorConfig {
            request_timeout_ms: 1_000,
            max_domains_per_request: 10,
            max_concurrent_goroutines: 4,
            max_body_read_bytes: 64 * 1024,
            ..HttpValidatorConfig::default()
        },
        PipelineConfig::default(),
        FeatureBuilderParams::default(),
        MicrocrawlConfig::default(),
        Arc::clone(&broadcaster),
        Arc::new(NoopMetricsSink),
        None,
    );

    // 2. CONDUCCIÓN COMPLETA
    orchestrator
        .run_campaign(&blueprint, &CancellationToken::new())
        .await
        .expect("pipeline drive must seal");

    // 3. VEREDICTOS DEL LEDGER
    let sealed_campaign = campaigns.get(campaign.id).await.unwrap();
    assert_eq!(sealed_campaign.state, CampaignState::Completed);

    let domains = GeneratedDomainRepository::new(client.get_connection().unwrap());
    assert_eq!(domains.count(campaign.id).await.unwrap(), 4, "2-wide binary space");

    let validations = ValidationResultRepository::new(client.get_connection().unwrap());
    assert_eq!(validations.count_dns_total(campaign.id).await.unwrap(), 4);
    assert_eq!(
        validations
            .count_dns_by_status(campaign.id, DnsValidationStatus::Resolved)
            .await
            .unwrap(),
        4,
        "the DoH fixture certifies every candidate"
    );
    assert_eq!(
        validations.count_http_total(campaign.id).await.unwrap(),
        4,
        "every resolved candidate must carry an HTTP verdict"
    );

    // 4. CHECKPOINT DE GENERACIÓN SELLADO
    let phases = PhaseExecutionRepository::new(client.get_connection().unwrap());
    let generation_checkpoint =
        phases.load(campaign.id, PipelinePhase::Generation).await.unwrap().unwrap();
    assert_eq!(generation_checkpoint.status, "complete");
    assert_eq!(generation_checkpoint.cursor_value, 4);

    // 5. SNAPSHOT POR DEFECTO ACTIVADO POR LA FASE DE SCORING
    let snapshots = SnapshotRepository::new(client.get_connection().unwrap());
    let active = snapshots.get_active(campaign.id).await.unwrap().expect("active profile");
    assert_eq!(active.profile_version, 1);

    // 6. EVENTOS DE FASE DIFUNDIDOS
    let mut observed_events = 0;
    while event_stream.try_recv().is_ok() {
        observed_events += 1;
    }
    assert!(observed_events > 0, "phase events must flow through the bus");
    println!("   ✅ Drive sealed: 4 candidates, {} events observed.", observed_events);
}

#[tokio::test]
async fn certify_pre_cancelled_drive_aborts() {
    let workspace = tempfile::tempdir().expect("tempdir ignition");
    let database_path = workspace.path().join("dominion.db");
    let client = TursoClient::connect(database_path.to_str().unwrap(), None)
        .await
        .expect("client ignition");

    let campaigns = CampaignRepository::new(client.get_connection().unwrap());
    let campaign = Campaign::new_draft("cancelled-drive");
    campaigns.create(&campaign).await.unwrap();

    let doh = doh_mock_answering_loopback().await;
    let blueprint = blueprint_for(campaign.id, format!("{}/dns-query", doh.uri()));

    let orchestrator = PipelineOrchestrator::new(
        client.clone(),
        DnsValidatorConfig { use_system_resolvers: false, ..DnsValidatorConfig::default() },
        HttpValidatorConfig::default(),
        PipelineConfig::default(),
        FeatureBuilderParams::default(),
        MicrocrawlConfig::default(),
        Arc::new(PhaseEventBroadcaster::default()),
        Arc::new(NoopMetricsSink),
        None,
    );

    let cancellation_token = CancellationToken::new();
    cancellation_token.cancel();

    let verdict = orchestrator.run_campaign(&blueprint, &cancellation_token).await;
    assert!(verdict.is_err(), "a pre-cancelled token must abort the drive");

    // Sin dominios sembrados: la cancelación precede a toda fase.
    let domains = GeneratedDomainRepository::new(client.get_connection().unwrap());
    assert_eq!(domains.count(campaign.id).await.unwrap(), 0);
}
