/**
 * CERTIFICACIÓN: Selector sigiloso — el stream de la fase HTTP-keyword
 * contiene exactamente los dominios con veredicto DNS resuelto, sin
 * duplicados ni omisiones, a través de múltiples páginas de cursor.
 */
use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use dominion_domain_models::config::StealthPhaseConfig;
use dominion_domain_models::events::PipelinePhase;
use dominion_domain_models::generation::GeneratedDomain;
use dominion_domain_models::validation::{DnsValidationResult, DnsValidationStatus};
use dominion_domain_pipeline::StealthSelector;
use dominion_infra_db::{GeneratedDomainRepository, TursoClient, ValidationResultRepository};

async fn client() -> (TursoClient, tempfile::TempDir) {
    let workspace = tempfile::tempdir().expect("tempdir ignition");
    let database_path = workspace.path().join("dominion.db");
    let client = TursoClient::connect(database_path.to_str().unwrap(), None)
        .await
        .expect("client ignition");
    (client, workspace)
}

fn dns_result(domain: &str, status: DnsValidationStatus) -> DnsValidationResult {
    DnsValidationResult {
        domain: domain.to_string(),
        resolver_used: Some("1.1.1.1".to_string()),
        status,
        ips: if status == DnsValidationStatus::Resolved {
            vec!["203.0.113.1".to_string()]
        } else {
            Vec::new()
        },
        duration_ms: 5,
        error: None,
        validated_at: Utc::now(),
    }
}

#[tokio::test]
async fn certify_http_phase_stream_matches_resolved_set() {
    println!("\n🚀 [AUDIT]: Initiating Stealth Selector Filter Audit...");
    let (client, _workspace) = client().await;
    let campaign_id = Uuid::new_v4();

    let domains = GeneratedDomainRepository::new(client.get_connection().unwrap());
    let validations = ValidationResultRepository::new(client.get_connection().unwrap());

    // 1. SIEMBRA: 600 candidatos fuerzan más de una página de cursor.
    let universe: Vec<GeneratedDomain> = (0..600u64)
        .map(|offset| GeneratedDomain {
            campaign_id,
            offset_index: offset,
            domain_name: format!("lead{:04}.com", offset),
        })
        .collect();
    domains.insert_batch(&universe).await.unwrap();

    // 2. VEREDICTOS: múltiplos de 3 resueltos, el resto NXDOMAIN.
    let mut expected_resolved = HashSet::new();
    for offset in 0..600u64 {
        let domain_name = format!("lead{:04}.com", offset);
        let status = if offset % 3 == 0 {
            expected_resolved.insert(domain_name.clone());
            DnsValidationStatus::Resolved
        } else {
            DnsValidationStatus::NotFound
        };
        validations.upsert_dns(campaign_id, &dns_result(&domain_name, status)).await.unwrap();
    }

    // 3. STREAM DE LA FASE HTTP-KEYWORD
    let selector = StealthSelector::new(GeneratedDomainRepository::new(
        client.get_connection().unwrap(),
    ));
    let stream = selector
        .randomize_domains(
            campaign_id,
            PipelinePhase::HttpKeywordValidation,
            &StealthPhaseConfig::http_defaults(),
        )
        .await
        .unwrap();

    let harvested: HashSet<String> = stream.iter().cloned().collect();
    assert_eq!(stream.len(), expected_resolved.len(), "no duplicates allowed");
    assert_eq!(harvested, expected_resolved, "exactly the DNS-resolved candidates");
    println!("   ✅ Stream sealed: {}/200 resolved candidates.", stream.len());
}

#[tokio::test]
async fn certify_dns_phase_stream_excludes_already_validated() {
    let (client, _workspace) = client().await;
    let campaign_id = Uuid::new_v4();

    let domains = GeneratedDomainRepository::new(client.get_connection().unwrap());
    let validations = ValidationResultRepository::new(client.get_connection().unwrap());

    let universe: Vec<GeneratedDomain> = (0..10u64)
        .map(|offset| GeneratedDomain {
            campaign_id,
            offset_index: offset,
            domain_name: format!("fresh{:02}.com", offset),
        })
        .collect();
    domains.insert_batch(&universe).await.unwrap();

    // Tres dominios ya portan veredicto; el stream DNS sólo sirve el resto.
    for offset in [0u64, 4, 7] {
        let domain_name = format!("fresh{:02}.com", offset);
        validations
            .upsert_dns(campaign_id, &dns_result(&domain_name, DnsValidationStatus::Resolved))
            .await
            .unwrap();
    }

    let selector = StealthSelector::new(GeneratedDomainRepository::new(
        client.get_connection().unwrap(),
    ));
    let stream = selector
        .randomize_domains(
            campaign_id,
            PipelinePhase::DnsValidation,
            &StealthPhaseConfig::dns_defaults(),
        )
        .await
        .unwrap();

    assert_eq!(stream.len(), 7, "already-validated candidates leave the predicate");
    assert!(!stream.contains(&"fresh00.com".to_string()));
    assert!(!stream.contains(&"fresh04.com".to_string()));
    assert!(!stream.contains(&"fresh07.com".to_string()));
}

#[tokio::test]
async fn certify_empty_universe_yields_empty_stream() {
    let (client, _workspace) = client().await;
    let selector = StealthSelector::new(GeneratedDomainRepository::new(
        client.get_connection().unwrap(),
    ));

    let stream = selector
        .randomize_domains(
            Uuid::new_v4(),
            PipelinePhase::DnsValidation,
            &StealthPhaseConfig::dns_defaults(),
        )
        .await
        .unwrap();
    assert!(stream.is_empty());
}
