/**
 * CERTIFICACIÓN: Máquina de estados de filas de features — siembra
 * idempotente, reclamación CAS, sellado ready, fallo con reintento y
 * re-encolado bajo presupuesto.
 */
use uuid::Uuid;

use dominion_domain_models::features::{FeatureAggregate, ProcessingState};
use dominion_infra_db::{FeatureRepository, TursoClient};

async fn repository() -> (FeatureRepository, tempfile::TempDir) {
    let workspace = tempfile::tempdir().expect("tempdir ignition");
    let database_path = workspace.path().join("dominion.db");
    let client = TursoClient::connect(database_path.to_str().unwrap(), None)
        .await
        .expect("client ignition");
    (FeatureRepository::new(client.get_connection().expect("connection")), workspace)
}

fn sample_aggregate(richness: f64) -> FeatureAggregate {
    FeatureAggregate {
        kw_unique_count: 4,
        kw_total_occurrences: 9,
        kw_weight_sum: 12.5,
        content_richness_score: richness,
        ..FeatureAggregate::default()
    }
}

#[tokio::test]
async fn certify_full_lifecycle_pending_building_ready() {
    println!("\n🚀 [AUDIT]: Initiating Feature Row Lifecycle Audit...");
    let (repository, _workspace) = repository().await;
    let campaign_id = Uuid::new_v4();
    let domain_id = Uuid::new_v4();

    // 1. SIEMBRA IDEMPOTENTE
    repository.ensure_pending(campaign_id, domain_id).await.unwrap();
    repository.ensure_pending(campaign_id, domain_id).await.unwrap();
    assert_eq!(repository.count_in_state(campaign_id, ProcessingState::Pending).await.unwrap(), 1);

    // 2. RECLAMACIÓN CAS: la segunda pasada no adjudica nada.
    let claimed = repository.claim_pending(campaign_id, 10).await.unwrap();
    assert_eq!(claimed, vec![domain_id]);
    assert!(repository.claim_pending(campaign_id, 10).await.unwrap().is_empty());
    assert_eq!(repository.count_in_state(campaign_id, ProcessingState::Building).await.unwrap(), 1);

    // 3. SELLADO READY con limpieza de last_error.
    repository
        .complete(campaign_id, domain_id, &sample_aggregate(0.41), 1, 1, None, None)
        .await
        .unwrap();

    let sealed = repository.get(campaign_id, domain_id).await.unwrap();
    assert_eq!(sealed.processing_state, ProcessingState::Ready);
    assert!(sealed.last_error.is_none());
    assert!((sealed.aggregate.content_richness_score - 0.41).abs() < 1e-9);
    println!("   ✅ Lifecycle sealed: pending → building → ready.");
}

#[tokio::test]
async fn certify_conflict_upsert_increments_attempts() {
    let (repository, _workspace) = repository().await;
    let campaign_id = Uuid::new_v4();
    let domain_id = Uuid::new_v4();

    repository
        .complete(campaign_id, domain_id, &sample_aggregate(0.2), 1, 1, None, None)
        .await
        .unwrap();
    repository
        .complete(campaign_id, domain_id, &sample_aggregate(0.7), 1, 1, None, None)
        .await
        .unwrap();

    let row = repository.get(campaign_id, domain_id).await.unwrap();
    assert_eq!(row.attempt_count, 2, "conflict-update must increment attempt_count");
    assert!((row.aggregate.content_richness_score - 0.7).abs() < 1e-9, "mutable fields refreshed");
}

#[tokio::test]
async fn certify_failure_and_requeue_budget() {
    let (repository, _workspace) = repository().await;
    let campaign_id = Uuid::new_v4();
    let domain_id = Uuid::new_v4();

    repository.ensure_pending(campaign_id, domain_id).await.unwrap();
    repository.claim_pending(campaign_id, 1).await.unwrap();

    // 1. FALLO: building → error con rastro.
    assert!(repository.fail(campaign_id, domain_id, "aggregation panic").await.unwrap());
    let failed = repository.get(campaign_id, domain_id).await.unwrap();
    assert_eq!(failed.processing_state, ProcessingState::Error);
    assert_eq!(failed.last_error.as_deref(), Some("aggregation panic"));
    assert_eq!(failed.attempt_count, 1);

    // 2. FAIL SOBRE NO-BUILDING: la guardia CAS rechaza.
    assert!(!repository.fail(campaign_id, domain_id, "double fault").await.unwrap());

    // 3. RE-ENCOLADO BAJO PRESUPUESTO: attempt_count 1 < max_retries 3.
    assert_eq!(repository.requeue_failed(campaign_id, 3).await.unwrap(), 1);
    assert_eq!(repository.count_in_state(campaign_id, ProcessingState::Pending).await.unwrap(), 1);

    // 4. PRESUPUESTO AGOTADO: con max_retries 1 nada se re-encola.
    repository.claim_pending(campaign_id, 1).await.unwrap();
    repository.fail(campaign_id, domain_id, "second failure").await.unwrap();
    assert_eq!(repository.requeue_failed(campaign_id, 1).await.unwrap(), 0);
}
