/**
 * CERTIFICACIÓN: Idempotencia del reconciliador — doble pasada converge
 * al mismo estado final y el conjunto vacío ajusta 0 filas.
 */
use std::time::Duration as StdDuration;

use chrono::Duration;
use uuid::Uuid;

use dominion_domain_models::features::ProcessingState;
use dominion_infra_db::{FeatureRepository, TursoClient};

async fn repository() -> (FeatureRepository, tempfile::TempDir) {
    let workspace = tempfile::tempdir().expect("tempdir ignition");
    let database_path = workspace.path().join("dominion.db");
    let client = TursoClient::connect(database_path.to_str().unwrap(), None)
        .await
        .expect("client ignition");
    (FeatureRepository::new(client.get_connection().expect("connection")), workspace)
}

#[tokio::test]
async fn certify_double_pass_converges() {
    println!("\n🚀 [AUDIT]: Initiating Reconciler Idempotence Audit...");
    let (repository, _workspace) = repository().await;
    let campaign_id = Uuid::new_v4();

    // 1. SIEMBRA DE ZOMBIES: 5 filas reclamadas que jamás sellaron.
    for _ in 0..5 {
        let domain_id = Uuid::new_v4();
        repository.ensure_pending(campaign_id, domain_id).await.unwrap();
    }
    let claimed = repository.claim_pending(campaign_id, 10).await.unwrap();
    assert_eq!(claimed.len(), 5);
    assert_eq!(
        repository.count_in_state(campaign_id, ProcessingState::Building).await.unwrap(),
        5
    );

    // El umbral cero convierte cualquier building previo en zombie.
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    // 2. PRIMERA PASADA: todos los zombies vuelven a pending.
    let first_pass = repository.reset_stuck(Duration::zero(), 2).await.unwrap();
    assert_eq!(first_pass, 5, "every stuck row must be adjusted in batches of 2");
    assert_eq!(
        repository.count_in_state(campaign_id, ProcessingState::Pending).await.unwrap(),
        5
    );
    assert_eq!(
        repository.count_in_state(campaign_id, ProcessingState::Building).await.unwrap(),
        0
    );

    // 3. SEGUNDA PASADA INMEDIATA: conjunto vacío, 0 ajustes, mismo estado.
    let second_pass = repository.reset_stuck(Duration::zero(), 2).await.unwrap();
    assert_eq!(second_pass, 0, "back-to-back reconciliation must be a no-op");
    assert_eq!(
        repository.count_in_state(campaign_id, ProcessingState::Pending).await.unwrap(),
        5
    );
    println!("   ✅ Convergence sealed: 5 adjusted, then 0.");
}

#[tokio::test]
async fn certify_empty_target_set_adjusts_nothing() {
    let (repository, _workspace) = repository().await;
    assert_eq!(repository.reset_stuck(Duration::minutes(30), 200).await.unwrap(), 0);
}

#[tokio::test]
async fn certify_fresh_building_rows_survive_age_guard() {
    let (repository, _workspace) = repository().await;
    let campaign_id = Uuid::new_v4();
    let domain_id = Uuid::new_v4();

    repository.ensure_pending(campaign_id, domain_id).await.unwrap();
    repository.claim_pending(campaign_id, 1).await.unwrap();

    // Umbral de 30 minutos: una fila recién reclamada no es zombie.
    let adjusted = repository.reset_stuck(Duration::minutes(30), 200).await.unwrap();
    assert_eq!(adjusted, 0);
    assert_eq!(
        repository.count_in_state(campaign_id, ProcessingState::Building).await.unwrap(),
        1
    );
}
