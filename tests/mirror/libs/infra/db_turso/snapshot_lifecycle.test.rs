/**
 * CERTIFICACIÓN: Linaje de snapshots de scoring — activación atómica con
 * retiro del predecesor, versión monotónica, mark-stale selectivo y
 * re-score que limpia la bandera.
 */
use std::collections::BTreeMap;

use uuid::Uuid;

use dominion_domain_models::features::FeatureAggregate;
use dominion_domain_models::scoring::ScoringProfileSnapshot;
use dominion_infra_db::{FeatureRepository, SnapshotRepository, TursoClient};

async fn fixtures() -> (SnapshotRepository, FeatureRepository, tempfile::TempDir) {
    let workspace = tempfile::tempdir().expect("tempdir ignition");
    let database_path = workspace.path().join("dominion.db");
    let client = TursoClient::connect(database_path.to_str().unwrap(), None)
        .await
        .expect("client ignition");
    (
        SnapshotRepository::new(client.get_connection().expect("connection")),
        FeatureRepository::new(client.get_connection().expect("connection")),
        workspace,
    )
}

fn draft_for(campaign_id: Uuid, richness_weight: f64) -> ScoringProfileSnapshot {
    ScoringProfileSnapshot::draft(
        campaign_id,
        BTreeMap::from([("richness".to_string(), richness_weight)]),
        2,
        serde_json::json!({ "normalization": "unit" }),
    )
}

#[tokio::test]
async fn certify_single_active_and_monotonic_versions() {
    println!("\n🚀 [AUDIT]: Initiating Snapshot Activation Audit...");
    let (snapshots, _features, _workspace) = fixtures().await;
    let campaign_id = Uuid::new_v4();

    // 1. PRIMER SNAPSHOT: versión 1 activa.
    let first = snapshots.create_snapshot(draft_for(campaign_id, 0.8)).await.unwrap();
    assert_eq!(first.profile_version, 1);
    assert!(first.is_active);

    // 2. SUCESOR: retira al predecesor en la misma unidad de trabajo.
    let second = snapshots.create_snapshot(draft_for(campaign_id, 0.6)).await.unwrap();
    assert_eq!(second.profile_version, 2);

    let active = snapshots.get_active(campaign_id).await.unwrap().expect("active snapshot");
    assert_eq!(active.id, second.id, "at most one active snapshot per campaign");

    let history = snapshots.snapshot_history(campaign_id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].profile_version, 2);

    let retired = &history[1];
    assert!(!retired.is_active);
    assert_eq!(retired.replaced_by, Some(second.id));
    assert!(retired.replaced_at.is_some());
    println!("   ✅ Lineage sealed: v1 retired by v2.");
}

#[tokio::test]
async fn certify_mark_stale_targets_only_foreign_snapshots() {
    let (snapshots, features, _workspace) = fixtures().await;
    let campaign_id = Uuid::new_v4();

    let current = snapshots.create_snapshot(draft_for(campaign_id, 0.9)).await.unwrap();

    // Fila sellada bajo el snapshot vigente y fila huérfana de snapshot.
    let aligned_domain = Uuid::new_v4();
    let orphan_domain = Uuid::new_v4();
    let aggregate = FeatureAggregate::default();
    features
        .complete(campaign_id, aligned_domain, &aggregate, 1, 1, Some(current.id), Some(0.5))
        .await
        .unwrap();
    features
        .complete(campaign_id, orphan_domain, &aggregate, 1, 1, None, None)
        .await
        .unwrap();

    // 1. MARK-STALE SELECTIVO: sólo la huérfana queda marcada.
    let flagged = features.mark_stale_scores(campaign_id, Some(current.id)).await.unwrap();
    assert_eq!(flagged, 1);
    assert!(!features.get(campaign_id, aligned_domain).await.unwrap().is_stale_score);
    assert!(features.get(campaign_id, orphan_domain).await.unwrap().is_stale_score);

    // 2. IDEMPOTENCIA: la segunda pasada converge al mismo estado final.
    let second_pass = features.mark_stale_scores(campaign_id, Some(current.id)).await.unwrap();
    assert_eq!(second_pass, 1, "orphan row remains the only flagged target");
    assert!(features.get(campaign_id, orphan_domain).await.unwrap().is_stale_score);

    // 3. RE-SCORE: sella el score bajo el snapshot activo y limpia la bandera.
    let stale_rows = features.stale_score_rows(campaign_id, 10).await.unwrap();
    assert_eq!(stale_rows.len(), 1);
    features.write_score(campaign_id, orphan_domain, 0.73, current.id).await.unwrap();
    let rescored = features.get(campaign_id, orphan_domain).await.unwrap();
    assert!(!rescored.is_stale_score);
    assert_eq!(rescored.scoring_profile_snapshot_id, Some(current.id));
    assert!(features.stale_score_rows(campaign_id, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn certify_null_current_marks_every_ready_row() {
    let (_snapshots, features, _workspace) = fixtures().await;
    let campaign_id = Uuid::new_v4();
    let aggregate = FeatureAggregate::default();

    for _ in 0..3 {
        features
            .complete(campaign_id, Uuid::new_v4(), &aggregate, 1, 1, None, None)
            .await
            .unwrap();
    }

    assert_eq!(features.mark_stale_scores(campaign_id, None).await.unwrap(), 3);
}
