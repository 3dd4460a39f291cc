/**
 * CERTIFICACIÓN: Broadcaster de eventos de fase — entrega best-effort,
 * descarte bajo presión del limitador y contabilidad de tramas perdidas.
 */
use uuid::Uuid;

use dominion_domain_models::events::{PhaseEvent, PhaseEventType, PipelinePhase};
use dominion_domain_pipeline::PhaseEventBroadcaster;

fn frame(campaign_id: Uuid) -> PhaseEvent {
    PhaseEvent::new(
        campaign_id,
        PhaseEventType::PhaseProgress,
        PipelinePhase::DnsValidation,
        "probing",
    )
}

#[tokio::test]
async fn certify_delivery_to_subscribers() {
    let broadcaster = PhaseEventBroadcaster::new(Some(100));
    let mut receiver = broadcaster.subscribe();
    let campaign_id = Uuid::new_v4();

    assert!(broadcaster.publish(frame(campaign_id)));

    let delivered = receiver.recv().await.expect("frame must arrive");
    assert_eq!(delivered.campaign_id, campaign_id);
    assert!(delivered.event_id.starts_with(&campaign_id.to_string()));
}

#[tokio::test]
async fn certify_rate_limiter_discards_overflow() {
    println!("\n🚀 [AUDIT]: Initiating Broadcast Rate Governor Audit...");
    // Cadencia mínima: la ráfaga inicial agota el bucket de inmediato.
    let broadcaster = PhaseEventBroadcaster::new(Some(5));
    let _receiver = broadcaster.subscribe();
    let campaign_id = Uuid::new_v4();

    let mut accepted = 0u32;
    for _ in 0..50 {
        if broadcaster.publish(frame(campaign_id)) {
            accepted += 1;
        }
    }

    assert!(accepted >= 5, "the initial burst must pass");
    assert!(accepted < 50, "overflow must be discarded, not queued");
    assert_eq!(broadcaster.dropped_total() as u32, 50 - accepted);
    println!("   ✅ Governor sealed: {} accepted, {} dropped.", accepted, 50 - accepted);
}

#[tokio::test]
async fn certify_publish_without_listeners_never_blocks() {
    let broadcaster = PhaseEventBroadcaster::new(Some(100));
    // Sin oyentes: la publicación retorna sin bloquear ni fallar.
    assert!(!broadcaster.publish(frame(Uuid::new_v4())));
}
