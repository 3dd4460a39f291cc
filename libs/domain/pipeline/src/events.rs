// [libs/domain/pipeline/src/events.rs]
/*!
 * =================================================================
 * APARATO: PHASE EVENT BROADCASTER (V3.2 - BEST EFFORT BUS)
 * CLASIFICACIÓN: DOMAIN ORCHESTRATION (ESTRATO L2)
 * RESPONSABILIDAD: DIFUSIÓN ACOTADA DE EVENTOS DE FASE
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. BEST EFFORT: La publicación jamás bloquea una fase; sin oyentes o
 *    bajo presión del limitador, la trama se descarta y contabiliza.
 * 2. TOKEN BUCKET: Cadencia nominal de 100 eventos/s con ráfaga igual
 *    al caudal.
 * =================================================================
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use tokio::sync::broadcast;
use tracing::debug;

use dominion_domain_models::events::PhaseEvent;

const BROADCAST_CHANNEL_CAPACITY: usize = 1024;
const DEFAULT_EVENTS_PER_SECOND: u32 = 100;

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Bus de eventos de fase con limitación de tasa y descarte bajo presión.
pub struct PhaseEventBroadcaster {
    sender: broadcast::Sender<PhaseEvent>,
    rate_per_second: f64,
    bucket: Mutex<BucketState>,
    dropped_total: AtomicU64,
}

impl PhaseEventBroadcaster {
    pub fn new(events_per_second: Option<u32>) -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CHANNEL_CAPACITY);
        let rate = events_per_second.unwrap_or(DEFAULT_EVENTS_PER_SECOND).max(1) as f64;
        Self {
            sender,
            rate_per_second: rate,
            bucket: Mutex::new(BucketState { tokens: rate, last_refill: Instant::now() }),
            dropped_total: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PhaseEvent> {
        self.sender.subscribe()
    }

    /// Publica best-effort: devuelve si la trama fue efectivamente emitida.
    pub fn publish(&self, event: PhaseEvent) -> bool {
        // 1. GOBIERNO DE CADENCIA (token bucket, descarte sin espera)
        {
            let mut bucket = self.bucket.lock().unwrap_or_else(|poison| poison.into_inner());
            let elapsed = bucket.last_refill.elapsed().as_secs_f64();
            bucket.tokens = (bucket.tokens + elapsed * self.rate_per_second).min(self.rate_per_second);
            bucket.last_refill = Instant::now();

            if bucket.tokens < 1.0 {
                self.dropped_total.fetch_add(1, Ordering::Relaxed);
                debug!(event_id = %event.event_id, "🕳️  [EVENT_DROP]: Rate limiter discarded frame.");
                return false;
            }
            bucket.tokens -= 1.0;
        }

        // 2. EMISIÓN SIN OYENTES = DESCARTE SILENCIOSO
        self.sender.send(event).is_ok()
    }

    pub fn dropped_total(&self) -> u64 {
        self.dropped_total.load(Ordering::Relaxed)
    }
}

impl Default for PhaseEventBroadcaster {
    fn default() -> Self {
        Self::new(None)
    }
}
