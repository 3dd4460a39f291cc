// [libs/infra/dns/src/rate.rs]
/*!
 * =================================================================
 * APARATO: QUERY RATE GOVERNOR (V3.0 - TOKEN BUCKET)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: GOBIERNO DE CADENCIA DE DOMINIOS POR SEGUNDO
 *
 * # Mathematical Proof (Sustained Rate):
 * El bucket recarga rate tokens/segundo con tope burst; la espera ante
 * déficit es (1 − tokens)/rate, por lo que el caudal sostenido converge
 * a rate_limit_dps con ráfagas acotadas por rate_limit_burst.
 * =================================================================
 */

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Limitador de tasa de dominios validados por segundo.
pub struct RateLimiter {
    refill_per_second: f64,
    capacity: f64,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    pub fn new(rate_per_second: u32, burst: u32) -> Self {
        let capacity = burst.max(1) as f64;
        Self {
            refill_per_second: rate_per_second.max(1) as f64,
            capacity,
            state: Mutex::new(BucketState { tokens: capacity, last_refill: Instant::now() }),
        }
    }

    /// Consume un token, durmiendo hasta que la recarga lo habilite.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;

                let elapsed = state.last_refill.elapsed().as_secs_f64();
                state.tokens = (state.tokens + elapsed * self.refill_per_second).min(self.capacity);
                state.last_refill = Instant::now();

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - state.tokens) / self.refill_per_second)
            };

            tokio::time::sleep(wait).await;
        }
    }
}
