// [libs/infra/http/src/proxy.rs]
/*!
 * =================================================================
 * APARATO: PROXY FLEET MANAGER (V3.2 - HEALTH FEEDBACK LOOP)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: SELECCIÓN DE SALIDAS Y RETROALIMENTACIÓN DE SALUD
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. LAST-WRITE-WINS: Los reportes de salud por identidad de proxy se
 *    serializan bajo el cerrojo del gestor; el último reporte prevalece.
 * 2. SEAM FIRST: El fetcher consume el trait; la flota en memoria es la
 *    implementación de referencia para campañas y Proving Grounds.
 * =================================================================
 */

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use dominion_domain_models::proxy::Proxy;

/// Contrato del gestor de proxies consumido por el fetcher.
#[async_trait]
pub trait ProxyManager: Send + Sync {
    /// Selecciona una salida utilizable, si existe alguna.
    async fn acquire(&self) -> Option<Proxy>;

    /// Reporta el veredicto de salud observado para una salida.
    fn report_health(&self, proxy_id: Uuid, healthy: bool, error: Option<&str>);

    /// Clasifica si un texto de error es atribuible a la salida dada.
    fn is_proxy_related_error(&self, message: &str, address: &str) -> bool {
        let lowered = message.to_ascii_lowercase();
        lowered.contains(&address.to_ascii_lowercase())
            || lowered.contains("proxy")
            || lowered.contains("socks")
            || lowered.contains("tunnel")
    }
}

/// Flota de proxies en memoria con rotación circular de utilizables.
pub struct InMemoryProxyManager {
    state: Mutex<FleetState>,
}

struct FleetState {
    fleet: HashMap<Uuid, Proxy>,
    rotation_order: Vec<Uuid>,
    cursor: usize,
}

impl InMemoryProxyManager {
    pub fn new(fleet: Vec<Proxy>) -> Self {
        let rotation_order: Vec<Uuid> = fleet.iter().map(|proxy| proxy.id).collect();
        let fleet = fleet.into_iter().map(|proxy| (proxy.id, proxy)).collect();
        Self { state: Mutex::new(FleetState { fleet, rotation_order, cursor: 0 }) }
    }

    pub fn snapshot(&self, proxy_id: Uuid) -> Option<Proxy> {
        let state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        state.fleet.get(&proxy_id).cloned()
    }
}

#[async_trait]
impl ProxyManager for InMemoryProxyManager {
    async fn acquire(&self) -> Option<Proxy> {
        let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        if state.rotation_order.is_empty() {
            return None;
        }

        // Ronda completa buscando la primera salida utilizable.
        for _ in 0..state.rotation_order.len() {
            let candidate_id = state.rotation_order[state.cursor % state.rotation_order.len()];
            state.cursor = state.cursor.wrapping_add(1);

            if let Some(candidate) = state.fleet.get(&candidate_id) {
                if candidate.is_usable() {
                    return Some(candidate.clone());
                }
            }
        }
        None
    }

    fn report_health(&self, proxy_id: Uuid, healthy: bool, error: Option<&str>) {
        let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        if let Some(proxy) = state.fleet.get_mut(&proxy_id) {
            proxy.is_healthy = healthy;
            if healthy {
                debug!(%proxy_id, "🩺 [PROXY_HEALTH]: Outlet certified healthy.");
            } else {
                warn!(
                    %proxy_id,
                    error = error.unwrap_or("unspecified"),
                    "🩺 [PROXY_HEALTH]: Outlet demoted to unhealthy."
                );
            }
        }
    }
}
