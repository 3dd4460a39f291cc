/**
 * CERTIFICACIÓN: Gestor de flota de proxies — rotación de utilizables,
 * salud last-write-wins y clasificación de errores atribuibles.
 */
use uuid::Uuid;

use dominion_domain_models::proxy::{Proxy, ProxyProtocol};
use dominion_infra_http::{InMemoryProxyManager, ProxyManager};

fn proxy(address: &str, protocol: ProxyProtocol) -> Proxy {
    Proxy {
        id: Uuid::new_v4(),
        protocol,
        address: address.to_string(),
        username: None,
        password: None,
        is_enabled: true,
        is_healthy: true,
    }
}

#[tokio::test]
async fn certify_rotation_spreads_across_usable_outlets() {
    let first = proxy("10.0.0.1:8080", ProxyProtocol::Http);
    let second = proxy("10.0.0.2:8080", ProxyProtocol::Socks5);
    let (first_id, second_id) = (first.id, second.id);
    let manager = InMemoryProxyManager::new(vec![first, second]);

    let picks: Vec<Uuid> = {
        let mut collected = Vec::new();
        for _ in 0..4 {
            collected.push(manager.acquire().await.expect("usable outlet").id);
        }
        collected
    };

    assert!(picks.contains(&first_id));
    assert!(picks.contains(&second_id));
}

#[tokio::test]
async fn certify_health_demotion_and_recovery_cycle() {
    println!("\n🚀 [AUDIT]: Initiating Proxy Health Feedback Audit...");
    let outlet = proxy("203.0.113.10:3128", ProxyProtocol::Https);
    let outlet_id = outlet.id;
    let manager = InMemoryProxyManager::new(vec![outlet]);

    // 1. DEGRADACIÓN: el fallo proxy-related retira la salida.
    manager.report_health(outlet_id, false, Some("tunnel handshake refused"));
    assert!(manager.acquire().await.is_none(), "unhealthy outlet must be skipped");
    assert!(!manager.snapshot(outlet_id).unwrap().is_healthy);

    // 2. RECUPERACIÓN: el primer éxito la certifica de nuevo.
    manager.report_health(outlet_id, true, None);
    assert_eq!(manager.acquire().await.map(|p| p.id), Some(outlet_id));

    // 3. LAST-WRITE-WINS: reportes en ráfaga, prevalece el último.
    manager.report_health(outlet_id, false, Some("late failure"));
    manager.report_health(outlet_id, true, None);
    assert!(manager.snapshot(outlet_id).unwrap().is_healthy);
}

#[tokio::test]
async fn certify_error_attribution_by_address_and_markers() {
    let manager = InMemoryProxyManager::new(Vec::new());

    assert!(manager
        .is_proxy_related_error("connect to 203.0.113.10:3128 refused", "203.0.113.10:3128"));
    assert!(manager.is_proxy_related_error("PROXY authentication required", "10.9.9.9:8080"));
    assert!(manager.is_proxy_related_error("socks5 greeting failed", "10.9.9.9:1080"));
    assert!(!manager.is_proxy_related_error("tls certificate expired", "10.9.9.9:8080"));
}
