// [libs/infra/http/src/dns_bridge.rs]
/*!
 * =================================================================
 * APARATO: PERSONA DNS DIAL BRIDGE (V3.2 - CUSTOM RESOLVE)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: RESOLUCIÓN PERSONALIZADA PARA EL DIAL DEL FETCHER
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. POOL-BACKED: El hook 'Resolve' de reqwest delega en el pool de la
 *    persona DNS; la primera IP devuelta alimenta el dial base.
 * 2. LITERAL BYPASS: Las IPs literales no consumen resolución.
 * 3. PER-FETCH FAILOVER: Bajo failover secuencial, cada fallo de
 *    resolución avanza el índice preferido del pool del fetch.
 * =================================================================
 */

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use hickory_proto::rr::RecordType;
use hyper::client::connect::dns::Name;
use reqwest::dns::{Addrs, Resolve, Resolving};
use tracing::debug;

use dominion_domain_models::persona::{DnsPersonaConfig, ResolverStrategy};
use dominion_infra_dns::transport::query_record;
use dominion_infra_dns::{parse_resolver, ResolverPool};

/// Resolutor por-fetch respaldado por el pool de la persona DNS.
pub struct PoolBackedResolver {
    pool: Arc<ResolverPool>,
    strategy: ResolverStrategy,
    query_timeout: Duration,
    doh_client: reqwest::Client,
}

impl PoolBackedResolver {
    pub fn new(persona: &DnsPersonaConfig) -> Result<Self, reqwest::Error> {
        let doh_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(persona.query_timeout_ms))
            .build()?;

        Ok(Self {
            pool: Arc::new(ResolverPool::new(persona)),
            strategy: persona.strategy,
            query_timeout: Duration::from_millis(persona.query_timeout_ms),
            doh_client,
        })
    }

    /// Resuelve el host a su primera IP utilizable.
    async fn lookup_first_ip(&self, host: &str) -> Result<IpAddr, String> {
        // IPs literales esquivan la resolución por contrato.
        if let Ok(literal) = host.parse::<IpAddr>() {
            return Ok(literal);
        }

        loop {
            let resolver_address = match self.pool.next() {
                Some(address) => address,
                None => return Err("no resolver available for custom dial".to_string()),
            };

            let outcome = match parse_resolver(&resolver_address) {
                Ok(target) => {
                    match query_record(&target, host, RecordType::A, self.query_timeout, &self.doh_client)
                        .await
                    {
                        Ok(ips) => Ok(ips),
                        Err(_) => {
                            // Pila dual: el canal AAAA cubre hosts solo-IPv6.
                            query_record(
                                &target,
                                host,
                                RecordType::AAAA,
                                self.query_timeout,
                                &self.doh_client,
                            )
                            .await
                        }
                    }
                }
                Err(fault) => Err(dominion_infra_dns::QueryFault::Io(fault.to_string())),
            };

            match outcome {
                Ok(ips) if !ips.is_empty() => return Ok(ips[0]),
                Ok(_) => return Err(format!("empty answer for host {}", host)),
                Err(fault) => {
                    let can_failover = self.strategy == ResolverStrategy::SequentialFailover
                        && self.pool.advance_preferred();
                    if can_failover {
                        debug!(host, resolver = %resolver_address, "🔁 [DIAL_FAILOVER]: Advancing preferred resolver.");
                        continue;
                    }
                    return Err(fault.to_string());
                }
            }
        }
    }
}

impl Resolve for PoolBackedResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let pool = Arc::clone(&self.pool);
        let strategy = self.strategy;
        let query_timeout = self.query_timeout;
        let doh_client = self.doh_client.clone();
        let host = name.as_str().to_string();

        Box::pin(async move {
            let bridge = PoolBackedResolver { pool, strategy, query_timeout, doh_client };
            let ip = bridge
                .lookup_first_ip(&host)
                .await
                .map_err(|message| -> Box<dyn std::error::Error + Send + Sync> {
                    message.into()
                })?;

            // El puerto lo impone el transporte; 0 es el centinela del hook.
            let addrs: Addrs = Box::new(std::iter::once(SocketAddr::new(ip, 0)));
            Ok(addrs)
        })
    }
}
