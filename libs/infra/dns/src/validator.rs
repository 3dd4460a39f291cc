// [libs/infra/dns/src/validator.rs]
/*!
 * =================================================================
 * APARATO: DNS VALIDATION ENGINE (V3.6 - FAILOVER ORCHESTRATOR)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CICLO DE CONSULTA A/AAAA CON REINTENTO ESTRATÉGICO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. COOPERATIVE CANCEL: Todo punto de suspensión observa el token; la
 *    cancelación durante el jitter produce el error nominal del contrato.
 * 2. EXTERNAL RETRY: El avance del índice preferido lo decide este motor
 *    tras clasificar la reintentabilidad del fallo, jamás el pool.
 * 3. DERIVED DEADLINES: El presupuesto por dominio del lote se deriva de
 *    la estrategia activa (failover paga n rondas completas).
 * =================================================================
 */

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use hickory_proto::rr::RecordType;
use rand::Rng;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use dominion_domain_models::config::DnsValidatorConfig;
use dominion_domain_models::persona::{DnsPersonaConfig, ResolverStrategy};
use dominion_domain_models::validation::{DnsValidationResult, DnsValidationStatus};

use crate::errors::{DnsError, QueryFault};
use crate::pool::ResolverPool;
use crate::rate::RateLimiter;
use crate::resolver::{parse_resolver, system_resolvers};
use crate::syntax::is_valid_domain;
use crate::transport::query_record;

/// Motor de validación DNS de una campaña.
pub struct DnsValidator {
    persona: DnsPersonaConfig,
    pool: Arc<ResolverPool>,
    doh_client: reqwest::Client,
    batch_semaphore: Arc<Semaphore>,
    rate_limiter: Option<RateLimiter>,
}

impl DnsValidator {
    /// Construye el motor fusionando la persona con la configuración base.
    ///
    /// Si la persona no declara resolutores, hereda los de la configuración
    /// (más los del sistema cuando `use_system_resolvers` está activo).
    pub fn new(
        config: &DnsValidatorConfig,
        persona: DnsPersonaConfig,
    ) -> Result<Self, DnsError> {
        let mut effective_persona = persona;
        if effective_persona.resolvers.is_empty() {
            effective_persona.resolvers = config.resolvers.clone();
            if config.use_system_resolvers {
                effective_persona.resolvers.extend(system_resolvers());
            }
        }
        if effective_persona.resolvers.is_empty() {
            return Err(DnsError::NoResolverAvailable);
        }
        if effective_persona.query_timeout_ms == 0 {
            effective_persona.query_timeout_ms = config.query_timeout_ms;
        }

        let doh_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(effective_persona.query_timeout_ms))
            .build()
            .map_err(|fault| DnsError::DohClientBuild(fault.to_string()))?;

        let rate_limiter = if config.rate_limit_dps > 0 {
            Some(RateLimiter::new(config.rate_limit_dps, config.rate_limit_burst))
        } else {
            None
        };

        Ok(Self {
            pool: Arc::new(ResolverPool::new(&effective_persona)),
            persona: effective_persona,
            doh_client,
            batch_semaphore: Arc::new(Semaphore::new(config.max_concurrent_goroutines.max(1))),
            rate_limiter,
        })
    }

    fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.persona.query_timeout_ms)
    }

    /// Presupuesto total por dominio derivado de la estrategia activa.
    fn per_domain_deadline(&self) -> Duration {
        let query_timeout = self.query_timeout();
        let delay_max = Duration::from_millis(self.persona.query_delay_max_ms);

        match self.persona.strategy {
            ResolverStrategy::SequentialFailover => {
                (query_timeout + delay_max) * self.pool.resolver_count().max(1) as u32
                    + Duration::from_secs(5)
            }
            _ => query_timeout * 2 + delay_max + Duration::from_secs(2),
        }
    }

    /// Valida un dominio ejecutando el ciclo completo de consulta.
    #[instrument(skip(self, cancellation_token), fields(domain = %domain))]
    pub async fn validate(
        &self,
        domain: &str,
        cancellation_token: &CancellationToken,
    ) -> DnsValidationResult {
        // 1. GATE SINTÁCTICO: rechazo sin consumo de resolutor.
        if !is_valid_domain(domain) {
            return DnsValidationResult::rejected(domain, "Invalid domain format");
        }

        let started = Instant::now();
        if self.persona.strategy == ResolverStrategy::SequentialFailover {
            self.pool.reset_preferred();
        }

        loop {
            // 2. ADQUISICIÓN DE RESOLUTOR
            let resolver_address = match self.pool.next() {
                Some(address) => address,
                None => {
                    return DnsValidationResult {
                        domain: domain.to_string(),
                        resolver_used: None,
                        status: DnsValidationStatus::Error,
                        ips: Vec::new(),
                        duration_ms: started.elapsed().as_millis() as u64,
                        error: Some(DnsError::NoResolverAvailable.to_string()),
                        validated_at: Utc::now(),
                    }
                }
            };

            // 3. JITTER UNIFORME PREVIO AL CICLO
            if let Err(delay_fault) = self.query_delay(cancellation_token).await {
                return DnsValidationResult {
                    domain: domain.to_string(),
                    resolver_used: Some(resolver_address),
                    status: DnsValidationStatus::Error,
                    ips: Vec::new(),
                    duration_ms: started.elapsed().as_millis() as u64,
                    error: Some(delay_fault),
                    validated_at: Utc::now(),
                };
            }

            // 4. SUBCONSULTAS A/AAAA CONCURRENTES ACOTADAS
            let (a_outcome, aaaa_outcome) =
                self.dual_query(&resolver_address, domain, cancellation_token).await;

            // 5. CLASIFICACIÓN DEL VEREDICTO
            let (status, ips, fault) = classify_outcomes(a_outcome, aaaa_outcome);

            let is_terminal = match status {
                DnsValidationStatus::Resolved
                | DnsValidationStatus::NotFound
                | DnsValidationStatus::Cancelled => true,
                DnsValidationStatus::Timeout | DnsValidationStatus::Error => {
                    let retryable = fault.as_ref().map(QueryFault::is_retryable).unwrap_or(false);
                    let can_failover = self.persona.strategy
                        == ResolverStrategy::SequentialFailover
                        && retryable
                        && self.pool.advance_preferred();
                    if can_failover {
                        debug!(
                            resolver = %resolver_address,
                            "🔁 [DNS_FAILOVER]: Advancing preferred resolver after retryable fault."
                        );
                    }
                    !can_failover
                }
            };

            if is_terminal {
                return DnsValidationResult {
                    domain: domain.to_string(),
                    resolver_used: Some(resolver_address),
                    status,
                    ips: ips.iter().map(IpAddr::to_string).collect(),
                    duration_ms: started.elapsed().as_millis() as u64,
                    error: fault.map(|f| f.to_string()),
                    validated_at: Utc::now(),
                };
            }
        }
    }

    /// Valida un lote bajo el semáforo global y el limitador de tasa.
    ///
    /// El orden de los resultados espeja el de los dominios de entrada.
    #[instrument(skip(self, domains, cancellation_token), fields(batch = domains.len()))]
    pub async fn validate_many(
        &self,
        domains: &[String],
        cancellation_token: &CancellationToken,
    ) -> Vec<DnsValidationResult> {
        let deadline = self.per_domain_deadline();

        let validations = domains.iter().map(|domain| {
            let semaphore = Arc::clone(&self.batch_semaphore);
            async move {
                if cancellation_token.is_cancelled() {
                    return cancelled_result(domain);
                }

                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return cancelled_result(domain),
                };
                if let Some(rate_limiter) = &self.rate_limiter {
                    rate_limiter.acquire().await;
                }
                if cancellation_token.is_cancelled() {
                    return cancelled_result(domain);
                }

                match tokio::time::timeout(deadline, self.validate(domain, cancellation_token))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(%domain, "⏱️  [DNS_DEADLINE]: Per-domain budget exhausted.");
                        DnsValidationResult {
                            domain: domain.clone(),
                            resolver_used: None,
                            status: DnsValidationStatus::Timeout,
                            ips: Vec::new(),
                            duration_ms: deadline.as_millis() as u64,
                            error: Some(QueryFault::Timeout.to_string()),
                            validated_at: Utc::now(),
                        }
                    }
                }
            }
        });

        join_all(validations).await
    }

    async fn query_delay(&self, cancellation_token: &CancellationToken) -> Result<(), String> {
        let (min, max) = (self.persona.query_delay_min_ms, self.persona.query_delay_max_ms);
        if max == 0 || max < min {
            return Ok(());
        }
        let jitter_ms = if min == max { min } else { rand::thread_rng().gen_range(min..=max) };

        tokio::select! {
            _ = cancellation_token.cancelled() => {
                Err("Context canceled during query delay".to_string())
            }
            _ = tokio::time::sleep(Duration::from_millis(jitter_ms)) => Ok(()),
        }
    }

    /// Dispara A y AAAA en paralelo bajo el semáforo por-dominio.
    async fn dual_query(
        &self,
        resolver_address: &str,
        domain: &str,
        cancellation_token: &CancellationToken,
    ) -> (Result<Vec<IpAddr>, QueryFault>, Result<Vec<IpAddr>, QueryFault>) {
        let target = match parse_resolver(resolver_address) {
            Ok(target) => target,
            Err(fault) => {
                let io_fault = QueryFault::Io(fault.to_string());
                return (Err(io_fault.clone()), Err(io_fault));
            }
        };

        let per_domain_semaphore =
            Arc::new(Semaphore::new(self.persona.concurrent_queries_per_domain.max(1) as usize));
        let timeout = self.query_timeout();

        let run_subquery = |record_type: RecordType| {
            let target = target.clone();
            let semaphore = Arc::clone(&per_domain_semaphore);
            let child_token = cancellation_token.child_token();
            let doh_client = self.doh_client.clone();
            let domain = domain.to_string();
            async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return Err(QueryFault::Cancelled),
                };
                tokio::select! {
                    _ = child_token.cancelled() => Err(QueryFault::Cancelled),
                    outcome = query_record(&target, &domain, record_type, timeout, &doh_client) => outcome,
                }
            }
        };

        tokio::join!(run_subquery(RecordType::A), run_subquery(RecordType::AAAA))
    }
}

fn cancelled_result(domain: &str) -> DnsValidationResult {
    DnsValidationResult {
        domain: domain.to_string(),
        resolver_used: None,
        status: DnsValidationStatus::Cancelled,
        ips: Vec::new(),
        duration_ms: 0,
        error: Some(QueryFault::Cancelled.to_string()),
        validated_at: Utc::now(),
    }
}

/// Clasifica el par de resultados A/AAAA en el veredicto del dominio.
///
/// Precedencia: IPs ⇒ Resolved; doble NXDOMAIN ⇒ NotFound; timeout ⇒
/// Timeout; cancelación ⇒ Cancelled; resto ⇒ Error con preferencia del
/// fallo A.
pub(crate) fn classify_outcomes(
    a_outcome: Result<Vec<IpAddr>, QueryFault>,
    aaaa_outcome: Result<Vec<IpAddr>, QueryFault>,
) -> (DnsValidationStatus, Vec<IpAddr>, Option<QueryFault>) {
    // 1. UNIÓN DEDUPLICADA PRESERVANDO ORDEN A ++ AAAA
    let mut ips: Vec<IpAddr> = Vec::new();
    for outcome in [&a_outcome, &aaaa_outcome] {
        if let Ok(addresses) = outcome {
            for address in addresses {
                if !ips.contains(address) {
                    ips.push(*address);
                }
            }
        }
    }
    if !ips.is_empty() {
        return (DnsValidationStatus::Resolved, ips, None);
    }

    let a_fault = a_outcome.err();
    let aaaa_fault = aaaa_outcome.err();

    // 2. DOBLE CERTIFICACIÓN DE INEXISTENCIA
    let a_not_found = a_fault.as_ref().map(QueryFault::is_not_found).unwrap_or(false);
    let aaaa_not_found = aaaa_fault.as_ref().map(QueryFault::is_not_found).unwrap_or(false);
    if a_not_found && aaaa_not_found {
        return (DnsValidationStatus::NotFound, Vec::new(), None);
    }

    // 3. CUALQUIER TIMEOUT DOMINA
    let a_timeout = a_fault.as_ref().map(QueryFault::is_timeout).unwrap_or(false);
    let aaaa_timeout = aaaa_fault.as_ref().map(QueryFault::is_timeout).unwrap_or(false);
    if a_timeout || aaaa_timeout {
        return (DnsValidationStatus::Timeout, Vec::new(), Some(QueryFault::Timeout));
    }

    // 4. CANCELACIÓN OBSERVADA SIN ÉXITO PREVIO
    let a_cancelled = a_fault.as_ref().map(QueryFault::is_cancelled).unwrap_or(false);
    let aaaa_cancelled = aaaa_fault.as_ref().map(QueryFault::is_cancelled).unwrap_or(false);
    if a_cancelled || aaaa_cancelled {
        return (DnsValidationStatus::Cancelled, Vec::new(), Some(QueryFault::Cancelled));
    }

    // 5. ERROR RESIDUAL CON PREFERENCIA DEL CANAL A
    let fault = match (a_fault, aaaa_fault) {
        (Some(fault), _) if !fault.is_not_found() => Some(fault),
        (_, Some(fault)) => Some(fault),
        (Some(fault), None) => Some(fault),
        (None, None) => None,
    };
    (DnsValidationStatus::Error, Vec::new(), fault)
}
