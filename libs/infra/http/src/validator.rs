// [libs/infra/http/src/validator.rs]
/*!
 * =================================================================
 * APARATO: HTTP VALIDATION ENGINE (V3.5 - BATCH PROBE MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: SONDEO POR LOTES, ACEPTACIÓN Y EXTRACCIÓN DE EVIDENCIA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. BATCH SEMAPHORE: La concurrencia intra-lote se acota por el
 *    semáforo global del validador.
 * 2. CANCEL FILL: La cancelación a mitad de lote sella los slots
 *    restantes como ErrorCancelled sin intentar la red.
 * 3. EVIDENCE CHAIN: Cabeceras canónicas, hash SHA-256, título y
 *    snippet se derivan del mismo cuerpo acotado.
 * =================================================================
 */

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use dominion_domain_models::config::HttpValidatorConfig;
use dominion_domain_models::persona::{DnsPersonaConfig, HttpPersonaConfig};
use dominion_domain_models::proxy::Proxy;
use dominion_domain_models::validation::{HttpValidationResult, HttpValidationStatus};

use crate::errors::HttpError;
use crate::extract::{content_hash, extract_snippet, extract_title, is_html_content_type};
use crate::fetcher::{FetchOutcome, HttpFetcher};

/// Motor de validación HTTP de una campaña.
pub struct HttpValidator {
    fetcher: HttpFetcher,
    batch_semaphore: Arc<Semaphore>,
}

impl HttpValidator {
    pub fn new(fetcher: HttpFetcher) -> Self {
        let concurrency = fetcher.config().max_concurrent_goroutines.max(1);
        Self { fetcher, batch_semaphore: Arc::new(Semaphore::new(concurrency)) }
    }

    /// Sondea y valida un dominio individual.
    #[instrument(skip(self, persona, dns_persona, proxy, cancellation_token), fields(domain = %domain))]
    pub async fn validate(
        &self,
        domain: &str,
        url: &str,
        persona: &HttpPersonaConfig,
        dns_persona: Option<&DnsPersonaConfig>,
        proxy: Option<Proxy>,
        cancellation_token: &CancellationToken,
    ) -> HttpValidationResult {
        // 1. CANONICALIZACIÓN DE LA URL CANDIDATA
        let canonical_url =
            if url.contains("://") { url.to_string() } else { format!("https://{}", url) };
        if reqwest::Url::parse(&canonical_url).is_err() {
            return HttpValidationResult::aborted(
                domain,
                HttpValidationStatus::ErrorInvalidUrl,
                HttpError::InvalidUrl(canonical_url).to_string(),
            );
        }

        // 2. SONDEO BAJO EL PRESUPUESTO DE LA PERSONA
        let request_timeout = if persona.request_timeout_ms > 0 {
            persona.request_timeout_ms
        } else {
            self.fetcher.config().request_timeout_ms
        };
        let fetch_future =
            self.fetcher.fetch(url, persona, dns_persona, proxy, cancellation_token);
        let outcome =
            match tokio::time::timeout(Duration::from_millis(request_timeout * 2), fetch_future)
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(HttpError::Timeout),
            };

        match outcome {
            Ok(fetch) => self.seal_result(domain, persona, fetch),
            Err(fault) => {
                let status = match &fault {
                    HttpError::Timeout => HttpValidationStatus::ErrorTimeout,
                    HttpError::RequestCreation(_) => HttpValidationStatus::ErrorRequestCreation,
                    HttpError::InvalidUrl(_) => HttpValidationStatus::ErrorInvalidUrl,
                    HttpError::Cancelled => HttpValidationStatus::ErrorCancelled,
                    _ => HttpValidationStatus::ErrorFetchFailed,
                };
                HttpValidationResult::aborted(domain, status, fault.to_string())
            }
        }
    }

    /// Consolida la evidencia del fetch en el veredicto del dominio.
    fn seal_result(
        &self,
        domain: &str,
        persona: &HttpPersonaConfig,
        fetch: FetchOutcome,
    ) -> HttpValidationResult {
        // 1. CABECERAS CANÓNICAS (claves en minúsculas)
        let mut response_headers = BTreeMap::new();
        for (name, value) in fetch.headers.iter() {
            if let Ok(value_text) = value.to_str() {
                response_headers.insert(name.as_str().to_ascii_lowercase(), value_text.to_string());
            }
        }

        // 2. CADENA DE EVIDENCIA SOBRE EL CUERPO ACOTADO
        let hash = content_hash(&fetch.body);
        let content_type = response_headers.get("content-type").map(String::as_str);
        let extracted_title = if is_html_content_type(content_type) {
            extract_title(&fetch.body)
        } else {
            None
        };
        let extracted_snippet = extract_snippet(&fetch.body);

        // 3. REGLA DE ACEPTACIÓN: conjunto vacío ⇒ 2xx.
        let is_success = if persona.accepted_status_codes.is_empty() {
            (200..300).contains(&fetch.status_code)
        } else {
            persona.accepted_status_codes.contains(&fetch.status_code)
        };
        let status = if is_success {
            HttpValidationStatus::Validated
        } else {
            HttpValidationStatus::FailedValidation
        };

        HttpValidationResult {
            domain: domain.to_string(),
            final_url: fetch.final_url,
            status_code: fetch.status_code,
            is_success,
            status,
            response_headers,
            raw_body: fetch.body,
            content_hash: Some(hash),
            extracted_title,
            extracted_snippet,
            duration_ms: fetch.duration_ms,
            error: None,
            proxy_id: fetch.proxy_id,
            validated_at: Utc::now(),
        }
    }

    /// Valida un lote de dominios en sub-lotes acotados por el semáforo.
    ///
    /// El orden de los resultados espeja el de los dominios de entrada; la
    /// cancelación sella los slots restantes sin intentar la red.
    #[instrument(skip(self, domains, persona, dns_persona, proxy, cancellation_token), fields(batch = domains.len()))]
    pub async fn validate_many(
        &self,
        domains: &[String],
        batch_size: usize,
        persona: &HttpPersonaConfig,
        dns_persona: Option<&DnsPersonaConfig>,
        proxy: Option<Proxy>,
        cancellation_token: &CancellationToken,
    ) -> Vec<HttpValidationResult> {
        let effective_batch = batch_size.max(1);
        let mut results = Vec::with_capacity(domains.len());

        for batch in domains.chunks(effective_batch) {
            // Cancelación entre lotes: sellar el resto sin red.
            if cancellation_token.is_cancelled() {
                for domain in &domains[results.len()..] {
                    results.push(HttpValidationResult::aborted(
                        domain,
                        HttpValidationStatus::ErrorCancelled,
                        HttpError::Cancelled.to_string(),
                    ));
                }
                break;
            }

            let probes = batch.iter().map(|domain| {
                let semaphore = Arc::clone(&self.batch_semaphore);
                let proxy = proxy.clone();
                async move {
                    if cancellation_token.is_cancelled() {
                        return HttpValidationResult::aborted(
                            domain,
                            HttpValidationStatus::ErrorCancelled,
                            HttpError::Cancelled.to_string(),
                        );
                    }
                    let _permit = match semaphore.acquire().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            return HttpValidationResult::aborted(
                                domain,
                                HttpValidationStatus::ErrorCancelled,
                                HttpError::Cancelled.to_string(),
                            )
                        }
                    };
                    self.validate(domain, domain, persona, dns_persona, proxy, cancellation_token)
                        .await
                }
            });

            results.extend(join_all(probes).await);
        }

        info!(
            validated = results.iter().filter(|r| r.is_success).count(),
            total = results.len(),
            "🌐 [HTTP_BATCH]: Probe batch sealed."
        );
        results
    }
}
