// [libs/domain/pipeline/src/selector.rs]
/*!
 * =================================================================
 * APARATO: STEALTH DOMAIN SELECTOR (V3.4 - CURSOR ONLY)
 * CLASIFICACIÓN: DOMAIN ORCHESTRATION (ESTRATO L2)
 * RESPONSABILIDAD: STREAM FILTRADO Y BARAJADO DE CANDIDATOS POR FASE
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CURSOR ONLY: La paginación por cursor es la única ruta; un pánico
 *    en esa ruta se recupera y asciende como error tipado, sin fallback
 *    legado por offset.
 * 2. PHASE PREDICATES: DNS consume dominios sin veredicto; HTTP-keyword
 *    consume resueltos sin sondeo previo.
 * =================================================================
 */

use futures::FutureExt;
use tracing::{info, instrument};
use uuid::Uuid;

use dominion_core_stealth::randomize;
use dominion_domain_models::config::StealthPhaseConfig;
use dominion_domain_models::events::PipelinePhase;
use dominion_infra_db::{CursorRequest, GeneratedDomainRepository};

use crate::errors::PipelineError;

/// Tamaño de página del barrido por cursor.
const SELECTOR_PAGE_SIZE: usize = 500;

pub struct StealthSelector {
    domains: GeneratedDomainRepository,
}

impl StealthSelector {
    pub fn new(domains: GeneratedDomainRepository) -> Self {
        Self { domains }
    }

    /// Materializa, filtra y baraja el stream de candidatos de la fase.
    #[instrument(skip(self, config))]
    pub async fn randomize_domains(
        &self,
        campaign_id: Uuid,
        phase: PipelinePhase,
        config: &StealthPhaseConfig,
    ) -> Result<Vec<String>, PipelineError> {
        // La ruta completa de cursor corre bajo blindaje anti-pánico.
        let harvest = std::panic::AssertUnwindSafe(self.collect_candidates(campaign_id, phase))
            .catch_unwind()
            .await;

        let candidates = match harvest {
            Ok(outcome) => outcome?,
            Err(panic_payload) => {
                let detail = panic_payload
                    .downcast_ref::<&str>()
                    .map(|text| text.to_string())
                    .or_else(|| panic_payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "opaque panic payload".to_string());
                return Err(PipelineError::SelectorPanic(detail));
            }
        };

        info!(
            "🎲 [STEALTH]: {} candidates harvested for phase {}.",
            candidates.len(),
            phase.as_str()
        );
        Ok(randomize(candidates, config))
    }

    /// Bucle de cursor hasta agotamiento o página vacía.
    async fn collect_candidates(
        &self,
        campaign_id: Uuid,
        phase: PipelinePhase,
    ) -> Result<Vec<String>, PipelineError> {
        let mut buffer = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let request = match &cursor {
                Some(after) => CursorRequest::after(after.clone(), SELECTOR_PAGE_SIZE),
                None => CursorRequest::from_start(SELECTOR_PAGE_SIZE),
            };

            let page = match phase {
                PipelinePhase::DnsValidation => {
                    self.domains.page_dns_pending(campaign_id, &request).await?
                }
                PipelinePhase::HttpKeywordValidation => {
                    self.domains.page_http_pending(campaign_id, &request).await?
                }
                _ => self.domains.page(campaign_id, &request, None).await?,
            };

            if page.data.is_empty() {
                break;
            }
            buffer.extend(page.data.into_iter().map(|record| record.domain_name));

            if !page.page_info.has_next {
                break;
            }
            cursor = page.page_info.end_cursor;
        }

        Ok(buffer)
    }
}
