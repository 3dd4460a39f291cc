// [libs/domain/pipeline/src/microcrawl.rs]
/*!
 * =================================================================
 * APARATO: MICROCRAWL ENRICHMENT UNIT (V3.2 - SHALLOW HARVEST)
 * CLASIFICACIÓN: DOMAIN ORCHESTRATION (ESTRATO L2)
 * RESPONSABILIDAD: CRAWL SECUNDARIO SUPERFICIAL BAJO PRESUPUESTO
 *
 * La compuerta (C8) decide; este aparato sólo ejecuta: hasta
 * budget_pages rutas conocidas, evidencia con señal Microcrawl y
 * detección de retornos decrecientes.
 * =================================================================
 */

use std::collections::HashSet;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use dominion_domain_models::persona::HttpPersonaConfig;
use dominion_domain_models::signals::{KeywordHit, MicrocrawlSignals};
use dominion_infra_http::HttpFetcher;

use crate::keywords::KeywordExtractor;

/// Rutas superficiales sondeadas por el crawl secundario.
const SHALLOW_PATHS: &[&str] = &["/about", "/services", "/products", "/contact"];

/// Ejecuta el microcrawl aprobado por la compuerta.
///
/// Devuelve las coincidencias enriquecidas y la señal agregada para el
/// término de ganancia del score.
#[instrument(skip(fetcher, persona, extractor, base_keyword_ids, cancellation_token), fields(domain = %domain))]
pub async fn enrich(
    fetcher: &HttpFetcher,
    domain: &str,
    persona: &HttpPersonaConfig,
    extractor: &KeywordExtractor,
    base_keyword_ids: &HashSet<u64>,
    budget_pages: u32,
    cancellation_token: &CancellationToken,
) -> (Vec<KeywordHit>, MicrocrawlSignals) {
    let mut harvested_hits: Vec<KeywordHit> = Vec::new();
    let mut observed_ids: HashSet<u64> = base_keyword_ids.clone();
    let mut added_unique = 0u32;
    let mut diminishing_returns = false;

    for path in SHALLOW_PATHS.iter().take(budget_pages as usize) {
        if cancellation_token.is_cancelled() {
            break;
        }

        let target_url = format!("https://{}{}", domain, path);
        let page_body = match fetcher
            .fetch(&target_url, persona, None, None, cancellation_token)
            .await
        {
            Ok(outcome) if (200..300).contains(&outcome.status_code) => outcome.body,
            Ok(_) | Err(_) => {
                debug!(%target_url, "🕸️  [MICROCRAWL]: Path skipped (non-2xx or fault).");
                continue;
            }
        };

        let page_hits = extractor.extract_microcrawl(&String::from_utf8_lossy(&page_body));
        let mut page_added = 0u32;
        for hit in &page_hits {
            if observed_ids.insert(hit.keyword_id) {
                page_added += 1;
            }
        }

        // Retornos decrecientes: una página sin claves nuevas marca la señal.
        if page_added == 0 && !page_hits.is_empty() {
            diminishing_returns = true;
        }
        added_unique += page_added;
        harvested_hits.extend(page_hits);
    }

    let signals = MicrocrawlSignals {
        added_unique,
        base_unique: base_keyword_ids.len() as u32,
        diminishing_returns,
    };
    (harvested_hits, signals)
}
