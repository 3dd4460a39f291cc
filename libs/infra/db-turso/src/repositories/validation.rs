// [libs/infra/db-turso/src/repositories/validation.rs]
/*!
 * =================================================================
 * APARATO: VALIDATION RESULT REPOSITORY (V3.2 - DUAL PROBE LEDGER)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: UPSERTS IDEMPOTENTES DE VEREDICTOS DNS Y HTTP
 *
 * # Mathematical Proof (At-Least-Once Safety):
 * La clave (campaign_id, domain_name) con ON CONFLICT DO UPDATE hace
 * que la re-entrega de un veredicto sea una sobre-escritura serializada;
 * la entrega al-menos-una-vez del ducto es segura por construcción.
 * =================================================================
 */

use libsql::{params, Connection};
use tracing::instrument;
use uuid::Uuid;

use dominion_domain_models::signals::{KeywordHit, MicrocrawlSignals};
use dominion_domain_models::validation::{
    DnsValidationResult, DnsValidationStatus, HttpValidationResult,
};

use crate::errors::DbError;

const UPSERT_DNS_RESULT: &str = r#"
    INSERT INTO dns_validation_results
        (campaign_id, domain_name, resolver_used, status, ips_json, duration_ms, error, validated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    ON CONFLICT (campaign_id, domain_name) DO UPDATE SET
        resolver_used = excluded.resolver_used,
        status = excluded.status,
        ips_json = excluded.ips_json,
        duration_ms = excluded.duration_ms,
        error = excluded.error,
        validated_at = excluded.validated_at
"#;

const COUNT_DNS_BY_STATUS: &str = r#"
    SELECT COUNT(*) FROM dns_validation_results
    WHERE campaign_id = ?1 AND status = ?2
"#;

const COUNT_DNS_TOTAL: &str =
    "SELECT COUNT(*) FROM dns_validation_results WHERE campaign_id = ?1";

const UPSERT_HTTP_RESULT: &str = r#"
    INSERT INTO http_keyword_results
        (campaign_id, domain_name, final_url, status_code, is_success, status, headers_json,
         content_hash, extracted_title, extracted_snippet, duration_ms, error, proxy_id, validated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
    ON CONFLICT (campaign_id, domain_name) DO UPDATE SET
        final_url = excluded.final_url,
        status_code = excluded.status_code,
        is_success = excluded.is_success,
        status = excluded.status,
        headers_json = excluded.headers_json,
        content_hash = excluded.content_hash,
        extracted_title = excluded.extracted_title,
        extracted_snippet = excluded.extracted_snippet,
        duration_ms = excluded.duration_ms,
        error = excluded.error,
        proxy_id = excluded.proxy_id,
        validated_at = excluded.validated_at
"#;

const COUNT_HTTP_SUCCESS: &str = r#"
    SELECT COUNT(*) FROM http_keyword_results
    WHERE campaign_id = ?1 AND is_success = 1
"#;

const COUNT_HTTP_TOTAL: &str =
    "SELECT COUNT(*) FROM http_keyword_results WHERE campaign_id = ?1";

const GET_HTTP_RESULT: &str = r#"
    SELECT status_code, is_success, content_hash, extracted_title, extracted_snippet,
           content_bytes, keyword_hits_json, microcrawl_json, is_parked, parked_confidence,
           duration_ms
    FROM http_keyword_results
    WHERE campaign_id = ?1 AND domain_name = ?2
"#;

/// Sella la evidencia de keywords producida por el extractor de la fase HTTP.
const RECORD_KEYWORD_EVIDENCE: &str = r#"
    UPDATE http_keyword_results
    SET content_bytes = ?1,
        keyword_hits_json = ?2,
        microcrawl_json = ?3,
        is_parked = ?4,
        parked_confidence = ?5
    WHERE campaign_id = ?6 AND domain_name = ?7
"#;

/// Proyección del veredicto HTTP con su evidencia para la fase de features.
#[derive(Debug, Clone)]
pub struct HttpResultSummary {
    pub status_code: u16,
    pub is_success: bool,
    pub content_hash: Option<String>,
    pub extracted_title: Option<String>,
    pub extracted_snippet: Option<String>,
    pub content_bytes: u64,
    pub keyword_hits: Vec<KeywordHit>,
    pub microcrawl: Option<MicrocrawlSignals>,
    pub is_parked: bool,
    pub parked_confidence: f64,
    pub duration_ms: u64,
}

pub struct ValidationResultRepository {
    database_connection: Connection,
}

impl ValidationResultRepository {
    pub fn new(connection: Connection) -> Self {
        Self { database_connection: connection }
    }

    #[instrument(skip(self, result), fields(domain = %result.domain))]
    pub async fn upsert_dns(
        &self,
        campaign_id: Uuid,
        result: &DnsValidationResult,
    ) -> Result<(), DbError> {
        let ips_json = serde_json::to_string(&result.ips)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;

        self.database_connection
            .execute(
                UPSERT_DNS_RESULT,
                params![
                    campaign_id.to_string(),
                    result.domain.clone(),
                    result.resolver_used.clone(),
                    result.status.as_str(),
                    ips_json,
                    result.duration_ms as i64,
                    result.error.clone(),
                    result.validated_at.to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn count_dns_by_status(
        &self,
        campaign_id: Uuid,
        status: DnsValidationStatus,
    ) -> Result<u64, DbError> {
        self.scalar_count(COUNT_DNS_BY_STATUS, params![campaign_id.to_string(), status.as_str()])
            .await
    }

    pub async fn count_dns_total(&self, campaign_id: Uuid) -> Result<u64, DbError> {
        self.scalar_count(COUNT_DNS_TOTAL, params![campaign_id.to_string()]).await
    }

    #[instrument(skip(self, result), fields(domain = %result.domain))]
    pub async fn upsert_http(
        &self,
        campaign_id: Uuid,
        result: &HttpValidationResult,
    ) -> Result<(), DbError> {
        let headers_json = serde_json::to_string(&result.response_headers)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;

        self.database_connection
            .execute(
                UPSERT_HTTP_RESULT,
                params![
                    campaign_id.to_string(),
                    result.domain.clone(),
                    result.final_url.clone(),
                    result.status_code as i64,
                    result.is_success as i64,
                    result.status.as_str(),
                    headers_json,
                    result.content_hash.clone(),
                    result.extracted_title.clone(),
                    result.extracted_snippet.clone(),
                    result.duration_ms as i64,
                    result.error.clone(),
                    result.proxy_id.map(|id| id.to_string()),
                    result.validated_at.to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn count_http_success(&self, campaign_id: Uuid) -> Result<u64, DbError> {
        self.scalar_count(COUNT_HTTP_SUCCESS, params![campaign_id.to_string()]).await
    }

    pub async fn count_http_total(&self, campaign_id: Uuid) -> Result<u64, DbError> {
        self.scalar_count(COUNT_HTTP_TOTAL, params![campaign_id.to_string()]).await
    }

    /// Sella la evidencia de keywords y microcrawl sobre el veredicto HTTP.
    #[instrument(skip(self, keyword_hits, microcrawl))]
    pub async fn record_keyword_evidence(
        &self,
        campaign_id: Uuid,
        domain_name: &str,
        content_bytes: u64,
        keyword_hits: &[KeywordHit],
        microcrawl: Option<&MicrocrawlSignals>,
        is_parked: bool,
        parked_confidence: f64,
    ) -> Result<(), DbError> {
        let hits_json = serde_json::to_string(keyword_hits)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;
        let microcrawl_json = microcrawl
            .map(serde_json::to_string)
            .transpose()
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;

        self.database_connection
            .execute(
                RECORD_KEYWORD_EVIDENCE,
                params![
                    content_bytes as i64,
                    hits_json,
                    microcrawl_json,
                    is_parked as i64,
                    parked_confidence,
                    campaign_id.to_string(),
                    domain_name
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn http_summary(
        &self,
        campaign_id: Uuid,
        domain_name: &str,
    ) -> Result<Option<HttpResultSummary>, DbError> {
        let mut rows = self
            .database_connection
            .query(GET_HTTP_RESULT, params![campaign_id.to_string(), domain_name])
            .await?;

        match rows.next().await? {
            Some(row) => {
                let hits_json: String = row.get(6)?;
                let microcrawl_json: Option<String> = row.get::<String>(7).ok();
                Ok(Some(HttpResultSummary {
                    status_code: row.get::<i64>(0)? as u16,
                    is_success: row.get::<i64>(1)? != 0,
                    content_hash: row.get::<String>(2).ok(),
                    extracted_title: row.get::<String>(3).ok(),
                    extracted_snippet: row.get::<String>(4).ok(),
                    content_bytes: row.get::<i64>(5)? as u64,
                    keyword_hits: serde_json::from_str(&hits_json)
                        .map_err(|fault| DbError::MappingError(fault.to_string()))?,
                    microcrawl: microcrawl_json
                        .map(|raw| serde_json::from_str(&raw))
                        .transpose()
                        .map_err(|fault| DbError::MappingError(fault.to_string()))?,
                    is_parked: row.get::<i64>(8)? != 0,
                    parked_confidence: row.get(9)?,
                    duration_ms: row.get::<i64>(10)? as u64,
                }))
            }
            None => Ok(None),
        }
    }

    async fn scalar_count(
        &self,
        statement: &str,
        parameters: impl libsql::params::IntoParams,
    ) -> Result<u64, DbError> {
        let mut rows = self.database_connection.query(statement, parameters).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DbError::MappingError("count query yielded no row".to_string()))?;
        Ok(row.get::<i64>(0)? as u64)
    }
}
