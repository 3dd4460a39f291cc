// [libs/infra/db-turso/src/repositories/domain.rs]
/*!
 * =================================================================
 * APARATO: GENERATED DOMAIN REPOSITORY (V3.3 - OFFSET LEDGER)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: INVENTARIO IDEMPOTENTE DE DOMINIOS GENERADOS
 *
 * # Mathematical Proof (Idempotent Seeding):
 * La clave primaria (campaign_id, offset_index) con INSERT OR IGNORE
 * convierte la re-siembra de un lote en un no-op, habilitando la
 * reanudación de la fase de generación desde cualquier cursor.
 * =================================================================
 */

use chrono::Utc;
use libsql::{params, Connection};
use tracing::{debug, instrument};
use uuid::Uuid;

use dominion_domain_models::generation::GeneratedDomain;
use dominion_domain_models::validation::DnsValidationStatus;

use crate::errors::DbError;
use crate::pagination::{CursorRequest, Page, PageInfo};
use crate::repositories::campaign::parse_timestamp;

const INSERT_DOMAIN: &str = r#"
    INSERT OR IGNORE INTO generated_domains (id, campaign_id, offset_index, domain_name, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
"#;

const COUNT_DOMAINS: &str =
    "SELECT COUNT(*) FROM generated_domains WHERE campaign_id = ?1";

/// Página por cursor sobre el orden de offsets.
const PAGE_DOMAINS: &str = r#"
    SELECT id, offset_index, domain_name
    FROM generated_domains
    WHERE campaign_id = ?1 AND offset_index > ?2
    ORDER BY offset_index ASC
    LIMIT ?3
"#;

/// Página filtrada por estado DNS (fase http_keyword_validation).
const PAGE_DOMAINS_WITH_DNS_STATUS: &str = r#"
    SELECT gd.id, gd.offset_index, gd.domain_name
    FROM generated_domains gd
    INNER JOIN dns_validation_results dvr
        ON dvr.campaign_id = gd.campaign_id AND dvr.domain_name = gd.domain_name
    WHERE gd.campaign_id = ?1 AND dvr.status = ?2 AND gd.offset_index > ?3
    ORDER BY gd.offset_index ASC
    LIMIT ?4
"#;

const COUNT_DOMAINS_WITH_DNS_STATUS: &str = r#"
    SELECT COUNT(*)
    FROM generated_domains gd
    INNER JOIN dns_validation_results dvr
        ON dvr.campaign_id = gd.campaign_id AND dvr.domain_name = gd.domain_name
    WHERE gd.campaign_id = ?1 AND dvr.status = ?2
"#;

/// Dominios sin veredicto DNS (predicado de entrada de la fase DNS).
const PAGE_DNS_PENDING: &str = r#"
    SELECT gd.id, gd.offset_index, gd.domain_name
    FROM generated_domains gd
    LEFT JOIN dns_validation_results dvr
        ON dvr.campaign_id = gd.campaign_id AND dvr.domain_name = gd.domain_name
    WHERE gd.campaign_id = ?1 AND dvr.domain_name IS NULL AND gd.offset_index > ?2
    ORDER BY gd.offset_index ASC
    LIMIT ?3
"#;

const COUNT_DNS_PENDING: &str = r#"
    SELECT COUNT(*)
    FROM generated_domains gd
    LEFT JOIN dns_validation_results dvr
        ON dvr.campaign_id = gd.campaign_id AND dvr.domain_name = gd.domain_name
    WHERE gd.campaign_id = ?1 AND dvr.domain_name IS NULL
"#;

/// Dominios resueltos aún sin sondeo HTTP (predicado de la fase HTTP).
const PAGE_HTTP_PENDING: &str = r#"
    SELECT gd.id, gd.offset_index, gd.domain_name
    FROM generated_domains gd
    INNER JOIN dns_validation_results dvr
        ON dvr.campaign_id = gd.campaign_id AND dvr.domain_name = gd.domain_name
    LEFT JOIN http_keyword_results hkr
        ON hkr.campaign_id = gd.campaign_id AND hkr.domain_name = gd.domain_name
    WHERE gd.campaign_id = ?1 AND dvr.status = ?2
      AND hkr.domain_name IS NULL AND gd.offset_index > ?3
    ORDER BY gd.offset_index ASC
    LIMIT ?4
"#;

const COUNT_HTTP_PENDING: &str = r#"
    SELECT COUNT(*)
    FROM generated_domains gd
    INNER JOIN dns_validation_results dvr
        ON dvr.campaign_id = gd.campaign_id AND dvr.domain_name = gd.domain_name
    LEFT JOIN http_keyword_results hkr
        ON hkr.campaign_id = gd.campaign_id AND hkr.domain_name = gd.domain_name
    WHERE gd.campaign_id = ?1 AND dvr.status = ?2 AND hkr.domain_name IS NULL
"#;

const GET_DOMAIN_ID: &str = r#"
    SELECT id FROM generated_domains
    WHERE campaign_id = ?1 AND domain_name = ?2
"#;

const GET_RECORD_BY_ID: &str = r#"
    SELECT id, offset_index, domain_name FROM generated_domains
    WHERE campaign_id = ?1 AND id = ?2
"#;

/// Fila materializada del inventario con su identidad persistida.
#[derive(Debug, Clone)]
pub struct DomainRecord {
    pub domain_id: Uuid,
    pub offset_index: u64,
    pub domain_name: String,
}

fn parse_offset_cursor(after: &Option<String>) -> Result<i64, DbError> {
    match after {
        Some(cursor) => cursor
            .parse::<i64>()
            .map_err(|_| DbError::MappingError(format!("invalid cursor {}", cursor))),
        None => Ok(-1),
    }
}

pub struct GeneratedDomainRepository {
    database_connection: Connection,
}

impl GeneratedDomainRepository {
    pub fn new(connection: Connection) -> Self {
        Self { database_connection: connection }
    }

    /// Siembra idempotente de un lote contiguo de dominios.
    #[instrument(skip(self, batch), fields(batch = batch.len()))]
    pub async fn insert_batch(&self, batch: &[GeneratedDomain]) -> Result<u64, DbError> {
        let mut inserted = 0u64;
        let now = Utc::now().to_rfc3339();

        for domain in batch {
            inserted += self
                .database_connection
                .execute(
                    INSERT_DOMAIN,
                    params![
                        Uuid::new_v4().to_string(),
                        domain.campaign_id.to_string(),
                        domain.offset_index as i64,
                        domain.domain_name.clone(),
                        now.clone()
                    ],
                )
                .await?;
        }

        debug!("🌱 [DOMAIN_SEED]: {} of {} rows newly seeded.", inserted, batch.len());
        Ok(inserted)
    }

    pub async fn count(&self, campaign_id: Uuid) -> Result<u64, DbError> {
        let mut rows = self
            .database_connection
            .query(COUNT_DOMAINS, params![campaign_id.to_string()])
            .await?;
        let row = rows.next().await?.ok_or_else(|| {
            DbError::MappingError("count query yielded no row".to_string())
        })?;
        Ok(row.get::<i64>(0)? as u64)
    }

    pub async fn domain_id(
        &self,
        campaign_id: Uuid,
        domain_name: &str,
    ) -> Result<Option<Uuid>, DbError> {
        let mut rows = self
            .database_connection
            .query(GET_DOMAIN_ID, params![campaign_id.to_string(), domain_name])
            .await?;

        match rows.next().await? {
            Some(row) => {
                let id_text: String = row.get(0)?;
                Ok(Some(
                    Uuid::parse_str(&id_text)
                        .map_err(|fault| DbError::MappingError(fault.to_string()))?,
                ))
            }
            None => Ok(None),
        }
    }

    /// Materializa la fila del inventario por su identidad persistida.
    pub async fn record_by_id(
        &self,
        campaign_id: Uuid,
        domain_id: Uuid,
    ) -> Result<Option<DomainRecord>, DbError> {
        let mut rows = self
            .database_connection
            .query(
                GET_RECORD_BY_ID,
                params![campaign_id.to_string(), domain_id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => {
                let id_text: String = row.get(0)?;
                let offset_index: i64 = row.get(1)?;
                let domain_name: String = row.get(2)?;
                Ok(Some(DomainRecord {
                    domain_id: Uuid::parse_str(&id_text)
                        .map_err(|fault| DbError::MappingError(fault.to_string()))?,
                    offset_index: offset_index as u64,
                    domain_name,
                }))
            }
            None => Ok(None),
        }
    }

    /// Página por cursor sobre offset_index ASC, con filtro DNS opcional.
    ///
    /// El cursor es el offset_index del último elemento servido (exclusivo).
    #[instrument(skip(self, request))]
    pub async fn page(
        &self,
        campaign_id: Uuid,
        request: &CursorRequest,
        dns_status_filter: Option<DnsValidationStatus>,
    ) -> Result<Page<DomainRecord>, DbError> {
        let after_offset = parse_offset_cursor(&request.after)?;
        // first + 1 sondea la existencia de la página siguiente.
        let probe_limit = (request.first + 1) as i64;

        let (rows, total_count) = match dns_status_filter {
            Some(status) => {
                let rows = self
                    .database_connection
                    .query(
                        PAGE_DOMAINS_WITH_DNS_STATUS,
                        params![
                            campaign_id.to_string(),
                            status.as_str(),
                            after_offset,
                            probe_limit
                        ],
                    )
                    .await?;

                let mut count_rows = self
                    .database_connection
                    .query(
                        COUNT_DOMAINS_WITH_DNS_STATUS,
                        params![campaign_id.to_string(), status.as_str()],
                    )
                    .await?;
                let total = count_rows
                    .next()
                    .await?
                    .map(|row| row.get::<i64>(0))
                    .transpose()?
                    .unwrap_or(0) as u64;
                (rows, total)
            }
            None => {
                let rows = self
                    .database_connection
                    .query(
                        PAGE_DOMAINS,
                        params![campaign_id.to_string(), after_offset, probe_limit],
                    )
                    .await?;
                (rows, self.count(campaign_id).await?)
            }
        };

        self.materialize_page(rows, request.first, total_count).await
    }

    /// Página de dominios aún sin veredicto DNS (predicado de la fase DNS).
    #[instrument(skip(self, request))]
    pub async fn page_dns_pending(
        &self,
        campaign_id: Uuid,
        request: &CursorRequest,
    ) -> Result<Page<DomainRecord>, DbError> {
        let after_offset = parse_offset_cursor(&request.after)?;
        let probe_limit = (request.first + 1) as i64;

        let rows = self
            .database_connection
            .query(
                PAGE_DNS_PENDING,
                params![campaign_id.to_string(), after_offset, probe_limit],
            )
            .await?;
        let total_count =
            self.scalar_count(COUNT_DNS_PENDING, params![campaign_id.to_string()]).await?;

        self.materialize_page(rows, request.first, total_count).await
    }

    pub async fn count_dns_pending(&self, campaign_id: Uuid) -> Result<u64, DbError> {
        self.scalar_count(COUNT_DNS_PENDING, params![campaign_id.to_string()]).await
    }

    /// Página de dominios resueltos sin sondeo HTTP (predicado de la fase HTTP).
    #[instrument(skip(self, request))]
    pub async fn page_http_pending(
        &self,
        campaign_id: Uuid,
        request: &CursorRequest,
    ) -> Result<Page<DomainRecord>, DbError> {
        let after_offset = parse_offset_cursor(&request.after)?;
        let probe_limit = (request.first + 1) as i64;

        let rows = self
            .database_connection
            .query(
                PAGE_HTTP_PENDING,
                params![
                    campaign_id.to_string(),
                    DnsValidationStatus::Resolved.as_str(),
                    after_offset,
                    probe_limit
                ],
            )
            .await?;
        let total_count = self.count_http_pending(campaign_id).await?;

        self.materialize_page(rows, request.first, total_count).await
    }

    pub async fn count_http_pending(&self, campaign_id: Uuid) -> Result<u64, DbError> {
        self.scalar_count(
            COUNT_HTTP_PENDING,
            params![campaign_id.to_string(), DnsValidationStatus::Resolved.as_str()],
        )
        .await
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

    async fn materialize_page(
        &self,
        mut rows: libsql::Rows,
        first: usize,
        total_count: u64,
    ) -> Result<Page<DomainRecord>, DbError> {
        let mut data = Vec::with_capacity(first);
        while let Some(row) = rows.next().await? {
            let id_text: String = row.get(0)?;
            let offset_index: i64 = row.get(1)?;
            let domain_name: String = row.get(2)?;
            data.push(DomainRecord {
                domain_id: Uuid::parse_str(&id_text)
                    .map_err(|fault| DbError::MappingError(fault.to_string()))?,
                offset_index: offset_index as u64,
                domain_name,
            });
        }

        let has_next = data.len() > first;
        data.truncate(first);
        let end_cursor = data.last().map(|record| record.offset_index.to_string());

        Ok(Page { data, page_info: PageInfo { has_next, end_cursor, total_count } })
    }

    /// Materializa una fila cruda (uso interno de pruebas y reanudación).
    pub async fn record_created_at(
        &self,
        campaign_id: Uuid,
        offset_index: u64,
    ) -> Result<Option<chrono::DateTime<Utc>>, DbError> {
        let mut rows = self
            .database_connection
            .query(
                "SELECT created_at FROM generated_domains WHERE campaign_id = ?1 AND offset_index = ?2",
                params![campaign_id.to_string(), offset_index as i64],
            )
            .await?;

        match rows.next().await? {
            Some(row) => {
                let created_at_text: String = row.get(0)?;
                Ok(Some(parse_timestamp(&created_at_text)?))
            }
            None => Ok(None),
        }
    }
}
