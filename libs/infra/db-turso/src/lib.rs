// [libs/infra/db-turso/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PERSISTENCE FACADE REGISTRY (V3.0 - DOMINION SYNC)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE LA FACHADA DE PERSISTENCIA
 * =================================================================
 */

pub mod client;
pub mod errors;
pub mod pagination;
pub mod repositories;
pub mod schema;

pub use client::TursoClient;
pub use errors::DbError;
pub use pagination::{CursorRequest, Page, PageInfo, SortOrder};
pub use repositories::{
    CampaignRepository, DomainRecord, FeatureRepository, GeneratedDomainRepository,
    HttpResultSummary, PhaseCheckpoint, PhaseExecutionRepository, QueryMetricsRepository,
    SnapshotRepository, StaleScoreRow, ValidationResultRepository,
};
