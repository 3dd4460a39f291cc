// [libs/infra/db-turso/src/repositories/mod.rs]
/*!
 * =================================================================
 * APARATO: REPOSITORY REGISTRY (V3.0 - ACCESS MATRIX)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE LOS REPOSITORIOS DEL LEDGER
 * =================================================================
 */

pub mod campaign;
pub mod domain;
pub mod feature;
pub mod metrics;
pub mod phase;
pub mod snapshot;
pub mod validation;

pub use campaign::CampaignRepository;
pub use domain::{DomainRecord, GeneratedDomainRepository};
pub use feature::{FeatureRepository, StaleScoreRow};
pub use metrics::QueryMetricsRepository;
pub use phase::{PhaseCheckpoint, PhaseExecutionRepository};
pub use snapshot::SnapshotRepository;
pub use validation::{HttpResultSummary, ValidationResultRepository};
