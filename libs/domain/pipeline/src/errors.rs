// [libs/domain/pipeline/src/errors.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE FAULT CATALOG (V3.1 - PHASE TAXONOMY)
 * CLASIFICACIÓN: DOMAIN ORCHESTRATION (ESTRATO L2)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DEL DUCTO
 * =================================================================
 */

use thiserror::Error;

use dominion_infra_db::DbError;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Fallo de persistencia propagado desde el Ledger.
    #[error("[L2_PIPELINE_FAULT]: PERSISTENCE -> {0}")]
    Persistence(#[from] DbError),

    /// Fallo del generador combinatorio de la campaña.
    #[error("[L2_PIPELINE_FAULT]: GENERATOR -> {0}")]
    Generator(#[from] dominion_core_gen::GeneratorError),

    /// Pánico recuperado en la ruta de cursor del selector sigiloso.
    /// Sin fallback legado: el fallo del cursor es fatal para la fase.
    #[error("[L2_SELECTOR_FAULT]: CURSOR_PANIC -> {0}")]
    SelectorPanic(String),

    /// El token de campaña canceló la fase en curso.
    #[error("[L2_PIPELINE_FAULT]: CAMPAIGN_CANCELLED")]
    Cancelled,

    /// Fallo terminal de una fase con rastro nominal.
    #[error("[L2_PIPELINE_FAULT]: PHASE_{phase} -> {detail}")]
    PhaseFailed { phase: &'static str, detail: String },
}
