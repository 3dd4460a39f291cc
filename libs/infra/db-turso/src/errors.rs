// [libs/infra/db-turso/src/errors.rs]
/*!
 * =================================================================
 * APARATO: DATABASE ERROR CATALOG (V3.1 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Error de enlace físico o de red con el cluster de Turso.
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    /// Fallo en la configuración del entorno (variables vacías o malformadas).
    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    /// Error de sintaxis o ejecución devuelto por el motor libSQL.
    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    /// Fallo en la transformación de tipos entre SQLite y el dominio Rust.
    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    /// Error al comprometer cambios en una secuencia multi-tabla.
    #[error("[L3_DB_FAULT]: TRANSACTION_COLLAPSE")]
    TransactionError,

    // --- ESTRATO DE CONTROL DE CAMPAÑAS ---

    /// La campaña solicitada no existe en las tablas activas.
    #[error("[L3_CAMPAIGN_FAULT]: IDENTIFIER_NOT_FOUND")]
    CampaignNotFound,

    /// La transición de estado solicitada viola la monotonía del autómata.
    #[error("[L3_CAMPAIGN_FAULT]: INVALID_STATE_TRANSITION")]
    InvalidStateTransition,

    // --- ESTRATO DE FEATURES Y SCORING ---

    /// La fila de features no existe para la clave (campaign_id, domain_id).
    #[error("[L3_FEATURE_FAULT]: ROW_NOT_FOUND")]
    FeatureRowNotFound,

    /// La campaña carece de snapshot de scoring activo.
    #[error("[L3_SCORING_FAULT]: NO_ACTIVE_SNAPSHOT")]
    NoActiveSnapshot,
}
