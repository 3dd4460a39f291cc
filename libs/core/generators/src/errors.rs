// [libs/core/generators/src/errors.rs]
/*!
 * =================================================================
 * APARATO: GENERATOR ERROR CATALOG (V3.0 - SOBERANO)
 * CLASIFICACIÓN: CORE ENGINE (ESTRATO L1)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS COMBINATORIOS
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GeneratorError {
    /// El conjunto de caracteres quedó vacío tras la deduplicación.
    #[error("[L1_GEN_FAULT]: EMPTY_CHARACTER_SET")]
    EmptyCharset,

    /// El TLD no respeta el contrato '.' + etiqueta no vacía.
    #[error("[L1_GEN_FAULT]: INVALID_TLD -> {0}")]
    InvalidTld(String),

    /// El offset solicitado cae fuera del espacio [0, total).
    #[error("[L1_GEN_FAULT]: OFFSET_OUT_OF_RANGE -> {offset} >= {total}")]
    OffsetOutOfRange { offset: u64, total: u64 },

    /// Un paso de potencia de dimensión única desbordaría u64.
    #[error("[L1_GEN_FAULT]: COMBINATION_OVERFLOW -> base {base} width {width}")]
    CombinationOverflow { base: u64, width: u32 },
}
