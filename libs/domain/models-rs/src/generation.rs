// [libs/domain/models-rs/src/generation.rs]
/*!
 * =================================================================
 * APARATO: GENERATION DOMAIN MODELS (V3.0 - OFFSET BIJECTION)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATOS DEL ESPACIO DE ENUMERACIÓN DE DOMINIOS
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Posición del segmento variable respecto a la cadena constante.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Prefix,
    Suffix,
    Both,
}

/// Parámetros que definen el espacio combinatorio de una campaña.
///
/// Invariante: al menos una longitud variable > 0, o el espacio degenera en
/// el dominio constante único (`total_combinations = 1`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainGenerationParams {
    pub pattern: PatternType,
    pub prefix_var_len: u32,
    pub suffix_var_len: u32,
    /// Conjunto de puntos de código; se deduplica preservando el primer uso.
    pub character_set: String,
    /// Cadena constante preservada verbatim (sensible a mayúsculas).
    pub constant_string: String,
    /// TLD normalizado a minúsculas con exactamente un punto inicial.
    pub tld: String,
}

/// Dominio candidato materializado en una posición del espacio combinatorio.
///
/// Invariante: `domain_name` es función determinista de (params, offset_index).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDomain {
    pub campaign_id: Uuid,
    pub offset_index: u64,
    pub domain_name: String,
}
