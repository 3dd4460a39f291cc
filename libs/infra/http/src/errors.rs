// [libs/infra/http/src/errors.rs]
/*!
 * =================================================================
 * APARATO: HTTP FAULT CATALOG (V3.1 - PROBE TAXONOMY)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE SONDEO HTTP
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    /// La URL candidata no es parseable ni tras la canonicalización.
    #[error("[L3_HTTP_FAULT]: INVALID_URL -> {0}")]
    InvalidUrl(String),

    /// El constructor del cliente o de la petición colapsó.
    #[error("[L3_HTTP_FAULT]: REQUEST_CREATION -> {0}")]
    RequestCreation(String),

    /// El sondeo agotó el presupuesto temporal de la persona.
    #[error("[L3_HTTP_NET_FAULT]: FETCH_TIMEOUT")]
    Timeout,

    /// Fallo terminal de red tras agotar los esquemas candidatos.
    #[error("[L3_HTTP_NET_FAULT]: FETCH_FAILED -> {0}")]
    FetchFailed(String),

    /// Fallo de lectura del cuerpo post-descompresión.
    #[error("[L3_HTTP_NET_FAULT]: BODY_READ -> {0}")]
    BodyRead(String),

    /// El token de cancelación interrumpió el sondeo.
    #[error("[L3_HTTP_FAULT]: CANCELLED")]
    Cancelled,
}

impl HttpError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, HttpError::Cancelled)
    }
}
