// [libs/domain/models-rs/src/validation.rs]
/*!
 * =================================================================
 * APARATO: VALIDATION RESULT MODELS (V3.3 - DUAL PROBE CONTRACTS)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: VEREDICTOS INMUTABLES DE SONDEO DNS Y HTTP
 *
 * # Mathematical Proof (Status Integrity):
 * DnsValidationStatus::Resolved exige |ips| ≥ 1; la clasificación se
 * produce en el validador tras deduplicar A ∪ AAAA, por lo que un
 * Resolved sin direcciones es inalcanzable por construcción.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Veredicto terminal de una validación DNS.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DnsValidationStatus {
    Resolved,
    NotFound,
    Timeout,
    Cancelled,
    Error,
}

impl DnsValidationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DnsValidationStatus::Resolved => "resolved",
            DnsValidationStatus::NotFound => "not_found",
            DnsValidationStatus::Timeout => "timeout",
            DnsValidationStatus::Cancelled => "cancelled",
            DnsValidationStatus::Error => "error",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "resolved" => Some(DnsValidationStatus::Resolved),
            "not_found" => Some(DnsValidationStatus::NotFound),
            "timeout" => Some(DnsValidationStatus::Timeout),
            "cancelled" => Some(DnsValidationStatus::Cancelled),
            "error" => Some(DnsValidationStatus::Error),
            _ => None,
        }
    }
}

/// Resultado inmutable de la validación DNS de un dominio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsValidationResult {
    pub domain: String,
    /// Resolutor que produjo el veredicto final (None si el gate sintáctico falló).
    pub resolver_used: Option<String>,
    pub status: DnsValidationStatus,
    /// Direcciones deduplicadas A ∪ AAAA.
    pub ips: Vec<String>,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub validated_at: DateTime<Utc>,
}

impl DnsValidationResult {
    /// Forja un veredicto de error sin consumo de resolutor.
    pub fn rejected(domain: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            resolver_used: None,
            status: DnsValidationStatus::Error,
            ips: Vec::new(),
            duration_ms: 0,
            error: Some(message.into()),
            validated_at: Utc::now(),
        }
    }
}

/// Veredicto terminal de un sondeo HTTP.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HttpValidationStatus {
    Validated,
    FailedValidation,
    ErrorTimeout,
    ErrorRequestCreation,
    ErrorInvalidUrl,
    ErrorFetchFailed,
    ErrorCancelled,
}

impl HttpValidationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpValidationStatus::Validated => "validated",
            HttpValidationStatus::FailedValidation => "failed_validation",
            HttpValidationStatus::ErrorTimeout => "error_timeout",
            HttpValidationStatus::ErrorRequestCreation => "error_request_creation",
            HttpValidationStatus::ErrorInvalidUrl => "error_invalid_url",
            HttpValidationStatus::ErrorFetchFailed => "error_fetch_failed",
            HttpValidationStatus::ErrorCancelled => "error_cancelled",
        }
    }
}

/// Resultado inmutable del sondeo HTTP de un dominio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpValidationResult {
    pub domain: String,
    pub final_url: String,
    pub status_code: u16,
    pub is_success: bool,
    pub status: HttpValidationStatus,
    /// Cabeceras con claves canonicalizadas (minúsculas).
    pub response_headers: BTreeMap<String, String>,
    /// Cuerpo post-descompresión acotado por MaxBodyReadBytes.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub raw_body: Vec<u8>,
    /// SHA-256 hex del cuerpo post-descompresión efectivamente leído.
    pub content_hash: Option<String>,
    pub extracted_title: Option<String>,
    /// Primeros 256 bytes del cuerpo, con elipsis si hubo truncamiento.
    pub extracted_snippet: Option<String>,
    pub duration_ms: u64,
    pub error: Option<String>,
    /// Identidad del proxy utilizado, si el gestor seleccionó alguno.
    pub proxy_id: Option<uuid::Uuid>,
    pub validated_at: DateTime<Utc>,
}

impl HttpValidationResult {
    /// Forja un veredicto de fallo previo a cualquier intento de red.
    pub fn aborted(
        domain: impl Into<String>,
        status: HttpValidationStatus,
        message: impl Into<String>,
    ) -> Self {
        let domain = domain.into();
        Self {
            final_url: domain.clone(),
            domain,
            status_code: 0,
            is_success: false,
            status,
            response_headers: BTreeMap::new(),
            raw_body: Vec::new(),
            content_hash: None,
            extracted_title: None,
            extracted_snippet: None,
            duration_ms: 0,
            error: Some(message.into()),
            proxy_id: None,
            validated_at: Utc::now(),
        }
    }
}
