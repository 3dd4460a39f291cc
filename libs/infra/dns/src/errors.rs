// [libs/infra/dns/src/errors.rs]
/*!
 * =================================================================
 * APARATO: DNS FAULT CATALOG (V3.2 - RETRY TAXONOMY)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE RESOLUCIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. RETRY TAXONOMY: Cada fallo declara su reintentabilidad bajo
 *    failover secuencial; NXDOMAIN y Cancelled son siempre terminales.
 * 2. PANOPTICON COMPLIANCE: Prefijos de estrato para el renderizado
 *    estructurado en el Dashboard.
 * =================================================================
 */

use thiserror::Error;

/// Fallo de una subconsulta individual (A o AAAA) contra un resolutor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryFault {
    /// El resolutor certificó la inexistencia del nombre.
    #[error("[L3_DNS_LOOKUP]: NXDOMAIN")]
    Nxdomain,

    /// Respuesta NoError sin registros del tipo consultado (no such host).
    #[error("[L3_DNS_LOOKUP]: NO_RECORDS")]
    NoRecords,

    /// La consulta agotó su presupuesto temporal.
    #[error("[L3_DNS_NET_FAULT]: QUERY_TIMEOUT")]
    Timeout,

    /// El transporte rechazó la conexión (puerto cerrado o filtrado).
    #[error("[L3_DNS_NET_FAULT]: CONNECTION_REFUSED -> {0}")]
    Refused(String),

    /// Fallo de E/S del datagrama o del stream TCP.
    #[error("[L3_DNS_NET_FAULT]: IO_FAULT -> {0}")]
    Io(String),

    /// El servidor respondió con un Rcode de mal comportamiento.
    #[error("[L3_DNS_SERVER_FAULT]: SERVER_MISBEHAVING -> {0}")]
    ServerMisbehaving(String),

    /// El canal DoH devolvió un estado HTTP no exitoso.
    #[error("[L3_DNS_DOH_FAULT]: HTTP_{status}")]
    DohHttp { status: u16, parameter_error: bool },

    /// Trama inválida o deriva de protocolo (txid, truncamiento no recuperable).
    #[error("[L3_DNS_PROTO_FAULT]: {0}")]
    Protocol(String),

    /// El token de cancelación interrumpió la subconsulta.
    #[error("[L3_DNS_FAULT]: CANCELLED")]
    Cancelled,
}

impl QueryFault {
    /// El fallo certifica inexistencia del nombre (equivalente a éxito terminal).
    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryFault::Nxdomain | QueryFault::NoRecords)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, QueryFault::Timeout)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, QueryFault::Cancelled)
    }

    /// Reintentabilidad bajo failover secuencial: timeout, rechazo de
    /// conexión, E/S, servidor errático y HTTP 400 DoH no paramétrico.
    pub fn is_retryable(&self) -> bool {
        match self {
            QueryFault::Timeout
            | QueryFault::Refused(_)
            | QueryFault::Io(_)
            | QueryFault::ServerMisbehaving(_) => true,
            QueryFault::DohHttp { status, parameter_error } => {
                *status == 400 && !parameter_error || *status >= 500
            }
            _ => false,
        }
    }
}

/// Fallos del aparato de validación por encima de la subconsulta.
#[derive(Error, Debug)]
pub enum DnsError {
    /// El dominio no supera el gate sintáctico; ningún resolutor se consume.
    #[error("Invalid domain format")]
    InvalidDomainFormat,

    /// El pool quedó sin resolutores utilizables.
    #[error("[L3_DNS_POOL_FAULT]: NO_RESOLVER_AVAILABLE")]
    NoResolverAvailable,

    /// La dirección del resolutor no es IP, IP:puerto ni URL DoH.
    #[error("[L3_DNS_POOL_FAULT]: UNPARSEABLE_RESOLVER -> {0}")]
    UnparseableResolver(String),

    /// Fallo de construcción del cliente DoH.
    #[error("[L3_DNS_DOH_FAULT]: CLIENT_IGNITION -> {0}")]
    DohClientBuild(String),
}
