// [libs/domain/models-rs/src/proxy.rs]
/*!
 * =================================================================
 * APARATO: PROXY DOMAIN MODELS (V3.0 - HEALTH FEEDBACK READY)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DE SALIDAS DE RED INTERMEDIADAS
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProxyProtocol {
    Http,
    Https,
    Socks5,
}

impl ProxyProtocol {
    pub fn scheme(self) -> &'static str {
        match self {
            ProxyProtocol::Http => "http",
            ProxyProtocol::Https => "https",
            ProxyProtocol::Socks5 => "socks5",
        }
    }
}

/// Salida de red compartida entre campañas.
///
/// `is_healthy` es mutado por los resultados de sondeo (last-write-wins por
/// identidad de proxy); la selección exige `is_enabled ∧ is_healthy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proxy {
    pub id: Uuid,
    pub protocol: ProxyProtocol,
    /// Dirección `host:puerto` sin esquema.
    pub address: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub is_enabled: bool,
    pub is_healthy: bool,
}

impl Proxy {
    /// URL completa del proxy para la construcción del cliente HTTP.
    pub fn url(&self) -> String {
        format!("{}://{}", self.protocol.scheme(), self.address)
    }

    pub fn is_usable(&self) -> bool {
        self.is_enabled && self.is_healthy
    }
}
