// [libs/infra/dns/src/resolver.rs]
/*!
 * =================================================================
 * APARATO: RESOLVER ADDRESS CODEC (V3.2 - MULTI-TRANSPORT)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: DECODIFICACIÓN DE DIRECCIONES DE RESOLUTORES
 *
 * Formatos admitidos:
 *   "1.1.1.1"               — IPv4, puerto 53 implícito
 *   "1.1.1.1:5353"          — IPv4 con puerto explícito
 *   "2606:4700::1111"       — IPv6 desnudo, puerto 53
 *   "[2606:4700::1111]:53"  — IPv6 con corchetes y puerto
 *   "https://…/dns-query"   — endpoint DoH (dns-json; http:// admitido
 *                             para fixtures y resolutores internos)
 * =================================================================
 */

use std::net::SocketAddr;

use crate::errors::DnsError;

/// Destino concreto de una consulta, tras decodificar la dirección textual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverTarget {
    /// Datagrama UDP (con reintento TCP ante truncamiento).
    Udp(SocketAddr),
    /// Endpoint HTTPS dns-json.
    Doh(String),
}

/// Decodifica la dirección textual de un resolutor en su destino de transporte.
pub fn parse_resolver(input: &str) -> Result<ResolverTarget, DnsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DnsError::UnparseableResolver(input.to_string()));
    }

    // El esquema http:// queda admitido para fixtures y resolutores internos.
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        return Ok(ResolverTarget::Doh(trimmed.to_string()));
    }

    let socket_address: SocketAddr = if trimmed.starts_with('[') {
        trimmed
            .parse()
            .map_err(|_| DnsError::UnparseableResolver(input.to_string()))?
    } else if trimmed.contains("::") || trimmed.matches(':').count() > 1 {
        // IPv6 desnudo sin puerto
        let ip = trimmed
            .parse::<std::net::IpAddr>()
            .map_err(|_| DnsError::UnparseableResolver(input.to_string()))?;
        SocketAddr::new(ip, 53)
    } else if let Ok(address) = trimmed.parse::<SocketAddr>() {
        address
    } else {
        let ip = trimmed
            .parse::<std::net::IpAddr>()
            .map_err(|_| DnsError::UnparseableResolver(input.to_string()))?;
        SocketAddr::new(ip, 53)
    };

    Ok(ResolverTarget::Udp(socket_address))
}

/// Resolutores del sistema leídos de /etc/resolv.conf (Unix).
///
/// Devuelve vacío en plataformas sin el archivo o ante fallo de lectura.
pub fn system_resolvers() -> Vec<String> {
    let content = match std::fs::read_to_string("/etc/resolv.conf") {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };

    let mut resolvers = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with("nameserver") {
            continue;
        }
        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        if parts.len() >= 2 && parse_resolver(parts[1]).is_ok() {
            resolvers.push(parts[1].to_string());
        }
    }
    resolvers
}
