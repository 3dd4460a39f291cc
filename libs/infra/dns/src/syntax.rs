// [libs/infra/dns/src/syntax.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN SYNTAX GATE (V3.1 - PRE-FLIGHT GUARD)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: RECHAZO SINTÁCTICO PREVIO AL CONSUMO DE RESOLUTORES
 * =================================================================
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Forma global exigida: etiquetas LDH de 1-63 + TLD alfabético de 2-63.
static DOMAIN_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9-]{1,63}\.)+[A-Za-z]{2,63}$").expect("static pattern compiles")
});

/// Valida la sintaxis completa del dominio candidato.
///
/// Además de la forma global: sin etiquetas vacías (`..`) y sin guiones
/// al inicio o final de ninguna etiqueta.
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.contains("..") || !DOMAIN_SHAPE.is_match(domain) {
        return false;
    }

    domain
        .split('.')
        .filter(|label| !label.is_empty())
        .all(|label| !label.starts_with('-') && !label.ends_with('-'))
}
