// [libs/infra/http/src/extract.rs]
/*!
 * =================================================================
 * APARATO: CONTENT EXTRACTION UNIT (V3.2 - TITLE & SNIPPET)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: EXTRACCIÓN DE TÍTULO, SNIPPET Y HASH DE CONTENIDO
 * =================================================================
 */

use scraper::{Html, Selector};
use sha2::{Digest, Sha256};

/// Longitud máxima del snippet en bytes de cuerpo.
const SNIPPET_BYTE_CAP: usize = 256;

/// SHA-256 hex del cuerpo post-descompresión efectivamente leído.
pub fn content_hash(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Texto del primer `<title>` de un documento HTML, si existe.
pub fn extract_title(html_body: &[u8]) -> Option<String> {
    let document = Html::parse_document(&String::from_utf8_lossy(html_body));
    let title_selector = Selector::parse("title").ok()?;

    document.select(&title_selector).next().map(|element| {
        element.text().collect::<String>().trim().to_string()
    }).filter(|title| !title.is_empty())
}

/// Primeros 256 bytes del cuerpo, con elipsis cuando hubo truncamiento.
pub fn extract_snippet(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    if body.len() <= SNIPPET_BYTE_CAP {
        Some(String::from_utf8_lossy(body).to_string())
    } else {
        Some(format!("{}…", String::from_utf8_lossy(&body[..SNIPPET_BYTE_CAP])))
    }
}

/// El Content-Type declara un documento HTML.
pub fn is_html_content_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|value| value.to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false)
}
