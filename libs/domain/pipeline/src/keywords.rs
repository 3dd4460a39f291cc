// [libs/domain/pipeline/src/keywords.rs]
/*!
 * =================================================================
 * APARATO: KEYWORD EVIDENCE EXTRACTOR (V3.3 - SURFACE SCAN)
 * CLASIFICACIÓN: DOMAIN ORCHESTRATION (ESTRATO L2)
 * RESPONSABILIDAD: EXTRACCIÓN DE COINCIDENCIAS Y DETECCIÓN DE PARKING
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DICTIONARY DRIVEN: El diccionario de la campaña (id, forma, peso,
 *    valor) gobierna el escaneo; el barrido es insensible a mayúsculas.
 * 2. BOUNDED HITS: El conteo por clave y señal se acota para inmunizar
 *    al agregador frente a páginas de relleno infinito.
 * =================================================================
 */

use serde::{Deserialize, Serialize};

use dominion_domain_models::signals::{KeywordHit, SignalType};

/// Tope de coincidencias registradas por clave y señal.
const MAX_HITS_PER_KEYWORD_SIGNAL: usize = 25;

/// Marcadores léxicos de páginas estacionadas.
const PARKING_MARKERS: &[&str] = &[
    "domain is for sale",
    "buy this domain",
    "this domain is parked",
    "domain parking",
    "sedo",
    "parkingcrew",
];

/// Entrada del diccionario de la campaña.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSpec {
    pub id: u64,
    pub surface_form: String,
    pub base_weight: f64,
    pub value_score: f64,
}

impl KeywordSpec {
    pub fn simple(id: u64, surface_form: impl Into<String>) -> Self {
        Self { id, surface_form: surface_form.into(), base_weight: 1.0, value_score: 1.0 }
    }
}

/// Extractor de evidencia de la campaña.
pub struct KeywordExtractor {
    dictionary: Vec<KeywordSpec>,
}

impl KeywordExtractor {
    pub fn new(dictionary: Vec<KeywordSpec>) -> Self {
        Self { dictionary }
    }

    pub fn dictionary_len(&self) -> usize {
        self.dictionary.len()
    }

    /// Escanea título y cuerpo produciendo las coincidencias posicionales.
    pub fn extract(&self, title: Option<&str>, body_text: &str) -> Vec<KeywordHit> {
        let mut hits = Vec::new();
        let lowered_body = body_text.to_ascii_lowercase();
        let lowered_title = title.map(|text| text.to_ascii_lowercase());

        for keyword in &self.dictionary {
            let needle = keyword.surface_form.to_ascii_lowercase();
            if needle.is_empty() {
                continue;
            }

            if let Some(title_text) = &lowered_title {
                scan_surface(title_text, &needle, keyword, SignalType::Title, &mut hits);
            }
            scan_surface(&lowered_body, &needle, keyword, SignalType::Body, &mut hits);
        }

        hits
    }

    /// Escaneo de una página de microcrawl: las coincidencias portan la
    /// señal de enriquecimiento.
    pub fn extract_microcrawl(&self, body_text: &str) -> Vec<KeywordHit> {
        let mut hits = Vec::new();
        let lowered_body = body_text.to_ascii_lowercase();

        for keyword in &self.dictionary {
            let needle = keyword.surface_form.to_ascii_lowercase();
            if needle.is_empty() {
                continue;
            }
            scan_surface(&lowered_body, &needle, keyword, SignalType::Microcrawl, &mut hits);
        }
        hits
    }
}

fn scan_surface(
    haystack: &str,
    needle: &str,
    keyword: &KeywordSpec,
    signal: SignalType,
    hits: &mut Vec<KeywordHit>,
) {
    let mut search_start = 0usize;
    let mut recorded = 0usize;

    while let Some(relative_position) = haystack[search_start..].find(needle) {
        let absolute_position = search_start + relative_position;
        hits.push(KeywordHit {
            keyword_id: keyword.id,
            surface_form: keyword.surface_form.clone(),
            signal_type: signal,
            position: absolute_position as u32,
            base_weight: keyword.base_weight,
            value_score: keyword.value_score,
        });

        recorded += 1;
        if recorded >= MAX_HITS_PER_KEYWORD_SIGNAL {
            break;
        }
        search_start = absolute_position + needle.len();
        if search_start >= haystack.len() {
            break;
        }
    }
}

/// Detección léxica de páginas estacionadas con confianza acumulativa.
pub fn detect_parked(body_text: &str) -> (bool, f64) {
    let lowered = body_text.to_ascii_lowercase();
    let marker_count = PARKING_MARKERS.iter().filter(|marker| lowered.contains(*marker)).count();

    if marker_count == 0 {
        return (false, 0.0);
    }
    let confidence = (0.5 + 0.2 * marker_count as f64).min(0.95);
    (true, confidence)
}
