// [libs/core/stealth/src/classify.rs]
/*!
 * =================================================================
 * APARATO: LABEL PATTERN CLASSIFIER (V3.1 - BUCKET TAXONOMY)
 * CLASIFICACIÓN: CORE STEALTH (ESTRATO L1)
 * RESPONSABILIDAD: TAXONOMÍA DE ETIQUETAS PARA PRIORIZACIÓN E INTERCALADO
 * =================================================================
 */

use crate::dictionary::is_dictionary_word;

/// Patrón estructural de la etiqueta primaria de un dominio.
///
/// La precedencia de clasificación es numeric → dictionary → mixed → short
/// → random; una etiqueta pertenece exactamente a un grupo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LabelPattern {
    Numeric,
    Dictionary,
    Mixed,
    Short,
    Random,
}

impl LabelPattern {
    pub fn as_str(self) -> &'static str {
        match self {
            LabelPattern::Numeric => "numeric",
            LabelPattern::Dictionary => "dictionary",
            LabelPattern::Mixed => "mixed",
            LabelPattern::Short => "short",
            LabelPattern::Random => "random",
        }
    }

    /// Grupos en el orden de ronda del intercalado.
    pub fn ordered() -> [LabelPattern; 5] {
        [
            LabelPattern::Numeric,
            LabelPattern::Dictionary,
            LabelPattern::Mixed,
            LabelPattern::Short,
            LabelPattern::Random,
        ]
    }
}

/// Etiqueta primaria del dominio (segmento previo al primer punto).
pub fn primary_label(domain: &str) -> &str {
    domain.split('.').next().unwrap_or(domain)
}

pub fn is_all_numeric(label: &str) -> bool {
    !label.is_empty() && label.chars().all(|c| c.is_ascii_digit())
}

pub fn is_mixed_alphanumeric(label: &str) -> bool {
    let has_letters = label.chars().any(|c| c.is_ascii_alphabetic());
    let has_digits = label.chars().any(|c| c.is_ascii_digit());
    has_letters && has_digits
}

/// Clasifica la etiqueta primaria en su grupo estructural.
pub fn classify_label(label: &str) -> LabelPattern {
    if is_all_numeric(label) {
        LabelPattern::Numeric
    } else if is_dictionary_word(label) {
        LabelPattern::Dictionary
    } else if is_mixed_alphanumeric(label) {
        LabelPattern::Mixed
    } else if label.len() <= 8 {
        LabelPattern::Short
    } else {
        LabelPattern::Random
    }
}
