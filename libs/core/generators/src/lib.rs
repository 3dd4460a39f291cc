// [libs/core/generators/src/lib.rs]
/*!
 * =================================================================
 * APARATO: COMBINATORIC DOMAIN GENERATOR (V3.4 - OFFSET BIJECTION)
 * CLASIFICACIÓN: CORE ENGINE (ESTRATO L1)
 * RESPONSABILIDAD: BIYECCIÓN DETERMINISTA OFFSET ↔ DOMINIO CANDIDATO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. PURE BIJECTION: generate_at(o) es función pura de los parámetros
 *    normalizados y el offset; ninguna mutación de estado interno.
 * 2. OVERFLOW GUARD: El conteo de combinaciones detecta el desborde de
 *    cada paso de potencia (max/base < acumulado) antes de multiplicar.
 * 3. CONFIG IDENTITY: El hash SHA-256 del patrón canónico identifica el
 *    espacio de búsqueda para reanudación y reutilización de campañas.
 *
 * # Mathematical Proof (Bijection):
 * Para ancho W sobre alfabeto de cardinal C, el offset k se expande como
 * número en base C con el dígito menos significativo escrito al final.
 * La expansión de ancho fijo es inyectiva sobre [0, C^W), y la división
 * prefijo/sufijo preserva la inyectividad por ser una partición posicional.
 * =================================================================
 */

pub mod errors;

use sha2::{Digest, Sha256};

use dominion_domain_models::generation::{DomainGenerationParams, PatternType};
pub use errors::GeneratorError;

/// Parámetros normalizados listos para la expansión combinatoria.
///
/// Normalización: charset deduplicado preservando primera ocurrencia; TLD en
/// minúsculas con exactamente un punto inicial; constante verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedParams {
    pub pattern: PatternType,
    pub prefix_len: u32,
    pub suffix_len: u32,
    pub charset: Vec<char>,
    pub constant: String,
    pub tld: String,
}

impl NormalizedParams {
    pub fn from_params(params: &DomainGenerationParams) -> Result<Self, GeneratorError> {
        // 1. DEDUPLICACIÓN DEL ALFABETO (primera ocurrencia prevalece)
        let mut charset: Vec<char> = Vec::with_capacity(params.character_set.chars().count());
        for candidate_char in params.character_set.chars() {
            if !charset.contains(&candidate_char) {
                charset.push(candidate_char);
            }
        }
        if charset.is_empty() {
            return Err(GeneratorError::EmptyCharset);
        }

        // 2. NORMALIZACIÓN DEL TLD (minúsculas, un único punto inicial)
        let stripped_tld = params.tld.trim().trim_start_matches('.').to_lowercase();
        if stripped_tld.is_empty() || !params.tld.trim().starts_with('.') {
            return Err(GeneratorError::InvalidTld(params.tld.clone()));
        }
        let tld = format!(".{}", stripped_tld);

        // 3. ANCHOS EFECTIVOS SEGÚN EL PATRÓN
        let (prefix_len, suffix_len) = match params.pattern {
            PatternType::Prefix => (params.prefix_var_len, 0),
            PatternType::Suffix => (0, params.suffix_var_len),
            PatternType::Both => (params.prefix_var_len, params.suffix_var_len),
        };

        Ok(Self {
            pattern: params.pattern,
            prefix_len,
            suffix_len,
            charset,
            constant: params.constant_string.clone(),
            tld,
        })
    }

    fn total_width(&self) -> u32 {
        self.prefix_len + self.suffix_len
    }
}

/// Generador determinista de dominios candidatos bajo un patrón.
#[derive(Debug, Clone)]
pub struct DomainGenerator {
    normalized: NormalizedParams,
    total: u64,
}

impl DomainGenerator {
    /// Valida, normaliza y precomputa el cardinal exacto del espacio.
    ///
    /// # Errors
    /// - `EmptyCharset` / `InvalidTld` en parámetros degenerados.
    /// - `CombinationOverflow` si C^W no cabe en u64.
    pub fn new(params: &DomainGenerationParams) -> Result<Self, GeneratorError> {
        let normalized = NormalizedParams::from_params(params)?;
        let total = checked_power(normalized.charset.len() as u64, normalized.total_width())?;
        Ok(Self { normalized, total })
    }

    /// Cardinal exacto del espacio combinatorio (1 si no hay segmento variable).
    pub fn total_combinations(&self) -> u64 {
        self.total
    }

    /// Parámetros normalizados del patrón activo.
    pub fn normalized_params(&self) -> &NormalizedParams {
        &self.normalized
    }

    /// Materializa el dominio único de la posición `offset`.
    ///
    /// El offset se expande en base |charset| con el dígito menos
    /// significativo escrito al final: el offset 0 produce el dominio
    /// lexicográficamente más bajo.
    pub fn generate_at(&self, offset: u64) -> Result<String, GeneratorError> {
        if offset >= self.total {
            return Err(GeneratorError::OffsetOutOfRange { offset, total: self.total });
        }

        let width = self.normalized.total_width() as usize;
        let base = self.normalized.charset.len() as u64;

        // 1. EXPANSIÓN POSICIONAL DE ANCHO FIJO
        let mut digit_indices = vec![0usize; width];
        let mut remainder = offset;
        for slot in digit_indices.iter_mut().rev() {
            *slot = (remainder % base) as usize;
            remainder /= base;
        }

        // 2. PARTICIÓN PREFIJO / SUFIJO Y ENSAMBLE PRE-DIMENSIONADO
        let prefix_width = self.normalized.prefix_len as usize;
        let mut domain_name = String::with_capacity(
            width + self.normalized.constant.len() + self.normalized.tld.len(),
        );
        for &digit in &digit_indices[..prefix_width] {
            domain_name.push(self.normalized.charset[digit]);
        }
        domain_name.push_str(&self.normalized.constant);
        for &digit in &digit_indices[prefix_width..] {
            domain_name.push(self.normalized.charset[digit]);
        }
        domain_name.push_str(&self.normalized.tld);

        Ok(domain_name)
    }

    /// Genera hasta `n` dominios contiguos desde `start`, recortando en total.
    ///
    /// Devuelve los dominios y el siguiente offset no consumido.
    pub fn generate_batch(&self, start: u64, n: usize) -> Result<(Vec<String>, u64), GeneratorError> {
        if start >= self.total {
            return Err(GeneratorError::OffsetOutOfRange { offset: start, total: self.total });
        }

        let end = start.saturating_add(n as u64).min(self.total);
        let mut batch = Vec::with_capacity((end - start) as usize);
        for offset in start..end {
            batch.push(self.generate_at(offset)?);
        }
        Ok((batch, end))
    }
}

/// Potencia exacta con guardia de desborde por paso (`max/base < acumulado`).
fn checked_power(base: u64, width: u32) -> Result<u64, GeneratorError> {
    let mut accumulated: u64 = 1;
    for _ in 0..width {
        if base != 0 && u64::MAX / base < accumulated {
            return Err(GeneratorError::CombinationOverflow { base, width });
        }
        accumulated *= base;
    }
    Ok(accumulated)
}

/// Hash canónico SHA-256 del patrón normalizado.
///
/// La serialización usa orden de claves fijo {patternType,
/// prefixVariableLength, suffixVariableLength, characterSet, constantString,
/// tld} sobre los valores normalizados, por lo que patrones equivalentes
/// (duplicados en el charset, TLD con mayúsculas) colapsan al mismo hash.
pub fn config_hash(params: &DomainGenerationParams) -> Result<String, GeneratorError> {
    let normalized = NormalizedParams::from_params(params)?;

    let pattern_label = match normalized.pattern {
        PatternType::Prefix => "prefix",
        PatternType::Suffix => "suffix",
        PatternType::Both => "both",
    };
    let charset_string: String = normalized.charset.iter().collect();

    // Ensamble manual para garantizar el orden de claves del contrato.
    let canonical_payload = format!(
        "{{\"patternType\":{},\"prefixVariableLength\":{},\"suffixVariableLength\":{},\"characterSet\":{},\"constantString\":{},\"tld\":{}}}",
        serde_json::to_string(pattern_label).expect("string literal always serializes"),
        normalized.prefix_len,
        normalized.suffix_len,
        serde_json::to_string(&charset_string).expect("string literal always serializes"),
        serde_json::to_string(&normalized.constant).expect("string literal always serializes"),
        serde_json::to_string(&normalized.tld).expect("string literal always serializes"),
    );

    let digest = Sha256::digest(canonical_payload.as_bytes());
    Ok(hex::encode(digest))
}
