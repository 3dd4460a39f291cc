// [libs/core/stealth/src/lib.rs]
/*!
 * =================================================================
 * APARATO: STEALTH SHUFFLE ENGINE (V3.3 - CRYPTO ENTROPY)
 * CLASIFICACIÓN: CORE STEALTH (ESTRATO L1)
 * RESPONSABILIDAD: BARAJADO CRIPTOGRÁFICO DE STREAMS DE CANDIDATOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CSPRNG ONLY: Todo barajado usa OsRng; jamás un PRNG sembrable fuera
 *    del Proving Grounds.
 * 2. SINGLE THREAD: Los barajados son síncronos y de hilo único; la
 *    concurrencia vive en las fases, no en la entropía.
 *
 * # Mathematical Proof (Fisher-Yates Uniformity):
 * El intercambio con índice uniforme j ∈ [0, i+1) en orden descendente
 * produce cada permutación con probabilidad 1/n!; la fuente OsRng hace
 * el stream de índices impredecible para un observador externo.
 * =================================================================
 */

pub mod classify;
pub mod dictionary;

use rand::rngs::OsRng;
use rand::Rng;
use std::collections::BTreeMap;

use dominion_domain_models::config::{ShuffleStrategy, StealthPhaseConfig};

pub use classify::{classify_label, primary_label, LabelPattern};
pub use dictionary::is_dictionary_word;

/// Barajado Fisher-Yates in situ con enteros uniformes de OsRng.
pub fn full_shuffle(domains: &mut [String]) {
    for i in (1..domains.len()).rev() {
        let j = OsRng.gen_range(0..=i);
        domains.swap(i, j);
    }
}

/// Particiona en bloques contiguos de `block_size` y baraja cada bloque.
///
/// El orden relativo entre bloques se preserva; el sigilo opera dentro
/// de la ventana local.
pub fn block_shuffle(domains: &mut [String], block_size: usize) {
    let effective_block = block_size.max(1);
    for block in domains.chunks_mut(effective_block) {
        for i in (1..block.len()).rev() {
            let j = OsRng.gen_range(0..=i);
            block.swap(i, j);
        }
    }
}

/// Cubo de prioridad asignado por las pistas activas.
///
/// short ⇒ etiqueta ≤ 8 → 1; dictionary ⇒ léxico → 1; numeric → 2;
/// mixed → 2; resto → 2 (default). El cubo 3 queda reservado para
/// degradaciones explícitas futuras del clasificador.
fn priority_bucket(domain: &str, hints: &[String]) -> u8 {
    let label = primary_label(domain);

    for hint in hints {
        match hint.as_str() {
            "short" if label.len() <= 8 => return 1,
            "dictionary" if is_dictionary_word(label) => return 1,
            "numeric" if classify::is_all_numeric(label) => return 2,
            "mixed" if classify::is_mixed_alphanumeric(label) => return 2,
            _ => {}
        }
    }
    2
}

/// Barajado ponderado: cubos {1 alta, 2 media, 3 baja} barajados de forma
/// independiente y concatenados 1 ‖ 2 ‖ 3.
pub fn weighted_shuffle(domains: Vec<String>, priority_hints: &[String]) -> Vec<String> {
    let mut buckets: BTreeMap<u8, Vec<String>> = BTreeMap::new();
    for domain in domains {
        let bucket = priority_bucket(&domain, priority_hints);
        buckets.entry(bucket).or_default().push(domain);
    }

    let mut ordered = Vec::new();
    for (_, mut bucket_members) in buckets {
        full_shuffle(&mut bucket_members);
        ordered.extend(bucket_members);
    }
    ordered
}

/// Barajado intercalado: agrupa por patrón estructural, baraja cada grupo
/// y reparte en ronda entre grupos no vacíos.
pub fn interleaved_shuffle(domains: Vec<String>) -> Vec<String> {
    let mut groups: BTreeMap<LabelPattern, Vec<String>> = BTreeMap::new();
    for domain in domains {
        let pattern = classify_label(primary_label(&domain));
        groups.entry(pattern).or_default().push(domain);
    }

    let mut shuffled_groups: Vec<Vec<String>> = LabelPattern::ordered()
        .into_iter()
        .filter_map(|pattern| groups.remove(&pattern))
        .map(|mut group| {
            full_shuffle(&mut group);
            group
        })
        .collect();

    // Ronda circular: una extracción por grupo mientras quede inventario.
    let total: usize = shuffled_groups.iter().map(Vec::len).sum();
    let mut interleaved = Vec::with_capacity(total);
    let mut cursors = vec![0usize; shuffled_groups.len()];
    while interleaved.len() < total {
        for (group_index, group) in shuffled_groups.iter_mut().enumerate() {
            if cursors[group_index] < group.len() {
                interleaved.push(std::mem::take(&mut group[cursors[group_index]]));
                cursors[group_index] += 1;
            }
        }
    }
    interleaved
}

/// Trunca el universo a `max(1, ⌊n × pct⌋)` antes del barajado.
pub fn apply_subset(mut domains: Vec<String>, subset_pct: Option<f64>) -> Vec<String> {
    if let Some(pct) = subset_pct {
        if pct > 0.0 && pct < 1.0 {
            let retained = ((domains.len() as f64) * pct).floor() as usize;
            domains.truncate(retained.max(1));
        }
    }
    domains
}

/// Aplica la estrategia configurada de la fase sobre el stream de candidatos.
pub fn randomize(domains: Vec<String>, config: &StealthPhaseConfig) -> Vec<String> {
    let mut candidates = apply_subset(domains, config.subset_pct);

    match config.strategy {
        ShuffleStrategy::FullShuffle => {
            full_shuffle(&mut candidates);
            candidates
        }
        ShuffleStrategy::BlockShuffle => {
            block_shuffle(&mut candidates, config.block_size);
            candidates
        }
        ShuffleStrategy::Weighted => weighted_shuffle(candidates, &config.priority_hints),
        ShuffleStrategy::Interleaved => interleaved_shuffle(candidates),
    }
}
