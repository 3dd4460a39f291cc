// [libs/infra/dns/src/pool.rs]
/*!
 * =================================================================
 * APARATO: RESOLVER ROTATION POOL (V3.3 - STRATEGY DISPATCH)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: SELECCIÓN ESTRATÉGICA DE RESOLUTORES BAJO MUTEX
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SINGLE MUTEX: Todo el estado mutable (índices, expansión ponderada)
 *    vive bajo un único cerrojo por pool.
 * 2. EXTERNAL ADVANCE: El avance del índice preferido lo dispara la
 *    decisión de reintento del validador, nunca el propio pool.
 *
 * # Mathematical Proof (Weighted Frequency):
 * La expansión repite cada resolutor w veces y se baraja una única vez;
 * el round-robin sobre la expansión visita cada resolutor con frecuencia
 * w_i / Σw_j exacta en cada vuelta completa.
 * =================================================================
 */

use std::sync::Mutex;

use rand::rngs::OsRng;
use rand::Rng;

use dominion_domain_models::persona::{DnsPersonaConfig, ResolverStrategy};

struct PoolState {
    /// Lista base, barajada una vez en la ignición para random_rotation.
    rotation: Vec<String>,
    /// Expansión ponderada (resolutor × peso), barajada una vez.
    weighted: Vec<String>,
    /// preferred_order ∩ resolvers preservando el orden preferido.
    preferred: Vec<String>,
    current_index: usize,
    preferred_index: usize,
}

/// Pool de resolutores con rotación estratégica por campaña o por fetch.
pub struct ResolverPool {
    strategy: ResolverStrategy,
    state: Mutex<PoolState>,
}

fn shuffle_once(list: &mut [String]) {
    for i in (1..list.len()).rev() {
        let j = OsRng.gen_range(0..=i);
        list.swap(i, j);
    }
}

impl ResolverPool {
    pub fn new(persona: &DnsPersonaConfig) -> Self {
        // 1. LISTA BASE BARAJADA (random_rotation)
        let mut rotation = persona.resolvers.clone();
        shuffle_once(&mut rotation);

        // 2. EXPANSIÓN PONDERADA barajada una única vez
        let mut weighted = Vec::new();
        for resolver in &persona.resolvers {
            let weight = persona.weights.get(resolver).copied().unwrap_or(0);
            for _ in 0..weight {
                weighted.push(resolver.clone());
            }
        }
        shuffle_once(&mut weighted);

        // 3. ORDEN PREFERIDO restringido a los resolutores presentes
        let mut preferred: Vec<String> = persona
            .preferred_order
            .iter()
            .filter(|candidate| persona.resolvers.contains(candidate))
            .cloned()
            .collect();
        if preferred.is_empty() {
            preferred = persona.resolvers.clone();
        }

        Self {
            strategy: persona.strategy,
            state: Mutex::new(PoolState {
                rotation,
                weighted,
                preferred,
                current_index: 0,
                preferred_index: 0,
            }),
        }
    }

    pub fn strategy(&self) -> ResolverStrategy {
        self.strategy
    }

    /// Selecciona el siguiente resolutor según la estrategia activa.
    pub fn next(&self) -> Option<String> {
        let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());

        match self.strategy {
            ResolverStrategy::RandomRotation => Self::round_robin(&mut state, false),
            ResolverStrategy::WeightedRotation => {
                if state.weighted.is_empty() {
                    // Sin pesos declarados: degradación a la rotación base.
                    Self::round_robin(&mut state, false)
                } else {
                    Self::round_robin(&mut state, true)
                }
            }
            ResolverStrategy::SequentialFailover => {
                state.preferred.get(state.preferred_index).cloned()
            }
        }
    }

    fn round_robin(state: &mut PoolState, use_weighted: bool) -> Option<String> {
        let list = if use_weighted { &state.weighted } else { &state.rotation };
        if list.is_empty() {
            return None;
        }
        let selected = list[state.current_index % list.len()].clone();
        state.current_index = state.current_index.wrapping_add(1);
        Some(selected)
    }

    /// Avanza el índice preferido tras un fallo reintentable.
    ///
    /// Devuelve `true` si queda un resolutor preferido por intentar.
    pub fn advance_preferred(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        if state.preferred_index + 1 < state.preferred.len() {
            state.preferred_index += 1;
            true
        } else {
            false
        }
    }

    /// Restaura el índice preferido para el siguiente dominio.
    pub fn reset_preferred(&self) {
        let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        state.preferred_index = 0;
    }

    pub fn resolver_count(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        match self.strategy {
            ResolverStrategy::SequentialFailover => state.preferred.len(),
            _ => state.rotation.len(),
        }
    }
}
