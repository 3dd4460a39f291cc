/**
 * CERTIFICACIÓN: Rotación de resolutores — cobertura total en rotación
 * aleatoria, frecuencia proporcional al peso y disciplina del failover.
 */
use std::collections::{HashMap, HashSet};

use dominion_domain_models::persona::{DnsPersonaConfig, ResolverStrategy};
use dominion_infra_dns::ResolverPool;

fn persona(resolvers: &[&str], strategy: ResolverStrategy) -> DnsPersonaConfig {
    DnsPersonaConfig {
        resolvers: resolvers.iter().map(|r| r.to_string()).collect(),
        strategy,
        ..DnsPersonaConfig::default()
    }
}

#[test]
fn certify_random_rotation_covers_every_resolver() {
    println!("\n🚀 [AUDIT]: Initiating Resolver Rotation Coverage Audit...");
    let resolvers = ["1.1.1.1", "8.8.8.8", "9.9.9.9", "208.67.222.222"];
    let pool = ResolverPool::new(&persona(&resolvers, ResolverStrategy::RandomRotation));

    let mut visited = HashSet::new();
    for _ in 0..resolvers.len() * 4 {
        visited.insert(pool.next().expect("non-empty pool"));
    }

    assert_eq!(visited.len(), resolvers.len(), "round-robin must visit every resolver");
    println!("   ✅ Coverage: {}/{} resolvers visited.", visited.len(), resolvers.len());
}

#[test]
fn certify_weighted_rotation_matches_declared_weights() {
    let mut config =
        persona(&["1.1.1.1", "8.8.8.8", "9.9.9.9"], ResolverStrategy::WeightedRotation);
    config.weights = HashMap::from([
        ("1.1.1.1".to_string(), 5),
        ("8.8.8.8".to_string(), 3),
        ("9.9.9.9".to_string(), 2),
    ]);
    let pool = ResolverPool::new(&config);

    // 10 vueltas completas sobre la expansión de 10 posiciones.
    let mut tally: HashMap<String, u32> = HashMap::new();
    for _ in 0..100 {
        *tally.entry(pool.next().expect("non-empty pool")).or_insert(0) += 1;
    }

    assert_eq!(tally.get("1.1.1.1"), Some(&50));
    assert_eq!(tally.get("8.8.8.8"), Some(&30));
    assert_eq!(tally.get("9.9.9.9"), Some(&20));
}

#[test]
fn certify_failover_discipline_and_reset() {
    let mut config = persona(
        &["1.1.1.1", "8.8.8.8", "9.9.9.9"],
        ResolverStrategy::SequentialFailover,
    );
    config.preferred_order = vec!["8.8.8.8".to_string(), "9.9.9.9".to_string()];
    let pool = ResolverPool::new(&config);

    // El pool sirve el preferido vigente hasta que el reintento lo avanza.
    assert_eq!(pool.next(), Some("8.8.8.8".to_string()));
    assert_eq!(pool.next(), Some("8.8.8.8".to_string()));

    assert!(pool.advance_preferred());
    assert_eq!(pool.next(), Some("9.9.9.9".to_string()));

    // Jamás avanza más allá del último preferido.
    assert!(!pool.advance_preferred());
    assert_eq!(pool.next(), Some("9.9.9.9".to_string()));

    // El éxito del dominio restaura el cursor para el siguiente.
    pool.reset_preferred();
    assert_eq!(pool.next(), Some("8.8.8.8".to_string()));
}
