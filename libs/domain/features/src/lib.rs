// [libs/domain/features/src/lib.rs]
/*!
 * =================================================================
 * APARATO: FEATURE ENGINE REGISTRY (V2.0 - DOMINION SYNC)
 * CLASIFICACIÓN: DOMAIN ENGINE (ESTRATO L2)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DEL MOTOR DE FEATURES
 * =================================================================
 */

pub mod aggregator;
pub mod gate;
pub mod governance;
pub mod richness;

pub use aggregator::{build_features, FeatureBuilderParams};
pub use gate::should_microcrawl;
pub use governance::{validate_feature_vector, GovernanceVerdict};
pub use richness::{legacy_score, v2_score, RichnessBreakdown};
