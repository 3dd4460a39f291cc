// [libs/domain/models-rs/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN CONTRACT REGISTRY (V3.0 - DOMINION SYNC)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE CONTRATOS SOBERANOS
 * =================================================================
 */

pub mod campaign;
pub mod config;
pub mod events;
pub mod features;
pub mod generation;
pub mod persona;
pub mod proxy;
pub mod scoring;
pub mod signals;
pub mod validation;

pub use campaign::{Campaign, CampaignMode, CampaignState};
pub use config::{
    default_signal_weights, DnsValidatorConfig, HttpValidatorConfig, MicrocrawlConfig,
    PipelineConfig, RichnessConfig, RichnessWeights, ShuffleStrategy, StealthPhaseConfig,
};
pub use events::{PhaseEvent, PhaseEventStatus, PhaseEventType, PipelinePhase};
pub use features::{FeatureAggregate, FeatureRow, PageArchetype, ProcessingState, TopKeyword};
pub use generation::{DomainGenerationParams, GeneratedDomain, PatternType};
pub use persona::{
    CookieMode, DnsPersonaConfig, HttpPersonaConfig, Persona, PersonaKind, ResolverStrategy,
};
pub use proxy::{Proxy, ProxyProtocol};
pub use scoring::ScoringProfileSnapshot;
pub use signals::{KeywordHit, MicrocrawlSignals, RawSignals, SignalType};
pub use validation::{
    DnsValidationResult, DnsValidationStatus, HttpValidationResult, HttpValidationStatus,
};
