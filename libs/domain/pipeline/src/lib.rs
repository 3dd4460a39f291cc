// [libs/domain/pipeline/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE ORCHESTRATION REGISTRY (V3.0 - DOMINION SYNC)
 * CLASIFICACIÓN: DOMAIN ORCHESTRATION (ESTRATO L2)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DEL DUCTO DE PROSPECCIÓN
 * =================================================================
 */

pub mod errors;
pub mod events;
pub mod keywords;
pub mod metrics;
pub mod microcrawl;
pub mod orchestrator;
pub mod reconciler;
pub mod selector;
pub mod snapshots;

pub use errors::PipelineError;
pub use events::PhaseEventBroadcaster;
pub use keywords::{detect_parked, KeywordExtractor, KeywordSpec};
pub use metrics::{MetricsSink, NoopMetricsSink, TracingMetricsSink};
pub use orchestrator::{CampaignBlueprint, PipelineOrchestrator};
pub use reconciler::{ReconcilePassReport, Reconciler};
pub use selector::StealthSelector;
pub use snapshots::SnapshotLifecycle;
