// [libs/domain/pipeline/src/orchestrator.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE PHASE ORCHESTRATOR (V3.8 - CAMPAIGN CONDUCTOR)
 * CLASIFICACIÓN: DOMAIN ORCHESTRATION (ESTRATO L2)
 * RESPONSABILIDAD: SECUENCIACIÓN GENERACIÓN → DNS → HTTP → FEATURES → SCORING
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. RESUMABLE PHASES: Cada fase deriva su trabajo restante del predicado
 *    del Ledger; el cursor persistido sella la reanudación de generación.
 * 2. COOPERATIVE CANCEL: El token de campaña corta toda ráfaga en vuelo;
 *    ninguna agregación cancelada sella building → ready.
 * 3. PAUSE AWARE: El autómata de campaña se relee entre lotes; Paused
 *    detiene el ducto dejando los cursores sellados.
 * 4. PHASE EVENTS: Arranque, progreso, sellado y fallo se difunden por
 *    el bus best-effort.
 * =================================================================
 */

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use dominion_core_gen::{config_hash, DomainGenerator};
use dominion_domain_features::{build_features, should_microcrawl, FeatureBuilderParams};
use dominion_domain_models::campaign::{CampaignMode, CampaignState};
use dominion_domain_models::config::{
    DnsValidatorConfig, HttpValidatorConfig, MicrocrawlConfig, PipelineConfig, StealthPhaseConfig,
};
use dominion_domain_models::events::{
    PhaseEvent, PhaseEventStatus, PhaseEventType, PipelinePhase,
};
use dominion_domain_models::generation::{DomainGenerationParams, GeneratedDomain};
use dominion_domain_models::persona::{DnsPersonaConfig, HttpPersonaConfig};
use dominion_domain_models::signals::RawSignals;
use dominion_domain_models::validation::{DnsValidationStatus, HttpValidationStatus};
use dominion_infra_db::{
    CampaignRepository, FeatureRepository, GeneratedDomainRepository, PhaseExecutionRepository,
    SnapshotRepository, TursoClient, ValidationResultRepository,
};
use dominion_infra_dns::DnsValidator;
use dominion_infra_http::{HttpFetcher, HttpValidator, ProxyManager};

use crate::errors::PipelineError;
use crate::events::PhaseEventBroadcaster;
use crate::keywords::{detect_parked, KeywordExtractor, KeywordSpec};
use crate::metrics::MetricsSink;
use crate::microcrawl;
use crate::selector::StealthSelector;
use crate::snapshots::SnapshotLifecycle;

/// Tamaño de lote de la fase de generación.
const GENERATION_BATCH_SIZE: usize = 500;
/// Tamaño de lote de reclamación de la fase de features.
const FEATURE_CLAIM_BATCH_SIZE: usize = 50;

/// Plan completo de ejecución de una campaña.
#[derive(Debug, Clone)]
pub struct CampaignBlueprint {
    pub campaign_id: Uuid,
    pub generation: DomainGenerationParams,
    pub http_persona: HttpPersonaConfig,
    pub dns_persona: DnsPersonaConfig,
    pub keywords: Vec<KeywordSpec>,
    pub dns_stealth: StealthPhaseConfig,
    pub http_stealth: StealthPhaseConfig,
}

/// Veredicto de una fase individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseOutcome {
    Completed,
    Paused,
}

pub struct PipelineOrchestrator {
    client: TursoClient,
    dns_config: DnsValidatorConfig,
    http_config: HttpValidatorConfig,
    pipeline_config: PipelineConfig,
    builder_params: FeatureBuilderParams,
    microcrawl_config: MicrocrawlConfig,
    broadcaster: Arc<PhaseEventBroadcaster>,
    metrics: Arc<dyn MetricsSink>,
    proxy_manager: Option<Arc<dyn ProxyManager>>,
}

impl PipelineOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client: TursoClient,
        dns_config: DnsValidatorConfig,
        http_config: HttpValidatorConfig,
        pipeline_config: PipelineConfig,
        builder_params: FeatureBuilderParams,
        microcrawl_config: MicrocrawlConfig,
        broadcaster: Arc<PhaseEventBroadcaster>,
        metrics: Arc<dyn MetricsSink>,
        proxy_manager: Option<Arc<dyn ProxyManager>>,
    ) -> Self {
        Self {
            client,
            dns_config,
            http_config,
            pipeline_config,
            builder_params,
            microcrawl_config,
            broadcaster,
            metrics,
            proxy_manager,
        }
    }

    /// Conduce la campaña a través de la secuencia completa de fases.
    #[instrument(skip(self, blueprint, cancellation_token), fields(campaign = %blueprint.campaign_id))]
    pub async fn run_campaign(
        &self,
        blueprint: &CampaignBlueprint,
        cancellation_token: &CancellationToken,
    ) -> Result<(), PipelineError> {
        let campaigns = CampaignRepository::new(self.client.get_connection()?);
        let campaign = campaigns.get(blueprint.campaign_id).await?;

        // 1. IGNICIÓN DEL AUTÓMATA DE CAMPAÑA
        match campaign.state {
            CampaignState::Draft => {
                campaigns
                    .transition(campaign.id, CampaignState::Draft, CampaignState::Running)
                    .await?
            }
            CampaignState::Paused => {
                campaigns
                    .transition(campaign.id, CampaignState::Paused, CampaignState::Running)
                    .await?
            }
            CampaignState::Running => {}
            CampaignState::Completed | CampaignState::Failed => {
                info!("🏁 [PIPELINE]: Campaign already terminal, nothing to drive.");
                return Ok(());
            }
        }

        // 2. SECUENCIA DE FASES SEGÚN EL MODO
        let phases: Vec<PipelinePhase> = match campaign.mode {
            CampaignMode::FullPipeline => PipelinePhase::ordered().to_vec(),
            CampaignMode::DnsOnly => {
                vec![PipelinePhase::Generation, PipelinePhase::DnsValidation]
            }
            CampaignMode::HttpOnly => vec![
                PipelinePhase::HttpKeywordValidation,
                PipelinePhase::FeatureAggregation,
                PipelinePhase::Scoring,
            ],
        };

        for phase in phases {
            if cancellation_token.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            self.emit(blueprint.campaign_id, PhaseEventType::PhaseStart, phase, "ignition", None);
            let phase_started = Instant::now();

            let outcome = match phase {
                PipelinePhase::Generation => {
                    self.run_generation(blueprint, cancellation_token).await
                }
                PipelinePhase::DnsValidation => self.run_dns(blueprint, cancellation_token).await,
                PipelinePhase::HttpKeywordValidation => {
                    self.run_http(blueprint, cancellation_token).await
                }
                PipelinePhase::FeatureAggregation => {
                    self.run_features(blueprint, cancellation_token).await
                }
                PipelinePhase::Scoring => self.run_scoring(blueprint, cancellation_token).await,
            };

            self.metrics.observe_histogram(
                "pipeline_phase_duration_seconds",
                &[("phase", phase.as_str())],
                phase_started.elapsed().as_secs_f64(),
            );

            match outcome {
                Ok(PhaseOutcome::Completed) => {
                    self.emit(
                        blueprint.campaign_id,
                        PhaseEventType::PhaseComplete,
                        phase,
                        "sealed",
                        Some(1.0),
                    );
                }
                Ok(PhaseOutcome::Paused) => {
                    info!("⏸️  [PIPELINE]: Campaign paused, cursors sealed.");
                    self.emit_with_status(
                        blueprint.campaign_id,
                        PhaseEventType::PhaseProgress,
                        phase,
                        "paused",
                        PhaseEventStatus::Warning,
                    );
                    return Ok(());
                }
                Err(phase_fault) => {
                    self.emit_with_status(
                        blueprint.campaign_id,
                        PhaseEventType::PhaseFailed,
                        phase,
                        "collapsed",
                        PhaseEventStatus::Error,
                    );
                    if !matches!(phase_fault, PipelineError::Cancelled) {
                        let _ = campaigns
                            .transition(
                                blueprint.campaign_id,
                                CampaignState::Running,
                                CampaignState::Failed,
                            )
                            .await;
                    }
                    return Err(phase_fault);
                }
            }
        }

        // 3. SELLADO TERMINAL
        campaigns
            .transition(blueprint.campaign_id, CampaignState::Running, CampaignState::Completed)
            .await?;
        info!("🏁 [PIPELINE]: Campaign sealed as completed.");
        Ok(())
    }

    // --- FASE 1: GENERACIÓN ---

    async fn run_generation(
        &self,
        blueprint: &CampaignBlueprint,
        cancellation_token: &CancellationToken,
    ) -> Result<PhaseOutcome, PipelineError> {
        let generator = DomainGenerator::new(&blueprint.generation)?;
        let pattern_hash = config_hash(&blueprint.generation)?;
        info!(
            "🧬 [GENERATION]: Space of {} candidates under pattern [{}].",
            generator.total_combinations(),
            &pattern_hash[..12]
        );

        let domains = GeneratedDomainRepository::new(self.client.get_connection()?);
        let phases = PhaseExecutionRepository::new(self.client.get_connection()?);

        // Reanudación desde el cursor persistido de la fase.
        let checkpoint = phases.load(blueprint.campaign_id, PipelinePhase::Generation).await?;
        if checkpoint.as_ref().map(|c| c.status == "complete").unwrap_or(false) {
            return Ok(PhaseOutcome::Completed);
        }
        let mut cursor = checkpoint.map(|c| c.cursor_value).unwrap_or(0);
        let total = generator.total_combinations();

        while cursor < total {
            if cancellation_token.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            if self.is_paused(blueprint.campaign_id).await? {
                return Ok(PhaseOutcome::Paused);
            }

            let (batch, next_offset) = generator.generate_batch(cursor, GENERATION_BATCH_SIZE)?;
            let rows: Vec<GeneratedDomain> = batch
                .into_iter()
                .enumerate()
                .map(|(index, domain_name)| GeneratedDomain {
                    campaign_id: blueprint.campaign_id,
                    offset_index: cursor + index as u64,
                    domain_name,
                })
                .collect();

            domains.insert_batch(&rows).await?;
            phases
                .checkpoint(blueprint.campaign_id, PipelinePhase::Generation, "running", next_offset)
                .await?;

            self.emit(
                blueprint.campaign_id,
                PhaseEventType::PhaseProgress,
                PipelinePhase::Generation,
                "seeding",
                Some(next_offset as f64 / total as f64),
            );
            cursor = next_offset;
        }

        phases
            .checkpoint(blueprint.campaign_id, PipelinePhase::Generation, "complete", total)
            .await?;
        Ok(PhaseOutcome::Completed)
    }

    // --- FASE 2: VALIDACIÓN DNS ---

    async fn run_dns(
        &self,
        blueprint: &CampaignBlueprint,
        cancellation_token: &CancellationToken,
    ) -> Result<PhaseOutcome, PipelineError> {
        let validator = DnsValidator::new(&self.dns_config, blueprint.dns_persona.clone())
            .map_err(|fault| PipelineError::PhaseFailed {
                phase: "dns",
                detail: fault.to_string(),
            })?;
        let selector =
            StealthSelector::new(GeneratedDomainRepository::new(self.client.get_connection()?));
        let validations = ValidationResultRepository::new(self.client.get_connection()?);
        let domains = GeneratedDomainRepository::new(self.client.get_connection()?);

        loop {
            // El predicado del Ledger define el trabajo restante.
            let candidates = selector
                .randomize_domains(
                    blueprint.campaign_id,
                    PipelinePhase::DnsValidation,
                    &blueprint.dns_stealth,
                )
                .await?;
            if candidates.is_empty() {
                break;
            }

            let chunk_size = self.dns_config.max_domains_per_request.max(1);
            for chunk in candidates.chunks(chunk_size) {
                if cancellation_token.is_cancelled() {
                    return Err(PipelineError::Cancelled);
                }
                if self.is_paused(blueprint.campaign_id).await? {
                    return Ok(PhaseOutcome::Paused);
                }

                let results = validator.validate_many(chunk, cancellation_token).await;
                for result in &results {
                    // Los veredictos Cancelled no consumen el predicado.
                    if result.status == DnsValidationStatus::Cancelled {
                        continue;
                    }
                    validations.upsert_dns(blueprint.campaign_id, result).await?;
                    self.metrics.incr_counter(
                        "dns_validations_total",
                        &[("status", result.status.as_str())],
                        1,
                    );
                }

                let remaining = domains.count_dns_pending(blueprint.campaign_id).await?;
                let total = domains.count(blueprint.campaign_id).await?.max(1);
                self.emit(
                    blueprint.campaign_id,
                    PhaseEventType::PhaseProgress,
                    PipelinePhase::DnsValidation,
                    "probing",
                    Some(1.0 - remaining as f64 / total as f64),
                );
            }
        }

        Ok(PhaseOutcome::Completed)
    }

    // --- FASE 3: SONDEO HTTP + EXTRACCIÓN DE EVIDENCIA ---

    async fn run_http(
        &self,
        blueprint: &CampaignBlueprint,
        cancellation_token: &CancellationToken,
    ) -> Result<PhaseOutcome, PipelineError> {
        let validator = HttpValidator::new(HttpFetcher::new(
            self.http_config.clone(),
            self.proxy_manager.clone(),
        ));
        let microcrawl_fetcher =
            HttpFetcher::new(self.http_config.clone(), self.proxy_manager.clone());
        let extractor = KeywordExtractor::new(blueprint.keywords.clone());

        let selector =
            StealthSelector::new(GeneratedDomainRepository::new(self.client.get_connection()?));
        let validations = ValidationResultRepository::new(self.client.get_connection()?);
        let domains = GeneratedDomainRepository::new(self.client.get_connection()?);
        let features = FeatureRepository::new(self.client.get_connection()?);

        let dns_persona_active = !blueprint.dns_persona.resolvers.is_empty();

        loop {
            let candidates = selector
                .randomize_domains(
                    blueprint.campaign_id,
                    PipelinePhase::HttpKeywordValidation,
                    &blueprint.http_stealth,
                )
                .await?;
            if candidates.is_empty() {
                break;
            }

            let chunk_size = self.http_config.max_domains_per_request.max(1);
            for chunk in candidates.chunks(chunk_size) {
                if cancellation_token.is_cancelled() {
                    return Err(PipelineError::Cancelled);
                }
                if self.is_paused(blueprint.campaign_id).await? {
                    return Ok(PhaseOutcome::Paused);
                }

                let results = validator
                    .validate_many(
                        chunk,
                        chunk_size,
                        &blueprint.http_persona,
                        dns_persona_active.then_some(&blueprint.dns_persona),
                        None,
                        cancellation_token,
                    )
                    .await;

                for result in &results {
                    if result.status == HttpValidationStatus::ErrorCancelled {
                        continue;
                    }
                    validations.upsert_http(blueprint.campaign_id, result).await?;
                    self.metrics.incr_counter(
                        "http_validations_total",
                        &[("status", result.status.as_str())],
                        1,
                    );

                    if !result.is_success {
                        continue;
                    }

                    // 1. EXTRACCIÓN DE EVIDENCIA BASE
                    let body_text = String::from_utf8_lossy(&result.raw_body).to_string();
                    let mut hits =
                        extractor.extract(result.extracted_title.as_deref(), &body_text);
                    let (is_parked, parked_confidence) = detect_parked(&body_text);

                    // 2. COMPUERTA DE MICROCRAWL SOBRE EL AGREGADO BASE
                    let base_signals = RawSignals {
                        html_bytes: result.raw_body.len() as u64,
                        http_status: result.status_code,
                        fetch_latency_ms: result.duration_ms,
                        content_hash: result.content_hash.clone(),
                        content_bytes: result.raw_body.len() as u64,
                        language: None,
                        parsed_keyword_hits: hits.clone(),
                        microcrawl: None,
                        is_parked,
                        parked_confidence,
                    };
                    let base_aggregate = build_features(&base_signals, &self.builder_params);

                    let mut microcrawl_signals = None;
                    if should_microcrawl(&base_aggregate, &self.microcrawl_config) {
                        let base_ids: HashSet<u64> =
                            hits.iter().map(|hit| hit.keyword_id).collect();
                        let (extra_hits, signals) = microcrawl::enrich(
                            &microcrawl_fetcher,
                            &result.domain,
                            &blueprint.http_persona,
                            &extractor,
                            &base_ids,
                            self.microcrawl_config.budget_pages,
                            cancellation_token,
                        )
                        .await;
                        hits.extend(extra_hits);
                        microcrawl_signals = Some(signals);
                        self.metrics.incr_counter("microcrawl_executions_total", &[], 1);
                    }

                    // 3. SELLADO DE EVIDENCIA Y SIEMBRA DE LA FILA DE FEATURES
                    validations
                        .record_keyword_evidence(
                            blueprint.campaign_id,
                            &result.domain,
                            result.raw_body.len() as u64,
                            &hits,
                            microcrawl_signals.as_ref(),
                            is_parked,
                            parked_confidence,
                        )
                        .await?;

                    if let Some(domain_id) =
                        domains.domain_id(blueprint.campaign_id, &result.domain).await?
                    {
                        features.ensure_pending(blueprint.campaign_id, domain_id).await?;
                    } else {
                        warn!(domain = %result.domain, "⚠️  [HTTP_PHASE]: Probe result without inventory row.");
                    }
                }

                let remaining = domains.count_http_pending(blueprint.campaign_id).await?;
                self.emit(
                    blueprint.campaign_id,
                    PhaseEventType::PhaseProgress,
                    PipelinePhase::HttpKeywordValidation,
                    "probing",
                    if remaining == 0 { Some(1.0) } else { None },
                );
            }
        }

        Ok(PhaseOutcome::Completed)
    }

    // --- FASE 4: AGREGACIÓN DE FEATURES ---

    async fn run_features(
        &self,
        blueprint: &CampaignBlueprint,
        cancellation_token: &CancellationToken,
    ) -> Result<PhaseOutcome, PipelineError> {
        let features = FeatureRepository::new(self.client.get_connection()?);
        let domains = GeneratedDomainRepository::new(self.client.get_connection()?);
        let validations = ValidationResultRepository::new(self.client.get_connection()?);
        let snapshots = SnapshotRepository::new(self.client.get_connection()?);

        let active_snapshot = snapshots.get_active(blueprint.campaign_id).await?;

        loop {
            if self.is_paused(blueprint.campaign_id).await? {
                return Ok(PhaseOutcome::Paused);
            }

            let claimed = features
                .claim_pending(blueprint.campaign_id, FEATURE_CLAIM_BATCH_SIZE)
                .await?;
            if claimed.is_empty() {
                break;
            }

            for domain_id in claimed {
                // Cancelación a mitad de lote: la fila queda en building y
                // el reconciliador la devolverá a pending. Sin escrituras
                // parciales.
                if cancellation_token.is_cancelled() {
                    return Err(PipelineError::Cancelled);
                }

                let record =
                    domains.record_by_id(blueprint.campaign_id, domain_id).await?;
                let Some(record) = record else {
                    features
                        .fail(blueprint.campaign_id, domain_id, "inventory row missing")
                        .await?;
                    continue;
                };

                let summary = validations
                    .http_summary(blueprint.campaign_id, &record.domain_name)
                    .await?;
                let Some(summary) = summary else {
                    features
                        .fail(blueprint.campaign_id, domain_id, "http evidence missing")
                        .await?;
                    continue;
                };

                // Función pura señales → agregado; jamás falla.
                let signals = RawSignals {
                    html_bytes: summary.content_bytes,
                    http_status: summary.status_code,
                    fetch_latency_ms: summary.duration_ms,
                    content_hash: summary.content_hash.clone(),
                    content_bytes: summary.content_bytes,
                    language: None,
                    parsed_keyword_hits: summary.keyword_hits.clone(),
                    microcrawl: summary.microcrawl.clone(),
                    is_parked: summary.is_parked,
                    parked_confidence: summary.parked_confidence,
                };
                let aggregate = build_features(&signals, &self.builder_params);

                let lead_score = active_snapshot
                    .as_ref()
                    .map(|snapshot| snapshot.score_vector(&aggregate.feature_vector));

                features
                    .complete(
                        blueprint.campaign_id,
                        domain_id,
                        &aggregate,
                        1,
                        1,
                        active_snapshot.as_ref().map(|snapshot| snapshot.id),
                        lead_score,
                    )
                    .await?;
                self.metrics.incr_counter("feature_rows_sealed_total", &[], 1);
            }

            self.emit(
                blueprint.campaign_id,
                PhaseEventType::PhaseProgress,
                PipelinePhase::FeatureAggregation,
                "aggregating",
                None,
            );
        }

        Ok(PhaseOutcome::Completed)
    }

    // --- FASE 5: SCORING ---

    async fn run_scoring(
        &self,
        blueprint: &CampaignBlueprint,
        cancellation_token: &CancellationToken,
    ) -> Result<PhaseOutcome, PipelineError> {
        if cancellation_token.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let lifecycle = SnapshotLifecycle::new(
            SnapshotRepository::new(self.client.get_connection()?),
            FeatureRepository::new(self.client.get_connection()?),
        );

        let active = lifecycle.ensure_active(blueprint.campaign_id).await?;
        lifecycle.mark_stale(blueprint.campaign_id, Some(active.id)).await?;
        let rescored = lifecycle.rescore(blueprint.campaign_id).await?;

        self.metrics.incr_counter("scoring_rows_rescored_total", &[], rescored);
        Ok(PhaseOutcome::Completed)
    }

    // --- UTILIDADES DE CONDUCCIÓN ---

    async fn is_paused(&self, campaign_id: Uuid) -> Result<bool, PipelineError> {
        let campaigns = CampaignRepository::new(self.client.get_connection()?);
        Ok(campaigns.get(campaign_id).await?.state == CampaignState::Paused)
    }

    fn emit(
        &self,
        campaign_id: Uuid,
        event_type: PhaseEventType,
        phase: PipelinePhase,
        sub_step: &str,
        progress: Option<f64>,
    ) {
        let mut event = PhaseEvent::new(campaign_id, event_type, phase, sub_step);
        if let Some(progress) = progress {
            event = event.with_progress(progress);
        }
        self.broadcaster.publish(event);
    }

    fn emit_with_status(
        &self,
        campaign_id: Uuid,
        event_type: PhaseEventType,
        phase: PipelinePhase,
        sub_step: &str,
        status: PhaseEventStatus,
    ) {
        let event = PhaseEvent::new(campaign_id, event_type, phase, sub_step).with_status(status);
        self.broadcaster.publish(event);
    }
}
