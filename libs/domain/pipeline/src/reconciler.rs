// [libs/domain/pipeline/src/reconciler.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE RECONCILER DAEMON (V3.3 - ZOMBIE HYGIENE)
 * CLASIFICACIÓN: DOMAIN ORCHESTRATION (ESTRATO L2)
 * RESPONSABILIDAD: SANEAMIENTO PERIÓDICO DE FILAS ESTANCADAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. NARROW RESET: El reset de zombies delega en el repositorio, que
 *    apunta por identidad de fila y jamás por predicado amplio.
 * 2. PANOPTICON COUNTERS: Cada pasada reporta rows_examined,
 *    rows_adjusted, pass_total y la latencia al sumidero de métricas.
 * 3. IDEMPOTENT PASSES: Dos pasadas consecutivas convergen al mismo
 *    estado final.
 * =================================================================
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use dominion_domain_models::config::PipelineConfig;
use dominion_infra_db::FeatureRepository;

use crate::errors::PipelineError;
use crate::metrics::MetricsSink;

/// Resumen de una pasada del reconciliador.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePassReport {
    pub stuck_building_adjusted: u64,
    pub failed_requeued: u64,
}

pub struct Reconciler {
    features: FeatureRepository,
    config: PipelineConfig,
    metrics: Arc<dyn MetricsSink>,
}

impl Reconciler {
    pub fn new(
        features: FeatureRepository,
        config: PipelineConfig,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self { features, config, metrics }
    }

    /// Sanea filas building estancadas más antiguas que `older_than`.
    ///
    /// Devuelve el número de filas ajustadas en la pasada.
    #[instrument(skip(self))]
    pub async fn reconcile_stuck(
        &self,
        older_than: Duration,
        batch_size: usize,
    ) -> Result<u64, PipelineError> {
        let adjusted = self
            .features
            .reset_stuck(
                chrono::Duration::seconds(older_than.as_secs() as i64),
                batch_size,
            )
            .await?;
        Ok(adjusted)
    }

    /// Pasada completa: zombies building + re-encolado de error/stale.
    #[instrument(skip(self))]
    pub async fn run_pass(&self) -> Result<ReconcilePassReport, PipelineError> {
        let pass_started = Instant::now();

        let report_outcome = async {
            let stuck_building_adjusted = self
                .reconcile_stuck(
                    Duration::from_secs(self.config.stuck_running_max_age_secs),
                    self.config.reconcile_batch_size,
                )
                .await?;
            let failed_requeued =
                self.features.requeue_failed_global(self.config.max_retries).await?;

            Ok::<ReconcilePassReport, PipelineError>(ReconcilePassReport {
                stuck_building_adjusted,
                failed_requeued,
            })
        }
        .await;

        // Reporte de contadores por categoría/acción/resultado.
        match &report_outcome {
            Ok(report) => {
                self.metrics.incr_counter(
                    "reconciler_rows_examined",
                    &[("category", "stuck_building")],
                    report.stuck_building_adjusted,
                );
                self.metrics.incr_counter(
                    "reconciler_rows_adjusted",
                    &[("action", "reset_to_pending")],
                    report.stuck_building_adjusted,
                );
                self.metrics.incr_counter(
                    "reconciler_rows_adjusted",
                    &[("action", "requeue_failed")],
                    report.failed_requeued,
                );
                self.metrics.incr_counter("reconciler_pass_total", &[("result", "ok")], 1);
            }
            Err(_) => {
                self.metrics.incr_counter("reconciler_pass_total", &[("result", "error")], 1);
            }
        }
        self.metrics.observe_histogram(
            "reconciler_pass_duration_seconds",
            &[],
            pass_started.elapsed().as_secs_f64(),
        );

        report_outcome
    }

    /// Inicia el daemon perpetuo de saneamiento en el runtime de Tokio.
    pub fn spawn_daemon(self: Arc<Self>, cancellation_token: CancellationToken) {
        if !self.config.reconcile_enabled {
            info!("💤 [RECONCILER]: Daemon disabled by configuration.");
            return;
        }

        let mut maintenance_ticker =
            interval(Duration::from_secs(self.config.reconcile_interval_secs.max(1)));

        tokio::spawn(async move {
            info!("💀 [RECONCILER_ACTIVE]: Row hygiene daemon initiated.");

            loop {
                tokio::select! {
                    _ = cancellation_token.cancelled() => {
                        info!("💀 [RECONCILER]: Daemon sealed by cancellation.");
                        break;
                    }
                    _ = maintenance_ticker.tick() => {
                        match self.run_pass().await {
                            Ok(report) if report.stuck_building_adjusted + report.failed_requeued > 0 => {
                                info!(
                                    "💀 [RECONCILER_PASS]: {} zombies reset, {} failures requeued.",
                                    report.stuck_building_adjusted, report.failed_requeued
                                );
                            }
                            Ok(_) => {}
                            Err(pass_fault) => {
                                error!("💀 [RECONCILER_FAULT]: Pass collapsed: {}", pass_fault);
                            }
                        }
                    }
                }
            }
        });
    }
}
