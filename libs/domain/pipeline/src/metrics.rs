// [libs/domain/pipeline/src/metrics.rs]
/*!
 * =================================================================
 * APARATO: METRICS SINK SEAM (V3.0 - REGISTRY AGNOSTIC)
 * CLASIFICACIÓN: DOMAIN ORCHESTRATION (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DE MÉTRICAS CONSUMIDO POR EL RECONCILIADOR
 *
 * El registro Prometheus vive fuera del núcleo; este seam entrega los
 * contadores etiquetados y el histograma de latencia a quien lo registre.
 * =================================================================
 */

use tracing::debug;

/// Sumidero de métricas del núcleo (contadores etiquetados e histogramas).
pub trait MetricsSink: Send + Sync {
    fn incr_counter(&self, name: &str, labels: &[(&str, &str)], value: u64);
    fn observe_histogram(&self, name: &str, labels: &[(&str, &str)], value: f64);
}

/// Implementación de referencia: volcado estructurado al rastro de tracing.
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn incr_counter(&self, name: &str, labels: &[(&str, &str)], value: u64) {
        debug!(target: "metrics", metric = name, ?labels, value, kind = "counter");
    }

    fn observe_histogram(&self, name: &str, labels: &[(&str, &str)], value: f64) {
        debug!(target: "metrics", metric = name, ?labels, value, kind = "histogram");
    }
}

/// Sumidero nulo para los Proving Grounds.
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn incr_counter(&self, _name: &str, _labels: &[(&str, &str)], _value: u64) {}
    fn observe_histogram(&self, _name: &str, _labels: &[(&str, &str)], _value: f64) {}
}
