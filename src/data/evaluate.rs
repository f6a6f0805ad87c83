use super::model::{Classification, EvaluatedRecord, EvaluationResult, MetricValue, NormalizedRecord};
use crate::config::MetricDefinition;

/// Classify a single value against a threshold. The boundary passes.
pub fn classify(value: Option<MetricValue>, threshold: f64) -> Classification {
    match value {
        Some(MetricValue::Value(v)) if v >= threshold => Classification::Pass,
        Some(MetricValue::Value(_)) => Classification::Fail,
        Some(MetricValue::Unresolved) | None => Classification::Unknown,
    }
}

/// Classify one metric of a record. Absent metrics are `Unknown`.
pub fn evaluate(record: &NormalizedRecord, metric: &MetricDefinition) -> EvaluationResult {
    EvaluationResult {
        metric_name: metric.name.clone(),
        classification: classify(record.metrics.get(&metric.name).copied(), metric.threshold),
    }
}

/// Evaluate every configured metric the record carries, in configuration
/// order.
pub fn evaluate_record(record: NormalizedRecord, metrics: &[MetricDefinition]) -> EvaluatedRecord {
    let results = metrics
        .iter()
        .filter(|m| record.metrics.contains_key(&m.name))
        .map(|m| evaluate(&record, m))
        .collect();
    EvaluatedRecord { record, results }
}
