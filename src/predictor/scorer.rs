use crate::model::TransactionRecord;

/// Capability seam between the dashboard pipeline and a fraud model.
///
/// The aggregation engine and narrative generator only ever see
/// `PredictionOutcome` values, so swapping the placeholder scorer for a real
/// model endpoint requires a new `Scorer` implementation and nothing else.
pub trait Scorer: Send + Sync {
    /// Return a raw risk value in [0, 1) for the given transaction.
    fn score(&self, record: &TransactionRecord) -> f64;
}

/// Placeholder scorer drawing from a uniform [0, 1) distribution.
///
/// Stands in for a call to a real scoring endpoint that returns
/// `{prediction, riskScore}` for a feature vector. No feature value
/// influences the result.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomScorer;

impl Scorer for RandomScorer {
    fn score(&self, _record: &TransactionRecord) -> f64 {
        rand::random::<f64>()
    }
}
