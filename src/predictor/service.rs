use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::info;

use super::scorer::Scorer;
use crate::error::FraudLensError;
use crate::model::{FeatureImportance, PredictionLabel, PredictionOutcome, TransactionRecord};

/// Minimum number of feature entries required for a manual submission.
const MIN_FEATURES: usize = 10;
/// Number of fabricated outcomes per batch submission.
const BATCH_SIZE: usize = 15;
/// Number of random feature values per fabricated batch row.
const BATCH_FEATURES: usize = 10;

/// Simulated network latency for a single prediction.
const SINGLE_LATENCY_MS: u64 = 1500;
/// Simulated processing time for a batch upload.
const BATCH_LATENCY_MS: u64 = 2500;

/// Mock prediction service.
///
/// Stands in for an external model endpoint: it validates input shape,
/// simulates network latency, and produces outcomes whose risk scores come
/// from the injected [`Scorer`]. The contract any real implementation must
/// preserve: outcome shape, 2-decimal rounding, and the strict 0.8 threshold.
pub struct PredictionService<S: Scorer> {
    scorer: S,
    single_latency: Duration,
    batch_latency: Duration,
}

impl<S: Scorer> PredictionService<S> {
    pub fn new(scorer: S) -> Self {
        Self::with_latency(
            scorer,
            Duration::from_millis(SINGLE_LATENCY_MS),
            Duration::from_millis(BATCH_LATENCY_MS),
        )
    }

    /// Construct with explicit latencies. Tests pass `Duration::ZERO`.
    pub fn with_latency(scorer: S, single_latency: Duration, batch_latency: Duration) -> Self {
        Self {
            scorer,
            single_latency,
            batch_latency,
        }
    }

    /// Score one manually entered transaction.
    ///
    /// Fails with a validation error if the record has fewer than 10
    /// entries. Returns the outcome plus the static feature-importance list.
    pub async fn predict(
        &self,
        record: &TransactionRecord,
    ) -> Result<(PredictionOutcome, Vec<FeatureImportance>), FraudLensError> {
        if record.len() < MIN_FEATURES {
            return Err(FraudLensError::Validation(
                "Incomplete transaction data provided.".to_string(),
            ));
        }

        tokio::time::sleep(self.single_latency).await;

        let outcome = self.score_record(generate_outcome_id("txn"), record.clone());
        info!(
            "Scored transaction {}: {} (risk {:.2})",
            outcome.id, outcome.prediction, outcome.risk_score
        );

        Ok((outcome, mock_feature_importance()))
    }

    /// Score a CSV batch upload, identified by file name only.
    ///
    /// File contents are never read: exactly 15 outcomes are fabricated with
    /// 10 random feature values each. Fails with a validation error if no
    /// file identifier is given.
    pub async fn predict_batch(
        &self,
        file_name: &str,
    ) -> Result<(Vec<PredictionOutcome>, Vec<FeatureImportance>), FraudLensError> {
        if file_name.trim().is_empty() {
            return Err(FraudLensError::Validation(
                "No file provided for batch prediction.".to_string(),
            ));
        }

        tokio::time::sleep(self.batch_latency).await;

        let outcomes: Vec<PredictionOutcome> = (1..=BATCH_SIZE)
            .map(|i| {
                let id = generate_outcome_id(&format!("batch_{}", i));
                self.score_record(id, fabricate_record())
            })
            .collect();

        let fraudulent = outcomes.iter().filter(|o| o.prediction.is_fraudulent()).count();
        info!(
            "Batch '{}' processed: {} outcomes, {} flagged",
            file_name,
            outcomes.len(),
            fraudulent
        );

        Ok((outcomes, mock_feature_importance()))
    }

    /// Score a record and freeze it into an outcome. The raw score is
    /// rounded to 2 decimals first so the stored score and the label always
    /// agree on the 0.8 threshold.
    fn score_record(&self, id: String, record: TransactionRecord) -> PredictionOutcome {
        let raw = self.scorer.score(&record);
        let risk_score = (raw * 100.0).round() / 100.0;
        PredictionOutcome {
            id,
            features: record.into_features(),
            prediction: PredictionLabel::from_risk_score(risk_score),
            risk_score,
        }
    }
}

/// The static feature-importance list returned alongside every prediction.
/// Mock reference data until a real model supplies its own weights.
pub fn mock_feature_importance() -> Vec<FeatureImportance> {
    [
        ("V17", 0.18),
        ("V14", 0.15),
        ("V12", 0.12),
        ("V10", 0.10),
        ("V11", 0.09),
        ("V16", 0.08),
        ("V7", 0.07),
        ("V4", 0.06),
        ("V3", 0.05),
        ("V9", 0.04),
    ]
    .iter()
    .map(|(feature, importance)| FeatureImportance {
        feature: feature.to_string(),
        importance: *importance,
    })
    .collect()
}

/// Generate an opaque outcome id: prefix + 10 hex chars from random bytes.
fn generate_outcome_id(prefix: &str) -> String {
    let bytes: [u8; 5] = rand::random();
    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}_{}", prefix, hex)
}

/// Fabricate a batch row: V1..V10 drawn uniformly from [0, 10).
fn fabricate_record() -> TransactionRecord {
    let mut features: Map<String, Value> = Map::with_capacity(BATCH_FEATURES);
    for i in 1..=BATCH_FEATURES {
        features.insert(format!("V{}", i), json!(rand::random::<f64>() * 10.0));
    }
    TransactionRecord::new(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scorer returning a fixed raw value, for threshold/rounding tests.
    struct FixedScorer(f64);

    impl Scorer for FixedScorer {
        fn score(&self, _record: &TransactionRecord) -> f64 {
            self.0
        }
    }

    fn manual_record(fields: usize) -> TransactionRecord {
        (1..=fields)
            .map(|i| (format!("V{}", i), json!(i as f64 * 0.5)))
            .collect()
    }

    fn zero_latency<S: Scorer>(scorer: S) -> PredictionService<S> {
        PredictionService::with_latency(scorer, Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_predict_rejects_incomplete_record() {
        let service = zero_latency(RandomScorerStub);
        let result = service.predict(&manual_record(9)).await;
        match result {
            Err(FraudLensError::Validation(msg)) => {
                assert_eq!(msg, "Incomplete transaction data provided.")
            }
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_predict_returns_outcome_with_importance() {
        let service = zero_latency(FixedScorer(0.42));
        let (outcome, importance) = service.predict(&manual_record(10)).await.unwrap();

        assert!(!outcome.id.is_empty());
        assert!(outcome.id.starts_with("txn_"));
        assert!((0.0..=1.0).contains(&outcome.risk_score));
        assert_eq!(outcome.prediction, PredictionLabel::NotFraudulent);
        assert_eq!(outcome.features.len(), 10);
        assert_eq!(importance.len(), 10);
    }

    #[tokio::test]
    async fn test_score_exactly_at_threshold_is_legitimate() {
        let service = zero_latency(FixedScorer(0.8));
        let (outcome, _) = service.predict(&manual_record(10)).await.unwrap();
        assert_eq!(outcome.risk_score, 0.8);
        assert_eq!(outcome.prediction, PredictionLabel::NotFraudulent);
    }

    #[tokio::test]
    async fn test_score_above_threshold_is_fraudulent() {
        let service = zero_latency(FixedScorer(0.81));
        let (outcome, _) = service.predict(&manual_record(10)).await.unwrap();
        assert_eq!(outcome.prediction, PredictionLabel::Fraudulent);
    }

    #[tokio::test]
    async fn test_label_agrees_with_rounded_score() {
        // Raw 0.804 rounds down to 0.80, which must stay legitimate.
        let service = zero_latency(FixedScorer(0.804));
        let (outcome, _) = service.predict(&manual_record(10)).await.unwrap();
        assert_eq!(outcome.risk_score, 0.8);
        assert_eq!(outcome.prediction, PredictionLabel::NotFraudulent);

        // Raw 0.805 rounds up to 0.81 and flips fraudulent.
        let service = zero_latency(FixedScorer(0.805));
        let (outcome, _) = service.predict(&manual_record(10)).await.unwrap();
        assert_eq!(outcome.risk_score, 0.81);
        assert_eq!(outcome.prediction, PredictionLabel::Fraudulent);
    }

    #[tokio::test]
    async fn test_risk_score_rounded_to_two_decimals() {
        let service = zero_latency(FixedScorer(0.123456));
        let (outcome, _) = service.predict(&manual_record(10)).await.unwrap();
        assert_eq!(outcome.risk_score, 0.12);
    }

    #[tokio::test]
    async fn test_batch_rejects_missing_file_name() {
        let service = zero_latency(RandomScorerStub);
        assert!(matches!(
            service.predict_batch("").await,
            Err(FraudLensError::Validation(_))
        ));
        assert!(matches!(
            service.predict_batch("   ").await,
            Err(FraudLensError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_batch_fabricates_fifteen_outcomes() {
        let service = zero_latency(RandomScorerStub);
        let (outcomes, importance) = service.predict_batch("upload.csv").await.unwrap();

        assert_eq!(outcomes.len(), 15);
        assert_eq!(importance.len(), 10);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert!(
                outcome.id.starts_with(&format!("batch_{}_", i + 1)),
                "unexpected id {}",
                outcome.id
            );
            assert_eq!(outcome.features.len(), 10);
            assert!((0.0..=1.0).contains(&outcome.risk_score));
            // Threshold invariant holds independently for every row.
            assert_eq!(
                outcome.prediction.is_fraudulent(),
                outcome.risk_score > 0.8
            );
        }
    }

    #[tokio::test]
    async fn test_batch_ids_are_unique() {
        let service = zero_latency(RandomScorerStub);
        let (outcomes, _) = service.predict_batch("upload.csv").await.unwrap();
        let mut ids: Vec<&str> = outcomes.iter().map(|o| o.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), outcomes.len());
    }

    #[test]
    fn test_mock_feature_importance_weights_in_range() {
        let importance = mock_feature_importance();
        assert_eq!(importance.len(), 10);
        assert_eq!(importance[0].feature, "V17");
        assert_eq!(importance[0].importance, 0.18);
        for fi in &importance {
            assert!((0.0..=1.0).contains(&fi.importance));
        }
    }

    /// Uniform scorer used where the exact value is irrelevant.
    struct RandomScorerStub;

    impl Scorer for RandomScorerStub {
        fn score(&self, _record: &TransactionRecord) -> f64 {
            rand::random::<f64>()
        }
    }
}
