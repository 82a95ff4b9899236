use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::model::{PredictionOutcome, TransactionPattern};

/// Legitimate/fraudulent partition of one prediction run.
///
/// `placeholder` is true only for the illustrative default pair shown
/// before any run, so callers and tests can tell decorative defaults apart
/// from a genuine zero-transaction result.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FraudSplit {
    pub legitimate: u64,
    pub fraudulent: u64,
    pub placeholder: bool,
}

impl FraudSplit {
    /// The fixed 80/20 pair rendered when no outcomes exist yet.
    /// A presentation fallback, not a data fact.
    pub fn placeholder() -> Self {
        Self {
            legitimate: 80,
            fraudulent: 20,
            placeholder: true,
        }
    }

    pub fn total(&self) -> u64 {
        self.legitimate + self.fraudulent
    }
}

/// Partition outcomes by prediction label. Never fails: an empty list
/// yields a real 0/0 split, not the placeholder.
pub fn split(outcomes: &[PredictionOutcome]) -> FraudSplit {
    let fraudulent = outcomes
        .iter()
        .filter(|o| o.prediction.is_fraudulent())
        .count() as u64;
    FraudSplit {
        legitimate: outcomes.len() as u64 - fraudulent,
        fraudulent,
        placeholder: false,
    }
}

/// The split a chart should render: the placeholder pair for an empty list,
/// real counts otherwise.
pub fn split_for_display(outcomes: &[PredictionOutcome]) -> FraudSplit {
    if outcomes.is_empty() {
        FraudSplit::placeholder()
    } else {
        split(outcomes)
    }
}

/// Group outcomes into per-date pattern buckets, in first-seen order.
///
/// Outcomes carry no timestamp, so the date key is resolved externally.
/// With [`current_date_resolver`] an entire run collapses into a single
/// bucket; a resolver backed by real per-transaction timestamps spreads
/// the series without any change here.
pub fn bucket_by_date<F>(outcomes: &[PredictionOutcome], mut date_for: F) -> Vec<TransactionPattern>
where
    F: FnMut(&PredictionOutcome) -> NaiveDate,
{
    let mut buckets: Vec<TransactionPattern> = Vec::new();
    for outcome in outcomes {
        let date = date_for(outcome).format("%Y-%m-%d").to_string();
        let idx = match buckets.iter().position(|b| b.date == date) {
            Some(idx) => idx,
            None => {
                buckets.push(TransactionPattern {
                    date,
                    total: 0,
                    fraudulent: 0,
                });
                buckets.len() - 1
            }
        };
        let bucket = &mut buckets[idx];
        bucket.total += 1;
        if outcome.prediction.is_fraudulent() {
            bucket.fraudulent += 1;
        }
    }
    buckets
}

/// The reference date resolver: every outcome maps to "today", matching the
/// observed dashboard behavior where one submission becomes one bucket.
pub fn current_date_resolver() -> impl FnMut(&PredictionOutcome) -> NaiveDate {
    let today = Utc::now().date_naive();
    move |_| today
}

/// The fixed illustrative 5-point series substituted when no buckets exist.
pub fn placeholder_patterns() -> Vec<TransactionPattern> {
    [
        ("2024-03-01", 20, 5),
        ("2024-03-02", 30, 8),
        ("2024-03-03", 45, 15),
        ("2024-03-04", 35, 12),
        ("2024-03-05", 25, 4),
    ]
    .iter()
    .map(|(date, total, fraudulent)| TransactionPattern {
        date: date.to_string(),
        total: *total,
        fraudulent: *fraudulent,
    })
    .collect()
}

/// All fraudulent outcomes, order preserved.
pub fn flagged(outcomes: &[PredictionOutcome]) -> Vec<&PredictionOutcome> {
    outcomes
        .iter()
        .filter(|o| o.prediction.is_fraudulent())
        .collect()
}
