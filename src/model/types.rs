use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Risk scores strictly above this threshold are labeled fraudulent.
/// A score of exactly 0.8 is legitimate.
pub const FRAUD_THRESHOLD: f64 = 0.8;

/// A transaction as submitted for scoring: an ordered mapping from feature
/// name (e.g. "V1".."V10") to a value. Keys are caller-supplied; values are
/// numeric in practice, strings tolerated. Immutable once constructed —
/// only read accessors are exposed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TransactionRecord(Map<String, Value>);

impl TransactionRecord {
    pub fn new(features: Map<String, Value>) -> Self {
        Self(features)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, feature: &str) -> Option<&Value> {
        self.0.get(feature)
    }

    pub fn features(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_features(self) -> Map<String, Value> {
        self.0
    }
}

impl FromIterator<(String, Value)> for TransactionRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The two-way prediction label. Serializes to the wire strings consumed
/// by the dashboard ("Fraudulent" / "Not Fraudulent").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PredictionLabel {
    Fraudulent,
    #[serde(rename = "Not Fraudulent")]
    NotFraudulent,
}

impl PredictionLabel {
    /// Label a (rounded) risk score against the strict 0.8 threshold.
    pub fn from_risk_score(score: f64) -> Self {
        if score > FRAUD_THRESHOLD {
            PredictionLabel::Fraudulent
        } else {
            PredictionLabel::NotFraudulent
        }
    }

    pub fn is_fraudulent(self) -> bool {
        matches!(self, PredictionLabel::Fraudulent)
    }
}

impl fmt::Display for PredictionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionLabel::Fraudulent => write!(f, "Fraudulent"),
            PredictionLabel::NotFraudulent => write!(f, "Not Fraudulent"),
        }
    }
}

/// One scored transaction. Created once by the prediction service, never
/// mutated, held in memory for the duration of one dashboard session and
/// replaced wholesale on the next run.
///
/// Invariant: `prediction == Fraudulent` iff `risk_score > 0.8`, with
/// `risk_score` already rounded to 2 decimal places.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionOutcome {
    /// Opaque unique id, generated at outcome-creation time, never reused.
    pub id: String,
    #[serde(flatten)]
    pub features: Map<String, Value>,
    pub prediction: PredictionLabel,
    #[serde(rename = "riskScore")]
    pub risk_score: f64,
}

/// Per-feature model weight in [0, 1]. Weights need not sum to 1 in the
/// mock; conceptually supplied by the prediction service alongside outcomes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// One point of the time-bucketed pattern series: all outcomes whose date
/// key resolved to `date`. Invariant: `fraudulent <= total`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionPattern {
    pub date: String,
    pub total: u64,
    pub fraudulent: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One entry of the session chat transcript. Append-only, cleared when a
/// new prediction run starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
}
