pub mod types;

pub use types::{
    FeatureImportance, Message, MessageRole, PredictionLabel, PredictionOutcome,
    TransactionPattern, TransactionRecord, FRAUD_THRESHOLD,
};
