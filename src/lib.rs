pub mod aggregate;
pub mod error;
pub mod export;
pub mod model;
pub mod narrative;
pub mod predictor;
pub mod session;

pub use error::FraudLensError;
pub use model::{
    FeatureImportance, Message, MessageRole, PredictionLabel, PredictionOutcome,
    TransactionPattern, TransactionRecord, FRAUD_THRESHOLD,
};
pub use predictor::{PredictionService, RandomScorer, Scorer};
pub use session::DashboardSession;

/// Initialize the tracing subscriber, honoring `RUST_LOG` and defaulting
/// to `info`. Call once from the embedding application.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
