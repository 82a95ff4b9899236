pub mod scorer;
pub mod service;

pub use scorer::{RandomScorer, Scorer};
pub use service::{mock_feature_importance, PredictionService};
