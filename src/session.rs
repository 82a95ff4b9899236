use tracing::{info, warn};

use crate::aggregate::{self, FraudSplit};
use crate::error::FraudLensError;
use crate::export;
use crate::model::{
    FeatureImportance, Message, MessageRole, PredictionOutcome, TransactionPattern,
};
use crate::narrative::{NO_DATA_REPLY, SUMMARY_FALLBACK};

/// Explicit per-session dashboard state: the current outcome snapshot,
/// chart aggregates, summary text, and chat transcript. One instance per
/// user session; nothing is persisted or shared across sessions.
///
/// Async results are applied through run tokens from [`begin_run`]: a
/// superseded request is allowed to complete and its result is discarded
/// here, never cancelled (no ordering guarantees are needed beyond that).
///
/// [`begin_run`]: DashboardSession::begin_run
#[derive(Debug)]
pub struct DashboardSession {
    outcomes: Vec<PredictionOutcome>,
    patterns: Vec<TransactionPattern>,
    feature_importance: Vec<FeatureImportance>,
    summary: String,
    messages: Vec<Message>,
    run_seq: u64,
    message_seq: u64,
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardSession {
    /// A fresh session shows the illustrative pattern series until the
    /// first run's buckets replace it.
    pub fn new() -> Self {
        Self {
            outcomes: Vec::new(),
            patterns: aggregate::placeholder_patterns(),
            feature_importance: Vec::new(),
            summary: String::new(),
            messages: Vec::new(),
            run_seq: 0,
            message_seq: 0,
        }
    }

    /// Start a new prediction run: clears all run-scoped state and returns
    /// the token that gates applying this run's async results. The pattern
    /// chart drops back to the illustrative series until the run lands.
    pub fn begin_run(&mut self) -> u64 {
        self.run_seq += 1;
        self.outcomes.clear();
        self.messages.clear();
        self.summary.clear();
        self.feature_importance.clear();
        self.patterns = aggregate::placeholder_patterns();
        self.run_seq
    }

    /// Store the outcome snapshot of a completed prediction call and
    /// recompute the pattern buckets. Returns false (and changes nothing)
    /// when a newer run has started since `token` was issued.
    pub fn apply_run(
        &mut self,
        token: u64,
        outcomes: Vec<PredictionOutcome>,
        feature_importance: Vec<FeatureImportance>,
    ) -> bool {
        if token != self.run_seq {
            warn!(
                "Discarding stale prediction result (run {}, current {})",
                token, self.run_seq
            );
            return false;
        }

        let patterns = aggregate::bucket_by_date(&outcomes, aggregate::current_date_resolver());
        self.patterns = if patterns.is_empty() {
            aggregate::placeholder_patterns()
        } else {
            patterns
        };
        info!("Run {} applied: {} outcome(s)", token, outcomes.len());
        self.outcomes = outcomes;
        self.feature_importance = feature_importance;
        true
    }

    /// Record a failed prediction call: run-scoped state is reset and the
    /// pattern chart falls back to the illustrative series.
    pub fn fail_run(&mut self, token: u64, error: &FraudLensError) -> bool {
        if token != self.run_seq {
            return false;
        }
        warn!("Run {} failed: {}", token, error);
        self.outcomes.clear();
        self.feature_importance.clear();
        self.summary.clear();
        self.patterns = aggregate::placeholder_patterns();
        true
    }

    /// Store the summary for a run, degrading failures to the fixed
    /// fallback string. Stale results are discarded.
    pub fn apply_summary(&mut self, token: u64, result: Result<String, FraudLensError>) -> bool {
        if token != self.run_seq {
            warn!(
                "Discarding stale summary (run {}, current {})",
                token, self.run_seq
            );
            return false;
        }
        self.summary = match result {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Summary generation failed: {}", e);
                SUMMARY_FALLBACK.to_string()
            }
        };
        true
    }

    pub fn push_user_message(&mut self, content: &str) -> &Message {
        self.push_message(MessageRole::User, content.to_string())
    }

    /// Append the assistant's reply, degrading failures to their
    /// user-visible message rather than surfacing a raw error.
    pub fn push_assistant_reply(&mut self, result: Result<String, FraudLensError>) -> &Message {
        let content = match result {
            Ok(text) => text,
            Err(e) => {
                warn!("Assistant reply failed: {}", e);
                e.to_string()
            }
        };
        self.push_message(MessageRole::Assistant, content)
    }

    /// Append the fixed reply for questions asked before any run. The
    /// external capability must not be invoked for this case.
    pub fn push_no_data_reply(&mut self) -> &Message {
        self.push_message(MessageRole::Assistant, NO_DATA_REPLY.to_string())
    }

    /// True once a prediction run has produced outcomes to ask about.
    pub fn has_data(&self) -> bool {
        !self.outcomes.is_empty()
    }

    pub fn run_token(&self) -> u64 {
        self.run_seq
    }

    pub fn outcomes(&self) -> &[PredictionOutcome] {
        &self.outcomes
    }

    pub fn patterns(&self) -> &[TransactionPattern] {
        &self.patterns
    }

    pub fn feature_importance(&self) -> &[FeatureImportance] {
        &self.feature_importance
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The fraud/legitimate split the probability chart renders.
    pub fn split(&self) -> FraudSplit {
        aggregate::split_for_display(&self.outcomes)
    }

    /// The flagged-transactions table rows.
    pub fn flagged(&self) -> Vec<&PredictionOutcome> {
        aggregate::flagged(&self.outcomes)
    }

    /// CSV export of the current outcome snapshot.
    pub fn export_csv(&self) -> String {
        export::to_csv(&self.outcomes)
    }

    fn push_message(&mut self, role: MessageRole, content: String) -> &Message {
        self.message_seq += 1;
        self.messages.push(Message {
            id: format!("msg_{}", self.message_seq),
            role,
            content,
        });
        &self.messages[self.messages.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PredictionLabel;
    use crate::predictor::mock_feature_importance;

    fn outcome(id: &str, label: PredictionLabel) -> PredictionOutcome {
        PredictionOutcome {
            id: id.to_string(),
            features: Default::default(),
            prediction: label,
            risk_score: if label.is_fraudulent() { 0.9 } else { 0.3 },
        }
    }

    #[test]
    fn test_fresh_session_shows_placeholders() {
        let session = DashboardSession::new();
        assert!(session.split().placeholder);
        assert!(!session.has_data());
        assert!(session.messages().is_empty());
        assert_eq!(session.export_csv(), "");

        // The pattern chart starts on the illustrative series, not empty.
        assert_eq!(session.patterns().len(), 5);
        assert_eq!(session.patterns()[0].date, "2024-03-01");
    }

    #[test]
    fn test_begin_run_resets_patterns_to_placeholder() {
        let mut session = DashboardSession::new();
        let token = session.begin_run();
        session.apply_run(token, vec![outcome("a", PredictionLabel::Fraudulent)], vec![]);
        assert_eq!(session.patterns().len(), 1);

        // A superseding run must not keep showing the prior run's buckets.
        session.begin_run();
        assert_eq!(session.patterns().len(), 5);
        assert_eq!(session.patterns()[0].date, "2024-03-01");
    }

    #[test]
    fn test_apply_run_stores_snapshot_and_buckets() {
        let mut session = DashboardSession::new();
        let token = session.begin_run();
        let applied = session.apply_run(
            token,
            vec![
                outcome("a", PredictionLabel::Fraudulent),
                outcome("b", PredictionLabel::NotFraudulent),
            ],
            mock_feature_importance(),
        );

        assert!(applied);
        assert_eq!(session.outcomes().len(), 2);
        assert_eq!(session.patterns().len(), 1);
        assert_eq!(session.patterns()[0].total, 2);
        assert_eq!(session.patterns()[0].fraudulent, 1);
        assert_eq!(session.feature_importance().len(), 10);

        let split = session.split();
        assert!(!split.placeholder);
        assert_eq!(split.fraudulent, 1);
        assert_eq!(session.flagged().len(), 1);
    }

    #[test]
    fn test_stale_run_result_is_discarded() {
        let mut session = DashboardSession::new();
        let first = session.begin_run();
        let second = session.begin_run();

        // The first run's response arrives after a second run started.
        let applied = session.apply_run(
            first,
            vec![outcome("stale", PredictionLabel::Fraudulent)],
            vec![],
        );
        assert!(!applied);
        assert!(session.outcomes().is_empty());

        assert!(session.apply_run(
            second,
            vec![outcome("fresh", PredictionLabel::NotFraudulent)],
            vec![],
        ));
        assert_eq!(session.outcomes()[0].id, "fresh");
    }

    #[test]
    fn test_stale_summary_is_discarded() {
        let mut session = DashboardSession::new();
        let first = session.begin_run();
        let _second = session.begin_run();

        assert!(!session.apply_summary(first, Ok("stale summary".to_string())));
        assert_eq!(session.summary(), "");
    }

    #[test]
    fn test_summary_failure_degrades_to_fallback() {
        let mut session = DashboardSession::new();
        let token = session.begin_run();
        session.apply_run(token, vec![outcome("a", PredictionLabel::Fraudulent)], vec![]);
        session.apply_summary(
            token,
            Err(FraudLensError::Generation("boom".to_string())),
        );
        assert_eq!(session.summary(), SUMMARY_FALLBACK);
    }

    #[test]
    fn test_begin_run_clears_previous_state() {
        let mut session = DashboardSession::new();
        let token = session.begin_run();
        session.apply_run(token, vec![outcome("a", PredictionLabel::Fraudulent)], vec![]);
        session.apply_summary(token, Ok("old summary".to_string()));
        session.push_user_message("old question");

        session.begin_run();
        assert!(session.outcomes().is_empty());
        assert!(session.messages().is_empty());
        assert_eq!(session.summary(), "");
        assert!(session.feature_importance().is_empty());
    }

    #[test]
    fn test_fail_run_resets_to_placeholder_patterns() {
        let mut session = DashboardSession::new();
        let token = session.begin_run();
        let handled = session.fail_run(
            token,
            &FraudLensError::Service("model endpoint unreachable".to_string()),
        );
        assert!(handled);
        assert!(session.outcomes().is_empty());
        assert_eq!(session.patterns().len(), 5);
        assert!(session.split().placeholder);
    }

    #[test]
    fn test_transcript_is_append_only_with_unique_ids() {
        let mut session = DashboardSession::new();
        session.push_user_message("any fraud?");
        session.push_no_data_reply();
        session.push_user_message("still there?");
        session.push_assistant_reply(Ok("Yes.".to_string()));

        let messages = session.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].content, NO_DATA_REPLY);
        assert_eq!(messages[3].content, "Yes.");

        let mut ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_failed_reply_degrades_to_message() {
        let mut session = DashboardSession::new();
        let message = session.push_assistant_reply(Err(FraudLensError::Generation(
            "provider unavailable".to_string(),
        )));
        assert_eq!(message.role, MessageRole::Assistant);
        assert!(message.content.contains("provider unavailable"));
    }
}
