use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::{ApiError, ContractApi};
use crate::models::ChatTurn;

use super::encodings::ChatEncoding;

/// Per-attempt ceiling; a slow shape must not eat the whole negotiation.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shown when every payload shape was rejected or timed out.
pub const ERROR_FALLBACK: &str =
    "Sorry, something went wrong while answering. Please try again in a moment.";

/// Shown when the backend accepted the request but sent no answer text.
pub const NO_ANSWER_FALLBACK: &str = "No answer came back for that question.";

/// How one payload shape fared.
#[derive(Debug)]
pub enum AttemptOutcome {
    Accepted,
    Rejected(ApiError),
    TimedOut,
}

#[derive(Debug)]
pub struct Attempt {
    pub encoding: ChatEncoding,
    pub outcome: AttemptOutcome,
}

/// Record of one negotiation round, in attempt order.
#[derive(Debug)]
pub struct NegotiationReport {
    pub attempts: Vec<Attempt>,
    pub accepted: Option<ChatEncoding>,
}

impl NegotiationReport {
    /// True when every candidate shape was tried and none was accepted.
    pub fn exhausted(&self) -> bool {
        self.accepted.is_none()
    }
}

/// The answer handed back to the caller. Always present; failures
/// surface as fallback text, never as an error.
#[derive(Debug)]
pub struct ChatExchange {
    pub text: String,
    pub report: NegotiationReport,
}

/// Probes the chat endpoint with each known payload shape until one is
/// accepted. Attempts are strictly sequential and stop at the first
/// success.
pub struct Negotiator {
    api: Arc<dyn ContractApi>,
    attempt_timeout: Duration,
}

impl Negotiator {
    pub fn new(api: Arc<dyn ContractApi>) -> Self {
        Self {
            api,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub async fn ask(&self, message: &str, history: &[ChatTurn]) -> ChatExchange {
        let mut attempts = Vec::new();
        for encoding in ChatEncoding::CANDIDATES {
            let payload = encoding.payload(message, history);
            match tokio::time::timeout(self.attempt_timeout, self.api.chat(&payload)).await {
                Ok(Ok(reply)) => {
                    debug!("chat accepted as {}", encoding.describe());
                    attempts.push(Attempt {
                        encoding,
                        outcome: AttemptOutcome::Accepted,
                    });
                    let text = reply.text().unwrap_or(NO_ANSWER_FALLBACK).to_string();
                    return ChatExchange {
                        text,
                        report: NegotiationReport {
                            attempts,
                            accepted: Some(encoding),
                        },
                    };
                }
                Ok(Err(error)) => {
                    debug!("chat rejected as {}: {}", encoding.describe(), error);
                    attempts.push(Attempt {
                        encoding,
                        outcome: AttemptOutcome::Rejected(error),
                    });
                }
                Err(_) => {
                    debug!(
                        "chat attempt as {} timed out after {:?}",
                        encoding.describe(),
                        self.attempt_timeout
                    );
                    attempts.push(Attempt {
                        encoding,
                        outcome: AttemptOutcome::TimedOut,
                    });
                }
            }
        }

        warn!("no chat payload shape was accepted, answering with fallback text");
        ChatExchange {
            text: ERROR_FALLBACK.to_string(),
            report: NegotiationReport {
                attempts,
                accepted: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApi;

    #[tokio::test]
    async fn first_shape_short_circuits() {
        let api = Arc::new(MockApi::new().with_chat_answer("looks fine"));
        let negotiator = Negotiator::new(api.clone());
        let exchange = negotiator.ask("hello", &[]).await;
        assert_eq!(exchange.text, "looks fine");
        assert_eq!(
            exchange.report.accepted,
            Some(ChatEncoding::MessageWithConversationHistory)
        );
        assert_eq!(api.chat_calls(), 1);
    }

    #[tokio::test]
    async fn falls_through_to_the_accepted_shape() {
        let api = Arc::new(
            MockApi::new()
                .accept_chat_keys(&["question", "conversation_history"])
                .with_chat_answer("second shape"),
        );
        let negotiator = Negotiator::new(api.clone());
        let exchange = negotiator.ask("hello", &[]).await;
        assert_eq!(exchange.text, "second shape");
        assert_eq!(
            exchange.report.accepted,
            Some(ChatEncoding::QuestionWithConversationHistory)
        );
        assert_eq!(api.chat_calls(), 2);
    }

    #[tokio::test]
    async fn exhaustion_yields_fallback_text_not_an_error() {
        let api = Arc::new(MockApi::new().reject_all_chat());
        let negotiator = Negotiator::new(api.clone());
        let exchange = negotiator.ask("hello", &[]).await;
        assert_eq!(exchange.text, ERROR_FALLBACK);
        assert!(exchange.report.exhausted());
        assert_eq!(exchange.report.attempts.len(), 4);
        assert_eq!(api.chat_calls(), 4);
    }

    #[tokio::test]
    async fn accepted_but_empty_reply_uses_no_answer_fallback() {
        let api = Arc::new(MockApi::new());
        let negotiator = Negotiator::new(api);
        let exchange = negotiator.ask("hello", &[]).await;
        assert_eq!(exchange.text, NO_ANSWER_FALLBACK);
        assert!(!exchange.report.exhausted());
    }
}
