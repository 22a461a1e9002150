//! Conversational follow-up questions about an analyzed contract.
//!
//! Backend deployments disagree on the chat request shape, so every send
//! goes through a [`Negotiator`] that probes the known encodings in a fixed
//! order. The session keeps the running transcript and always produces an
//! answer string; a broken backend degrades to fallback text.

mod encodings;
mod negotiator;

pub use encodings::ChatEncoding;
pub use negotiator::{
    Attempt, AttemptOutcome, ChatExchange, NegotiationReport, Negotiator, DEFAULT_ATTEMPT_TIMEOUT,
    ERROR_FALLBACK, NO_ANSWER_FALLBACK,
};

use std::sync::Arc;
use std::time::Duration;

use crate::api::ContractApi;
use crate::models::ChatTurn;

/// Opening line of every conversation.
pub const GREETING: &str =
    "Hello, this is Checky! Ask me anything about your contract :)";

/// One conversation with the assistant. The transcript starts with the
/// greeting and grows by one user and one assistant turn per question,
/// fallback answers included.
pub struct ChatSession {
    negotiator: Negotiator,
    history: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new(api: Arc<dyn ContractApi>) -> Self {
        Self {
            negotiator: Negotiator::new(api),
            history: vec![ChatTurn::assistant(GREETING)],
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.negotiator = self.negotiator.with_attempt_timeout(timeout);
        self
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Sends one question. The history passed to the backend includes the
    /// question itself, matching what deployed servers expect.
    pub async fn ask(&mut self, message: &str) -> ChatExchange {
        self.history.push(ChatTurn::user(message));
        let exchange = self.negotiator.ask(message, &self.history).await;
        self.history.push(ChatTurn::assistant(&exchange.text));
        exchange
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApi;
    use crate::models::ChatRole;

    #[tokio::test]
    async fn transcript_grows_by_two_turns_per_question() {
        let api = Arc::new(MockApi::new().with_chat_answer("it depends"));
        let mut session = ChatSession::new(api);
        assert_eq!(session.history().len(), 1);

        session.ask("what about overtime?").await;
        let history = session.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, ChatRole::Assistant);
        assert_eq!(history[0].content, GREETING);
        assert_eq!(history[1].role, ChatRole::User);
        assert_eq!(history[2].content, "it depends");
    }

    #[tokio::test]
    async fn fallback_answers_still_join_the_transcript() {
        let api = Arc::new(MockApi::new().reject_all_chat());
        let mut session = ChatSession::new(api);
        let exchange = session.ask("anything?").await;
        assert_eq!(exchange.text, ERROR_FALLBACK);
        assert_eq!(session.history().last().map(|turn| turn.content.as_str()), Some(ERROR_FALLBACK));
    }
}
