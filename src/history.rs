//! Turning a flat message log into the question/answer pairs the chat gateway
//! expects.
//!
//! Pairing is a two-state machine.  In [`PairingState::Idle`] there is no
//! question waiting for an answer; in [`PairingState::AwaitingAnswer`] the last
//! pair has a question and an empty answer slot.
//!
//! | state           | user message            | bot message                  |
//! |-----------------|-------------------------|------------------------------|
//! | Idle            | open pair, await answer | discard (no open pair)       |
//! | AwaitingAnswer  | open pair, await answer | fill answer, go idle         |
//!
//! The greeting is skipped entirely.  A discarded bot message stays in the
//! conversation; it only has no place in the history.

use crate::types::{HistoryPair, Message, Sender};

/// Where the pairer is between messages.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PairingState {
    /// No question is waiting for an answer.
    Idle,

    /// The last pair has a question and no answer yet.
    AwaitingAnswer,
}

/// What happened to a message fed to the pairer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PairingStep {
    /// The message was the greeting and was skipped.
    SkippedGreeting,

    /// A user message opened a new pair.
    Opened,

    /// A bot message filled the open pair.
    Answered,

    /// A bot message arrived with no open pair and was dropped.
    DiscardedBot,
}

/// Incremental history builder.
#[derive(Debug, Clone)]
pub struct HistoryPairer<'a> {
    sentinel_id: &'a str,
    state: PairingState,
    pairs: Vec<HistoryPair>,
}

impl<'a> HistoryPairer<'a> {
    /// Create a pairer that skips the message whose id is `sentinel_id`.
    pub fn new(sentinel_id: &'a str) -> Self {
        Self {
            sentinel_id,
            state: PairingState::Idle,
            pairs: Vec::new(),
        }
    }

    /// The current state.
    pub fn state(&self) -> PairingState {
        self.state
    }

    /// Feed the next message in chronological order.
    pub fn push(&mut self, message: &Message) -> PairingStep {
        if *message.id() == *self.sentinel_id {
            return PairingStep::SkippedGreeting;
        }
        match (self.state, message.sender()) {
            (_, Sender::User) => {
                self.pairs.push(HistoryPair::open(message.text()));
                self.state = PairingState::AwaitingAnswer;
                PairingStep::Opened
            }
            (PairingState::AwaitingAnswer, Sender::Bot) => {
                if let Some(pair) = self.pairs.last_mut() {
                    pair.1 = message.text().to_string();
                }
                self.state = PairingState::Idle;
                PairingStep::Answered
            }
            (PairingState::Idle, Sender::Bot) => {
                tracing::debug!(
                    message_id = %message.id(),
                    "bot message without an open question left out of history"
                );
                PairingStep::DiscardedBot
            }
        }
    }

    /// Finish and return the pairs, oldest first.
    pub fn finish(self) -> Vec<HistoryPair> {
        self.pairs
    }
}

/// Pair every message in `messages`, skipping the one whose id is
/// `sentinel_id`.
///
/// A trailing unanswered question yields a pair with an empty answer.
pub fn pair_history(messages: &[Message], sentinel_id: &str) -> Vec<HistoryPair> {
    let mut pairer = HistoryPairer::new(sentinel_id);
    for message in messages {
        pairer.push(message);
    }
    pairer.finish()
}
