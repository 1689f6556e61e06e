//! Core chat widget state.
//!
//! This module provides the `ChatSession` struct which owns everything one
//! chat widget needs: its open/closed flag, the lazily created session, the
//! conversation log, and the in-flight flag that keeps at most one gateway
//! call outstanding.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::Error;
use crate::chat::config::ChatConfig;
use crate::client::{ChatBackend, Gateway, reply_or_fallback};
use crate::error::Result;
use crate::history::pair_history;
use crate::observability::{CHAT_ACTIVATIONS, CHAT_BUSY_REJECTIONS, CHAT_FALLBACKS, CHAT_SENDS};
use crate::session::{Session, SessionId};
use crate::types::{ChatRequest, GREETING_ID, HistoryPair, Message};

/// What became of a call to [`ChatSession::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The question was logged and answered; this is the bot message that
    /// was appended (the gateway's answer or the fallback).
    Replied(Message),

    /// Another send was still waiting for its reply; nothing was logged or
    /// sent.
    Busy,
}

/// Aggregated stats for a chat widget.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The session id, once the widget has been activated.
    pub session_id: Option<SessionId>,
    /// Whether the widget is currently open.
    pub is_open: bool,
    /// The number of messages in the conversation, greeting included.
    pub message_count: usize,
    /// The number of answered questions.
    pub exchanges: usize,
    /// Total number of gateway calls made.
    pub total_requests: u64,
    /// How many of those calls ended in the fallback reply.
    pub fallbacks: u64,
    /// The configured chat gateway endpoint.
    pub chat_url: String,
}

#[derive(Debug, Default)]
struct WidgetState {
    open: bool,
    session: Option<Session>,
    requests: u64,
    fallbacks: u64,
}

impl WidgetState {
    fn activate(&mut self, greeting: &str) -> &mut Session {
        self.session.get_or_insert_with(|| {
            CHAT_ACTIVATIONS.click();
            Session::activate(greeting)
        })
    }
}

/// Holds the in-flight flag for one send.
///
/// If the send is dropped after its question was logged but before the reply
/// was, the fallback reply is logged here so every question gets exactly one
/// answer.
struct InFlight<'a, B: ChatBackend> {
    widget: &'a ChatSession<B>,
    awaiting_reply: bool,
}

impl<B: ChatBackend> Drop for InFlight<'_, B> {
    fn drop(&mut self) {
        if self.awaiting_reply {
            self.widget.abandon_pending();
        }
        self.widget.in_flight.store(false, Ordering::Release);
    }
}

/// One chat widget.
///
/// Every widget owns its own session, conversation and in-flight flag, so any
/// number of them can coexist.  All methods take `&self`; a widget can be
/// shared between tasks behind an `Arc`.
pub struct ChatSession<B: ChatBackend> {
    backend: B,
    config: ChatConfig,
    state: Mutex<WidgetState>,
    in_flight: AtomicBool,
}

impl ChatSession<Gateway> {
    /// Creates a widget that talks to the gateway named in `config`.
    pub fn new(config: ChatConfig) -> Result<Self> {
        let gateway = Gateway::with_options(&config.chat_url, Some(config.timeout))?;
        Ok(Self::with_backend(gateway, config))
    }
}

impl<B: ChatBackend> ChatSession<B> {
    /// Creates a widget with a custom backend.
    pub fn with_backend(backend: B, config: ChatConfig) -> Self {
        Self {
            backend,
            config,
            state: Mutex::new(WidgetState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// The widget configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Opens the widget, starting the session on first use.
    pub fn open(&self) {
        let mut state = self.lock_state();
        state.open = true;
        state.activate(&self.config.greeting);
    }

    /// Closes the widget.  The session and its conversation are kept.
    pub fn close(&self) {
        self.lock_state().open = false;
    }

    /// Flips the widget between open and closed and returns the new state.
    pub fn toggle(&self) -> bool {
        let open = !self.is_open();
        if open {
            self.open();
        } else {
            self.close();
        }
        open
    }

    /// Whether the widget is open.
    pub fn is_open(&self) -> bool {
        self.lock_state().open
    }

    /// Starts the session if there is none yet and returns its id.
    ///
    /// Calling this again returns the same id.
    pub fn activate(&self) -> SessionId {
        let mut state = self.lock_state();
        state.activate(&self.config.greeting).id().clone()
    }

    /// The session id, if the widget has been activated.
    pub fn session_id(&self) -> Option<SessionId> {
        self.lock_state()
            .session
            .as_ref()
            .map(|session| session.id().clone())
    }

    /// A snapshot of the conversation, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.lock_state()
            .session
            .as_ref()
            .map(|session| session.conversation().all().to_vec())
            .unwrap_or_default()
    }

    /// The number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.lock_state()
            .session
            .as_ref()
            .map_or(0, |session| session.conversation().len())
    }

    /// The conversation as the question/answer pairs the gateway receives.
    pub fn history(&self) -> Vec<HistoryPair> {
        self.lock_state()
            .session
            .as_ref()
            .map(|session| pair_history(session.conversation().all(), GREETING_ID))
            .unwrap_or_default()
    }

    /// Whether a send is waiting for its reply.
    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Sends a user message and waits for the reply.
    ///
    /// This method:
    /// 1. Starts the session if needed
    /// 2. Adds the user message to the conversation
    /// 3. Sends the question and the paired history to the backend
    /// 4. Adds exactly one bot message: the answer, or the fallback text if
    ///    the backend failed or this future was dropped before the reply
    ///
    /// Backend failures never surface here.  If another send is still
    /// pending, this returns [`SendOutcome::Busy`] without touching the
    /// conversation.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `text` is blank.
    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        let question = text.trim();
        if question.is_empty() {
            return Err(Error::validation(
                "message text must not be empty",
                Some("text".to_string()),
            ));
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            CHAT_BUSY_REJECTIONS.click();
            tracing::debug!("send rejected while a reply is pending");
            return Ok(SendOutcome::Busy);
        }
        let mut in_flight = InFlight {
            widget: self,
            awaiting_reply: false,
        };

        let request = {
            let mut state = self.lock_state();
            let session = state.activate(&self.config.greeting);
            session
                .conversation_mut()
                .append(Message::user(question))?;
            let history = pair_history(session.conversation().all(), GREETING_ID);
            ChatRequest::new(session.id().as_str(), question, history)
        };
        in_flight.awaiting_reply = true;
        CHAT_SENDS.click();

        let result = self.backend.ask(&request).await;
        let (answer, failed) = reply_or_fallback(result, &self.config.fallback_answer);
        let reply = Message::bot(answer);

        let mut state = self.lock_state();
        in_flight.awaiting_reply = false;
        state.requests += 1;
        if failed {
            state.fallbacks += 1;
            CHAT_FALLBACKS.click();
        }
        state
            .activate(&self.config.greeting)
            .conversation_mut()
            .append(reply.clone())?;
        tracing::debug!(
            session_id = %request.session_id,
            fallback = failed,
            "appended bot reply"
        );
        Ok(SendOutcome::Replied(reply))
    }

    /// Returns the current widget statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        let state = self.lock_state();
        let (session_id, message_count, exchanges) = match &state.session {
            Some(session) => {
                let messages = session.conversation().all();
                let exchanges = pair_history(messages, GREETING_ID)
                    .iter()
                    .filter(|pair| !pair.is_open())
                    .count();
                (Some(session.id().clone()), messages.len(), exchanges)
            }
            None => (None, 0, 0),
        };
        SessionStats {
            session_id,
            is_open: state.open,
            message_count,
            exchanges,
            total_requests: state.requests,
            fallbacks: state.fallbacks,
            chat_url: self.config.chat_url.clone(),
        }
    }

    /// Saves the conversation to the specified path as JSON.
    pub fn save_transcript_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let transcript = {
            let state = self.lock_state();
            TranscriptFile {
                version: 1,
                session_id: state.session.as_ref().map(|s| s.id().clone()),
                messages: state
                    .session
                    .as_ref()
                    .map(|s| s.conversation().all().to_vec())
                    .unwrap_or_default(),
            }
        };
        let file = File::create(path.as_ref())
            .map_err(|err| Error::io("failed to create transcript file", err))?;
        let writer = BufWriter::new(file);
        to_writer_pretty(writer, &transcript).map_err(|err| {
            Error::serialization("failed to serialize transcript", Some(Box::new(err)))
        })
    }

    fn abandon_pending(&self) {
        let mut state = self.lock_state();
        state.requests += 1;
        state.fallbacks += 1;
        CHAT_FALLBACKS.click();
        let reply = Message::bot(self.config.fallback_answer.as_str());
        let session = state.activate(&self.config.greeting);
        tracing::warn!(
            session_id = %session.id(),
            "send dropped before the reply arrived; logging the fallback"
        );
        if let Err(err) = session.conversation_mut().append(reply) {
            tracing::warn!(error = %err, "could not log the fallback reply");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Serialize)]
struct TranscriptFile {
    version: u8,
    session_id: Option<SessionId>,
    messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Semaphore;

    use crate::client::FALLBACK_ANSWER;
    use crate::types::Sender;

    /// Answers from a script and records every request.
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn ask(&self, request: &ChatRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(format!("echo: {}", request.question)))
        }
    }

    /// Holds every reply until a permit is released.
    struct GatedBackend {
        gate: Semaphore,
    }

    #[async_trait::async_trait]
    impl ChatBackend for GatedBackend {
        async fn ask(&self, request: &ChatRequest) -> Result<String> {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| Error::connection("gate closed", None))?;
            Ok(format!("answer to {}", request.question))
        }
    }

    fn widget(replies: Vec<Result<String>>) -> ChatSession<Arc<ScriptedBackend>> {
        ChatSession::with_backend(
            Arc::new(ScriptedBackend::new(replies)),
            ChatConfig::default(),
        )
    }

    #[test]
    fn new_widget_is_closed_and_inactive() {
        let widget = widget(vec![]);
        assert!(!widget.is_open());
        assert!(widget.session_id().is_none());
        assert!(widget.messages().is_empty());
        assert!(widget.history().is_empty());
    }

    #[test]
    fn open_activates_once() {
        let widget = widget(vec![]);
        widget.open();
        let id = widget.session_id().unwrap();
        let messages = widget.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_greeting());
        assert_eq!(messages[0].text(), widget.config().greeting);

        widget.close();
        assert!(!widget.is_open());
        assert!(widget.toggle());
        assert_eq!(widget.activate(), id);
        assert_eq!(widget.session_id(), Some(id));
        assert_eq!(widget.message_count(), 1);
    }

    #[test]
    fn widgets_do_not_share_state() {
        let a = widget(vec![]);
        let b = widget(vec![]);
        a.open();
        assert!(b.session_id().is_none());
        b.open();
        assert_ne!(a.session_id(), b.session_id());
    }

    #[tokio::test]
    async fn send_appends_question_and_answer() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok("B".to_string()),
            Ok("D".to_string()),
        ]));
        let widget = ChatSession::with_backend(backend.clone(), ChatConfig::default());

        let outcome = widget.send("A").await.unwrap();
        match outcome {
            SendOutcome::Replied(reply) => {
                assert_eq!(reply.text(), "B");
                assert_eq!(reply.sender(), Sender::Bot);
            }
            SendOutcome::Busy => panic!("unexpected busy"),
        }
        assert_eq!(widget.message_count(), 3);

        widget.send("  C  ").await.unwrap();
        assert_eq!(widget.message_count(), 5);
        assert_eq!(
            widget.history(),
            vec![HistoryPair::new("A", "B"), HistoryPair::new("C", "D")]
        );

        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        let id = widget.session_id().unwrap();
        assert!(requests.iter().all(|r| r.session_id == id.as_str()));
        assert_eq!(requests[0].question, "A");
        assert_eq!(requests[0].chat_history, vec![HistoryPair::open("A")]);
        assert_eq!(requests[1].question, "C");
        assert_eq!(
            requests[1].chat_history,
            vec![HistoryPair::new("A", "B"), HistoryPair::open("C")]
        );
    }

    #[tokio::test]
    async fn greeting_never_sent_upstream() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let widget = ChatSession::with_backend(backend.clone(), ChatConfig::default());
        widget.open();
        for question in ["one", "two", "three"] {
            widget.send(question).await.unwrap();
        }
        let greeting = widget.config().greeting.clone();
        for request in backend.requests() {
            assert!(
                request
                    .chat_history
                    .iter()
                    .all(|pair| pair.question() != greeting && pair.answer() != greeting)
            );
        }
    }

    #[tokio::test]
    async fn failure_appends_fallback() {
        let widget = widget(vec![
            Err(Error::connection("connection refused", None)),
            Ok("back again".to_string()),
        ]);
        let outcome = widget.send("hello?").await.unwrap();
        assert_eq!(
            outcome,
            SendOutcome::Replied(widget.messages().last().unwrap().clone())
        );
        let last = widget.messages().last().cloned().unwrap();
        assert_eq!(last.text(), FALLBACK_ANSWER);
        assert_eq!(last.sender(), Sender::Bot);
        assert_eq!(widget.message_count(), 3);

        // The session stays usable after a failure.
        widget.send("still there?").await.unwrap();
        assert_eq!(widget.message_count(), 5);
        let stats = widget.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.fallbacks, 1);
        assert_eq!(stats.exchanges, 2);
    }

    #[tokio::test]
    async fn empty_answer_is_treated_as_failure() {
        let widget = widget(vec![Ok("   ".to_string())]);
        widget.send("anything").await.unwrap();
        assert_eq!(widget.messages().last().unwrap().text(), FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn custom_fallback_text() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(Error::timeout("slow"))]));
        let config = ChatConfig::default().with_fallback_answer("Offline right now.");
        let widget = ChatSession::with_backend(backend, config);
        widget.send("hi").await.unwrap();
        assert_eq!(widget.messages().last().unwrap().text(), "Offline right now.");
    }

    #[tokio::test]
    async fn blank_input_is_rejected() {
        let widget = widget(vec![]);
        let err = widget.send("   ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(widget.message_count(), 0);
        assert!(!widget.is_pending());
    }

    #[tokio::test]
    async fn concurrent_send_is_busy() {
        let widget = Arc::new(ChatSession::with_backend(
            GatedBackend {
                gate: Semaphore::new(0),
            },
            ChatConfig::default(),
        ));
        widget.open();
        let session_id = widget.session_id().unwrap();

        let first = {
            let widget = Arc::clone(&widget);
            tokio::spawn(async move { widget.send("first").await })
        };
        while !widget.is_pending() || widget.message_count() < 2 {
            tokio::task::yield_now().await;
        }

        // Greeting plus the pending question.
        assert_eq!(widget.message_count(), 2);
        assert_eq!(widget.send("second").await.unwrap(), SendOutcome::Busy);
        assert_eq!(widget.message_count(), 2);

        widget.backend.gate.add_permits(1);
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, SendOutcome::Replied(ref m) if m.text() == "answer to first"));
        assert_eq!(widget.message_count(), 3);
        assert!(!widget.is_pending());
        assert_eq!(widget.session_id(), Some(session_id));

        widget.backend.gate.add_permits(1);
        widget.send("second").await.unwrap();
        assert_eq!(widget.message_count(), 5);
    }

    #[tokio::test]
    async fn dropped_send_still_gets_a_reply() {
        let widget = ChatSession::with_backend(
            GatedBackend {
                gate: Semaphore::new(0),
            },
            ChatConfig::default(),
        );
        widget.open();

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), widget.send("first")).await;
        assert!(abandoned.is_err());
        assert!(!widget.is_pending());
        let messages = widget.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].sender(), Sender::Bot);
        assert_eq!(messages[2].text(), FALLBACK_ANSWER);

        widget.backend.gate.add_permits(1);
        widget.send("second").await.unwrap();
        let senders: Vec<Sender> = widget.messages().iter().map(Message::sender).collect();
        assert_eq!(
            senders,
            vec![Sender::Bot, Sender::User, Sender::Bot, Sender::User, Sender::Bot]
        );
        assert_eq!(
            widget.history(),
            vec![
                HistoryPair::new("first", FALLBACK_ANSWER),
                HistoryPair::new("second", "answer to second"),
            ]
        );
        let stats = widget.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.fallbacks, 1);
    }

    #[test]
    fn transcript_round_trip_on_disk() {
        let widget = widget(vec![]);
        widget.open();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.json");
        widget.save_transcript_to(&path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(
            json["session_id"],
            widget.session_id().unwrap().as_str()
        );
        assert_eq!(json["messages"][0]["id"], GREETING_ID);
    }
}
