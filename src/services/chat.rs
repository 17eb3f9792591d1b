// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat continuation: starting new chats and continuing existing ones.
//!
//! The user's message is appended to the local transcript before the backend
//! is called and the assistant's answer is appended after it returns. A
//! failed call leaves the user's message in place without an answer; nothing
//! is retried or rolled back.

use crate::error::AppError;
use crate::models::chat::{normalize_messages, STARTING_AI_MESSAGE};
use crate::models::{ChatSummary, Handoff, Message};
use crate::services::SessionService;

// ─────────────────────────────────────────────────────────────────────────────
// Transcript - local message sequence with two-phase append
// ─────────────────────────────────────────────────────────────────────────────

/// Handle for a user message waiting on the backend's answer.
///
/// Resolve it with [`Transcript::commit`] or [`Transcript::fail`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pending turn must be committed or failed"]
pub struct PendingTurn {
    message_id: u64,
}

impl PendingTurn {
    pub fn message_id(&self) -> u64 {
        self.message_id
    }
}

/// Ordered messages of one chat.
///
/// Message IDs come from a counter that only moves forward, so an ID is
/// never reused within a transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
    pending: Option<u64>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt an existing sequence (fetched or handed off); numbering resumes
    /// after its highest ID.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let next_id = messages.iter().map(|m| m.id + 1).max().unwrap_or(0);
        Self {
            messages,
            next_id,
            pending: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// ID of the user message still waiting for an answer.
    pub fn pending(&self) -> Option<u64> {
        self.pending
    }

    fn push(&mut self, content: String, is_user: bool) -> &Message {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            content,
            is_user,
        });
        &self.messages[self.messages.len() - 1]
    }

    /// Append an assistant message outside of any turn (the greeting).
    pub fn push_assistant(&mut self, content: impl Into<String>) -> &Message {
        self.push(content.into(), false)
    }

    /// Phase one: show the user's message right away.
    pub fn begin_turn(&mut self, query: &str) -> Result<PendingTurn, AppError> {
        if query.trim().is_empty() {
            return Err(AppError::BadRequest("Message is empty".to_string()));
        }
        if self.pending.is_some() {
            return Err(AppError::BadRequest(
                "A message is already waiting for a reply".to_string(),
            ));
        }

        let message_id = self.push(query.to_string(), true).id;
        self.pending = Some(message_id);
        Ok(PendingTurn { message_id })
    }

    /// Phase two (success): append the assistant's reply after the user message.
    ///
    /// A blank reply is not materialized; the turn stays unanswered.
    pub fn commit(&mut self, turn: PendingTurn, reply: impl Into<String>) -> Option<&Message> {
        self.settle(&turn);

        let reply = reply.into();
        if reply.trim().is_empty() {
            tracing::warn!(message_id = turn.message_id, "Empty assistant reply dropped");
            return None;
        }
        Some(self.push(reply, false))
    }

    /// Phase two (failure): keep the user message, append nothing.
    pub fn fail(&mut self, turn: PendingTurn) {
        self.settle(&turn);
    }

    fn settle(&mut self, turn: &PendingTurn) {
        if self.pending == Some(turn.message_id) {
            self.pending = None;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ChatSession - one chat view, new or continued
// ─────────────────────────────────────────────────────────────────────────────

/// Result of submitting one message.
#[derive(Debug)]
pub enum TurnOutcome {
    /// A new chat was created. The view should move to `handoff.chat_id`
    /// and reuse `handoff.messages` instead of fetching.
    Created(Handoff),
    /// An existing chat got its reply.
    Replied(Message),
    /// The backend call failed; the user's message stays without a reply.
    Unanswered(AppError),
}

/// Local view of one chat.
pub struct ChatSession {
    session: SessionService,
    chat_id: Option<u64>,
    transcript: Transcript,
}

impl ChatSession {
    /// Start a draft chat showing only the greeting. No network call.
    pub fn new_chat(session: SessionService) -> Self {
        let mut transcript = Transcript::new();
        transcript.push_assistant(STARTING_AI_MESSAGE);

        Self {
            session,
            chat_id: None,
            transcript,
        }
    }

    /// Open an existing chat.
    ///
    /// A handoff for the same chat is used verbatim. Otherwise the messages
    /// are fetched; if that fails the error is logged and the chat opens
    /// empty.
    pub async fn resume(session: SessionService, chat_id: u64, handoff: Option<Handoff>) -> Self {
        let messages = match handoff {
            Some(h) if h.chat_id == chat_id => h.messages,
            _ => match fetch_messages(&session, chat_id).await {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::error!(chat_id, error = %e, "Failed to fetch chat messages");
                    Vec::new()
                }
            },
        };

        Self {
            session,
            chat_id: Some(chat_id),
            transcript: Transcript::from_messages(messages),
        }
    }

    /// Backend ID, `None` while the chat is still a draft.
    pub fn chat_id(&self) -> Option<u64> {
        self.chat_id
    }

    pub fn is_new_chat(&self) -> bool {
        self.chat_id.is_none()
    }

    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether a message is waiting on the backend.
    pub fn is_busy(&self) -> bool {
        self.transcript.pending().is_some()
    }

    /// Send a message.
    ///
    /// Blank input is rejected before anything is appended. Backend failures
    /// are reported as [`TurnOutcome::Unanswered`], never as `Err`. If the
    /// returned future is dropped before the backend answers, the user's
    /// message stays unanswered and the session accepts the next submit.
    pub async fn submit(&mut self, query: &str) -> Result<TurnOutcome, AppError> {
        let session = self.session.clone();
        let chat_id = self.chat_id;

        let guard = TurnGuard {
            turn: Some(self.transcript.begin_turn(query)?),
            transcript: &mut self.transcript,
        };

        let result = match chat_id {
            None => create(&session, query).await,
            Some(chat_id) => reply(&session, chat_id, query).await,
        };

        match result {
            Ok(Answer::Created { chat_id, reply }) => {
                guard.fail();
                Ok(TurnOutcome::Created(self.adopt_created(chat_id, query, reply)))
            }
            Ok(Answer::Reply(reply)) => match guard.commit(reply) {
                Some(message) => Ok(TurnOutcome::Replied(message)),
                None => Ok(TurnOutcome::Unanswered(AppError::Internal(anyhow::anyhow!(
                    "Assistant returned an empty reply"
                )))),
            },
            Err(e) => {
                tracing::error!(chat_id = ?chat_id, error = %e, "Chat request failed");
                guard.fail();
                Ok(TurnOutcome::Unanswered(e))
            }
        }
    }

    /// Rebuild the canonical first exchange of a new chat and switch to it.
    ///
    /// Earlier unanswered attempts in the draft are dropped; the created
    /// chat holds exactly the greeting, the query and the answer.
    fn adopt_created(&mut self, chat_id: u64, query: &str, reply: String) -> Handoff {
        let mut transcript = Transcript::new();
        transcript.push_assistant(STARTING_AI_MESSAGE);
        transcript.push(query.to_string(), true);
        if reply.trim().is_empty() {
            tracing::warn!(chat_id, "Created chat returned an empty first answer");
        } else {
            transcript.push(reply, false);
        }

        self.chat_id = Some(chat_id);
        self.transcript = transcript;

        Handoff {
            chat_id,
            messages: self.transcript.messages().to_vec(),
        }
    }
}

/// Backend answer to one submitted message.
enum Answer {
    Created { chat_id: u64, reply: String },
    Reply(String),
}

async fn create(session: &SessionService, query: &str) -> Result<Answer, AppError> {
    let access = session.access_token()?;
    let created = session.api().create_chat(&access, query).await?;
    tracing::info!(chat_id = created.chat_id, "Chat created");

    Ok(Answer::Created {
        chat_id: created.chat_id,
        reply: created.ai_response,
    })
}

async fn reply(session: &SessionService, chat_id: u64, query: &str) -> Result<Answer, AppError> {
    let access = session.access_token()?;
    let reply = session.api().continue_chat(&access, chat_id, query).await?;
    Ok(Answer::Reply(reply))
}

/// Holds a pending turn across the backend call and fails it if the call
/// is abandoned.
struct TurnGuard<'a> {
    transcript: &'a mut Transcript,
    turn: Option<PendingTurn>,
}

impl TurnGuard<'_> {
    fn commit(mut self, reply: String) -> Option<Message> {
        let turn = self.turn.take()?;
        self.transcript.commit(turn, reply).cloned()
    }

    fn fail(mut self) {
        if let Some(turn) = self.turn.take() {
            self.transcript.fail(turn);
        }
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if let Some(turn) = self.turn.take() {
            tracing::warn!(message_id = turn.message_id, "Chat request abandoned before it finished");
            self.transcript.fail(turn);
        }
    }
}

/// Fetch and filter a chat's messages.
pub async fn fetch_messages(session: &SessionService, chat_id: u64) -> Result<Vec<Message>, AppError> {
    let access = session.access_token()?;
    let raw = session.api().chat_messages(&access, chat_id).await?;
    Ok(normalize_messages(raw))
}

/// List the user's chats for the history view.
pub async fn chat_history(session: &SessionService) -> Result<Vec<ChatSummary>, AppError> {
    let access = session.access_token()?;
    session.api().chat_history(&access).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_phase_commit() {
        let mut t = Transcript::new();
        t.push_assistant("hello");

        let turn = t.begin_turn("idea?").unwrap();
        assert_eq!(turn.message_id(), 1);
        assert_eq!(t.pending(), Some(1));
        assert_eq!(t.last().map(|m| m.is_user), Some(true));

        let reply = t.commit(turn, "try this").cloned().unwrap();
        assert_eq!(reply.id, 2);
        assert!(!reply.is_user);
        assert_eq!(t.pending(), None);
    }

    #[test]
    fn test_failed_turn_keeps_user_message() {
        let mut t = Transcript::new();
        let turn = t.begin_turn("hello?").unwrap();
        t.fail(turn);

        assert_eq!(t.len(), 1);
        assert_eq!(t.last().map(|m| m.content.as_str()), Some("hello?"));
        assert_eq!(t.pending(), None);

        // Next turn gets a fresh ID
        let turn = t.begin_turn("anyone?").unwrap();
        assert_eq!(turn.message_id(), 1);
        t.fail(turn);
    }

    #[test]
    fn test_blank_input_and_overlap_rejected() {
        let mut t = Transcript::new();
        assert!(matches!(t.begin_turn("  \n"), Err(AppError::BadRequest(_))));
        assert!(t.is_empty());

        let turn = t.begin_turn("first").unwrap();
        assert!(t.begin_turn("second").is_err());
        assert_eq!(t.len(), 1);
        t.fail(turn);
    }

    #[test]
    fn test_dropped_guard_settles_turn() {
        let mut t = Transcript::new();
        let guard = TurnGuard {
            turn: Some(t.begin_turn("first").unwrap()),
            transcript: &mut t,
        };
        drop(guard);

        assert_eq!(t.pending(), None);
        assert_eq!(t.len(), 1);
        let turn = t.begin_turn("second").unwrap();
        assert_eq!(turn.message_id(), 1);
        t.fail(turn);
    }

    #[test]
    fn test_blank_reply_not_materialized() {
        let mut t = Transcript::new();
        let turn = t.begin_turn("q").unwrap();
        assert!(t.commit(turn, "   ").is_none());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_ids_continue_after_adopted_messages() {
        let adopted = vec![
            Message {
                id: 0,
                content: "a".to_string(),
                is_user: true,
            },
            Message {
                id: 1,
                content: "b".to_string(),
                is_user: false,
            },
        ];
        let mut t = Transcript::from_messages(adopted);
        let turn = t.begin_turn("c").unwrap();
        assert_eq!(turn.message_id(), 2);
        t.fail(turn);
    }
}
