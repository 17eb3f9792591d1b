// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat messages and summaries for the API and the local transcript.

use serde::{Deserialize, Serialize};

/// Opening assistant message shown for every new chat.
///
/// It never travels over the network; the backend only sees the user's
/// first query.
pub const STARTING_AI_MESSAGE: &str = "Hello! I'm your DataTalksClub capstone project assistant. \
I'm here to help you brainstorm and develop ideas for your \
capstone project across any of our courses - ML Engineering, \
Data Engineering, MLOps, LLMs, and more!\n\nWhich \
course are you taking, and what kind of project are you thinking about?";

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Map a backend role string. Anything but `user`/`assistant` is not shown.
    pub fn from_wire(role: &str) -> Option<Self> {
        match role {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// A message in the local conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Stable position key within one transcript
    pub id: u64,
    /// Message text (never blank)
    pub content: String,
    /// True when the user wrote it
    pub is_user: bool,
}

impl Message {
    pub fn role(&self) -> Role {
        if self.is_user {
            Role::User
        } else {
            Role::Assistant
        }
    }
}

/// Message as returned by the fetch-chat endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Filter raw backend messages down to what the user should see.
///
/// Keeps only user/assistant entries with non-blank content, in order, and
/// numbers them by their position in the output.
pub fn normalize_messages(raw: Vec<RawMessage>) -> Vec<Message> {
    raw.into_iter()
        .filter_map(|m| {
            let role = Role::from_wire(&m.role)?;
            let content = m.content.filter(|c| !c.trim().is_empty())?;
            Some((role, content))
        })
        .enumerate()
        .map(|(position, (role, content))| Message {
            id: position as u64,
            content,
            is_user: role == Role::User,
        })
        .collect()
}

/// Chat listing entry from `GET api/chats/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub query_preview: String,
    /// RFC 3339 timestamp of the last turn
    pub last_updated: String,
    #[serde(default)]
    pub message_count: u32,
}

/// Messages carried from a freshly created chat to its continued view so the
/// first load does not re-fetch them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handoff {
    pub chat_id: u64,
    pub messages: Vec<Message>,
}

// ─── Wire payloads ───────────────────────────────────────────

/// Body of `GET api/chats/{id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatDetailResponse {
    #[serde(default)]
    pub messages: Vec<RawMessage>,
}

/// Chat reference inside a create response.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatRef {
    pub id: u64,
}

/// Body of `POST api/chats/`.
///
/// The model may produce no text, in which case `ai_response` is null.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateChatResponse {
    pub chat: ChatRef,
    #[serde(default)]
    pub ai_response: Option<String>,
}

/// Body of `PUT api/chats/{id}/`.
#[derive(Debug, Deserialize)]
pub(crate) struct ContinueChatResponse {
    #[serde(default)]
    pub ai_response: Option<String>,
}
