// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - backend access and session logic.

pub mod api;
pub mod chat;
pub mod session;

pub use api::{ApiClient, CreatedChat};
pub use chat::{chat_history, fetch_messages, ChatSession, PendingTurn, Transcript, TurnOutcome};
pub use session::{SessionService, SessionState};
