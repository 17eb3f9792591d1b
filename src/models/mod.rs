// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the client.

pub mod chat;
pub mod tokens;
pub mod user;

pub use chat::{ChatSummary, Handoff, Message, RawMessage, Role};
pub use tokens::TokenPair;
pub use user::UserProfile;
