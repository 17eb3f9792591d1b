// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Capstone Assistant command line client
//!
//! Logs in against the assistant backend, lists previous chats, and runs an
//! interactive chat loop on stdin.

use anyhow::Context;
use capstone_assistant::{
    config::Config,
    services::{chat_history, ChatSession, SessionState, TurnOutcome},
    time_utils::format_last_updated,
    AppState,
};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Get capstone project ideas from the DataTalksClub assistant.
#[derive(Parser)]
#[command(name = "capstone", version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in.
    Register {
        /// Full name shown in the assistant.
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ASSISTANT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in with an existing account.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ASSISTANT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget stored credentials.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Check whether the stored session is still valid.
    Status,
    /// List previous chats.
    History,
    /// Start a new chat, or continue one with --id.
    Chat {
        /// Chat to continue.
        #[arg(long)]
        id: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json);

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(api_url = %config.api_url, "Configuration loaded");

    let state = AppState::from_config(config)?;
    let session = &state.session;

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => {
            let user = session.register(&name, &email, &password).await?;
            println!("Welcome, {} <{}>", user.name, user.email);
        }
        Commands::Login { email, password } => {
            let user = session.login(&email, &password).await?;
            println!("Logged in as {} <{}>", user.name, user.email);
        }
        Commands::Logout => {
            session.logout()?;
            println!("Logged out");
        }
        Commands::Whoami => {
            require_login(&state).await?;
            let user = session.fetch_current_user().await?;
            println!("{} <{}> (id {})", user.name, user.email, user.id);
        }
        Commands::Status => {
            let state_after = session.check().await;
            match state_after {
                SessionState::Authenticated => {
                    let expiry = session
                        .store()
                        .read_tokens()
                        .and_then(|t| t.access_expires_at());
                    match expiry {
                        Some(at) => println!("Logged in (access token expires {})", at),
                        None => println!("Logged in"),
                    }
                }
                _ => println!("Not logged in"),
            }
        }
        Commands::History => {
            require_login(&state).await?;
            let chats = chat_history(session).await?;
            if chats.is_empty() {
                println!("No chat history yet");
            }
            let now = chrono::Utc::now();
            for chat in chats {
                println!(
                    "#{:<5} {}  ({} messages, {})",
                    chat.id,
                    chat.title,
                    chat.message_count,
                    format_last_updated(&chat.last_updated, now)
                );
                if !chat.query_preview.is_empty() {
                    println!("       {}", chat.query_preview);
                }
            }
        }
        Commands::Chat { id } => {
            require_login(&state).await?;
            let chat = match id {
                Some(chat_id) => ChatSession::resume(session.clone(), chat_id, None).await,
                None => ChatSession::new_chat(session.clone()),
            };
            run_chat(chat).await?;
        }
    }

    Ok(())
}

async fn require_login(state: &AppState) -> anyhow::Result<()> {
    if !state.session.is_logged_in().await {
        anyhow::bail!("Not logged in. Run `capstone login` first.");
    }
    Ok(())
}

/// Interactive loop: one line per message, `/quit` or EOF to leave.
async fn run_chat(mut chat: ChatSession) -> anyhow::Result<()> {
    for message in chat.messages() {
        print_message(message.is_user, &message.content);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        match chat.submit(line).await? {
            TurnOutcome::Created(handoff) => {
                println!("(chat #{})", handoff.chat_id);
                if let Some(reply) = handoff.messages.last().filter(|m| !m.is_user) {
                    print_message(false, &reply.content);
                }
            }
            TurnOutcome::Replied(reply) => print_message(false, &reply.content),
            TurnOutcome::Unanswered(e) => {
                eprintln!("! No reply: {}. You can send your message again.", e);
            }
        }
    }

    Ok(())
}

fn print_message(is_user: bool, content: &str) {
    let speaker = if is_user { "you" } else { "assistant" };
    println!("[{}] {}\n", speaker, content);
}

/// Initialize logging to stderr, JSON when requested.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("capstone_assistant=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
