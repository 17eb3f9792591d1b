//! Credential storage layer.
//!
//! A small key-value abstraction standing in for browser local storage, with
//! an in-memory implementation for tests and a JSON file for the CLI.

pub mod credentials;
pub mod file;
pub mod memory;

pub use credentials::CredentialStore;
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::AppError;

/// Record names as constants.
pub mod keys {
    pub const TOKENS: &str = "tokens";
    pub const USER: &str = "user";
}

/// String key-value storage backing the credential records.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is not present.
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), AppError>;
}
