//! reader-feedback: the AI feedback calls behind the active reader.
//!
//! - `FeedbackService` - the three feedback operations as a trait
//! - `ChatFeedbackClient` - implementation over an OpenAI-compatible
//!   `/v1/chat/completions` endpoint
//! - `FeedbackConfig` with `FileStore` loading from `.json`/`.toml`
//! - `prompts` - prompt text for each operation

pub mod client;
pub mod config;
pub mod error;
pub mod prompts;
pub mod service;

pub use client::ChatFeedbackClient;
pub use config::{FeedbackConfig, FileStore, Loader, Saver};
pub use error::FeedbackError;
pub use service::{FeedbackService, PendingRequest, run_request};
