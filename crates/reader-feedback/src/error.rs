//! Errors from the feedback service and its configuration.
//!
//! The detailed variants go to logs and the CLI. Users of the reading UI
//! only ever see [`FeedbackError::user_message`].

use std::path::PathBuf;

use miette::Diagnostic;
use reader_core::RequestKind;
use reqwest::StatusCode;

/// Longest body excerpt kept in a [`FeedbackError::Status`].
const SNIPPET_CHARS: usize = 200;

#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum FeedbackError {
    #[error("invalid feedback configuration: {field}: {reason}")]
    #[diagnostic(
        code(reader::feedback::config),
        help("check the config file and READER_LLM_* environment variables")
    )]
    Config {
        field: &'static str,
        reason: String,
    },

    #[error("could not reach the feedback service")]
    #[diagnostic(code(reader::feedback::transport))]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {snippet}")]
    #[diagnostic(code(reader::feedback::status))]
    Status {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    #[error("could not decode feedback response: {0}")]
    #[diagnostic(code(reader::feedback::decode))]
    Decode(String),

    #[error("the feedback service returned no content")]
    #[diagnostic(code(reader::feedback::empty_response))]
    EmptyResponse,

    #[error("config file error")]
    #[diagnostic(code(reader::feedback::io))]
    Io(#[from] std::io::Error),

    #[error("invalid TOML config")]
    #[diagnostic(code(reader::feedback::toml))]
    TomlRead(#[from] toml::de::Error),

    #[error("could not write TOML config")]
    #[diagnostic(code(reader::feedback::toml))]
    TomlWrite(#[from] toml::ser::Error),

    #[error("invalid JSON config")]
    #[diagnostic(code(reader::feedback::json))]
    Json(#[from] serde_json::Error),

    #[error("unsupported config format: {}", .0.display())]
    #[diagnostic(
        code(reader::feedback::unsupported_format),
        help("use a .json or .toml file")
    )]
    UnsupportedFormat(PathBuf),
}

impl FeedbackError {
    /// The generic message shown to users when a request of `kind` fails.
    pub fn user_message(kind: RequestKind) -> &'static str {
        match kind {
            RequestKind::AnnotationGuide => "Failed to generate AI annotation guide.",
            RequestKind::SummaryFeedback => "Failed to generate AI summary feedback.",
            RequestKind::AnnotationFeedback => "Failed to generate AI annotation feedback.",
        }
    }

    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        FeedbackError::Config {
            field,
            reason: reason.into(),
        }
    }
}

/// Trimmed, length-capped excerpt of a response body for error messages.
pub(crate) fn make_snippet(body: &str) -> String {
    let body = body.trim();
    let mut chars = body.char_indices();
    match chars.nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}
