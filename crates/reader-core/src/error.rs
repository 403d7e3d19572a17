//! Error types for annotation operations.
//!
//! Every variant is a recoverable rejection: the operation that produced it
//! left the session state untouched.

use miette::Diagnostic;

use crate::annotation::AnnotationType;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum AnnotateError {
    /// Selection was missing, collapsed or whitespace-only.
    #[error("selection is empty")]
    #[diagnostic(
        code(reader::empty_selection),
        help("select some non-whitespace text first")
    )]
    EmptySelection,

    /// A note-requiring annotation type was saved without note text.
    #[error("a {} annotation needs a note", .kind.meta().label)]
    #[diagnostic(code(reader::empty_note), help("type some text for your note"))]
    EmptyNote { kind: AnnotationType },

    /// Connection endpoints have identical bounds.
    #[error("a connection cannot link a passage to itself")]
    #[diagnostic(
        code(reader::self_connection),
        help("select a different passage for the second endpoint")
    )]
    SelfConnection,

    #[error("no connection is waiting for a second endpoint")]
    #[diagnostic(code(reader::no_pending_connection))]
    NoPendingConnection,

    #[error("no note is being drafted")]
    #[diagnostic(code(reader::no_draft))]
    NoDraft,

    #[error("range {start}..{end} is outside the text (length {len})")]
    #[diagnostic(code(reader::out_of_bounds))]
    OutOfBounds { start: usize, end: usize, len: usize },

    /// Reported selection text disagrees with the source at those offsets.
    #[error("selected text does not match the source at {start}..{end}")]
    #[diagnostic(code(reader::text_mismatch))]
    TextMismatch { start: usize, end: usize },

    #[error("no text has been provided")]
    #[diagnostic(
        code(reader::no_source_text),
        help("paste or load some text first")
    )]
    NoSourceText,

    #[error("no summary has been written")]
    #[diagnostic(code(reader::no_summary))]
    NoSummary,

    #[error("there are no annotations to review")]
    #[diagnostic(
        code(reader::no_annotations),
        help("make some annotations first to get feedback")
    )]
    NoAnnotations,
}
