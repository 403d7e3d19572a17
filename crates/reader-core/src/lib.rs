//! reader-core: annotation-span engine for the active reader, free of any
//! UI framework.
//!
//! This crate provides:
//! - `TextRange` and char-offset helpers over the immutable source text
//! - `SelectionSource` - platform seam for reading the user's selection
//! - `SpanStore` / `ConnectionStore` with the two-step `ConnectionFlow`
//! - `partition` - segment tiling for layered rendering, plus an HTML writer
//! - `ReaderSession` - the consolidated per-document state

pub mod annotation;
pub mod connection;
pub mod container;
pub mod draft;
pub mod error;
pub mod feedback;
pub mod html;
pub mod range;
pub mod resolve;
pub mod segment;
pub mod session;
pub mod spans;

pub use annotation::{Annotation, AnnotationMeta, AnnotationType, UnknownAnnotationType};
pub use connection::{Connection, ConnectionFlow, ConnectionStore};
pub use container::{BoundaryPoint, ContainerNode, ContainerSelection, ContainerView};
pub use draft::NoteDraft;
pub use error::AnnotateError;
pub use feedback::{FeedbackAnnotation, to_feedback_payload};
pub use html::{DISPLAY_AREA_ATTR, HtmlSegmentWriter, render_segments_html};
pub use range::{TextRange, char_len, char_slice};
pub use resolve::{SelectionSnapshot, SelectionSource, capture_range, resolve_selection};
pub use segment::{Marker, Segment, partition};
pub use session::{AiPanel, Applied, ApplyOutcome, Notice, ReaderSession, RequestKind, RequestTicket};
pub use smol_str::SmolStr;
pub use spans::SpanStore;
