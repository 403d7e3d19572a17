//! Per-document session state.
//!
//! `ReaderSession` owns the source text and everything defined relative to
//! it. Its methods are the only way to mutate that state; views read through
//! the accessors and re-render from [`ReaderSession::segments`].

use smol_str::SmolStr;

use crate::annotation::{Annotation, AnnotationType};
use crate::connection::{Connection, ConnectionFlow, ConnectionStore};
use crate::draft::NoteDraft;
use crate::error::AnnotateError;
use crate::feedback::{FeedbackAnnotation, to_feedback_payload};
use crate::html::render_segments_html;
use crate::range::TextRange;
use crate::resolve::{SelectionSource, capture_range};
use crate::segment::{Segment, partition};
use crate::spans::SpanStore;

/// Result of a toolbar action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub applied: Applied,
    /// Side effects the user should be told about.
    pub notices: Vec<Notice>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    Annotated(SmolStr),
    DraftOpened,
    ConnectionStarted,
    ConnectionCommitted(SmolStr),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// A pending connection was dropped because another type was chosen.
    ConnectionCancelled,
    /// An unsaved note draft was dropped by a new toolbar action.
    DraftDiscarded,
}

/// The three calls to the feedback service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    AnnotationGuide,
    SummaryFeedback,
    AnnotationFeedback,
}

/// Handle for an outstanding feedback request, tagged with the text
/// generation it was issued against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTicket {
    kind: RequestKind,
    generation: u64,
}

impl RequestTicket {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Display state for one feedback panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AiPanel {
    pub loading: bool,
    pub content: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default)]
struct AiPanels {
    guide: AiPanel,
    summary: AiPanel,
    annotations: AiPanel,
}

impl AiPanels {
    fn get(&self, kind: RequestKind) -> &AiPanel {
        match kind {
            RequestKind::AnnotationGuide => &self.guide,
            RequestKind::SummaryFeedback => &self.summary,
            RequestKind::AnnotationFeedback => &self.annotations,
        }
    }

    fn get_mut(&mut self, kind: RequestKind) -> &mut AiPanel {
        match kind {
            RequestKind::AnnotationGuide => &mut self.guide,
            RequestKind::SummaryFeedback => &mut self.summary,
            RequestKind::AnnotationFeedback => &mut self.annotations,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ReaderSession {
    source: String,
    spans: SpanStore,
    connections: ConnectionStore,
    flow: ConnectionFlow,
    draft: NoteDraft,
    selection: Option<TextRange>,
    summary: String,
    panels: AiPanels,
    generation: u64,
}

impl ReaderSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.replace_text(text);
        session
    }

    // === Source text ===

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Counter advanced on every text replacement.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Swap in new text. Everything defined against the old text is dropped.
    pub fn replace_text(&mut self, text: impl Into<String>) {
        self.source = text.into();
        self.spans.clear();
        self.connections.clear();
        self.flow = ConnectionFlow::Idle;
        self.draft = NoteDraft::NotEditing;
        self.selection = None;
        self.summary.clear();
        self.panels = AiPanels::default();
        self.generation += 1;
        tracing::debug!(
            generation = self.generation,
            len = self.source.len(),
            "source text replaced"
        );
    }

    // === Selection ===

    pub fn selection(&self) -> Option<&TextRange> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, range: Option<TextRange>) {
        self.selection = range;
    }

    /// Select `[start, end)` of the current text.
    pub fn select(&mut self, start: usize, end: usize) -> Result<&TextRange, AnnotateError> {
        let range = TextRange::from_source(&self.source, start, end)?;
        Ok(self.selection.insert(range))
    }

    /// Read the platform selection and store the resolved range (or clear it).
    pub fn capture_selection(&mut self, source_ui: &impl SelectionSource) -> Option<&TextRange> {
        self.selection = capture_range(source_ui, &self.source);
        self.selection.as_ref()
    }

    // === Toolbar ===

    /// Apply an annotation type to the current selection.
    ///
    /// `connection` starts or completes the connection workflow. Other types
    /// cancel a pending connection first, then either insert directly or open
    /// a note draft. Any accepted action discards an open draft. Rejections
    /// leave every part of the session unchanged.
    pub fn apply_type(&mut self, kind: AnnotationType) -> Result<ApplyOutcome, AnnotateError> {
        let mut notices = Vec::new();

        if kind == AnnotationType::Connection {
            let applied = if self.flow.is_pending() {
                let conn = self
                    .flow
                    .complete(self.selection.clone(), &mut self.connections)?;
                Applied::ConnectionCommitted(conn.id.clone())
            } else {
                self.flow.start(self.selection.clone())?;
                Applied::ConnectionStarted
            };
            if self.draft.cancel() {
                notices.push(Notice::DraftDiscarded);
            }
            self.selection = None;
            return Ok(ApplyOutcome { applied, notices });
        }

        let range = match &self.selection {
            Some(range) if !range.is_blank() => range.clone(),
            _ => return Err(AnnotateError::EmptySelection),
        };

        if self.flow.cancel().is_some() {
            notices.push(Notice::ConnectionCancelled);
        }
        if self.draft.cancel() {
            notices.push(Notice::DraftDiscarded);
        }

        let applied = if kind.drafts_note() {
            self.draft = NoteDraft::open(range, kind);
            Applied::DraftOpened
        } else {
            let ann = self.spans.insert(range, kind, None)?;
            Applied::Annotated(ann.id.clone())
        };
        self.selection = None;
        Ok(ApplyOutcome { applied, notices })
    }

    // === Note drafts ===

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    pub fn set_draft_note(&mut self, text: impl Into<String>) -> Result<(), AnnotateError> {
        self.draft.set_note(text)
    }

    /// Promote the open draft to an annotation.
    pub fn save_draft(&mut self) -> Result<SmolStr, AnnotateError> {
        let (range, kind, note) = self.draft.take()?;
        Ok(self.spans.insert(range, kind, note)?.id.clone())
    }

    pub fn cancel_draft(&mut self) -> bool {
        self.draft.cancel()
    }

    // === Annotations & connections ===

    pub fn annotations(&self) -> &[Annotation] {
        self.spans.list()
    }

    pub fn connections(&self) -> &[Connection] {
        self.connections.list()
    }

    pub fn connection_flow(&self) -> &ConnectionFlow {
        &self.flow
    }

    /// Insert an annotation directly, bypassing the toolbar flow.
    pub fn annotate(
        &mut self,
        range: TextRange,
        kind: AnnotationType,
        note: Option<String>,
    ) -> Result<SmolStr, AnnotateError> {
        let range = self.revalidate(&range)?;
        if kind.meta().requires_note && note.as_deref().is_none_or(|n| n.trim().is_empty()) {
            return Err(AnnotateError::EmptyNote { kind });
        }
        Ok(self.spans.insert(range, kind, note)?.id.clone())
    }

    /// Store a connection directly, bypassing the two-step flow.
    pub fn connect(&mut self, from: TextRange, to: TextRange) -> Result<SmolStr, AnnotateError> {
        let from = self.revalidate(&from)?;
        let to = self.revalidate(&to)?;
        if from.is_blank() || to.is_blank() {
            return Err(AnnotateError::EmptySelection);
        }
        Ok(self.connections.push(from, to)?.id.clone())
    }

    /// Check a range built elsewhere against the current text.
    fn revalidate(&self, range: &TextRange) -> Result<TextRange, AnnotateError> {
        TextRange::with_text(&self.source, range.start(), range.end(), range.text())
    }

    /// Returns whether an annotation was removed.
    pub fn remove_annotation(&mut self, id: &str) -> bool {
        self.spans.remove(id).is_some()
    }

    pub fn remove_connection(&mut self, id: &str) -> bool {
        self.connections.remove(id).is_some()
    }

    pub fn cancel_connection(&mut self) -> bool {
        self.flow.cancel().is_some()
    }

    // === Derived views ===

    pub fn segments(&self) -> Vec<Segment> {
        partition(
            &self.source,
            self.spans.list(),
            self.connections.list(),
            self.flow.pending_start(),
        )
    }

    pub fn render_html(&self) -> String {
        render_segments_html(&self.segments(), self.spans.list())
    }

    pub fn feedback_payload(&self) -> Vec<FeedbackAnnotation> {
        to_feedback_payload(&self.spans)
    }

    // === Summary ===

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn set_summary(&mut self, text: impl Into<String>) {
        self.summary = text.into();
    }

    // === Feedback requests ===

    pub fn panel(&self, kind: RequestKind) -> &AiPanel {
        self.panels.get(kind)
    }

    /// Check preconditions for a request, mark its panel loading and issue a
    /// ticket for the current text generation.
    pub fn begin_request(&mut self, kind: RequestKind) -> Result<RequestTicket, AnnotateError> {
        if self.source.trim().is_empty() {
            return Err(AnnotateError::NoSourceText);
        }
        match kind {
            RequestKind::SummaryFeedback if self.summary.trim().is_empty() => {
                return Err(AnnotateError::NoSummary);
            }
            RequestKind::AnnotationFeedback if self.spans.is_empty() => {
                return Err(AnnotateError::NoAnnotations);
            }
            _ => {}
        }

        *self.panels.get_mut(kind) = AiPanel {
            loading: true,
            content: None,
            error: None,
        };
        Ok(RequestTicket {
            kind,
            generation: self.generation,
        })
    }

    /// Deliver a response. Responses for an older text generation are
    /// dropped; returns whether this one was accepted.
    pub fn finish_request(&mut self, ticket: RequestTicket, result: Result<String, String>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                kind = ?ticket.kind,
                ticket_generation = ticket.generation,
                current = self.generation,
                "dropping stale feedback response"
            );
            return false;
        }

        let panel = self.panels.get_mut(ticket.kind);
        panel.loading = false;
        match result {
            Ok(content) => {
                panel.content = Some(content);
                panel.error = None;
            }
            Err(message) => {
                panel.content = None;
                panel.error = Some(message);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ContainerNode, ContainerView};
    use crate::segment::Marker;

    const TEXT: &str = "The cat sat on the mat.";

    #[test]
    fn test_cat_on_the_mat_scenario() {
        let mut session = ReaderSession::with_text(TEXT);

        session.select(4, 7).unwrap();
        let outcome = session.apply_type(AnnotationType::KeyTerm).unwrap();
        assert_eq!(outcome.applied, Applied::Annotated("a-0".into()));
        let ann = &session.annotations()[0];
        assert_eq!(
            (ann.range.start(), ann.range.end(), ann.range.text(), ann.kind),
            (4, 7, "cat", AnnotationType::KeyTerm)
        );

        session.select(12, 22).unwrap();
        let outcome = session.apply_type(AnnotationType::Connection).unwrap();
        assert_eq!(outcome.applied, Applied::ConnectionStarted);
        assert_eq!(
            session.connection_flow().pending_start().map(|r| r.text()),
            Some("on the mat")
        );

        session.select(0, 3).unwrap();
        let outcome = session.apply_type(AnnotationType::Connection).unwrap();
        assert_eq!(outcome.applied, Applied::ConnectionCommitted("c-0".into()));
        assert_eq!(session.connection_flow(), &ConnectionFlow::Idle);

        let conn = &session.connections()[0];
        assert_eq!((conn.from.start(), conn.from.end()), (12, 22));
        assert_eq!(conn.from.text(), "on the mat");
        assert_eq!((conn.to.start(), conn.to.end(), conn.to.text()), (0, 3, "The"));
    }

    #[test]
    fn test_replace_text_resets_everything() {
        let mut session = ReaderSession::with_text(TEXT);
        let generation = session.generation();
        session.select(4, 7).unwrap();
        session.apply_type(AnnotationType::KeyTerm).unwrap();
        session.select(12, 22).unwrap();
        session.apply_type(AnnotationType::Connection).unwrap();
        session.set_summary("A cat sits.");

        session.replace_text("Something else entirely.");
        assert!(session.annotations().is_empty());
        assert!(session.connections().is_empty());
        assert_eq!(session.connection_flow(), &ConnectionFlow::Idle);
        assert_eq!(session.summary(), "");
        assert_eq!(session.generation(), generation + 1);
        assert_eq!(session.segments().len(), 1);
    }

    #[test]
    fn test_connection_on_empty_selection() {
        let mut session = ReaderSession::with_text(TEXT);
        let err = session.apply_type(AnnotationType::Connection).unwrap_err();
        assert_eq!(err, AnnotateError::EmptySelection);
        assert_eq!(session.connection_flow(), &ConnectionFlow::Idle);
        assert!(session.connections().is_empty());
    }

    #[test]
    fn test_self_connection_keeps_pending() {
        let mut session = ReaderSession::with_text(TEXT);
        session.select(4, 7).unwrap();
        session.apply_type(AnnotationType::Connection).unwrap();
        session.select(4, 7).unwrap();
        let err = session.apply_type(AnnotationType::Connection).unwrap_err();
        assert_eq!(err, AnnotateError::SelfConnection);
        assert!(session.connection_flow().is_pending());
        assert!(session.connections().is_empty());
        // Selection survives a rejection so the user can adjust it.
        assert!(session.selection().is_some());
    }

    #[test]
    fn test_other_type_cancels_pending_connection() {
        let mut session = ReaderSession::with_text(TEXT);
        session.select(12, 22).unwrap();
        session.apply_type(AnnotationType::Connection).unwrap();

        session.select(4, 7).unwrap();
        let outcome = session.apply_type(AnnotationType::Highlight).unwrap();
        assert_eq!(outcome.notices, vec![Notice::ConnectionCancelled]);
        assert!(!session.connection_flow().is_pending());
        assert_eq!(session.annotations().len(), 1);
        assert!(session.connections().is_empty());
    }

    #[test]
    fn test_rejected_type_does_not_cancel_pending() {
        let mut session = ReaderSession::with_text(TEXT);
        session.select(12, 22).unwrap();
        session.apply_type(AnnotationType::Connection).unwrap();

        let err = session.apply_type(AnnotationType::Highlight).unwrap_err();
        assert_eq!(err, AnnotateError::EmptySelection);
        assert!(session.connection_flow().is_pending());
    }

    #[test]
    fn test_note_draft_flow() {
        let mut session = ReaderSession::with_text(TEXT);
        session.select(4, 7).unwrap();
        let outcome = session.apply_type(AnnotationType::Question).unwrap();
        assert_eq!(outcome.applied, Applied::DraftOpened);
        assert!(session.draft().is_open());
        // Drafts never leak into the store or the render.
        assert!(session.annotations().is_empty());
        assert!(session.segments().iter().all(|s| s.is_plain()));

        assert_eq!(
            session.save_draft().unwrap_err(),
            AnnotateError::EmptyNote {
                kind: AnnotationType::Question
            }
        );
        session.set_draft_note("Why a cat?").unwrap();
        let id = session.save_draft().unwrap();
        let ann = &session.annotations()[0];
        assert_eq!(ann.id, id);
        assert_eq!(ann.note.as_deref(), Some("Why a cat?"));
        assert!(!session.draft().is_open());
    }

    #[test]
    fn test_cancel_draft_discards() {
        let mut session = ReaderSession::with_text(TEXT);
        session.select(0, 3).unwrap();
        session.apply_type(AnnotationType::CustomNote).unwrap();
        session.set_draft_note("half written").unwrap();
        assert!(session.cancel_draft());
        assert!(session.annotations().is_empty());
        assert_eq!(session.save_draft().unwrap_err(), AnnotateError::NoDraft);
    }

    #[test]
    fn test_new_action_discards_open_draft() {
        let mut session = ReaderSession::with_text(TEXT);
        session.select(0, 3).unwrap();
        session.apply_type(AnnotationType::CustomNote).unwrap();
        session.select(4, 7).unwrap();
        let outcome = session.apply_type(AnnotationType::Evidence).unwrap();
        assert_eq!(outcome.notices, vec![Notice::DraftDiscarded]);
        assert!(!session.draft().is_open());
        assert_eq!(session.annotations().len(), 1);
    }

    #[test]
    fn test_connection_action_discards_open_draft() {
        let mut session = ReaderSession::with_text(TEXT);
        session.select(0, 3).unwrap();
        session.apply_type(AnnotationType::CustomNote).unwrap();
        session.select(4, 7).unwrap();
        let outcome = session.apply_type(AnnotationType::Connection).unwrap();
        assert_eq!(outcome.applied, Applied::ConnectionStarted);
        assert_eq!(outcome.notices, vec![Notice::DraftDiscarded]);
        assert!(!session.draft().is_open());

        // A rejected connection action keeps the draft.
        session.cancel_connection();
        session.select(0, 3).unwrap();
        session.apply_type(AnnotationType::CustomNote).unwrap();
        assert_eq!(
            session.apply_type(AnnotationType::Connection).unwrap_err(),
            AnnotateError::EmptySelection
        );
        assert!(session.draft().is_open());
    }

    #[test]
    fn test_ranges_from_other_text_are_rejected() {
        let mut session = ReaderSession::with_text(TEXT);
        let stale = TextRange::from_source("A dog ran off.", 2, 5).unwrap();
        assert_eq!(
            session.annotate(stale.clone(), AnnotationType::Highlight, None),
            Err(AnnotateError::TextMismatch { start: 2, end: 5 })
        );
        let cat = TextRange::from_source(TEXT, 4, 7).unwrap();
        assert_eq!(
            session.connect(cat, stale),
            Err(AnnotateError::TextMismatch { start: 2, end: 5 })
        );

        let past_end = TextRange::from_source("The cat sat on the mat. And more.", 24, 27).unwrap();
        assert!(matches!(
            session.annotate(past_end, AnnotationType::Highlight, None),
            Err(AnnotateError::OutOfBounds { .. })
        ));
        assert!(session.annotations().is_empty());
        assert!(session.connections().is_empty());
        assert_eq!(session.segments().len(), 1);
    }

    #[test]
    fn test_remove_unknown_ids() {
        let mut session = ReaderSession::with_text(TEXT);
        assert!(!session.remove_annotation("a-7"));
        assert!(!session.remove_connection("c-7"));
        assert!(!session.cancel_connection());
    }

    #[test]
    fn test_connection_outlives_overlapping_annotation() {
        let mut session = ReaderSession::with_text(TEXT);
        let cat = TextRange::from_source(TEXT, 4, 7).unwrap();
        let mat = TextRange::from_source(TEXT, 19, 22).unwrap();
        let id = session.annotate(cat.clone(), AnnotationType::KeyTerm, None).unwrap();
        session.connect(cat, mat).unwrap();

        assert!(session.remove_annotation(&id));
        assert_eq!(session.connections().len(), 1);
        let cat_segment = session
            .segments()
            .into_iter()
            .find(|s| s.text == "cat")
            .unwrap();
        assert_eq!(cat_segment.markers, vec![Marker::ConnectionFrom { id: "c-0".into() }]);
    }

    #[test]
    fn test_annotate_requires_note_for_note_types() {
        let mut session = ReaderSession::with_text(TEXT);
        let cat = TextRange::from_source(TEXT, 4, 7).unwrap();
        assert_eq!(
            session.annotate(cat.clone(), AnnotationType::Question, None),
            Err(AnnotateError::EmptyNote {
                kind: AnnotationType::Question
            })
        );
        assert!(
            session
                .annotate(cat, AnnotationType::Question, Some("why?".into()))
                .is_ok()
        );
    }

    #[test]
    fn test_capture_selection_from_container() {
        let mut session = ReaderSession::with_text(TEXT);
        let mut view = ContainerView::new(ContainerNode::element(
            "div",
            vec![ContainerNode::text(TEXT)],
        ));
        view.select_offsets(4, 7);
        assert_eq!(session.capture_selection(&view).unwrap().text(), "cat");

        view.clear_selection();
        assert!(session.capture_selection(&view).is_none());
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_request_preconditions() {
        let mut session = ReaderSession::new();
        assert_eq!(
            session.begin_request(RequestKind::AnnotationGuide),
            Err(AnnotateError::NoSourceText)
        );

        session.replace_text(TEXT);
        assert_eq!(
            session.begin_request(RequestKind::SummaryFeedback),
            Err(AnnotateError::NoSummary)
        );
        assert_eq!(
            session.begin_request(RequestKind::AnnotationFeedback),
            Err(AnnotateError::NoAnnotations)
        );
        assert!(session.begin_request(RequestKind::AnnotationGuide).is_ok());
        assert!(session.panel(RequestKind::AnnotationGuide).loading);
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut session = ReaderSession::with_text(TEXT);
        let ticket = session.begin_request(RequestKind::AnnotationGuide).unwrap();
        session.replace_text("New text.");
        assert!(!session.finish_request(ticket, Ok("old guide".into())));
        assert_eq!(session.panel(RequestKind::AnnotationGuide), &AiPanel::default());

        let ticket = session.begin_request(RequestKind::AnnotationGuide).unwrap();
        assert!(session.finish_request(ticket, Ok("new guide".into())));
        let panel = session.panel(RequestKind::AnnotationGuide);
        assert!(!panel.loading);
        assert_eq!(panel.content.as_deref(), Some("new guide"));
    }

    #[test]
    fn test_late_response_after_more_annotations_is_kept() {
        let mut session = ReaderSession::with_text(TEXT);
        session.select(4, 7).unwrap();
        session.apply_type(AnnotationType::KeyTerm).unwrap();
        let ticket = session.begin_request(RequestKind::AnnotationFeedback).unwrap();

        session.select(0, 3).unwrap();
        session.apply_type(AnnotationType::Highlight).unwrap();
        assert!(session.finish_request(ticket, Err("Failed to generate AI annotation feedback.".into())));
        let panel = session.panel(RequestKind::AnnotationFeedback);
        assert_eq!(panel.error.as_deref(), Some("Failed to generate AI annotation feedback."));
        assert_eq!(session.annotations().len(), 2);
    }

    #[test]
    fn test_feedback_payload_and_html() {
        let mut session = ReaderSession::with_text(TEXT);
        session.select(4, 7).unwrap();
        session.apply_type(AnnotationType::KeyTerm).unwrap();

        let payload = session.feedback_payload();
        assert_eq!(payload[0].text, "cat");
        assert_eq!(payload[0].kind, AnnotationType::KeyTerm);
        assert!(session.render_html().contains(">cat</mark>"));
    }
}
