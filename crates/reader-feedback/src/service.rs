use std::future::Future;

use reader_core::{
    AnnotateError, FeedbackAnnotation, ReaderSession, RequestKind, RequestTicket,
};

use crate::error::FeedbackError;

/// The three feedback operations behind the reading UI.
pub trait FeedbackService {
    /// Suggestions for what to annotate in `source`.
    fn annotation_guide(
        &self,
        source: &str,
    ) -> impl Future<Output = Result<String, FeedbackError>> + Send;

    fn summary_feedback(
        &self,
        source: &str,
        summary: &str,
    ) -> impl Future<Output = Result<String, FeedbackError>> + Send;

    fn annotation_feedback(
        &self,
        source: &str,
        annotations: &[FeedbackAnnotation],
    ) -> impl Future<Output = Result<String, FeedbackError>> + Send;
}

/// Inputs for one request, copied out of the session so the session is not
/// borrowed while the request is in flight.
#[derive(Clone, Debug)]
pub struct PendingRequest {
    ticket: RequestTicket,
    source: String,
    summary: String,
    annotations: Vec<FeedbackAnnotation>,
}

impl PendingRequest {
    /// Check preconditions and mark the panel for `kind` as loading.
    pub fn begin(session: &mut ReaderSession, kind: RequestKind) -> Result<Self, AnnotateError> {
        let ticket = session.begin_request(kind)?;
        Ok(Self {
            ticket,
            source: session.source().to_string(),
            summary: match kind {
                RequestKind::SummaryFeedback => session.summary().to_string(),
                _ => String::new(),
            },
            annotations: match kind {
                RequestKind::AnnotationFeedback => session.feedback_payload(),
                _ => Vec::new(),
            },
        })
    }

    pub fn ticket(&self) -> RequestTicket {
        self.ticket
    }

    /// Run the request. Failures are logged and replaced by the generic
    /// user-facing message, ready for [`ReaderSession::finish_request`].
    pub async fn send(
        self,
        service: &impl FeedbackService,
    ) -> (RequestTicket, Result<String, String>) {
        let kind = self.ticket.kind();
        let result = match kind {
            RequestKind::AnnotationGuide => service.annotation_guide(&self.source).await,
            RequestKind::SummaryFeedback => {
                service.summary_feedback(&self.source, &self.summary).await
            }
            RequestKind::AnnotationFeedback => {
                service
                    .annotation_feedback(&self.source, &self.annotations)
                    .await
            }
        };
        let result = result.map_err(|err| {
            tracing::error!(?kind, error = %err, "feedback request failed");
            FeedbackError::user_message(kind).to_string()
        });
        (self.ticket, result)
    }
}

/// Begin, send and finish a request against `session` in one go.
///
/// Returns whether the response was accepted by the session.
pub async fn run_request(
    session: &mut ReaderSession,
    service: &impl FeedbackService,
    kind: RequestKind,
) -> Result<bool, AnnotateError> {
    let request = PendingRequest::begin(session, kind)?;
    let (ticket, result) = request.send(service).await;
    Ok(session.finish_request(ticket, result))
}
