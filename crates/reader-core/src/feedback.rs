//! Projection of annotations into the payload sent to the feedback service.

use serde::{Deserialize, Serialize};

use crate::annotation::{Annotation, AnnotationType};

/// One annotation as the feedback service sees it: no ids, no offsets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackAnnotation {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: AnnotationType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

impl From<&Annotation> for FeedbackAnnotation {
    fn from(ann: &Annotation) -> Self {
        Self {
            text: ann.range.text().to_string(),
            kind: ann.kind,
            note: ann.note.clone(),
        }
    }
}

/// Project annotations in the order given.
pub fn to_feedback_payload<'a>(
    spans: impl IntoIterator<Item = &'a Annotation>,
) -> Vec<FeedbackAnnotation> {
    spans.into_iter().map(FeedbackAnnotation::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::TextRange;
    use crate::spans::SpanStore;

    #[test]
    fn test_payload_preserves_order_and_drops_offsets() {
        let text = "The cat sat on the mat.";
        let mut store = SpanStore::new();
        store
            .insert(
                TextRange::from_source(text, 12, 22).unwrap(),
                AnnotationType::Question,
                Some("Which mat?".into()),
            )
            .unwrap();
        store
            .insert(
                TextRange::from_source(text, 4, 7).unwrap(),
                AnnotationType::KeyTerm,
                None,
            )
            .unwrap();

        let payload = to_feedback_payload(&store);
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[0].text, "cat");
        assert_eq!(payload[1].note.as_deref(), Some("Which mat?"));

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"text": "cat", "type": "key-term"},
                {"text": "on the mat", "type": "question", "note": "Which mat?"}
            ])
        );
    }

    #[test]
    fn test_empty_store() {
        let store = SpanStore::new();
        assert!(to_feedback_payload(&store).is_empty());
    }
}
