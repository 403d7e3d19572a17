//! Annotation types, their static display metadata, and the annotation record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::range::TextRange;

/// Semantic type of an annotation. Closed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationType {
    Highlight,
    MainIdea,
    KeyTerm,
    Evidence,
    Question,
    Connection,
    CustomNote,
}

/// Static configuration for one annotation type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnnotationMeta {
    pub label: &'static str,
    /// Short badge text shown after the annotated span.
    pub abbreviation: &'static str,
    /// CSS class applied to rendered spans of this type.
    pub style_class: &'static str,
    pub requires_note: bool,
}

impl AnnotationType {
    pub const ALL: [AnnotationType; 7] = [
        AnnotationType::Highlight,
        AnnotationType::MainIdea,
        AnnotationType::KeyTerm,
        AnnotationType::Evidence,
        AnnotationType::Question,
        AnnotationType::Connection,
        AnnotationType::CustomNote,
    ];

    pub fn meta(self) -> &'static AnnotationMeta {
        match self {
            AnnotationType::Highlight => &AnnotationMeta {
                label: "Highlight",
                abbreviation: "HL",
                style_class: "ann-highlight",
                requires_note: false,
            },
            AnnotationType::MainIdea => &AnnotationMeta {
                label: "Main Idea",
                abbreviation: "MI",
                style_class: "ann-main-idea",
                requires_note: false,
            },
            AnnotationType::KeyTerm => &AnnotationMeta {
                label: "Key Term",
                abbreviation: "KT",
                style_class: "ann-key-term",
                requires_note: false,
            },
            AnnotationType::Evidence => &AnnotationMeta {
                label: "Evidence",
                abbreviation: "EV",
                style_class: "ann-evidence",
                requires_note: false,
            },
            AnnotationType::Question => &AnnotationMeta {
                label: "Question",
                abbreviation: "Q",
                style_class: "ann-question",
                requires_note: true,
            },
            AnnotationType::Connection => &AnnotationMeta {
                label: "Connection",
                abbreviation: "CON",
                style_class: "ann-connection",
                requires_note: true,
            },
            AnnotationType::CustomNote => &AnnotationMeta {
                label: "Note",
                abbreviation: "N",
                style_class: "ann-custom-note",
                requires_note: true,
            },
        }
    }

    /// Wire name, e.g. `main-idea`.
    pub fn as_str(self) -> &'static str {
        match self {
            AnnotationType::Highlight => "highlight",
            AnnotationType::MainIdea => "main-idea",
            AnnotationType::KeyTerm => "key-term",
            AnnotationType::Evidence => "evidence",
            AnnotationType::Question => "question",
            AnnotationType::Connection => "connection",
            AnnotationType::CustomNote => "custom-note",
        }
    }

    /// Whether applying this type opens a note draft rather than inserting
    /// directly. `connection` is routed to the connection workflow instead.
    pub fn drafts_note(self) -> bool {
        self != AnnotationType::Connection && self.meta().requires_note
    }
}

impl fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown annotation type `{0}`")]
pub struct UnknownAnnotationType(pub String);

impl FromStr for AnnotationType {
    type Err = UnknownAnnotationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnnotationType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownAnnotationType(s.to_string()))
    }
}

/// A committed annotation span. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: SmolStr,
    pub range: TextRange,
    pub kind: AnnotationType,
    pub note: Option<String>,
}

impl Annotation {
    pub fn meta(&self) -> &'static AnnotationMeta {
        self.kind.meta()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_every_type() {
        for kind in AnnotationType::ALL {
            assert_eq!(kind.as_str().parse::<AnnotationType>(), Ok(kind));
        }
        assert_eq!(
            "margin".parse::<AnnotationType>(),
            Err(UnknownAnnotationType("margin".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&AnnotationType::MainIdea).unwrap();
        assert_eq!(json, "\"main-idea\"");
        let back: AnnotationType = serde_json::from_str("\"custom-note\"").unwrap();
        assert_eq!(back, AnnotationType::CustomNote);
    }

    #[test]
    fn test_note_requirements() {
        assert!(!AnnotationType::Highlight.drafts_note());
        assert!(!AnnotationType::KeyTerm.drafts_note());
        assert!(AnnotationType::Question.drafts_note());
        assert!(AnnotationType::CustomNote.drafts_note());
        // Routed to the connection workflow, not a note draft.
        assert!(AnnotationType::Connection.meta().requires_note);
        assert!(!AnnotationType::Connection.drafts_note());
    }

    #[test]
    fn test_meta_labels() {
        assert_eq!(AnnotationType::Evidence.meta().abbreviation, "EV");
        assert_eq!(AnnotationType::CustomNote.meta().label, "Note");
        assert_eq!(AnnotationType::KeyTerm.meta().style_class, "ann-key-term");
    }
}
