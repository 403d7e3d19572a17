//! Two-phase creation for annotation types that need a note.
//!
//! The draft lives outside the span store and is only promoted on save, so a
//! half-written annotation never shows up in listings or segments.

use crate::annotation::AnnotationType;
use crate::error::AnnotateError;
use crate::range::TextRange;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NoteDraft {
    #[default]
    NotEditing,
    DraftingNote {
        range: TextRange,
        kind: AnnotationType,
        note: String,
    },
}

impl NoteDraft {
    pub fn open(range: TextRange, kind: AnnotationType) -> Self {
        NoteDraft::DraftingNote {
            range,
            kind,
            note: String::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, NoteDraft::DraftingNote { .. })
    }

    pub fn range(&self) -> Option<&TextRange> {
        match self {
            NoteDraft::DraftingNote { range, .. } => Some(range),
            NoteDraft::NotEditing => None,
        }
    }

    /// Replace the note text. Fails if no draft is open.
    pub fn set_note(&mut self, text: impl Into<String>) -> Result<(), AnnotateError> {
        match self {
            NoteDraft::DraftingNote { note, .. } => {
                *note = text.into();
                Ok(())
            }
            NoteDraft::NotEditing => Err(AnnotateError::NoDraft),
        }
    }

    /// Close the draft and hand back its parts, if the note is acceptable.
    ///
    /// A whitespace-only note on a note-requiring type is rejected and the
    /// draft stays open. A blank note on any other type is dropped.
    pub fn take(&mut self) -> Result<(TextRange, AnnotationType, Option<String>), AnnotateError> {
        let NoteDraft::DraftingNote { kind, note, .. } = self else {
            return Err(AnnotateError::NoDraft);
        };
        let blank = note.trim().is_empty();
        if blank && kind.meta().requires_note {
            return Err(AnnotateError::EmptyNote { kind: *kind });
        }

        match std::mem::take(self) {
            NoteDraft::DraftingNote { range, kind, note } => {
                Ok((range, kind, (!blank).then_some(note)))
            }
            NoteDraft::NotEditing => Err(AnnotateError::NoDraft),
        }
    }

    /// Discard the draft. Returns whether one was open.
    pub fn cancel(&mut self) -> bool {
        let was_open = self.is_open();
        *self = NoteDraft::NotEditing;
        was_open
    }
}
