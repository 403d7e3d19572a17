//! Ordered store of annotation spans.

use smol_str::{SmolStr, format_smolstr};

use crate::annotation::{Annotation, AnnotationType};
use crate::error::AnnotateError;
use crate::range::TextRange;

/// Annotations over one source text, kept sorted by start offset.
///
/// Ties keep insertion order. Partially overlapping spans are accepted; the
/// segment partitioner layers them.
#[derive(Clone, Debug, Default)]
pub struct SpanStore {
    spans: Vec<Annotation>,
    next_id: usize,
}

impl SpanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new annotation and return it.
    pub fn insert(
        &mut self,
        range: TextRange,
        kind: AnnotationType,
        note: Option<String>,
    ) -> Result<&Annotation, AnnotateError> {
        if range.is_blank() {
            return Err(AnnotateError::EmptySelection);
        }

        let id = self.fresh_id();
        // Insert after every span with start <= ours so ties stay in insertion order.
        let pos = self
            .spans
            .partition_point(|a| a.range.start() <= range.start());
        tracing::debug!(%id, %kind, start = range.start(), end = range.end(), "annotation added");
        self.spans.insert(
            pos,
            Annotation {
                id,
                range,
                kind,
                note,
            },
        );
        Ok(&self.spans[pos])
    }

    /// Remove by id. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> Option<Annotation> {
        let pos = self.spans.iter().position(|a| a.id == id)?;
        Some(self.spans.remove(pos))
    }

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.spans.iter().find(|a| a.id == id)
    }

    /// All annotations, ordered by start.
    pub fn list(&self) -> &[Annotation] {
        &self.spans
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.spans.iter()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Drop every annotation. Ids are not reused afterwards.
    pub fn clear(&mut self) {
        self.spans.clear();
    }

    fn fresh_id(&mut self) -> SmolStr {
        let id = format_smolstr!("a-{}", self.next_id);
        self.next_id += 1;
        id
    }
}

impl<'a> IntoIterator for &'a SpanStore {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}
