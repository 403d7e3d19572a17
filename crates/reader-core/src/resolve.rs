//! Selection-to-offset resolution.
//!
//! Platforms describe a selection by stringifying two ranges against the
//! text-display container: container start up to the selection start
//! (`prefix`), and the selection itself (`selected`). Counting chars of those
//! strings gives the offsets. This only holds if the container's text content
//! is exactly the source text, so rendered decorations must not add text
//! nodes (see `html::render_segments_html`).

use crate::range::{TextRange, char_len};

/// Platform-neutral description of the current selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    /// Whether the selection lies inside the text-display container.
    pub within_container: bool,
    pub collapsed: bool,
    /// Container text strictly before the selection start.
    pub prefix: String,
    /// Text covered by the selection.
    pub selected: String,
}

impl SelectionSnapshot {
    pub fn new(prefix: impl Into<String>, selected: impl Into<String>) -> Self {
        let selected = selected.into();
        Self {
            within_container: true,
            collapsed: selected.is_empty(),
            prefix: prefix.into(),
            selected,
        }
    }

    /// A selection somewhere else on the page.
    pub fn outside() -> Self {
        Self::default()
    }
}

/// Reads the current selection from a UI.
///
/// The browser implementation uses the DOM Selection API; the in-memory
/// [`crate::container::ContainerView`] backs tests and non-browser front ends.
pub trait SelectionSource {
    /// Snapshot the current selection, or `None` if there is no selection at all.
    fn capture(&self) -> Option<SelectionSnapshot>;
}

impl<T: SelectionSource> SelectionSource for &T {
    fn capture(&self) -> Option<SelectionSnapshot> {
        (*self).capture()
    }
}

impl<T: SelectionSource> SelectionSource for Option<T> {
    fn capture(&self) -> Option<SelectionSnapshot> {
        self.as_ref().and_then(|s| s.capture())
    }
}

/// Resolve a snapshot to a range over `source`.
///
/// Returns `None` for collapsed, whitespace-only or out-of-container
/// selections, and for snapshots that disagree with `source` (a render that
/// is out of date with the current text).
pub fn resolve_selection(snapshot: &SelectionSnapshot, source: &str) -> Option<TextRange> {
    if !snapshot.within_container {
        tracing::debug!("resolve_selection: selection outside text container");
        return None;
    }
    if snapshot.collapsed || snapshot.selected.trim().is_empty() {
        return None;
    }

    let start = char_len(&snapshot.prefix);
    let end = start + char_len(&snapshot.selected);

    match TextRange::with_text(source, start, end, &snapshot.selected) {
        Ok(range) => Some(range),
        Err(err) => {
            tracing::debug!(start, end, %err, "resolve_selection: snapshot does not match source");
            None
        }
    }
}

/// Capture from `source_ui` and resolve in one step.
pub fn capture_range(source_ui: &impl SelectionSource, source: &str) -> Option<TextRange> {
    source_ui
        .capture()
        .and_then(|snapshot| resolve_selection(&snapshot, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "The cat sat on the mat.";

    #[test]
    fn test_resolve_simple() {
        let snap = SelectionSnapshot::new("The ", "cat");
        let range = resolve_selection(&snap, TEXT).unwrap();
        assert_eq!((range.start(), range.end(), range.text()), (4, 7, "cat"));
    }

    #[test]
    fn test_resolve_is_stable() {
        let snap = SelectionSnapshot::new("The cat sat ", "on the mat");
        let first = resolve_selection(&snap, TEXT);
        let second = resolve_selection(&snap, TEXT);
        assert_eq!(first, second);
        assert_eq!(first.unwrap().to_range(), 12..22);
    }

    #[test]
    fn test_rejects_collapsed_and_blank() {
        assert_eq!(resolve_selection(&SelectionSnapshot::new("The", ""), TEXT), None);
        assert_eq!(
            resolve_selection(&SelectionSnapshot::new("The", " "), TEXT),
            None
        );

        let mut collapsed = SelectionSnapshot::new("The ", "cat");
        collapsed.collapsed = true;
        assert_eq!(resolve_selection(&collapsed, TEXT), None);
    }

    #[test]
    fn test_rejects_outside_container() {
        let mut snap = SelectionSnapshot::new("The ", "cat");
        snap.within_container = false;
        assert_eq!(resolve_selection(&snap, TEXT), None);
        assert_eq!(resolve_selection(&SelectionSnapshot::outside(), TEXT), None);
    }

    #[test]
    fn test_rejects_stale_render() {
        // Container still shows old text.
        let snap = SelectionSnapshot::new("A ", "dog");
        assert_eq!(resolve_selection(&snap, TEXT), None);
        // Runs past the end.
        let snap = SelectionSnapshot::new(TEXT, "more");
        assert_eq!(resolve_selection(&snap, TEXT), None);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let text = "café au lait";
        let range = resolve_selection(&SelectionSnapshot::new("café ", "au"), text).unwrap();
        assert_eq!(range.to_range(), 5..7);
    }

    #[test]
    fn test_option_source() {
        struct Fixed(SelectionSnapshot);
        impl SelectionSource for Fixed {
            fn capture(&self) -> Option<SelectionSnapshot> {
                Some(self.0.clone())
            }
        }

        let some = Some(Fixed(SelectionSnapshot::new("The ", "cat")));
        assert_eq!(capture_range(&some, TEXT).unwrap().text(), "cat");
        let none: Option<Fixed> = None;
        assert_eq!(capture_range(&none, TEXT), None);
    }
}
