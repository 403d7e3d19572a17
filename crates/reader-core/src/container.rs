//! In-memory model of a text-display container.
//!
//! Mirrors the DOM shape the browser layer sees: element nodes wrapping text
//! nodes, with boundary points expressed as (node path, offset). Offsets in
//! text nodes count chars; offsets in element nodes count children, as in the
//! DOM. Used to exercise selection resolution over nested markup without a
//! browser.

use smol_str::SmolStr;

use crate::range::{char_len, char_slice};
use crate::resolve::{SelectionSnapshot, SelectionSource};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerNode {
    Text(String),
    Element {
        tag: SmolStr,
        children: Vec<ContainerNode>,
    },
}

/// A position inside a container: child indices from the root, then an offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryPoint {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(path: impl Into<Vec<usize>>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

/// Anchor/focus pair. The focus may precede the anchor (backwards selection).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerSelection {
    pub anchor: BoundaryPoint,
    pub focus: BoundaryPoint,
}

impl ContainerNode {
    pub fn text(s: impl Into<String>) -> Self {
        ContainerNode::Text(s.into())
    }

    pub fn element(tag: &str, children: Vec<ContainerNode>) -> Self {
        ContainerNode::Element {
            tag: SmolStr::new(tag),
            children,
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            ContainerNode::Text(t) => out.push_str(t),
            ContainerNode::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Text length in chars.
    pub fn char_len(&self) -> usize {
        match self {
            ContainerNode::Text(t) => char_len(t),
            ContainerNode::Element { children, .. } => children.iter().map(|c| c.char_len()).sum(),
        }
    }

    /// Flatten a boundary point to a char offset into `text_content()`.
    ///
    /// Returns `None` if the path does not exist under this node, which callers
    /// treat as a point outside the container.
    pub fn flat_offset(&self, point: &BoundaryPoint) -> Option<usize> {
        self.locate(&point.path, point.offset)
    }

    fn locate(&self, path: &[usize], offset: usize) -> Option<usize> {
        match (self, path.split_first()) {
            (ContainerNode::Text(t), None) => (offset <= char_len(t)).then_some(offset),
            (ContainerNode::Text(_), Some(_)) => None,
            (ContainerNode::Element { children, .. }, None) => {
                (offset <= children.len())
                    .then(|| children[..offset].iter().map(|c| c.char_len()).sum())
            }
            (ContainerNode::Element { children, .. }, Some((&idx, rest))) => {
                let child = children.get(idx)?;
                let before: usize = children[..idx].iter().map(|c| c.char_len()).sum();
                Some(before + child.locate(rest, offset)?)
            }
        }
    }

    /// A boundary point inside a text node for the given flat offset.
    ///
    /// At a boundary between two text nodes the earlier node's end is chosen.
    pub fn point_at(&self, flat: usize) -> Option<BoundaryPoint> {
        let mut path = Vec::new();
        match self.find_point(flat, &mut path) {
            Some(offset) => Some(BoundaryPoint { path, offset }),
            None if flat == 0 => Some(BoundaryPoint::new(Vec::new(), 0)),
            None => None,
        }
    }

    fn find_point(&self, flat: usize, path: &mut Vec<usize>) -> Option<usize> {
        match self {
            ContainerNode::Text(t) => (flat <= char_len(t)).then_some(flat),
            ContainerNode::Element { children, .. } => {
                let mut acc = 0;
                for (idx, child) in children.iter().enumerate() {
                    let len = child.char_len();
                    if flat <= acc + len {
                        path.push(idx);
                        if let Some(offset) = child.find_point(flat - acc, path) {
                            return Some(offset);
                        }
                        path.pop();
                    }
                    acc += len;
                }
                None
            }
        }
    }

    /// Stringify a selection against this container the way a DOM `Range`
    /// would.
    pub fn snapshot(&self, selection: &ContainerSelection) -> SelectionSnapshot {
        let (Some(anchor), Some(focus)) = (
            self.flat_offset(&selection.anchor),
            self.flat_offset(&selection.focus),
        ) else {
            return SelectionSnapshot::outside();
        };

        let (start, end) = (anchor.min(focus), anchor.max(focus));
        let content = self.text_content();
        let prefix = char_slice(&content, 0..start).unwrap_or_default();
        let selected = char_slice(&content, start..end).unwrap_or_default();

        SelectionSnapshot {
            within_container: true,
            collapsed: start == end,
            prefix: prefix.to_string(),
            selected: selected.to_string(),
        }
    }
}

/// A container plus the current selection within it.
#[derive(Clone, Debug)]
pub struct ContainerView {
    pub root: ContainerNode,
    pub selection: Option<ContainerSelection>,
}

impl ContainerView {
    pub fn new(root: ContainerNode) -> Self {
        Self {
            root,
            selection: None,
        }
    }

    pub fn select(&mut self, anchor: BoundaryPoint, focus: BoundaryPoint) {
        self.selection = Some(ContainerSelection { anchor, focus });
    }

    /// Select flat offsets `[start, end)` via text-node boundary points.
    pub fn select_offsets(&mut self, start: usize, end: usize) -> bool {
        match (self.root.point_at(start), self.root.point_at(end)) {
            (Some(anchor), Some(focus)) => {
                self.select(anchor, focus);
                true
            }
            _ => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }
}

impl SelectionSource for ContainerView {
    fn capture(&self) -> Option<SelectionSnapshot> {
        self.selection
            .as_ref()
            .map(|selection| self.root.snapshot(selection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::TextRange;
    use crate::resolve::{capture_range, resolve_selection};

    const TEXT: &str = "The cat sat on the mat.";

    /// `The <mark>cat</mark> sat <mark>on <b>the</b> mat</mark>.`
    fn nested() -> ContainerNode {
        ContainerNode::element(
            "div",
            vec![
                ContainerNode::text("The "),
                ContainerNode::element("mark", vec![ContainerNode::text("cat")]),
                ContainerNode::text(" sat "),
                ContainerNode::element(
                    "mark",
                    vec![
                        ContainerNode::text("on "),
                        ContainerNode::element("b", vec![ContainerNode::text("the")]),
                        ContainerNode::text(" mat"),
                    ],
                ),
                ContainerNode::text("."),
            ],
        )
    }

    #[test]
    fn test_text_content_matches_source() {
        assert_eq!(nested().text_content(), TEXT);
        assert_eq!(nested().char_len(), 23);
    }

    #[test]
    fn test_flat_offset_through_nesting() {
        let root = nested();
        assert_eq!(root.flat_offset(&BoundaryPoint::new([1, 0], 0)), Some(4));
        assert_eq!(root.flat_offset(&BoundaryPoint::new([3, 1, 0], 2)), Some(17));
        // Element offsets count children.
        assert_eq!(root.flat_offset(&BoundaryPoint::new([], 2)), Some(7));
        assert_eq!(root.flat_offset(&BoundaryPoint::new([9], 0)), None);
        assert_eq!(root.flat_offset(&BoundaryPoint::new([0], 99)), None);
    }

    #[test]
    fn test_selection_across_markup() {
        let mut view = ContainerView::new(nested());
        // From inside "cat" to inside the bold "the".
        view.select(BoundaryPoint::new([1, 0], 1), BoundaryPoint::new([3, 1, 0], 2));
        let range = capture_range(&view, TEXT).unwrap();
        assert_eq!(range.to_range(), 5..17);
        assert_eq!(range.text(), "at sat on th");
    }

    #[test]
    fn test_backwards_selection() {
        let mut view = ContainerView::new(nested());
        view.select(BoundaryPoint::new([3, 2, 0], 4), BoundaryPoint::new([3, 0, 0], 0));
        let range = capture_range(&view, TEXT).unwrap();
        assert_eq!(range.to_range(), 12..22);
        assert_eq!(range.text(), "on the mat");
    }

    #[test]
    fn test_stray_selection_is_rejected() {
        let mut view = ContainerView::new(nested());
        view.select(BoundaryPoint::new([7, 0], 0), BoundaryPoint::new([0], 2));
        assert_eq!(view.capture(), Some(SelectionSnapshot::outside()));
        assert_eq!(capture_range(&view, TEXT), None);

        view.clear_selection();
        assert_eq!(capture_range(&view, TEXT), None);
    }

    #[test]
    fn test_collapsed_selection_is_rejected() {
        let mut view = ContainerView::new(nested());
        view.select(BoundaryPoint::new([2], 1), BoundaryPoint::new([2], 1));
        let snap = view.capture().unwrap();
        assert!(snap.collapsed);
        assert_eq!(resolve_selection(&snap, TEXT), None);
    }

    #[test]
    fn test_every_range_round_trips() {
        let root = nested();
        let len = root.char_len();
        for start in 0..len {
            for end in start + 1..=len {
                let expected = TextRange::from_source(TEXT, start, end).unwrap();
                let mut view = ContainerView::new(root.clone());
                assert!(view.select_offsets(start, end));
                match capture_range(&view, TEXT) {
                    Some(range) => assert_eq!(range, expected),
                    None => assert!(expected.is_blank(), "{start}..{end} rejected"),
                }
            }
        }
    }
}
