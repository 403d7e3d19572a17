//! Browser implementation of selection capture.
//!
//! The current DOM selection is stringified against the text-display
//! container and handed to the core resolver as a [`SelectionSnapshot`].

use reader_core::{DISPLAY_AREA_ATTR, ReaderSession, SelectionSnapshot, SelectionSource};
use web_sys::{Document, Element};

/// Selection source bound to one text-display container.
pub struct BrowserSelection {
    container_id: String,
}

impl BrowserSelection {
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Look up the text-display element: by id first, then by marker attribute
    /// on or under the id'd element.
    fn display_area(&self, document: &Document) -> Option<Element> {
        let element = document.get_element_by_id(&self.container_id)?;
        if element.has_attribute(DISPLAY_AREA_ATTR) {
            return Some(element);
        }
        let selector = format!("[{DISPLAY_AREA_ATTR}]");
        element.query_selector(&selector).ok().flatten()
    }
}

impl SelectionSource for BrowserSelection {
    fn capture(&self) -> Option<SelectionSnapshot> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let container = self.display_area(&document)?;

        let selection = window.get_selection().ok()??;
        if selection.range_count() == 0 {
            return None;
        }
        let range = selection.get_range_at(0).ok()?;

        let common = range.common_ancestor_container().ok()?;
        if !container.contains(Some(&common)) {
            tracing::trace!(
                common_ancestor = %common.node_name(),
                "selection outside text display area"
            );
            return Some(SelectionSnapshot::outside());
        }

        let selected = String::from(range.to_string());

        // Container start up to the selection start.
        let prefix_range = document.create_range().ok()?;
        prefix_range.select_node_contents(&container).ok()?;
        let start_container = range.start_container().ok()?;
        let start_offset = range.start_offset().ok()?;
        if let Err(e) = prefix_range.set_end(&start_container, start_offset) {
            tracing::warn!(error = ?e, "could not measure selection prefix");
            return None;
        }
        let prefix = String::from(prefix_range.to_string());

        Some(SelectionSnapshot {
            within_container: true,
            collapsed: range.collapsed(),
            prefix,
            selected,
        })
    }
}

/// Replace the contents of element `container_id` with the session's render.
pub fn render_into(container_id: &str, session: &ReaderSession) -> bool {
    let Some(element) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(container_id))
    else {
        tracing::warn!(container_id, "render target not found");
        return false;
    };
    element.set_inner_html(&session.render_html());
    true
}
