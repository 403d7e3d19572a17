//! HTML output for a segment partition.
//!
//! Annotated segments become `<mark>` elements. Badges and connection roles
//! are carried in attributes only: the container's text content must stay
//! identical to the source text or selection offsets drift (see
//! [`crate::resolve`]). Stylesheets render the badge with
//! `mark[data-badge]::after { content: attr(data-badge) }`.

use std::fmt::Write;

use crate::annotation::Annotation;
use crate::segment::{Marker, Segment};

/// Attribute on the text-display container that selection capture looks for.
pub const DISPLAY_AREA_ATTR: &str = "data-text-display-area";

pub struct HtmlSegmentWriter<'a, W: Write> {
    writer: W,
    spans: &'a [Annotation],
}

impl<'a, W: Write> HtmlSegmentWriter<'a, W> {
    pub fn new(writer: W, spans: &'a [Annotation]) -> Self {
        Self { writer, spans }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn write_segments(&mut self, segments: &[Segment]) -> std::fmt::Result {
        for segment in segments {
            self.write_segment(segment)?;
        }
        Ok(())
    }

    pub fn write_segment(&mut self, segment: &Segment) -> std::fmt::Result {
        if segment.is_plain() {
            return escape_text(&mut self.writer, &segment.text);
        }

        let primary = segment
            .primary
            .as_deref()
            .and_then(|id| self.spans.iter().find(|a| a.id == id));

        let mut classes: Vec<&str> = Vec::new();
        if let Some(ann) = primary {
            classes.push(ann.meta().style_class);
        }
        if segment.kinds().count() > 1 {
            classes.push("ann-layered");
        }
        let mut from_ids = Vec::new();
        let mut to_ids = Vec::new();
        for marker in &segment.markers {
            match marker {
                Marker::ConnectionFrom { id } => from_ids.push(id.as_str()),
                Marker::ConnectionTo { id } => to_ids.push(id.as_str()),
                Marker::PendingStart => classes.push("ann-pending"),
                Marker::Annotation { .. } => {}
            }
        }
        if !from_ids.is_empty() || !to_ids.is_empty() {
            classes.push("ann-connection-endpoint");
        }

        write!(self.writer, "<mark class=\"{}\"", classes.join(" "))?;
        let ids: Vec<&str> = segment
            .markers
            .iter()
            .filter_map(Marker::annotation_id)
            .collect();
        if !ids.is_empty() {
            write!(self.writer, " data-annotations=\"{}\"", ids.join(" "))?;
        }
        if !from_ids.is_empty() {
            write!(self.writer, " data-connection-from=\"{}\"", from_ids.join(" "))?;
        }
        if !to_ids.is_empty() {
            write!(self.writer, " data-connection-to=\"{}\"", to_ids.join(" "))?;
        }
        // Badge goes on the last segment of the primary span.
        if let Some(ann) = primary.filter(|a| a.range.end() == segment.range.end) {
            let meta = ann.meta();
            write!(
                self.writer,
                " data-badge=\"{}\" title=\"{}\"",
                meta.abbreviation, meta.label
            )?;
        }
        self.writer.write_char('>')?;
        escape_text(&mut self.writer, &segment.text)?;
        self.writer.write_str("</mark>")
    }
}

fn escape_text<W: Write>(writer: &mut W, text: &str) -> std::fmt::Result {
    for c in text.chars() {
        match c {
            '&' => writer.write_str("&amp;")?,
            '<' => writer.write_str("&lt;")?,
            '>' => writer.write_str("&gt;")?,
            '"' => writer.write_str("&quot;")?,
            _ => writer.write_char(c)?,
        }
    }
    Ok(())
}

/// Render segments into a `<div data-text-display-area>` container.
pub fn render_segments_html(segments: &[Segment], spans: &[Annotation]) -> String {
    let mut out = String::new();
    out.push_str("<div ");
    out.push_str(DISPLAY_AREA_ATTR);
    out.push('>');
    let mut writer = HtmlSegmentWriter::new(out, spans);
    // Writing into a String cannot fail.
    let _ = writer.write_segments(segments);
    let mut out = writer.into_inner();
    out.push_str("</div>");
    out
}
