//! Partition of the source text into render segments.
//!
//! Every annotation, connection endpoint and the pending connection start
//! contributes its bounds as cut points. Consecutive cut points delimit one
//! segment, tagged with every range that fully covers it. The result tiles
//! `[0, len)` with no gaps or overlaps, so nested and partially overlapping
//! annotations layer instead of clobbering each other.

use std::ops::Range;

use serde::Serialize;
use smol_str::SmolStr;

use crate::annotation::{Annotation, AnnotationType};
use crate::connection::Connection;
use crate::range::{TextRange, char_len};

/// What covers a segment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "kebab-case")]
pub enum Marker {
    Annotation { id: SmolStr, kind: AnnotationType },
    ConnectionFrom { id: SmolStr },
    ConnectionTo { id: SmolStr },
    /// First endpoint of the connection being created.
    PendingStart,
}

impl Marker {
    pub fn annotation_id(&self) -> Option<&str> {
        match self {
            Marker::Annotation { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// A maximal run of text with a constant marker set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub range: Range<usize>,
    pub text: SmolStr,
    pub markers: Vec<Marker>,
    /// Annotation that owns the badge for this segment: the longest covering
    /// span, earlier store order on ties.
    pub primary: Option<SmolStr>,
}

impl Segment {
    pub fn is_plain(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        self.markers.contains(&Marker::PendingStart)
    }

    pub fn kinds(&self) -> impl Iterator<Item = AnnotationType> + '_ {
        self.markers.iter().filter_map(|m| match m {
            Marker::Annotation { kind, .. } => Some(*kind),
            _ => None,
        })
    }
}

/// Partition `source` by the given spans, connections and pending start.
///
/// `spans` should be in store order (sorted by start); marker order follows
/// it. Ranges past the end of `source` are clamped.
pub fn partition(
    source: &str,
    spans: &[Annotation],
    connections: &[Connection],
    pending: Option<&TextRange>,
) -> Vec<Segment> {
    let len = char_len(source);
    if len == 0 {
        return Vec::new();
    }

    let mut bounds = Vec::with_capacity(2 + spans.len() * 2 + connections.len() * 4 + 2);
    bounds.push(0);
    bounds.push(len);
    for ann in spans {
        bounds.extend([ann.range.start(), ann.range.end()]);
    }
    for conn in connections {
        bounds.extend([
            conn.from.start(),
            conn.from.end(),
            conn.to.start(),
            conn.to.end(),
        ]);
    }
    if let Some(start) = pending {
        bounds.extend([start.start(), start.end()]);
    }
    for b in bounds.iter_mut() {
        *b = (*b).min(len);
    }
    bounds.sort_unstable();
    bounds.dedup();

    // Char offset -> byte offset for each boundary, in one pass.
    let byte_bounds = byte_offsets(source, &bounds);

    let mut segments = Vec::with_capacity(bounds.len().saturating_sub(1));
    for (i, pair) in bounds.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        if a == b {
            continue;
        }

        let mut markers = Vec::new();
        let mut primary: Option<&Annotation> = None;
        for ann in spans {
            if ann.range.covers(a, b) {
                markers.push(Marker::Annotation {
                    id: ann.id.clone(),
                    kind: ann.kind,
                });
                if primary.is_none_or(|p| ann.range.len() > p.range.len()) {
                    primary = Some(ann);
                }
            }
        }
        for conn in connections {
            if conn.from.covers(a, b) {
                markers.push(Marker::ConnectionFrom {
                    id: conn.id.clone(),
                });
            }
            if conn.to.covers(a, b) {
                markers.push(Marker::ConnectionTo {
                    id: conn.id.clone(),
                });
            }
        }
        if pending.is_some_and(|p| p.covers(a, b)) {
            markers.push(Marker::PendingStart);
        }

        segments.push(Segment {
            range: a..b,
            text: SmolStr::new(&source[byte_bounds[i]..byte_bounds[i + 1]]),
            markers,
            primary: primary.map(|p| p.id.clone()),
        });
    }

    tracing::trace!(
        segments = segments.len(),
        boundaries = bounds.len(),
        "partitioned source text"
    );
    segments
}

/// Byte offsets for sorted char offsets (each `<= char_len(source)`).
fn byte_offsets(source: &str, sorted_chars: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(sorted_chars.len());
    let mut wanted = sorted_chars.iter().peekable();
    for (char_idx, (byte_idx, _)) in source.char_indices().enumerate() {
        while wanted.next_if(|&&c| c == char_idx).is_some() {
            out.push(byte_idx);
        }
        if wanted.peek().is_none() {
            return out;
        }
    }
    out.extend(wanted.map(|_| source.len()));
    out
}
