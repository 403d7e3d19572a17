//! Connections between two passages and the two-step workflow that creates them.
//!
//! Connections copy their endpoint ranges; they do not reference annotations
//! and survive deletion of any annotation that happens to overlap them.

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};

use crate::error::AnnotateError;
use crate::range::TextRange;

/// A directed link from one passage to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: SmolStr,
    pub from: TextRange,
    pub to: TextRange,
}

#[derive(Clone, Debug, Default)]
pub struct ConnectionStore {
    connections: Vec<Connection>,
    next_id: usize,
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a connection. Rejects endpoints with identical bounds.
    pub fn push(&mut self, from: TextRange, to: TextRange) -> Result<&Connection, AnnotateError> {
        if from.same_bounds(&to) {
            return Err(AnnotateError::SelfConnection);
        }
        let id = format_smolstr!("c-{}", self.next_id);
        self.next_id += 1;
        tracing::debug!(
            %id,
            from = ?from.to_range(),
            to = ?to.to_range(),
            "connection added"
        );
        self.connections.push(Connection { id, from, to });
        Ok(&self.connections[self.connections.len() - 1])
    }

    /// Remove by id. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> Option<Connection> {
        let pos = self.connections.iter().position(|c| c.id == id)?;
        Some(self.connections.remove(pos))
    }

    pub fn get(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Connections in creation order.
    pub fn list(&self) -> &[Connection] {
        &self.connections
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Connection> {
        self.connections.iter()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn clear(&mut self) {
        self.connections.clear();
    }
}

/// State of the connection workflow.
///
/// `Idle --start--> Pending --complete--> Idle` (connection stored), or
/// `Pending --cancel--> Idle` (nothing stored). Rejected transitions leave
/// the state as it was.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionFlow {
    #[default]
    Idle,
    Pending { start: TextRange },
}

impl ConnectionFlow {
    pub fn is_pending(&self) -> bool {
        matches!(self, ConnectionFlow::Pending { .. })
    }

    /// The captured first endpoint, if any.
    pub fn pending_start(&self) -> Option<&TextRange> {
        match self {
            ConnectionFlow::Pending { start } => Some(start),
            ConnectionFlow::Idle => None,
        }
    }

    /// Capture the first endpoint.
    ///
    /// Starting again while pending re-anchors on the new range.
    pub fn start(&mut self, range: Option<TextRange>) -> Result<(), AnnotateError> {
        let range = match range {
            Some(range) if !range.is_blank() => range,
            _ => {
                tracing::debug!("connection start rejected: empty selection");
                return Err(AnnotateError::EmptySelection);
            }
        };
        if let ConnectionFlow::Pending { start } = self {
            tracing::debug!(
                previous = ?start.to_range(),
                next = ?range.to_range(),
                "connection start re-anchored"
            );
        }
        *self = ConnectionFlow::Pending { start: range };
        Ok(())
    }

    /// Capture the second endpoint and store the connection.
    ///
    /// On rejection the flow stays pending so the user can pick again.
    pub fn complete<'s>(
        &mut self,
        range: Option<TextRange>,
        store: &'s mut ConnectionStore,
    ) -> Result<&'s Connection, AnnotateError> {
        let ConnectionFlow::Pending { start } = self else {
            return Err(AnnotateError::NoPendingConnection);
        };
        let to = match range {
            Some(range) if !range.is_blank() => range,
            _ => {
                tracing::debug!("connection completion rejected: empty selection");
                return Err(AnnotateError::EmptySelection);
            }
        };
        if start.same_bounds(&to) {
            tracing::debug!(range = ?to.to_range(), "connection completion rejected: self connection");
            return Err(AnnotateError::SelfConnection);
        }

        let from = start.clone();
        *self = ConnectionFlow::Idle;
        store.push(from, to)
    }

    /// Abandon a pending connection. Returns the discarded start, if any.
    pub fn cancel(&mut self) -> Option<TextRange> {
        match std::mem::take(self) {
            ConnectionFlow::Pending { start } => {
                tracing::debug!(start = ?start.to_range(), "connection cancelled");
                Some(start)
            }
            ConnectionFlow::Idle => None,
        }
    }
}
