#![forbid(unsafe_code)]

//! One-shot "entered the viewport" markers.

use tracing::debug;

use crate::surface::{EffectSurface, SurfaceError};

/// Tracks which observed elements have already been marked.
///
/// An element is marked the first time the host reports it intersecting and
/// is never unmarked; later reports for it are ignored.
#[derive(Debug, Clone)]
pub struct VisibilityTracker<N> {
    marker_class: String,
    pending: Vec<N>,
    marked: Vec<N>,
}

impl<N: Clone + PartialEq> VisibilityTracker<N> {
    pub fn new(marker_class: impl Into<String>, observed: Vec<N>) -> Self {
        Self {
            marker_class: marker_class.into(),
            pending: observed,
            marked: Vec::new(),
        }
    }

    /// Elements still waiting for their first intersection.
    pub fn pending(&self) -> &[N] {
        &self.pending
    }

    pub fn is_marked(&self, node: &N) -> bool {
        self.marked.contains(node)
    }

    /// Mark `node` if it is observed and not yet marked.
    ///
    /// Returns `Ok(true)` when the node was marked now; the host should stop
    /// observing it.
    pub fn mark<S>(&mut self, surface: &S, node: &N) -> Result<bool, SurfaceError>
    where
        S: EffectSurface<Node = N>,
    {
        let Some(pos) = self.pending.iter().position(|n| n == node) else {
            return Ok(false);
        };
        surface.add_class(node, &self.marker_class)?;
        let node = self.pending.remove(pos);
        self.marked.push(node);
        debug!(
            target: "glint::page",
            remaining = self.pending.len(),
            "element marked visible"
        );
        Ok(true)
    }
}
