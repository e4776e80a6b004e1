use crate::artifact::{ComposedArtifact, revoke_all};
use crate::types::Direction;

/// Preview artifacts of the current selection plus the one being shown.
///
/// The active index always points at an existing preview, or is 0 when
/// there are none.
#[derive(Debug, Default)]
pub struct PreviewSet {
    artifacts: Vec<ComposedArtifact>,
    active: usize,
}

impl PreviewSet {
    /// Replace all previews, revoking the old ones, and show the first
    pub fn replace(&mut self, artifacts: Vec<ComposedArtifact>) {
        revoke_all(&mut self.artifacts);
        self.artifacts = artifacts;
        self.active = 0;
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    pub fn artifacts(&self) -> &[ComposedArtifact] {
        &self.artifacts
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<&ComposedArtifact> {
        self.artifacts.get(self.active)
    }

    /// Move one preview back or forward; stops at either end
    pub fn advance(&mut self, direction: Direction) -> usize {
        self.active = step(self.active, self.artifacts.len(), direction);
        self.active
    }

    /// Jump to `index`. Out-of-range indices leave the selection as is.
    pub fn show(&mut self, index: usize) -> usize {
        if index < self.artifacts.len() {
            self.active = index;
        }
        self.active
    }
}

fn step(index: usize, len: usize, direction: Direction) -> usize {
    match direction {
        Direction::Previous => index.saturating_sub(1),
        Direction::Next if index + 1 < len => index + 1,
        Direction::Next => index,
    }
}
