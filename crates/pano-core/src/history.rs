//! Navigation history.
//!
//! A LIFO stack of scene snapshots. Entries are deep copies taken at
//! departure time, so later mutations of the live dataset (there are
//! none today, but the snapshot guarantee is part of the contract)
//! cannot rewrite where "back" leads.

use crate::scene::Scene;

#[derive(Debug, Default)]
pub struct History {
    stack: Vec<Scene>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the scene being departed.
    pub fn push(&mut self, scene: &Scene) {
        self.stack.push(scene.clone());
    }

    /// Take the most recent snapshot for a back navigation.
    pub fn pop(&mut self) -> Option<Scene> {
        self.stack.pop()
    }

    pub fn peek(&self) -> Option<&Scene> {
        self.stack.last()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}
