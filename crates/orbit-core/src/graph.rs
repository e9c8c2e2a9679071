//! Dependency edges between tasks.
//!
//! Existence, creation and removal treat an edge as an unordered pair,
//! so at most one edge can connect two tasks regardless of orientation.
//! Lock evaluation uses the stored direction: a task is locked while
//! any edge pointing into it comes from a task that has not completed
//! a session. The direction is recorded once from the caller-supplied
//! (source, target) order and never flipped.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GraphError;
use crate::task::TaskStore;

/// A prerequisite link gating `target_id` on `source_id`'s completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Connection {
    pub id: String,
    #[serde(rename = "sourceId")]
    pub source_id: String,
    #[serde(rename = "targetId")]
    pub target_id: String,
}

impl Connection {
    /// True when this edge connects `a` and `b` in either orientation.
    fn links(&self, a: &str, b: &str) -> bool {
        (self.source_id == a && self.target_id == b)
            || (self.source_id == b && self.target_id == a)
    }
}

/// Result of a toggle operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Created,
    Removed,
}

/// All dependency edges, owned alongside the task store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    edges: Vec<Connection>,
}

impl DependencyGraph {
    pub fn new(edges: Vec<Connection>) -> Self {
        Self { edges }
    }

    pub fn all(&self) -> &[Connection] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// True if an edge connects `a` and `b` in either orientation.
    pub fn exists(&self, a: &str, b: &str) -> bool {
        self.edges.iter().any(|e| e.links(a, b))
    }

    /// Insert a new edge from `source` to `target`.
    pub fn create(&mut self, source: &str, target: &str) -> Result<Connection, GraphError> {
        if source == target {
            return Err(GraphError::SelfLoop);
        }
        if self.exists(source, target) {
            return Err(GraphError::Duplicate {
                a: source.to_string(),
                b: target.to_string(),
            });
        }
        let edge = Connection {
            id: Uuid::new_v4().to_string(),
            source_id: source.to_string(),
            target_id: target.to_string(),
        };
        self.edges.push(edge.clone());
        Ok(edge)
    }

    /// Remove the edge between `a` and `b` in whichever orientation it
    /// was stored. Returns false if absent.
    pub fn remove(&mut self, a: &str, b: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| !e.links(a, b));
        self.edges.len() != before
    }

    /// Create the edge if absent, remove it if present.
    pub fn toggle(&mut self, source: &str, target: &str) -> Result<ToggleOutcome, GraphError> {
        if self.exists(source, target) {
            self.remove(source, target);
            Ok(ToggleOutcome::Removed)
        } else {
            self.create(source, target)?;
            Ok(ToggleOutcome::Created)
        }
    }

    /// Remove every edge touching `task_id` (cascade on task deletion).
    pub fn remove_all_for_task(&mut self, task_id: &str) {
        self.edges
            .retain(|e| e.source_id != task_id && e.target_id != task_id);
    }

    pub fn clear_all(&mut self) {
        self.edges.clear();
    }

    /// A task is locked while at least one incoming edge comes from a
    /// task that has not completed a session. Edges whose source no
    /// longer resolves are skipped. A task with no incoming edges is
    /// never locked; cycles simply never unlock.
    pub fn is_locked(&self, task_id: &str, tasks: &TaskStore) -> bool {
        self.edges
            .iter()
            .filter(|e| e.target_id == task_id)
            .any(|e| {
                tasks
                    .get(&e.source_id)
                    .is_some_and(|source| !source.session_completed)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDraft;
    use crate::tier::Tier;

    fn store_with(names: &[&str]) -> (TaskStore, Vec<String>) {
        let mut store = TaskStore::default();
        let ids = names
            .iter()
            .map(|n| {
                store
                    .create(TaskDraft {
                        name: n.to_string(),
                        tier: Tier::Min25,
                        ..Default::default()
                    })
                    .unwrap()
                    .id
            })
            .collect();
        (store, ids)
    }

    #[test]
    fn self_loop_rejected() {
        let mut graph = DependencyGraph::default();
        assert_eq!(graph.create("a", "a").unwrap_err(), GraphError::SelfLoop);
        assert!(graph.is_empty());
    }

    #[test]
    fn duplicate_rejected_in_either_orientation() {
        let mut graph = DependencyGraph::default();
        graph.create("a", "b").unwrap();
        assert!(matches!(
            graph.create("a", "b"),
            Err(GraphError::Duplicate { .. })
        ));
        assert!(matches!(
            graph.create("b", "a"),
            Err(GraphError::Duplicate { .. })
        ));
        assert_eq!(graph.len(), 1);
        assert!(graph.exists("a", "b"));
        assert!(graph.exists("b", "a"));
    }

    #[test]
    fn remove_matches_either_orientation() {
        let mut graph = DependencyGraph::default();
        graph.create("a", "b").unwrap();
        assert!(graph.remove("b", "a"));
        assert!(!graph.remove("b", "a"));
        assert!(graph.is_empty());
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut graph = DependencyGraph::default();
        assert_eq!(graph.toggle("a", "b").unwrap(), ToggleOutcome::Created);
        assert_eq!(graph.toggle("a", "b").unwrap(), ToggleOutcome::Removed);
        assert!(graph.is_empty());
        assert!(!graph.exists("a", "b"));
    }

    #[test]
    fn cascade_removes_every_touching_edge() {
        let mut graph = DependencyGraph::default();
        graph.create("a", "b").unwrap();
        graph.create("b", "c").unwrap();
        graph.create("c", "a").unwrap();
        graph.remove_all_for_task("b");
        for edge in graph.all() {
            assert_ne!(edge.source_id, "b");
            assert_ne!(edge.target_id, "b");
        }
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn no_incoming_edges_means_never_locked() {
        let (store, ids) = store_with(&["a", "b"]);
        let mut graph = DependencyGraph::default();
        graph.create(&ids[0], &ids[1]).unwrap();
        assert!(!graph.is_locked(&ids[0], &store));
        assert!(graph.is_locked(&ids[1], &store));
    }

    #[test]
    fn completing_source_unlocks_target() {
        let (mut store, ids) = store_with(&["a", "b"]);
        let mut graph = DependencyGraph::default();
        graph.create(&ids[0], &ids[1]).unwrap();
        store.mark_session_completed(&ids[0]);
        assert!(!graph.is_locked(&ids[1], &store));
    }

    #[test]
    fn dangling_source_is_skipped() {
        let (store, ids) = store_with(&["b"]);
        let mut graph = DependencyGraph::default();
        graph.create("ghost", &ids[0]).unwrap();
        assert!(!graph.is_locked(&ids[0], &store));
    }

    #[test]
    fn direction_is_recorded_from_caller_order() {
        let mut graph = DependencyGraph::default();
        graph.create("a", "b").unwrap();
        let edge = &graph.all()[0];
        assert_eq!(edge.source_id, "a");
        assert_eq!(edge.target_id, "b");
    }
}
