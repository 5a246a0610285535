//! Task graph
//!
//! A directed acyclic graph of named provisioning steps with explicit
//! dependency edges. The walk order is a deterministic topological sort,
//! stable with respect to insertion order, so repeated runs apply steps in
//! the same sequence. Cycles are rejected before anything runs.

use crate::error::{HostsmithError, HostsmithResult};

/// Handle to a node in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

struct Node<T> {
    name: String,
    payload: T,
    deps: Vec<NodeId>,
}

/// Dependency-ordered collection of provisioning steps
pub struct TaskGraph<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Default for TaskGraph<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<T> TaskGraph<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with no dependencies
    pub fn add_node(&mut self, name: impl Into<String>, payload: T) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            payload,
            deps: Vec::new(),
        });
        id
    }

    /// Declare that `node` depends on `on`
    pub fn depends(&mut self, node: NodeId, on: NodeId) {
        let deps = &mut self.nodes[node.0].deps;
        if !deps.contains(&on) {
            deps.push(on);
        }
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn payload(&self, id: NodeId) -> &T {
        &self.nodes[id.0].payload
    }

    pub fn dependencies(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].deps
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deterministic topological order over all nodes
    ///
    /// Kahn's algorithm; among ready nodes the earliest-inserted runs
    /// first. Returns `DependencyCycle` naming one node on a cycle.
    pub fn topological_order(&self) -> HostsmithResult<Vec<NodeId>> {
        let mut remaining_deps: Vec<usize> = self.nodes.iter().map(|n| n.deps.len()).collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut done = vec![false; self.nodes.len()];

        while order.len() < self.nodes.len() {
            let next = (0..self.nodes.len()).find(|&i| !done[i] && remaining_deps[i] == 0);
            let Some(next) = next else {
                let stuck = (0..self.nodes.len())
                    .find(|&i| !done[i])
                    .expect("incomplete order implies an unfinished node");
                return Err(HostsmithError::DependencyCycle {
                    step: self.nodes[stuck].name.clone(),
                });
            };

            done[next] = true;
            order.push(NodeId(next));
            for (i, node) in self.nodes.iter().enumerate() {
                if !done[i] && node.deps.contains(&NodeId(next)) {
                    remaining_deps[i] -= 1;
                }
            }
        }

        Ok(order)
    }
}
