//! Arena-backed node storage. Nodes are never removed; the tree is dropped as a whole.

use crate::node::{Node, NodeId};

#[derive(Debug, Clone)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push(&mut self, n: Node) -> NodeId {
        let id = self.nodes.len() as u32;
        self.nodes.push(n);
        id
    }

    /// Push `n` and link it under its parent.
    pub fn push_child(&mut self, n: Node) -> NodeId {
        let parent = n.parent;
        let id = self.push(n);
        if let Some(p) = parent {
            self.get_mut(p).children.push(id);
        }
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as NodeId, n))
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}
