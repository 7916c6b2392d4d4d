//! Search tree nodes: decision nodes hold a realized state, chance nodes a pending move.

use az_core::{GameState, Move};

pub type NodeId = u32;

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Realized state. `mv` is the move that produced it, `None` for the root and for
    /// sampled outcomes under a chance node.
    Decision { state: GameState, mv: Option<Move> },
    /// A move whose result involves a tile draw. Each child is one sampled outcome of
    /// replaying `pending` on the parent's state.
    Chance { pending: Move },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub plays: u32,
    /// Sum of rewards backed up through this node.
    pub score: f64,
}

impl Node {
    pub fn decision(state: GameState, mv: Option<Move>, parent: Option<NodeId>) -> Self {
        Self {
            kind: NodeKind::Decision { state, mv },
            parent,
            children: Vec::new(),
            plays: 0,
            score: 0.0,
        }
    }

    pub fn chance(pending: Move, parent: NodeId) -> Self {
        Self {
            kind: NodeKind::Chance { pending },
            parent: Some(parent),
            children: Vec::new(),
            plays: 0,
            score: 0.0,
        }
    }

    pub fn is_chance(&self) -> bool {
        matches!(self.kind, NodeKind::Chance { .. })
    }

    /// The realized state, or `None` for chance nodes.
    pub fn state(&self) -> Option<&GameState> {
        match &self.kind {
            NodeKind::Decision { state, .. } => Some(state),
            NodeKind::Chance { .. } => None,
        }
    }

    /// The move that leads from the parent decision state into this node.
    pub fn incoming_move(&self) -> Option<Move> {
        match self.kind {
            NodeKind::Decision { mv, .. } => mv,
            NodeKind::Chance { pending } => Some(pending),
        }
    }

    pub fn mean(&self) -> f64 {
        if self.plays == 0 {
            0.0
        } else {
            self.score / self.plays as f64
        }
    }
}
