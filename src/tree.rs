//! Arena-allocated search tree.
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`]. Children
//! are owned by their parent's slot list; the parent link is only an index,
//! so walking back up for backpropagation needs no shared ownership.

use log::trace;

use crate::error::SearchError;
use crate::state::PositionState;

/// Guard below which the oracle's legal-move mass counts as zero.
pub const PRIOR_EPSILON: f64 = 1e-8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize { self.0 as usize }
}

/// One position in the tree with its visit statistics.
#[derive(Debug, Clone)]
pub struct Node<S: PositionState> {
    position: S,
    parent: Option<NodeId>,
    children: Vec<(S::Move, NodeId)>,
    visit_count: u32,
    total_value: f64,
    prior: f64,
}

impl<S: PositionState> Node<S> {
    fn new(position: S, parent: Option<NodeId>, prior: f64) -> Self {
        Self { position, parent, children: Vec::new(), visit_count: 0, total_value: 0.0, prior }
    }

    pub fn position(&self) -> &S { &self.position }

    pub fn parent(&self) -> Option<NodeId> { self.parent }

    /// Children in insertion order.
    pub fn children(&self) -> &[(S::Move, NodeId)] { &self.children }

    pub fn visit_count(&self) -> u32 { self.visit_count }

    /// Sum of backed-up values, each from the side to move at this node.
    pub fn total_value(&self) -> f64 { self.total_value }

    pub fn prior(&self) -> f64 { self.prior }

    pub fn is_expanded(&self) -> bool { !self.children.is_empty() }

    /// Average backed-up value for the side to move here; 0 when unvisited.
    pub fn mean_value(&self) -> f64 {
        if self.visit_count == 0 { 0.0 } else { self.total_value / self.visit_count as f64 }
    }
}

/// PUCT score of `child` as seen by the player choosing among its siblings.
fn puct_score<S: PositionState>(child: &Node<S>, parent_visits_sqrt: f64, c_puct: f64) -> f64 {
    // The child's mean is from its own mover, i.e. the selecting player's opponent.
    let q = -child.mean_value();
    let u = c_puct * child.prior * parent_visits_sqrt / (1.0 + child.visit_count as f64);
    q + u
}

#[derive(Debug, Clone)]
pub struct Tree<S: PositionState> {
    nodes: Vec<Node<S>>,
}

impl<S: PositionState> Tree<S> {
    pub fn new(root_position: S) -> Self {
        Self { nodes: vec![Node::new(root_position, None, 1.0)] }
    }

    pub fn root(&self) -> NodeId { NodeId(0) }

    pub fn get(&self, id: NodeId) -> &Node<S> { &self.nodes[id.index()] }

    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    fn allocate(&mut self, node: Node<S>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Child maximising the PUCT score; ties go to the earliest inserted.
    ///
    /// Returns `None` for an unexpanded node.
    pub fn select_child(&self, id: NodeId, c_puct: f64) -> Option<(S::Move, NodeId)> {
        let node = self.get(id);
        let parent_visits_sqrt = (node.visit_count as f64).sqrt();
        let mut best: Option<(S::Move, NodeId)> = None;
        let mut best_score = f64::NEG_INFINITY;
        for &(mv, child_id) in &node.children {
            let score = puct_score(self.get(child_id), parent_visits_sqrt, c_puct);
            if best.is_none() || score > best_score {
                best = Some((mv, child_id));
                best_score = score;
            }
        }
        best
    }

    /// Create one child per legal move, with priors taken from `policy` and
    /// renormalised over the legal moves.
    ///
    /// Falls back to uniform priors when the legal moves carry (almost) no
    /// mass. Returns the number of children created; expanding an already
    /// expanded node or one without legal moves creates none.
    pub fn expand(&mut self, id: NodeId, policy: &[f32]) -> Result<usize, SearchError> {
        if policy.len() != S::ACTION_SPACE {
            return Err(SearchError::PolicyShape { got: policy.len(), expected: S::ACTION_SPACE });
        }
        if self.get(id).is_expanded() {
            trace!("node {} already expanded", id.index());
            return Ok(0);
        }
        let position = self.get(id).position.clone();
        let moves = position.legal_moves();
        if moves.is_empty() {
            return Ok(0);
        }

        let mut raw = Vec::with_capacity(moves.len());
        for mv in &moves {
            let idx = position.action_index(mv)?;
            let p = policy.get(idx).copied().unwrap_or(0.0) as f64;
            // NaN or negative weights count as no mass
            raw.push(if p.is_finite() && p > 0.0 { p } else { 0.0 });
        }
        let total: f64 = raw.iter().sum();
        let priors: Vec<f64> = if total < PRIOR_EPSILON {
            vec![1.0 / moves.len() as f64; moves.len()]
        } else {
            raw.iter().map(|p| p / total).collect()
        };

        for (mv, prior) in moves.into_iter().zip(priors) {
            let child = self.allocate(Node::new(position.apply(mv), Some(id), prior));
            self.nodes[id.index()].children.push((mv, child));
        }
        Ok(self.get(id).children.len())
    }

    /// Add `value` at `leaf` and its negation at each step toward the root.
    pub fn backpropagate(&mut self, leaf: NodeId, value: f64) {
        let mut current = Some(leaf);
        let mut v = value;
        while let Some(id) = current {
            let node = &mut self.nodes[id.index()];
            node.visit_count += 1;
            node.total_value += v;
            v = -v;
            current = node.parent;
        }
    }

    /// Mix `noise` into the priors of `id`'s children: `(1 - eps) * p + eps * n`.
    pub fn mix_child_priors(&mut self, id: NodeId, noise: &[f64], eps: f64) {
        let children: Vec<NodeId> = self.get(id).children.iter().map(|&(_, c)| c).collect();
        for (child, n) in children.into_iter().zip(noise) {
            let node = &mut self.nodes[child.index()];
            node.prior = (1.0 - eps) * node.prior + eps * n;
        }
    }

    /// Child with the most visits; ties go to the earliest inserted.
    pub fn most_visited_child(&self, id: NodeId) -> Option<(S::Move, NodeId)> {
        let mut best: Option<(S::Move, NodeId)> = None;
        let mut best_visits = 0u32;
        for &(mv, child_id) in &self.get(id).children {
            let visits = self.get(child_id).visit_count;
            if best.is_none() || visits > best_visits {
                best = Some((mv, child_id));
                best_visits = visits;
            }
        }
        best
    }

    /// Table of the `limit` most visited children of `id`.
    pub fn statistics_string(&self, id: NodeId, c_puct: f64, limit: usize) -> String {
        let mut s = String::from("|   move   |     P     |     N     |     Q     |   PUCT    |\n");
        let parent_visits_sqrt = (self.get(id).visit_count as f64).sqrt();
        let mut children: Vec<_> = self.get(id).children.iter().collect();
        children.sort_by(|a, b| self.get(b.1).visit_count.cmp(&self.get(a.1).visit_count));
        for &(mv, child_id) in children.into_iter().take(limit) {
            let child = self.get(child_id);
            s.push_str(&format!(
                "|{:^10}|{:^11.4}|{:^11}|{:^11.4}|{:^11.4}|\n",
                mv.to_string(),
                child.prior,
                child.visit_count,
                -child.mean_value(),
                puct_score(child, parent_visits_sqrt, c_puct),
            ));
        }
        s
    }
}
