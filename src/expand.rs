use std::collections::HashMap;

use crate::models::{FinancialNode, NodeId, Statement};

/// Deepest level (0-based) whose nodes expand-all / collapse-all will touch:
/// totalizer → account → classification.
pub const MAX_EXPAND_DEPTH: usize = 2;

/// Open/closed flags keyed by node id. Anything not in the map is closed.
#[derive(Debug, Clone, Default)]
pub struct ExpandState {
    open: HashMap<NodeId, bool>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, id: &NodeId) -> bool {
        self.open.get(id).copied().unwrap_or(false)
    }

    pub fn toggle(&mut self, id: &NodeId) {
        let next = !self.is_open(id);
        self.open.insert(id.clone(), next);
    }

    /// Put every expandable node of the tree into the same state in one pass.
    pub fn set_all(&mut self, statement: &Statement, open: bool) {
        for node in statement.walk() {
            if node.has_children() && node.id.depth() <= MAX_EXPAND_DEPTH {
                self.open.insert(node.id.clone(), open);
            }
        }
    }

    pub fn expand_all(&mut self, statement: &Statement) {
        self.set_all(statement, true);
    }

    pub fn collapse_all(&mut self, statement: &Statement) {
        self.set_all(statement, false);
    }

    #[cfg(test)]
    pub fn open_count(&self) -> usize {
        self.open.values().filter(|v| **v).count()
    }

    /// Nodes to draw, depth-first, descending only into open nodes.
    pub fn visible<'a>(&self, statement: &'a Statement) -> Vec<&'a FinancialNode> {
        fn visit<'a>(state: &ExpandState, node: &'a FinancialNode, out: &mut Vec<&'a FinancialNode>) {
            out.push(node);
            if state.is_open(&node.id) {
                for child in &node.classificacoes {
                    visit(state, child, out);
                }
            }
        }
        let mut out = Vec::new();
        for node in &statement.data {
            visit(self, node, &mut out);
        }
        out
    }
}
