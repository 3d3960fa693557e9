use std::sync::Arc;

use super::call_tree::{CallTree, CallTreeNode, NodeId};

/// A named, ordered collection of call trees from one report.
///
/// The nodes live in a shared [`CallTree`] arena. Zooming produces another
/// forest over the same arena with a single root, so no node data is copied
/// and the original forest stays valid.
#[derive(Debug, Clone)]
pub struct CallForest {
    name: String,
    tree: Arc<CallTree>,
    roots: Vec<NodeId>,
}

impl CallForest {
    pub fn new(name: impl Into<String>, tree: Arc<CallTree>, roots: Vec<NodeId>) -> Self {
        Self {
            name: name.into(),
            tree,
            roots,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tree(&self) -> &CallTree {
        &self.tree
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&CallTreeNode> {
        self.tree.node(id)
    }

    /// Sum of the root sample counts.
    pub fn total_samples(&self) -> u64 {
        self.roots
            .iter()
            .filter_map(|&r| self.tree.node(r))
            .map(|n| n.samples)
            .sum()
    }

    /// Height of the deepest call tree (0 when there are no roots).
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&r| self.tree.height(r))
            .max()
            .unwrap_or(0)
    }

    /// Whether `id` is reachable from one of this forest's roots.
    pub fn contains(&self, id: NodeId) -> bool {
        let mut pending: Vec<NodeId> = self.roots.clone();
        while let Some(current) = pending.pop() {
            if current == id {
                return true;
            }
            pending.extend_from_slice(self.tree.children(current));
        }
        false
    }

    /// A forest whose sole root is `id`, named after its signature and sharing
    /// this forest's arena. Returns `None` for ids outside the arena.
    pub fn zoom(&self, id: NodeId) -> Option<Self> {
        let node = self.tree.node(id)?;
        Some(Self {
            name: node.signature.to_string(),
            tree: Arc::clone(&self.tree),
            roots: vec![id],
        })
    }

    /// Shares the arena with `other`.
    pub fn shares_tree_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree)
    }
}
