use jmc_flame_protocol::SharedStr;

/// Index of a node in a [`CallTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }

    /// The handle used as `frame_id` in render commands.
    pub fn frame_id(self) -> u64 {
        self.0 as u64
    }

    pub fn from_frame_id(frame_id: u64) -> Option<Self> {
        usize::try_from(frame_id).ok().map(Self)
    }
}

/// One stack frame occurrence, aggregated across samples.
#[derive(Debug, Clone)]
pub struct CallTreeNode {
    pub signature: SharedStr,
    /// Inclusive sample count (self + descendants), as reported by the profiler.
    pub samples: u64,
    /// Distance from the node's root in the parsed report (root = 0).
    pub depth: u32,
    /// 1-based line of the report this node was decoded from.
    pub line: usize,
    pub children: Vec<NodeId>,
}

/// Arena holding every node of a parsed report.
///
/// Nodes are only ever appended while the report is parsed; after that the
/// arena is shared read-only by the original forest and every zoomed view.
#[derive(Debug, Clone, Default)]
pub struct CallTree {
    nodes: Vec<CallTreeNode>,
}

impl CallTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&CallTreeNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &CallTreeNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Height of the subtree rooted at `id`; a leaf has height 1.
    pub fn height(&self, id: NodeId) -> usize {
        // Iterative so that very deep stacks cannot overflow the call stack.
        let mut max = 0;
        let mut pending = vec![(id, 1usize)];
        while let Some((current, level)) = pending.pop() {
            if self.node(current).is_none() {
                continue;
            }
            max = max.max(level);
            pending.extend(self.children(current).iter().map(|&c| (c, level + 1)));
        }
        max
    }

    pub(crate) fn push(&mut self, node: CallTreeNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.push(child);
        }
    }
}
