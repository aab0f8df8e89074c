/// Identifier assigned to a node in order of first appearance in the layout text.
///
/// Ids start at 1 for every parse and are never reused within that parse,
/// even after the node carrying one has been deleted.
pub type NodeId = usize;

/// A file or directory proposed by a layout.
///
/// The tree owns its nodes through `children`. `parent` is a non-owning
/// lookup by id and is `None` only for the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub is_dir: bool,
    pub depth: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, is_dir: bool, depth: usize) -> Self {
        Node {
            id,
            name: name.into(),
            is_dir,
            depth,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Append `child` as the last child of this node and point it back here.
    pub fn push_child(&mut self, mut child: Node) {
        child.parent = Some(self.id);
        self.children.push(child);
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Depth-first search for the node with `id`, including `self`.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Number of nodes in this subtree, `self` included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    /// Pre-order walk over this subtree.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Remove the descendant with `id` together with its whole subtree.
    ///
    /// Matches only strict descendants; the remaining siblings keep their order.
    pub fn remove_descendant(&mut self, id: NodeId) -> bool {
        if let Some(pos) = self.children.iter().position(|c| c.id == id) {
            self.children.remove(pos);
            return true;
        }
        self.children
            .iter_mut()
            .any(|child| child.remove_descendant(id))
    }
}

pub struct PreOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Delete the node `id` and its subtree from the tree rooted at `root`.
///
/// Returns the root to keep using and whether anything was removed. Deleting
/// the root itself discards the whole tree.
pub fn delete_node(root: Option<Node>, id: NodeId) -> (Option<Node>, bool) {
    match root {
        None => (None, false),
        Some(node) if node.id == id => (None, true),
        Some(mut node) => {
            let found = node.remove_descendant(id);
            (Some(node), found)
        }
    }
}
