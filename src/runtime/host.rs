//! Host UI tree abstraction.
//!
//! The runtime never renders anything itself. It asks a [`Host`] to create,
//! move, patch and remove nodes, and treats the tree as a black box beyond
//! that. [`MemoryHost`] is an in-memory tree that counts every mutation.

use rustc_hash::FxHashMap;

use super::view::View;

/// Opaque handle of a host node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Operations the reconciler needs from the running UI tree.
pub trait Host {
    /// Parent of `node`, `None` when detached or unknown.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Create a detached, empty placeholder node.
    fn create_placeholder(&mut self) -> NodeId;

    /// Insert `node` into `parent` before `reference` (append when `None`).
    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>);

    /// Put `new` where `old` is inside `parent`; `old` ends up detached.
    fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId);

    /// Build a detached subtree for `view`, returning its root.
    fn render(&mut self, view: &View) -> NodeId;

    /// Detach and destroy `node` with its subtree.
    fn remove(&mut self, node: NodeId);

    /// Diff `old` against `new` and patch the subtree rooted at `node` in
    /// place. Returns the root afterwards, which is `node` unless the root
    /// itself had to be replaced.
    fn patch(&mut self, node: NodeId, old: &View, new: &View) -> NodeId;
}

/// What a [`MemoryHost`] node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryKind {
    Container,
    Placeholder,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct MemoryNode {
    kind: MemoryKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory host tree.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: FxHashMap<NodeId, MemoryNode>,
    next: u32,
    mutations: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, kind: MemoryKind) -> NodeId {
        self.next += 1;
        let id = NodeId(self.next);
        self.nodes.insert(
            id,
            MemoryNode {
                kind,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    /// Create a mount container. Not counted as a mutation.
    pub fn create_container(&mut self) -> NodeId {
        self.alloc(MemoryKind::Container)
    }

    /// Number of mutations performed so far.
    #[inline]
    pub fn mutations(&self) -> usize {
        self.mutations
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn kind(&self, node: NodeId) -> Option<&MemoryKind> {
        self.nodes.get(&node).map(|n| &n.kind)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(&node).map_or(&[], |n| n.children.as_slice())
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            MemoryKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match self.kind(node)? {
            MemoryKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Concatenated text of the subtree.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.nodes.get(&node) else {
            return;
        };
        if let MemoryKind::Text(text) = &n.kind {
            out.push_str(text);
        }
        for &child in &n.children {
            self.collect_text(child, out);
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(&node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|&c| c != node);
        }
    }

    fn destroy(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.remove(&node) {
            for child in n.children {
                self.destroy(child);
            }
        }
    }

    fn build(&mut self, view: &View) -> NodeId {
        match view {
            View::Text(text) => self.alloc(MemoryKind::Text(text.clone())),
            View::Element {
                tag,
                attrs,
                children,
            } => {
                let id = self.alloc(MemoryKind::Element {
                    tag: tag.clone(),
                    attrs: attrs.clone(),
                });
                for child in children {
                    let child = self.build(child);
                    self.link(id, child, None);
                }
                id
            }
        }
    }

    fn link(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        self.detach(node);
        let Some(p) = self.nodes.get_mut(&parent) else {
            return;
        };
        let index = reference
            .and_then(|r| p.children.iter().position(|&c| c == r))
            .unwrap_or(p.children.len());
        p.children.insert(index, node);
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = Some(parent);
        }
    }
}

impl Host for MemoryHost {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node)?.parent
    }

    fn create_placeholder(&mut self) -> NodeId {
        self.mutations += 1;
        self.alloc(MemoryKind::Placeholder)
    }

    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        self.mutations += 1;
        self.link(parent, node, reference);
    }

    fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) {
        self.mutations += 1;
        self.detach(new);
        let Some(index) = self
            .nodes
            .get(&parent)
            .and_then(|p| p.children.iter().position(|&c| c == old))
        else {
            self.link(parent, new, None);
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children[index] = new;
        }
        if let Some(n) = self.nodes.get_mut(&new) {
            n.parent = Some(parent);
        }
        if let Some(o) = self.nodes.get_mut(&old) {
            o.parent = None;
        }
    }

    fn render(&mut self, view: &View) -> NodeId {
        self.mutations += 1;
        self.build(view)
    }

    fn remove(&mut self, node: NodeId) {
        self.mutations += 1;
        self.detach(node);
        self.destroy(node);
    }

    fn patch(&mut self, node: NodeId, old: &View, new: &View) -> NodeId {
        if !self.contains(node) || !old.same_shape(new) {
            let fresh = self.render(new);
            if let Some(parent) = self.parent(node) {
                self.replace_child(parent, fresh, node);
            }
            self.destroy(node);
            return fresh;
        }

        match (old, new) {
            (View::Text(a), View::Text(b)) => {
                if a != b {
                    self.mutations += 1;
                    if let Some(n) = self.nodes.get_mut(&node) {
                        n.kind = MemoryKind::Text(b.clone());
                    }
                }
            }
            (
                View::Element {
                    attrs: old_attrs,
                    children: old_children,
                    ..
                },
                View::Element {
                    tag,
                    attrs: new_attrs,
                    children: new_children,
                },
            ) => {
                if old_attrs != new_attrs {
                    self.mutations += 1;
                    if let Some(n) = self.nodes.get_mut(&node) {
                        n.kind = MemoryKind::Element {
                            tag: tag.clone(),
                            attrs: new_attrs.clone(),
                        };
                    }
                }
                let kids = self.children(node).to_vec();
                for (i, view) in new_children.iter().enumerate() {
                    match (kids.get(i), old_children.get(i)) {
                        (Some(&kid), Some(prev)) => {
                            self.patch(kid, prev, view);
                        }
                        _ => {
                            let fresh = self.render(view);
                            self.insert_before(node, fresh, None);
                        }
                    }
                }
                for &extra in kids.iter().skip(new_children.len()) {
                    self.remove(extra);
                }
            }
            _ => {}
        }
        node
    }
}
