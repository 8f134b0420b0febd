//! DOM Tree (arena-based allocation)
//!
//! Nodes are never freed; removing a node only unlinks it, so a `NodeId`
//! stays valid for the lifetime of the tree.

use std::cell::RefCell;

use crate::binding::QueryCache;
use crate::node::{Attribute, Node, NodeData};
use crate::observer::{MutationLog, MutationRecord};
use crate::{DomError, NodeId};

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    mutations: MutationLog,
    /// Bumped on every structural change and every attribute value change
    generation: u64,
    pub(crate) cache: RefCell<QueryCache>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            mutations: MutationLog::default(),
            generation: 0,
            cache: RefCell::default(),
        }
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if !id.is_valid() {
            return None;
        }
        self.nodes.get(id.index())
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.get(id).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        if !id.is_valid() {
            return Err(DomError::UnknownNode(id));
        }
        self.nodes.get_mut(id.index()).ok_or(DomError::UnknownNode(id))
    }

    /// Number of nodes ever allocated (document included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Lowercase tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Parent within the same tree (None for detached nodes and shadow roots)
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.get(id)?.parent;
        parent.is_valid().then_some(parent)
    }

    /// Parent, or the host when `id` is a shadow root
    pub fn composed_parent(&self, id: NodeId) -> Option<NodeId> {
        match self.get(id)?.data {
            NodeData::ShadowRoot { host } => Some(host),
            _ => self.parent(id),
        }
    }

    /// Direct children in order
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Children { tree: self, next }
    }

    /// Direct element children in order
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(|&c| self.is_element(c))
    }

    /// Strict ancestors within the same tree, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Descendants in tree order, excluding `id` and shadow trees
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        while let Some(current) = stack.pop() {
            out.push(current);
            let mark = stack.len();
            stack.extend(self.children(current));
            stack[mark..].reverse();
        }
        out
    }

    /// Inclusive containment across shadow boundaries
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.composed_parent(id);
        }
        false
    }

    /// Whether the node is reachable from the document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.get(id).is_some() && self.contains(NodeId::ROOT, id)
    }

    // ------------------------------------------------------------------
    // Structure mutation
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or last when None)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        if !self.node(parent)?.is_container() {
            return Err(DomError::HierarchyRequest("parent cannot have children"));
        }
        match self.node(child)?.data {
            NodeData::Document | NodeData::ShadowRoot { .. } => {
                return Err(DomError::HierarchyRequest("node cannot be inserted"));
            }
            _ => {}
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest("node is an ancestor of the parent"));
        }
        let mut reference = reference;
        if let Some(r) = reference {
            if self.node(r)?.parent != parent {
                return Err(DomError::HierarchyRequest("reference is not a child of parent"));
            }
            if r == child {
                let next = self.nodes[child.index()].next_sibling;
                reference = next.is_valid().then_some(next);
            }
        }

        if let Some(old_parent) = self.unlink(child) {
            self.mutations.push(MutationRecord::child_removed(old_parent, child));
        }
        self.link(parent, child, reference);
        self.mutations.push(MutationRecord::child_added(parent, child));
        self.generation += 1;
        Ok(())
    }

    /// Detach `child` from its parent
    pub fn remove(&mut self, child: NodeId) -> Result<(), DomError> {
        self.node(child)?;
        if let Some(parent) = self.unlink(child) {
            self.mutations.push(MutationRecord::child_removed(parent, child));
            self.generation += 1;
        }
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        match reference {
            None => {
                let last = self.nodes[parent.index()].last_child;
                let c = &mut self.nodes[child.index()];
                c.parent = parent;
                c.prev_sibling = last;
                c.next_sibling = NodeId::NONE;
                if last.is_valid() {
                    self.nodes[last.index()].next_sibling = child;
                } else {
                    self.nodes[parent.index()].first_child = child;
                }
                self.nodes[parent.index()].last_child = child;
            }
            Some(reference) => {
                let prev = self.nodes[reference.index()].prev_sibling;
                let c = &mut self.nodes[child.index()];
                c.parent = parent;
                c.prev_sibling = prev;
                c.next_sibling = reference;
                self.nodes[reference.index()].prev_sibling = child;
                if prev.is_valid() {
                    self.nodes[prev.index()].next_sibling = child;
                } else {
                    self.nodes[parent.index()].first_child = child;
                }
            }
        }
    }

    fn unlink(&mut self, child: NodeId) -> Option<NodeId> {
        let (parent, prev, next) = {
            let c = &self.nodes[child.index()];
            (c.parent, c.prev_sibling, c.next_sibling)
        };
        if !parent.is_valid() {
            return None;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }
        let c = &mut self.nodes[child.index()];
        c.parent = NodeId::NONE;
        c.prev_sibling = NodeId::NONE;
        c.next_sibling = NodeId::NONE;
        Some(parent)
    }

    // ------------------------------------------------------------------
    // Shadow roots
    // ------------------------------------------------------------------

    /// Attach a shadow root to an element
    pub fn attach_shadow(&mut self, host: NodeId) -> Result<NodeId, DomError> {
        let element = self.node(host)?.as_element().ok_or(DomError::NotAnElement(host))?;
        if element.shadow_root.is_valid() {
            return Err(DomError::ShadowRootExists(host));
        }
        let root = self.push(Node::shadow_root(host));
        if let Some(element) = self.nodes[host.index()].as_element_mut() {
            element.shadow_root = root;
        }
        self.generation += 1;
        Ok(root)
    }

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        let root = self.get(host)?.as_element()?.shadow_root;
        root.is_valid().then_some(root)
    }

    /// Host element when `id` is a shadow root
    pub fn shadow_host(&self, id: NodeId) -> Option<NodeId> {
        match self.get(id)?.data {
            NodeData::ShadowRoot { host } => Some(host),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.get(id)
            .and_then(Node::as_element)
            .map_or(&[][..], |e| e.attrs.as_slice())
    }

    /// Set an attribute, returning the previous value.
    ///
    /// Always records a mutation, even when the value is unchanged.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: &str,
    ) -> Result<Option<String>, DomError> {
        let element = self.node_mut(id)?.as_element_mut().ok_or(DomError::NotAnElement(id))?;
        let old = element.set_attr(name, value);
        if old.as_deref() != Some(value) {
            self.generation += 1;
        }
        self.mutations.push(MutationRecord::attribute(id, name, old.clone()));
        Ok(old)
    }

    /// Remove an attribute, returning its value. Absent attributes record nothing.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let element = self.node_mut(id)?.as_element_mut().ok_or(DomError::NotAnElement(id))?;
        let old = element.remove_attr(name);
        if old.is_some() {
            self.generation += 1;
            self.mutations.push(MutationRecord::attribute(id, name, old.clone()));
        }
        Ok(old)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        if let Some(t) = self.get(id).and_then(Node::as_text) {
            text.push_str(t);
        }
        for node in self.descendants(id) {
            if let Some(t) = self.get(node).and_then(Node::as_text) {
                text.push_str(t);
            }
        }
        text
    }

    // ------------------------------------------------------------------
    // Bookkeeping
    // ------------------------------------------------------------------

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mutations(&self) -> &MutationLog {
        &self.mutations
    }

    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        self.mutations.take()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.tree.get(self.next).map(|_| self.next)?;
        self.next = self.tree.nodes[current.index()].next_sibling;
        Some(current)
    }
}

/// Iterator over ancestors, nearest first
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let list = tree.create_element("ul");
        let a = tree.create_element("li");
        let b = tree.create_element("li");
        tree.append_child(tree.root(), list).unwrap();
        tree.append_child(list, a).unwrap();
        tree.append_child(list, b).unwrap();
        (tree, list, a, b)
    }

    #[test]
    fn test_append_and_children() {
        let (tree, list, a, b) = sample();
        assert_eq!(tree.children(list).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(tree.parent(a), Some(list));
        assert!(tree.is_connected(b));
    }

    #[test]
    fn test_insert_before_and_move() {
        let (mut tree, list, a, b) = sample();
        tree.insert_before(list, b, Some(a)).unwrap();
        assert_eq!(tree.children(list).collect::<Vec<_>>(), vec![b, a]);

        // Inserting a node before itself keeps the order
        tree.insert_before(list, b, Some(b)).unwrap();
        assert_eq!(tree.children(list).collect::<Vec<_>>(), vec![b, a]);
    }

    #[test]
    fn test_remove_detaches() {
        let (mut tree, list, a, b) = sample();
        tree.remove(a).unwrap();
        assert_eq!(tree.children(list).collect::<Vec<_>>(), vec![b]);
        assert!(!tree.is_connected(a));
        assert_eq!(tree.parent(a), None);
    }

    #[test]
    fn test_hierarchy_errors() {
        let (mut tree, list, a, _) = sample();
        assert!(matches!(tree.append_child(a, list), Err(DomError::HierarchyRequest(_))));
        let text = tree.create_text("x");
        assert!(matches!(tree.append_child(text, a), Err(DomError::HierarchyRequest(_))));
        assert!(matches!(
            tree.append_child(list, NodeId(999)),
            Err(DomError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_descendants_preorder() {
        let (mut tree, list, a, b) = sample();
        let inner = tree.create_element("span");
        tree.append_child(a, inner).unwrap();
        assert_eq!(tree.descendants(list), vec![a, inner, b]);
    }

    #[test]
    fn test_generation_tracks_value_changes_only() {
        let (mut tree, _, a, _) = sample();
        let before = tree.generation();
        tree.set_attribute(a, "role", "option").unwrap();
        let after_first = tree.generation();
        assert!(after_first > before);
        tree.set_attribute(a, "role", "option").unwrap();
        assert_eq!(tree.generation(), after_first);
        assert_eq!(tree.mutations().attribute_writes(a, "role"), 2);
    }

    #[test]
    fn test_shadow_root_connection() {
        let (mut tree, list, _, _) = sample();
        let root = tree.attach_shadow(list).unwrap();
        let part = tree.create_element("div");
        tree.append_child(root, part).unwrap();

        assert_eq!(tree.shadow_root(list), Some(root));
        assert_eq!(tree.shadow_host(root), Some(list));
        assert_eq!(tree.parent(part), Some(root));
        assert_eq!(tree.composed_parent(root), Some(list));
        assert!(tree.is_connected(part));
        assert!(tree.contains(list, part));
        assert_eq!(tree.attach_shadow(list), Err(DomError::ShadowRootExists(list)));
    }

    #[test]
    fn test_text_content() {
        let (mut tree, _, a, b) = sample();
        let t1 = tree.create_text("Hello ");
        let t2 = tree.create_text("World");
        tree.append_child(a, t1).unwrap();
        tree.append_child(b, t2).unwrap();
        assert_eq!(tree.text_content(tree.root()), "Hello World");
    }
}
