//! Attribute Synchronizer
//!
//! Widgets derive the full attribute set an element must carry and hand it
//! to [`synchronize`], which only touches the tree where the value differs.

use trellis_dom::{DomTree, NodeId};

use crate::aria::{AriaRole, Politeness};

/// Derived attributes for one element; `None` means "must be absent"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    entries: Vec<(&'static str, Option<String>)>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.entries.push((name, Some(value.into())));
        self
    }

    pub fn set_opt(mut self, name: &'static str, value: Option<impl Into<String>>) -> Self {
        self.entries.push((name, value.map(Into::into)));
        self
    }

    /// `"true"` / `"false"` valued attribute (`aria-expanded`, `aria-selected`)
    pub fn set_bool(self, name: &'static str, value: bool) -> Self {
        self.set(name, if value { "true" } else { "false" })
    }

    /// Boolean content attribute: present and empty, or absent (`hidden`)
    pub fn flag(self, name: &'static str, present: bool) -> Self {
        self.set_opt(name, present.then_some(""))
    }

    pub fn remove(mut self, name: &'static str) -> Self {
        self.entries.push((name, None));
        self
    }

    pub fn role(self, role: AriaRole) -> Self {
        self.set("role", role.as_str())
    }

    pub fn live(self, politeness: Politeness) -> Self {
        self.set("aria-live", politeness.as_str())
    }

    pub fn tabindex(self, index: i32) -> Self {
        self.set("tabindex", index.to_string())
    }

    pub fn entries(&self) -> &[(&'static str, Option<String>)] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Apply `attributes` to `node`, skipping writes that would not change the
/// tree. Returns the number of writes performed.
pub fn synchronize(tree: &mut DomTree, node: NodeId, attributes: &AttributeSet) -> usize {
    if !tree.is_element(node) {
        tracing::warn!("Skipping attribute sync for missing element {:?}", node);
        return 0;
    }
    let mut writes = 0;
    for (name, value) in attributes.entries() {
        let unchanged = tree.get_attribute(node, name) == value.as_deref();
        if unchanged {
            continue;
        }
        let result = match value {
            Some(value) => tree.set_attribute(node, name, value),
            None => tree.remove_attribute(node, name),
        };
        match result {
            Ok(_) => writes += 1,
            Err(e) => tracing::warn!("Attribute sync failed on {:?}: {}", node, e),
        }
    }
    if writes > 0 {
        tracing::trace!("Synchronized {} attribute(s) on {:?}", writes, node);
    }
    writes
}

/// Synchronize when the relative exists, otherwise log which relative was absent
pub fn synchronize_relative(
    tree: &mut DomTree,
    relative: Option<NodeId>,
    binding: &str,
    attributes: &AttributeSet,
) -> usize {
    match relative {
        Some(node) => synchronize(tree, node, attributes),
        None => {
            tracing::debug!("No {} relative, skipping its attributes", binding);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element() -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let el = tree.create_element("trellis-carousel-slide");
        tree.append_child(tree.root(), el).unwrap();
        (tree, el)
    }

    #[test]
    fn test_sync_is_idempotent() {
        let (mut tree, el) = element();
        let attrs = AttributeSet::new()
            .role(AriaRole::TabPanel)
            .set("aria-roledescription", "slide")
            .set_bool("aria-hidden", false);

        assert_eq!(synchronize(&mut tree, el, &attrs), 3);
        let records = tree.mutations().len();
        assert_eq!(synchronize(&mut tree, el, &attrs), 0);
        assert_eq!(tree.mutations().len(), records);
    }

    #[test]
    fn test_none_removes() {
        let (mut tree, el) = element();
        tree.set_attribute(el, "aria-live", "off").unwrap();
        let attrs = AttributeSet::new().remove("aria-live").flag("hidden", false);
        assert_eq!(synchronize(&mut tree, el, &attrs), 1);
        assert!(!tree.has_attribute(el, "aria-live"));
        assert_eq!(synchronize(&mut tree, el, &attrs), 0);
    }

    #[test]
    fn test_flag_present_is_empty_string() {
        let (mut tree, el) = element();
        synchronize(&mut tree, el, &AttributeSet::new().flag("hidden", true));
        assert_eq!(tree.get_attribute(el, "hidden"), Some(""));
    }

    #[test]
    fn test_missing_element_is_skipped() {
        let mut tree = DomTree::new();
        let text = tree.create_text("x");
        assert_eq!(synchronize(&mut tree, text, &AttributeSet::new().set("a", "b")), 0);
        assert_eq!(
            synchronize_relative(&mut tree, None, "tabs", &AttributeSet::new().set("a", "b")),
            0
        );
    }

    #[test]
    fn test_last_entry_wins_in_get() {
        let attrs = AttributeSet::new().set("tabindex", "0").tabindex(-1);
        assert_eq!(attrs.get("tabindex"), Some(Some("-1")));
        assert_eq!(attrs.get("role"), None);
    }
}
