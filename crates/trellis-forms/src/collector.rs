//! Collectors
//!
//! Context-scoped lookup tables from element identity to a live value
//! (usually the element's node id). Entries live until `delete` is called.

use std::collections::HashMap;
use std::rc::Rc;

use trellis_dom::Uid;

use crate::control::Target;

/// Identity of an external target object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetKey(usize);

impl TargetKey {
    pub fn of(target: &Target) -> Self {
        Self(Rc::as_ptr(target) as *const () as usize)
    }
}

/// Lookup by `id` attribute or library uid
#[derive(Debug)]
pub struct Collector<V> {
    by_id: HashMap<String, V>,
    by_uid: HashMap<Uid, V>,
    /// Id each uid was last registered under, so renames drop the stale key
    ids: HashMap<Uid, String>,
}

impl<V> Default for Collector<V> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            by_uid: HashMap::new(),
            ids: HashMap::new(),
        }
    }
}

impl<V: Clone> Collector<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite under every applicable key
    pub fn set(&mut self, uid: Uid, id: Option<&str>, value: V) {
        if let Some(previous) = self.ids.remove(&uid) {
            if id != Some(previous.as_str()) {
                self.by_id.remove(&previous);
            }
        }
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            self.by_id.insert(id.to_string(), value.clone());
            self.ids.insert(uid, id.to_string());
        }
        self.by_uid.insert(uid, value);
    }

    pub fn get_by_id(&self, id: &str) -> Option<&V> {
        self.by_id.get(id)
    }

    pub fn get_by_uid(&self, uid: Uid) -> Option<&V> {
        self.by_uid.get(&uid)
    }

    /// Remove under every key the uid was registered with
    pub fn delete(&mut self, uid: Uid) -> Option<V> {
        if let Some(id) = self.ids.remove(&uid) {
            self.by_id.remove(&id);
        }
        self.by_uid.remove(&uid)
    }

    pub fn len(&self) -> usize {
        self.by_uid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uid.is_empty()
    }
}

/// Collector with an extra `(target, path)` key for bound form controls
#[derive(Debug)]
pub struct FormControlCollector<V> {
    inner: Collector<V>,
    by_target: HashMap<(TargetKey, String), V>,
    targets: HashMap<Uid, (TargetKey, String)>,
}

impl<V> Default for FormControlCollector<V> {
    fn default() -> Self {
        Self {
            inner: Collector::default(),
            by_target: HashMap::new(),
            targets: HashMap::new(),
        }
    }
}

impl<V: Clone> FormControlCollector<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; a changed target/path drops the old composite entry first
    pub fn set(&mut self, uid: Uid, id: Option<&str>, binding: Option<(&Target, &str)>, value: V) {
        if let Some(old) = self.targets.remove(&uid) {
            self.by_target.remove(&old);
        }
        if let Some((target, path)) = binding {
            let key = (TargetKey::of(target), path.to_string());
            self.by_target.insert(key.clone(), value.clone());
            self.targets.insert(uid, key);
        }
        self.inner.set(uid, id, value);
    }

    pub fn get_by_id(&self, id: &str) -> Option<&V> {
        self.inner.get_by_id(id)
    }

    pub fn get_by_uid(&self, uid: Uid) -> Option<&V> {
        self.inner.get_by_uid(uid)
    }

    pub fn get_by_target(&self, target: &Target, path: &str) -> Option<&V> {
        self.by_target.get(&(TargetKey::of(target), path.to_string()))
    }

    pub fn delete(&mut self, uid: Uid) -> Option<V> {
        if let Some(key) = self.targets.remove(&uid) {
            self.by_target.remove(&key);
        }
        self.inner.delete(uid)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::cell::RefCell;

    #[test]
    fn test_set_get_delete() {
        let mut collector = Collector::new();
        collector.set(Uid(1), Some("carousel"), "a");
        assert_eq!(collector.get_by_id("carousel"), Some(&"a"));
        assert_eq!(collector.get_by_uid(Uid(1)), Some(&"a"));

        assert_eq!(collector.delete(Uid(1)), Some("a"));
        assert_eq!(collector.get_by_id("carousel"), None);
        assert_eq!(collector.get_by_uid(Uid(1)), None);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_reregistration_under_new_id() {
        let mut collector = Collector::new();
        collector.set(Uid(1), Some("old"), 1);
        collector.set(Uid(1), Some("new"), 1);
        assert_eq!(collector.get_by_id("old"), None);
        assert_eq!(collector.get_by_id("new"), Some(&1));
    }

    #[test]
    fn test_target_key() {
        let target: Target = Rc::new(RefCell::new(json!({})));
        let other: Target = Rc::new(RefCell::new(Value::Null));
        let mut collector = FormControlCollector::new();
        collector.set(Uid(7), None, Some((&target, "user.name")), 'x');

        assert_eq!(collector.get_by_target(&target, "user.name"), Some(&'x'));
        assert_eq!(collector.get_by_target(&other, "user.name"), None);
        assert_eq!(collector.get_by_target(&target, "user.age"), None);
    }

    #[test]
    fn test_target_change_drops_old_entry() {
        let first: Target = Rc::new(RefCell::new(json!({})));
        let second: Target = Rc::new(RefCell::new(json!({})));
        let mut collector = FormControlCollector::new();
        collector.set(Uid(7), None, Some((&first, "a")), 1);
        collector.set(Uid(7), None, Some((&second, "b")), 1);

        assert_eq!(collector.get_by_target(&first, "a"), None);
        assert_eq!(collector.get_by_target(&second, "b"), Some(&1));

        collector.delete(Uid(7));
        assert_eq!(collector.get_by_target(&second, "b"), None);
        assert_eq!(collector.get_by_uid(Uid(7)), None);
    }
}
