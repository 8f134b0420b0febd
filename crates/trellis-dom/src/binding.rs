//! Query Bindings
//!
//! Declarative relationships between a widget element and its relatives,
//! resolved against the arena. Results are memoized per tree generation, so
//! any structural change or attribute value change is visible on the next
//! read without explicit invalidation.

use std::collections::HashMap;

use crate::selector::SelectorList;
use crate::{DomTree, NodeId};

/// A named relationship: `{ name, selector, all?, closest?, shadow? }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub name: &'static str,
    pub selector: &'static str,
    /// Resolve to every match instead of the first
    pub all: bool,
    /// Walk self and ancestors instead of descendants
    pub closest: bool,
    /// Query inside the host's shadow root
    pub shadow: bool,
}

impl Binding {
    /// First matching descendant
    pub const fn one(name: &'static str, selector: &'static str) -> Self {
        Self {
            name,
            selector,
            all: false,
            closest: false,
            shadow: false,
        }
    }

    /// Every matching descendant, in tree order
    pub const fn all(name: &'static str, selector: &'static str) -> Self {
        Self {
            name,
            selector,
            all: true,
            closest: false,
            shadow: false,
        }
    }

    /// Nearest matching inclusive ancestor
    pub const fn closest(name: &'static str, selector: &'static str) -> Self {
        Self {
            name,
            selector,
            all: false,
            closest: true,
            shadow: false,
        }
    }

    /// Scope the query to the shadow tree
    pub const fn shadow(self) -> Self {
        Self {
            shadow: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    host: NodeId,
    binding: Binding,
}

#[derive(Debug)]
struct CacheEntry {
    generation: u64,
    nodes: Vec<NodeId>,
}

/// Generation-validated query cache
#[derive(Debug, Default)]
pub(crate) struct QueryCache {
    entries: HashMap<CacheKey, CacheEntry>,
    selectors: HashMap<&'static str, Option<SelectorList>>,
    hits: u64,
    misses: u64,
}

impl QueryCache {
    fn selector(&mut self, source: &'static str) -> Option<SelectorList> {
        self.selectors
            .entry(source)
            .or_insert_with(|| match SelectorList::parse(source) {
                Ok(list) => Some(list),
                Err(e) => {
                    tracing::warn!("Binding selector rejected: {}", e);
                    None
                }
            })
            .clone()
    }
}

impl DomTree {
    fn resolve(&self, host: NodeId, binding: &Binding) -> Vec<NodeId> {
        let key = CacheKey {
            host,
            binding: *binding,
        };
        let generation = self.generation();
        let mut cache = self.cache.borrow_mut();
        if let Some(entry) = cache.entries.get(&key) {
            if entry.generation == generation {
                let nodes = entry.nodes.clone();
                cache.hits += 1;
                return nodes;
            }
        }
        cache.misses += 1;

        let Some(list) = cache.selector(binding.selector) else {
            return Vec::new();
        };
        let nodes = if binding.closest {
            std::iter::once(host)
                .chain(self.ancestors(host))
                .find(|&n| list.matches(self, n))
                .into_iter()
                .collect()
        } else {
            let scope = if binding.shadow {
                self.shadow_root(host)
            } else {
                Some(host)
            };
            match scope {
                Some(scope) => {
                    let mut found = self.descendants(scope).into_iter().filter(|&n| list.matches(self, n));
                    if binding.all {
                        found.collect()
                    } else {
                        found.next().into_iter().collect()
                    }
                }
                None => Vec::new(),
            }
        };
        cache.entries.insert(
            key,
            CacheEntry {
                generation,
                nodes: nodes.clone(),
            },
        );
        nodes
    }

    /// Resolve a singular binding
    pub fn query_one(&self, host: NodeId, binding: &Binding) -> Option<NodeId> {
        self.resolve(host, binding).first().copied()
    }

    /// Resolve a binding to an ordered, possibly empty list
    pub fn query_all(&self, host: NodeId, binding: &Binding) -> Vec<NodeId> {
        self.resolve(host, binding)
    }

    /// (hits, misses) of the binding cache
    pub fn query_cache_stats(&self) -> (u64, u64) {
        let cache = self.cache.borrow();
        (cache.hits, cache.misses)
    }
}
