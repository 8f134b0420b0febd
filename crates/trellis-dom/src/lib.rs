//! Trellis DOM - Element tree for headless widgets
//!
//! Arena-allocated node tree with attribute reflection, mutation records,
//! a small selector engine and declarative query bindings.

mod binding;
mod custom_elements;
mod events;
mod node;
mod observer;
mod selector;
mod tree;
mod uid;

pub use binding::Binding;
pub use custom_elements::{CustomElementError, DefinitionRegistry, ElementDefinition};
pub use events::{KeyboardInput, UiEvent, UiEventKind};
pub use node::{Attribute, ElementData, Node, NodeData};
pub use observer::{MutationLog, MutationRecord, MutationType};
pub use selector::SelectorList;
pub use tree::{Ancestors, Children, DomTree};
pub use uid::{Uid, UidGenerator};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Document node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this ID refers to a node at all
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// DOM error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(&'static str),

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0:?} already hosts a shadow root")]
    ShadowRootExists(NodeId),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}
