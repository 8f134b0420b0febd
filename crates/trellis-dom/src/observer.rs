//! Mutation Records
//!
//! Every write to the tree is recorded, including writes that store a value
//! equal to the current one. Idempotence is the caller's job.

use crate::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    ChildList,
}

/// Mutation record
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

impl MutationRecord {
    pub fn attribute(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: Some(name.to_string()),
            old_value,
        }
    }

    pub fn child_added(parent: NodeId, child: NodeId) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target: parent,
            added_nodes: vec![child],
            removed_nodes: Vec::new(),
            attribute_name: None,
            old_value: None,
        }
    }

    pub fn child_removed(parent: NodeId, child: NodeId) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target: parent,
            added_nodes: Vec::new(),
            removed_nodes: vec![child],
            attribute_name: None,
            old_value: None,
        }
    }
}

/// Append-only mutation log
#[derive(Debug, Default)]
pub struct MutationLog {
    records: Vec<MutationRecord>,
}

impl MutationLog {
    pub fn push(&mut self, record: MutationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[MutationRecord] {
        &self.records
    }

    pub fn take(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of recorded writes of `name` on `target`
    pub fn attribute_writes(&self, target: NodeId, name: &str) -> usize {
        self.records
            .iter()
            .filter(|r| {
                r.mutation_type == MutationType::Attributes
                    && r.target == target
                    && r.attribute_name.as_deref() == Some(name)
            })
            .count()
    }
}
