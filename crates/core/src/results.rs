//! Result types for yake operations
//!
//! This module contains the result types returned by [`crate::YakeManager`]
//! operations, providing a centralized location for output structures.

use crate::configs::document::TargetType;
use crate::environment::EffectiveEnv;
use crate::tree::NodeId;

/// A callable ready to run: its steps are rendered and its environment composed
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTarget {
    pub id: NodeId,
    pub path: String,
    pub doc: String,
    /// Variables contributed by the document, without the ambient environment
    pub overlay: EffectiveEnv,
    /// The complete environment the steps run in
    pub env: EffectiveEnv,
    pub steps: Vec<String>,
}

/// Targets in execution order, dependencies first and the selected target last
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    pub target: String,
    pub targets: Vec<PlannedTarget>,
}

impl ExecutionPlan {
    pub fn paths(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.path.as_str()).collect()
    }

    pub fn step_count(&self) -> usize {
        self.targets.iter().map(|t| t.steps.len()).sum()
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub targets_run: usize,
    pub steps_run: usize,
}

/// One entry of a group listing
#[derive(Debug, Clone, PartialEq)]
pub struct ListedTarget {
    pub name: String,
    pub path: String,
    pub target_type: TargetType,
    pub doc: String,
}

/// Immediate children of a group (or of the document root)
#[derive(Debug, Clone, PartialEq)]
pub struct TargetListing {
    /// Dotted path of the listed group, empty for the document root
    pub path: String,
    pub doc: String,
    pub children: Vec<ListedTarget>,
}

/// What selecting a path resolves to
#[derive(Debug)]
pub enum Selection {
    /// A group was selected; nothing runs and its children are listed
    Listed(TargetListing),
    /// A callable was selected and ran to completion
    Ran(RunSummary),
}

/// Result of getting the dependency graph
#[derive(Debug)]
pub struct DependencyGraphResult {
    pub graph: petgraph::Graph<String, ()>,
    pub cycles: Vec<Vec<String>>,
}
