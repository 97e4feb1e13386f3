//! Execution planning
//!
//! Turns a selected callable into an [`ExecutionPlan`]: the dependency order from
//! [`build_graph`], each target's composed environment, and every step rendered.
//! Rendering happens for the whole plan up front so a template error is reported
//! before anything runs.

use crate::environment::{effective_env, overlay_env, AmbientEnv};
use crate::execution::dependencies::build_graph;
use crate::results::{ExecutionPlan, ListedTarget, PlannedTarget, TargetListing};
use crate::template::render;
use crate::tree::{NodeId, TargetTree};
use crate::types::YakeResult;

/// Render one callable's steps and compose its environment
pub fn plan_target(
    tree: &TargetTree,
    id: NodeId,
    ambient: &AmbientEnv,
) -> YakeResult<PlannedTarget> {
    let node = tree.node(id);
    let steps = tree
        .exec_of(id)
        .iter()
        .map(|step| render(step, tree.meta(), node))
        .collect::<YakeResult<Vec<_>>>()?;

    Ok(PlannedTarget {
        id,
        path: node.path.clone(),
        doc: render(&node.doc, tree.meta(), node)?,
        overlay: overlay_env(tree, id),
        env: effective_env(tree, id, ambient),
        steps,
    })
}

/// Plan the execution of `target` and all of its transitive dependencies
pub fn plan_execution(
    tree: &TargetTree,
    target: NodeId,
    ambient: &AmbientEnv,
) -> YakeResult<ExecutionPlan> {
    let targets = build_graph(tree, target)?
        .into_iter()
        .map(|id| plan_target(tree, id, ambient))
        .collect::<YakeResult<Vec<_>>>()?;

    Ok(ExecutionPlan {
        target: tree.path_of(target).to_string(),
        targets,
    })
}

/// List the immediate children of a group with their rendered docs
pub fn list_children(tree: &TargetTree, id: NodeId) -> YakeResult<TargetListing> {
    let node = tree.node(id);
    let children = tree
        .children_of(id)
        .map(|(name, child)| {
            let child_node = tree.node(child);
            Ok(ListedTarget {
                name: name.to_string(),
                path: child_node.path.clone(),
                target_type: child_node.target_type(),
                doc: render(&child_node.doc, tree.meta(), child_node)?,
            })
        })
        .collect::<YakeResult<Vec<_>>>()?;

    Ok(TargetListing {
        path: node.path.clone(),
        doc: render(&node.doc, tree.meta(), node)?,
        children,
    })
}

/// Validate the whole document: every callable must have an acyclic dependency
/// graph and renderable steps and docs
pub fn check_document(tree: &TargetTree) -> YakeResult<usize> {
    let ambient = AmbientEnv::default();
    let mut checked = 0;
    for id in tree.callables() {
        plan_execution(tree, id, &ambient)?;
        checked += 1;
    }
    for id in tree.node_ids() {
        if tree.children_of(id).next().is_some() {
            list_children(tree, id)?;
        }
    }
    Ok(checked)
}
