//! Target dependency management
//!
//! This module expands a callable's `depends` edges into an execution order and
//! detects cycles, both for a single target and across the whole document.

use std::collections::HashMap;

use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;
use tracing::debug;

use crate::configs::document::TargetType;
use crate::results::DependencyGraphResult;
use crate::tree::{NodeId, TargetTree};
use crate::types::{YakeError, YakeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Compute the execution order for `target`: every transitive dependency exactly
/// once, each after its own dependencies, and `target` last. Independent
/// dependencies keep their `depends` declaration order.
pub fn build_graph(tree: &TargetTree, target: NodeId) -> YakeResult<Vec<NodeId>> {
    if tree.type_of(target) == TargetType::Group {
        return Err(YakeError::config(
            tree.node(target).display_path(),
            "groups have no steps to execute; select one of their targets",
        ));
    }

    let mut marks = HashMap::new();
    let mut stack = Vec::new();
    let mut order = Vec::new();
    visit(tree, target, &mut marks, &mut stack, &mut order)?;

    debug!(
        target = tree.path_of(target),
        order = ?order.iter().map(|id| tree.path_of(*id)).collect::<Vec<_>>(),
        "resolved execution order"
    );
    Ok(order)
}

fn visit(
    tree: &TargetTree,
    id: NodeId,
    marks: &mut HashMap<NodeId, Mark>,
    stack: &mut Vec<NodeId>,
    order: &mut Vec<NodeId>,
) -> YakeResult<()> {
    match marks.get(&id) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::InProgress) => {
            let start = stack.iter().position(|n| *n == id).unwrap_or(0);
            let cycle = stack[start..]
                .iter()
                .chain(std::iter::once(&id))
                .map(|n| tree.path_of(*n).to_string())
                .collect();
            return Err(YakeError::Cycle { cycle });
        }
        None => {}
    }

    marks.insert(id, Mark::InProgress);
    stack.push(id);

    for dependency in tree.depends_of(id) {
        visit(tree, *dependency, marks, stack, order)?;
    }

    stack.pop();
    marks.insert(id, Mark::Done);
    order.push(id);
    Ok(())
}

/// Build the document-wide dependency graph of callables, with every cycle
/// reported as a strongly connected component
pub fn dependency_graph(tree: &TargetTree) -> DependencyGraphResult {
    let mut graph = DiGraph::<String, ()>::new();
    let mut node_indices = HashMap::new();

    for id in tree.callables() {
        let index = graph.add_node(tree.path_of(id).to_string());
        node_indices.insert(id, index);
    }

    // Edge: target -> dependency (dependency runs first)
    for id in tree.callables() {
        for dependency in tree.depends_of(id) {
            if let (Some(&from), Some(&to)) = (node_indices.get(&id), node_indices.get(dependency)) {
                graph.add_edge(from, to, ());
            }
        }
    }

    let mut cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
        .into_iter()
        .filter_map(|component| {
            if component.len() > 1 {
                let mut cycle = component
                    .iter()
                    .map(|node| graph[*node].clone())
                    .collect::<Vec<_>>();
                cycle.sort();
                Some(cycle)
            } else {
                let node = component[0];
                if graph.contains_edge(node, node) {
                    Some(vec![graph[node].clone()])
                } else {
                    None
                }
            }
        })
        .collect();
    cycles.sort();

    DependencyGraphResult { graph, cycles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::document::parse_document;
    use crate::test_support::example_tree;

    fn tree_from(yaml: &str) -> TargetTree {
        TargetTree::from_config(parse_document(yaml).unwrap()).unwrap()
    }

    fn order_of(tree: &TargetTree, path: &str) -> YakeResult<Vec<String>> {
        let id = tree.resolve(path).unwrap();
        Ok(build_graph(tree, id)?
            .into_iter()
            .map(|id| tree.path_of(id).to_string())
            .collect())
    }

    #[test]
    fn test_target_without_depends_runs_alone() {
        let tree = example_tree();
        for id in tree.callables().filter(|id| tree.depends_of(*id).is_empty()) {
            assert_eq!(build_graph(&tree, id).unwrap(), vec![id]);
        }
    }

    #[test]
    fn test_postgres_order_follows_declaration() {
        let tree = example_tree();
        assert_eq!(
            order_of(&tree, "docker.postgres").unwrap(),
            vec!["base", "docker2", "docker3.mysql2.mysqlsub", "docker.postgres"]
        );
    }

    #[test]
    fn test_shared_dependency_runs_once() {
        let tree = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            targets:
              base: { meta: { doc: b, type: callable } }
              left: { meta: { doc: l, type: callable, depends: [base] } }
              right: { meta: { doc: r, type: callable, depends: [base] } }
              top: { meta: { doc: t, type: callable, depends: [left, right, base] } }
            "#,
        );
        assert_eq!(
            order_of(&tree, "top").unwrap(),
            vec!["base", "left", "right", "top"]
        );
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        let tree = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            targets:
              a: { meta: { doc: a, type: callable, depends: [grp.c] } }
              b: { meta: { doc: b, type: callable, depends: [a] } }
              grp:
                meta: { doc: g, type: group }
                targets:
                  c: { meta: { doc: c, type: callable } }
                  d: { meta: { doc: d, type: callable, depends: [b, a] } }
            "#,
        );
        let id = tree.resolve("grp.d").unwrap();
        let order = build_graph(&tree, id).unwrap();
        for (position, node) in order.iter().enumerate() {
            for dependency in tree.depends_of(*node) {
                let dep_position = order.iter().position(|n| n == dependency).unwrap();
                assert!(dep_position < position);
            }
        }
        assert_eq!(order.last(), Some(&id));
    }

    #[test]
    fn test_cycle_is_reported_with_path() {
        let tree = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            targets:
              start: { meta: { doc: s, type: callable, depends: [a] } }
              a: { meta: { doc: a, type: callable, depends: [b] } }
              b: { meta: { doc: b, type: callable, depends: [c] } }
              c: { meta: { doc: c, type: callable, depends: [a] } }
            "#,
        );
        match order_of(&tree, "start").unwrap_err() {
            YakeError::Cycle { cycle } => assert_eq!(cycle, vec!["a", "b", "c", "a"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let tree = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            targets:
              loop: { meta: { doc: l, type: callable, depends: [loop] } }
            "#,
        );
        match order_of(&tree, "loop").unwrap_err() {
            YakeError::Cycle { cycle } => assert_eq!(cycle, vec!["loop", "loop"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unrelated_cycle_does_not_block_target() {
        let tree = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            targets:
              fine: { meta: { doc: f, type: callable } }
              a: { meta: { doc: a, type: callable, depends: [b] } }
              b: { meta: { doc: b, type: callable, depends: [a] } }
            "#,
        );
        assert_eq!(order_of(&tree, "fine").unwrap(), vec!["fine"]);
        assert!(order_of(&tree, "a").is_err());
    }

    #[test]
    fn test_group_cannot_be_built() {
        let tree = example_tree();
        let err = order_of(&tree, "docker3").unwrap_err();
        assert!(matches!(err, YakeError::Config { ref path, .. } if path == "docker3"));
    }

    #[test]
    fn test_document_graph_reports_cycles() {
        let tree = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            targets:
              fine: { meta: { doc: f, type: callable, depends: [a] } }
              a: { meta: { doc: a, type: callable, depends: [b] } }
              b: { meta: { doc: b, type: callable, depends: [a] } }
            "#,
        );
        let result = dependency_graph(&tree);
        assert_eq!(result.graph.node_count(), 3);
        assert_eq!(result.graph.edge_count(), 3);
        assert_eq!(result.cycles, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_example_graph_is_acyclic() {
        let result = dependency_graph(&example_tree());
        assert_eq!(result.graph.node_count(), 5);
        assert_eq!(result.graph.edge_count(), 3);
        assert!(result.cycles.is_empty());
    }
}
