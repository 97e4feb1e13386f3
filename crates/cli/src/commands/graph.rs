use anyhow::Result;
use colored::*;
use yake_core::colors::target_color;
use yake_core::manager::YakeManager;

/// Print one line per callable: its direct dependencies in declaration order,
/// with the cycle it belongs to, if any
pub fn execute(manager: &YakeManager) -> Result<()> {
    let result = manager.dependency_graph();
    let graph = &result.graph;

    for node_index in graph.node_indices() {
        let path = &graph[node_index];
        // newest edge first
        let mut deps: Vec<&str> = graph
            .neighbors(node_index)
            .map(|neighbor| graph[neighbor].as_str())
            .collect();
        deps.reverse();

        let label = path.color(target_color(path)).bold();
        let edges = if deps.is_empty() {
            "(no dependencies)".dimmed().to_string()
        } else {
            format!("{} {}", "depends on:".dimmed(), deps.join(", "))
        };

        match result.cycles.iter().find(|cycle| cycle.contains(path)) {
            Some(cycle) => println!(
                "{} {} {}",
                label,
                edges,
                format!("[cycle: {}]", cycle.join(", ")).red().bold()
            ),
            None => println!("{} {}", label, edges),
        }
    }

    let summary = format!(
        "{} targets, {} edges, {} cycles",
        graph.node_count(),
        graph.edge_count(),
        result.cycles.len()
    );
    if result.cycles.is_empty() {
        println!("\n{}", summary.dimmed());
    } else {
        println!("\n{}", summary.yellow().bold());
    }

    Ok(())
}
