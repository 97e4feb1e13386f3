use anyhow::Result;
use colored::*;
use yake_core::colors::target_color;
use yake_core::manager::YakeManager;

pub fn execute(manager: &YakeManager, target: &str) -> Result<()> {
    println!("{} {}", "Execution plan for".bold(), target.cyan());

    let plan = manager.plan(target)?;

    println!("\n{}:", "Execution order".bold());
    for (i, planned) in plan.targets.iter().enumerate() {
        println!(
            "  {}. {}",
            i + 1,
            planned.path.color(target_color(&planned.path)).bold()
        );
        for (key, value) in &planned.overlay {
            println!("       {} {}={}", "env".dimmed(), key, value);
        }
        for (index, step) in planned.steps.iter().enumerate() {
            let mut lines = step.lines();
            if let Some(first) = lines.next() {
                println!("       {} {}", format!("[{}]", index).dimmed(), first);
            }
            for line in lines {
                println!("           {}", line);
            }
        }
    }

    Ok(())
}
