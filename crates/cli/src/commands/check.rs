use anyhow::Result;
use colored::*;
use yake_core::manager::YakeManager;

pub fn execute(manager: &YakeManager) -> Result<()> {
    let checked = manager.check()?;
    println!(
        "{} {}",
        "✓".green().bold(),
        format!("{} callable targets are valid", checked).green()
    );
    Ok(())
}
