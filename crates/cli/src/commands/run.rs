use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use colored::*;
use yake_core::manager::YakeManager;
use yake_core::results::Selection;
use yake_core::YakeError;

use super::list::print_listing;

pub fn execute(manager: &YakeManager, target: Option<&str>) -> Result<()> {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {e}"))?;

    let selection = match manager.select(target, cancelled) {
        Ok(selection) => selection,
        Err(err @ YakeError::Resolution { referenced_by: None, .. }) => {
            eprintln!(
                "{} {}",
                "Available targets:".bold(),
                manager.callable_paths().join(", ")
            );
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    match selection {
        Selection::Listed(listing) => print_listing(&listing),
        Selection::Ran(summary) => {
            println!();
            println!(
                "{} {}",
                "✓".green().bold(),
                format!(
                    "{} targets, {} steps completed successfully!",
                    summary.targets_run, summary.steps_run
                )
                .green()
                .bold()
            );
        }
    }

    Ok(())
}
