//! High-level target runner
//!
//! This module runs an [`ExecutionPlan`] one step at a time: dependencies first,
//! the selected target last, stopping at the first failing step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::*;
use tracing::{debug, info};

use crate::colors::target_color;
use crate::environment::AmbientEnv;
use crate::execution::command::StepRunner;
use crate::planning::plan_execution;
use crate::results::{ExecutionPlan, PlannedTarget, RunSummary};
use crate::tree::{NodeId, TargetTree};
use crate::types::{YakeError, YakeResult};

/// Runs callables and their dependencies through a [`StepRunner`]
pub struct TargetRunner<'a, R: StepRunner> {
    tree: &'a TargetTree,
    ambient: &'a AmbientEnv,
    runner: R,
    cancelled: Arc<AtomicBool>,
    quiet: bool,
}

impl<'a, R: StepRunner> TargetRunner<'a, R> {
    pub fn new(tree: &'a TargetTree, ambient: &'a AmbientEnv, runner: R) -> Self {
        Self {
            tree,
            ambient,
            runner,
            cancelled: Arc::new(AtomicBool::new(false)),
            quiet: false,
        }
    }

    /// Share a flag that stops the run before the next step once set
    pub fn with_cancellation(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Suppress the per-target headers printed to stdout
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Plan and run `target` with all of its dependencies
    pub fn run(&self, target: NodeId) -> YakeResult<RunSummary> {
        let plan = plan_execution(self.tree, target, self.ambient)?;
        self.run_plan(&plan)
    }

    /// Run an already rendered plan in order, failing fast
    pub fn run_plan(&self, plan: &ExecutionPlan) -> YakeResult<RunSummary> {
        let mut summary = RunSummary::default();

        for target in &plan.targets {
            self.print_header(target);
            for (index, step) in target.steps.iter().enumerate() {
                if self.cancelled.load(Ordering::SeqCst) {
                    return Err(YakeError::Interrupted {
                        target: target.path.clone(),
                        step: index,
                    });
                }

                info!(target_path = %target.path, step = index, "running step");
                let code = self.runner.run_step(&target.path, index, step, &target.env)?;
                summary.steps_run += 1;

                if code != 0 {
                    return Err(YakeError::Execution {
                        target: target.path.clone(),
                        step: index,
                        code,
                    });
                }
            }
            summary.targets_run += 1;
            debug!(target_path = %target.path, "target completed");
        }

        Ok(summary)
    }

    fn print_header(&self, target: &PlannedTarget) {
        if self.quiet {
            return;
        }
        println!();
        println!(
            "┌─ {} {}",
            "Running".bold(),
            target.path.color(target_color(&target.path)).bold()
        );
        println!("└─ {}", target.doc.bright_black());
    }
}
