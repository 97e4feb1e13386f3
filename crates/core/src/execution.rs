//! Target execution module
//!
//! This module handles the actual execution of targets including dependency
//! ordering, step invocation and fail-fast reporting.

pub mod command;
pub mod dependencies;
pub mod runner;

pub use command::{ShellRunner, StepRunner};
pub use dependencies::{build_graph, dependency_graph};
pub use runner::TargetRunner;
