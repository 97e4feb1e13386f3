//! Yake Core Library
//!
//! This is the core library for the yake task runner. It loads a `Yakefile` (a
//! declarative tree of group and callable targets), resolves dotted target paths,
//! composes layered environments, renders templates and runs command steps in
//! dependency order.
//!
//! ## Architecture
//!
//! - [`manager`] - High-level interface used by the CLI
//! - [`configs`] - Document parsing
//! - [`discovery`] - Recursive document includes
//! - [`tree`] - Target tree and path resolution
//! - [`environment`] - Layered environment composition
//! - [`template`] - `{{namespace.field}}` placeholder rendering
//! - [`planning`] - Execution plans, group listings and document checks
//! - [`execution`] - Dependency ordering and step execution
//! - [`results`] - Result types for manager operations
//! - [`types`] - Error types and type aliases

pub mod colors;
pub mod configs;
pub mod discovery;
pub mod environment;
pub mod execution;
pub mod manager;
pub mod planning;
pub mod results;
pub mod template;
pub mod tree;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export the main types for easier usage
pub use manager::{YakeManager, YakeManagerConfig};
pub use types::{YakeError, YakeResult};
