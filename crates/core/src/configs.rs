//! Document configuration parsing
//!
//! Raw serde representation of a `Yakefile`. Structural rules that serde cannot
//! express (callable/group field misuse, reserved variables, dependency links) are
//! enforced when the document is loaded into a [`crate::tree::TargetTree`].

pub mod document;
