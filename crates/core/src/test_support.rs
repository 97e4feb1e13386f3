//! Shared fixtures for unit tests

use crate::configs::document::parse_document;
use crate::tree::TargetTree;

/// The demo document shipped in `demos/Yakefile`
pub(crate) const EXAMPLE_DOCUMENT: &str = include_str!("../../../demos/Yakefile");

pub(crate) fn example_tree() -> TargetTree {
    let config = parse_document(EXAMPLE_DOCUMENT).expect("demo document should parse");
    TargetTree::from_config(config).expect("demo document should load")
}
