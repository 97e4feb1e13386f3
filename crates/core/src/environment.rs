//! Environment composition
//!
//! A callable's environment is the ambient process environment overlaid with every
//! `env` mapping on the path from the document root down to the callable itself.
//! Deeper overlays win on collision.

use std::collections::BTreeMap;
use std::ffi::OsString;

use tracing::warn;

use crate::tree::{NodeId, TargetTree};

/// A fully composed variable mapping, sorted by name
pub type EffectiveEnv = BTreeMap<String, String>;

/// Read-only snapshot of the process environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmbientEnv {
    vars: BTreeMap<String, String>,
}

impl AmbientEnv {
    /// Capture the current process environment. Variables that are not valid
    /// unicode are skipped with a warning.
    pub fn capture() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    fn from_os_vars<I: IntoIterator<Item = (OsString, OsString)>>(vars: I) -> Self {
        let vars = vars
            .into_iter()
            .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (Ok(key), Err(_)) => {
                    warn!(variable = %key, "skipping environment variable with a non-unicode value");
                    None
                }
                (Err(key), _) => {
                    warn!(
                        variable = %key.to_string_lossy(),
                        "skipping environment variable with a non-unicode name"
                    );
                    None
                }
            })
            .collect();
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AmbientEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// The overlays alone, without the ambient base
pub fn overlay_env(tree: &TargetTree, id: NodeId) -> EffectiveEnv {
    let mut env = EffectiveEnv::new();
    for level in tree.ancestry(id) {
        env.extend(
            tree.node(level)
                .env
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
    }
    env
}

/// The environment a callable's steps run in
pub fn effective_env(tree: &TargetTree, id: NodeId, ambient: &AmbientEnv) -> EffectiveEnv {
    let mut env = ambient.vars.clone();
    env.extend(overlay_env(tree, id));
    env
}
