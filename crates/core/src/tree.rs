//! Target tree and path resolution
//!
//! The parsed document is flattened into a node table indexed by [`NodeId`]. Every
//! `depends` entry is resolved to a [`NodeId`] once, after the whole tree is loaded,
//! so later stages work on an integer graph instead of dotted strings.

use tracing::debug;

use crate::configs::document::{
    DocumentMeta, EnvOverlay, TargetConfig, TargetType, YakeFileConfig,
};
use crate::types::{YakeError, YakeResult};

/// Variables that always come from the ambient environment and may not be overlaid
pub const RESERVED_ENV_VARS: &[&str] = &["TERM", "TZ", "LANG", "PATH", "HOME"];

/// Display name used for the document root in diagnostics
pub const ROOT_DISPLAY_NAME: &str = "<root>";

/// Index of a node in a [`TargetTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group {
        children: Vec<NodeId>,
    },
    Callable {
        exec: Vec<String>,
        depends: Vec<NodeId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    /// Dotted path from the document root, empty for the root itself
    pub path: String,
    pub doc: String,
    /// The node's own `meta.version`, the document version for the root
    pub version: Option<String>,
    pub parent: Option<NodeId>,
    pub env: EnvOverlay,
    pub kind: NodeKind,
}

impl Node {
    pub fn target_type(&self) -> TargetType {
        match self.kind {
            NodeKind::Group { .. } => TargetType::Group,
            NodeKind::Callable { .. } => TargetType::Callable,
        }
    }

    pub fn display_path(&self) -> &str {
        if self.path.is_empty() {
            ROOT_DISPLAY_NAME
        } else {
            &self.path
        }
    }
}

/// The loaded document: a rooted tree of groups and callables
#[derive(Debug, Clone)]
pub struct TargetTree {
    meta: DocumentMeta,
    nodes: Vec<Node>,
}

impl TargetTree {
    /// Build the tree from a parsed document, enforcing the structural rules
    pub fn from_config(config: YakeFileConfig) -> YakeResult<Self> {
        let root_env = config.env.unwrap_or_default();
        check_env(ROOT_DISPLAY_NAME, &root_env)?;

        let mut tree = Self {
            nodes: vec![Node {
                name: String::new(),
                path: String::new(),
                doc: config.meta.doc.clone(),
                version: Some(config.meta.version.clone()),
                parent: None,
                env: root_env,
                kind: NodeKind::Group {
                    children: Vec::new(),
                },
            }],
            meta: config.meta,
        };

        let mut pending = Vec::new();
        for (name, target) in config.targets {
            tree.add_target(tree.root(), name, target, &mut pending)?;
        }
        tree.link_dependencies(pending)?;

        debug!(nodes = tree.nodes.len(), "loaded target tree");
        Ok(tree)
    }

    fn add_target(
        &mut self,
        parent: NodeId,
        name: String,
        config: TargetConfig,
        pending: &mut Vec<(NodeId, Vec<String>)>,
    ) -> YakeResult<()> {
        let path = match self.node(parent).path.as_str() {
            "" => name.clone(),
            parent_path => format!("{}.{}", parent_path, name),
        };

        if name.is_empty() || name.contains('.') {
            return Err(YakeError::config(
                path,
                "target names must be non-empty and must not contain '.'",
            ));
        }

        let env = config.env.unwrap_or_default();
        check_env(&path, &env)?;

        let kind = match config.meta.target_type {
            TargetType::Callable => {
                if config.targets.is_some() {
                    return Err(YakeError::config(
                        path,
                        "callable targets must not define 'targets'",
                    ));
                }
                NodeKind::Callable {
                    exec: config.exec.unwrap_or_default(),
                    depends: Vec::new(),
                }
            }
            TargetType::Group => {
                if config.exec.is_some() {
                    return Err(YakeError::config(path, "group targets must not define 'exec'"));
                }
                if config.meta.depends.is_some() {
                    return Err(YakeError::config(
                        path,
                        "group targets must not define 'depends'",
                    ));
                }
                NodeKind::Group {
                    children: Vec::new(),
                }
            }
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name,
            path,
            doc: config.meta.doc,
            version: config.meta.version,
            parent: Some(parent),
            env,
            kind,
        });
        if let NodeKind::Group { children } = &mut self.nodes[parent.0].kind {
            children.push(id);
        }

        if let Some(depends) = config.meta.depends {
            pending.push((id, depends));
        }

        for (child_name, child) in config.targets.unwrap_or_default() {
            self.add_target(id, child_name, child, pending)?;
        }

        Ok(())
    }

    fn link_dependencies(&mut self, pending: Vec<(NodeId, Vec<String>)>) -> YakeResult<()> {
        for (id, depends) in pending {
            let owner = self.node(id).path.clone();
            let mut resolved = Vec::with_capacity(depends.len());

            for (index, dependency) in depends.iter().enumerate() {
                let dep_id = self.resolve(dependency).map_err(|_| YakeError::Resolution {
                    path: dependency.clone(),
                    referenced_by: Some(format!("{} depends[{}]", owner, index)),
                })?;

                if self.type_of(dep_id) == TargetType::Group {
                    return Err(YakeError::config(
                        owner,
                        format!(
                            "depends[{}] references group '{}'; only callable targets can be depended upon",
                            index, dependency
                        ),
                    ));
                }
                resolved.push(dep_id);
            }

            if let NodeKind::Callable { depends, .. } = &mut self.nodes[id.0].kind {
                *depends = resolved;
            }
        }
        Ok(())
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Resolve an absolute dotted path such as `docker3.mysql2.mysqlsub`
    pub fn resolve(&self, path: &str) -> YakeResult<NodeId> {
        let not_found = || YakeError::Resolution {
            path: path.to_string(),
            referenced_by: None,
        };

        if path.is_empty() {
            return Err(not_found());
        }

        let mut current = self.root();
        for segment in path.split('.') {
            current = self
                .children_of(current)
                .find(|(name, _)| *name == segment)
                .map(|(_, id)| id)
                .ok_or_else(not_found)?;
        }
        Ok(current)
    }

    /// Resolve a path, treating an empty path as the document root
    pub fn resolve_or_root(&self, path: Option<&str>) -> YakeResult<NodeId> {
        match path {
            None | Some("") => Ok(self.root()),
            Some(path) => self.resolve(path),
        }
    }

    pub fn type_of(&self, id: NodeId) -> TargetType {
        self.node(id).target_type()
    }

    /// Children of a group in declaration order; callables have none
    pub fn children_of(&self, id: NodeId) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        let children: &[NodeId] = match &self.node(id).kind {
            NodeKind::Group { children } => children,
            NodeKind::Callable { .. } => &[],
        };
        children
            .iter()
            .map(move |child| (self.node(*child).name.as_str(), *child))
    }

    /// Dependencies of a callable in declaration order; groups have none
    pub fn depends_of(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Callable { depends, .. } => depends,
            NodeKind::Group { .. } => &[],
        }
    }

    /// Command steps of a callable; groups have none
    pub fn exec_of(&self, id: NodeId) -> &[String] {
        match &self.node(id).kind {
            NodeKind::Callable { exec, .. } => exec,
            NodeKind::Group { .. } => &[],
        }
    }

    pub fn path_of(&self, id: NodeId) -> &str {
        &self.node(id).path
    }

    /// The chain of nodes from the root down to `id`, inclusive
    pub fn ancestry(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// All nodes in declaration order, root first
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// All callables in declaration order
    pub fn callables(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.node_ids()
            .filter(|id| self.type_of(*id) == TargetType::Callable)
    }

    pub fn callable_paths(&self) -> Vec<String> {
        self.callables()
            .map(|id| self.path_of(id).to_string())
            .collect()
    }
}

fn check_env(owner: &str, env: &EnvOverlay) -> YakeResult<()> {
    if let Some(key) = env
        .keys()
        .find(|key| RESERVED_ENV_VARS.contains(&key.as_str()))
    {
        return Err(YakeError::config(
            owner,
            format!("env variable '{}' is reserved and cannot be overridden", key),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::document::parse_document;
    use crate::test_support::example_tree;

    fn tree_from(yaml: &str) -> YakeResult<TargetTree> {
        TargetTree::from_config(parse_document(yaml)?)
    }

    #[test]
    fn test_resolve_top_level_and_nested_paths() {
        let tree = example_tree();
        let base = tree.resolve("base").unwrap();
        assert_eq!(tree.type_of(base), TargetType::Callable);

        let nested = tree.resolve("docker3.mysql2.mysqlsub").unwrap();
        assert_eq!(tree.node(nested).name, "mysqlsub");
        assert_eq!(tree.type_of(tree.resolve("docker3").unwrap()), TargetType::Group);
    }

    #[test]
    fn test_resolve_missing_segment_fails() {
        let tree = example_tree();
        for path in ["mysqlsub", "docker3.mysql3", "base.child", "", "docker..postgres"] {
            let err = tree.resolve(path).unwrap_err();
            assert!(matches!(err, YakeError::Resolution { .. }), "{}", path);
        }
    }

    #[test]
    fn test_resolve_round_trips_every_node_path() {
        let tree = example_tree();
        for id in tree.node_ids().skip(1) {
            let path = tree.path_of(id);
            assert_eq!(tree.resolve(path).unwrap(), id);
            assert_eq!(tree.path_of(tree.resolve(path).unwrap()), path);
        }
    }

    #[test]
    fn test_children_in_declaration_order() {
        let tree = example_tree();
        let docker3 = tree.resolve("docker3").unwrap();
        let names: Vec<_> = tree.children_of(docker3).map(|(name, _)| name).collect();
        assert_eq!(names, vec!["mysql", "mysql2"]);

        let top: Vec<_> = tree.children_of(tree.root()).map(|(name, _)| name).collect();
        assert_eq!(top, vec!["base", "docker", "docker2", "docker3"]);
    }

    #[test]
    fn test_depends_are_linked_in_order() {
        let tree = example_tree();
        let postgres = tree.resolve("docker.postgres").unwrap();
        let deps: Vec<_> = tree
            .depends_of(postgres)
            .iter()
            .map(|id| tree.path_of(*id))
            .collect();
        assert_eq!(deps, vec!["base", "docker2", "docker3.mysql2.mysqlsub"]);
    }

    #[test]
    fn test_ancestry_runs_root_to_leaf() {
        let tree = example_tree();
        let sub = tree.resolve("docker3.mysql2.mysqlsub").unwrap();
        let chain: Vec<_> = tree
            .ancestry(sub)
            .into_iter()
            .map(|id| tree.node(id).display_path().to_string())
            .collect();
        assert_eq!(
            chain,
            vec!["<root>", "docker3", "docker3.mysql2", "docker3.mysql2.mysqlsub"]
        );
    }

    #[test]
    fn test_callable_paths() {
        let tree = example_tree();
        assert_eq!(
            tree.callable_paths(),
            vec![
                "base",
                "docker.postgres",
                "docker2",
                "docker3.mysql",
                "docker3.mysql2.mysqlsub"
            ]
        );
    }

    #[test]
    fn test_callable_with_targets_is_rejected() {
        let err = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            targets:
              base:
                meta: { doc: b, type: callable }
                targets:
                  sub: { meta: { doc: s, type: callable } }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, YakeError::Config { ref path, .. } if path == "base"));
    }

    #[test]
    fn test_group_with_exec_is_rejected() {
        let err = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            targets:
              outer:
                meta: { doc: o, type: group }
                targets:
                  inner:
                    meta: { doc: i, type: group }
                    exec: [ "echo nope" ]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, YakeError::Config { ref path, .. } if path == "outer.inner"));
    }

    #[test]
    fn test_group_with_depends_is_rejected() {
        let err = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            targets:
              base: { meta: { doc: b, type: callable } }
              grp: { meta: { doc: g, type: group, depends: [base] } }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, YakeError::Config { ref path, .. } if path == "grp"));
    }

    #[test]
    fn test_depending_on_group_is_rejected() {
        let err = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            targets:
              grp:
                meta: { doc: g, type: group }
                targets:
                  leaf: { meta: { doc: l, type: callable } }
              top: { meta: { doc: t, type: callable, depends: [grp] } }
            "#,
        )
        .unwrap_err();
        match err {
            YakeError::Config { path, message } => {
                assert_eq!(path, "top");
                assert!(message.contains("group 'grp'"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unknown_dependency_reports_reference() {
        let err = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            targets:
              base: { meta: { doc: b, type: callable } }
              top: { meta: { doc: t, type: callable, depends: [base, missing.thing] } }
            "#,
        )
        .unwrap_err();
        match err {
            YakeError::Resolution {
                path,
                referenced_by,
            } => {
                assert_eq!(path, "missing.thing");
                assert_eq!(referenced_by.as_deref(), Some("top depends[1]"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_reserved_env_vars_are_rejected() {
        let err = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            env:
              PATH: $HOME/bin:$PATH
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, YakeError::Config { ref path, .. } if path == ROOT_DISPLAY_NAME));

        let err = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            targets:
              grp:
                meta: { doc: g, type: group }
                env: { HOME: /tmp }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, YakeError::Config { ref path, .. } if path == "grp"));
    }

    #[test]
    fn test_dotted_target_names_are_rejected() {
        let err = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            targets:
              "a.b": { meta: { doc: x, type: callable } }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, YakeError::Config { .. }));
    }

    #[test]
    fn test_callable_without_exec_has_no_steps() {
        let tree = tree_from(
            r#"
            meta: { doc: d, version: 1.0.0 }
            targets:
              noop: { meta: { doc: n, type: callable } }
            "#,
        )
        .unwrap();
        let noop = tree.resolve("noop").unwrap();
        assert!(tree.exec_of(noop).is_empty());
    }
}
