//! Placeholder substitution for command steps and docs.
//!
//! Resolves `{{meta.<field>}}` against the document metadata and
//! `{{target.<field>}}` against the node being rendered. Shell variables such as
//! `$PORT` are left untouched for the shell to expand.

use crate::configs::document::DocumentMeta;
use crate::tree::Node;
use crate::types::{YakeError, YakeResult};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Render every placeholder in `text`, with `node` as the local scope
pub fn render(text: &str, meta: &DocumentMeta, node: &Node) -> YakeResult<String> {
    let error = |placeholder: &str, reason: String| YakeError::Template {
        target: node.display_path().to_string(),
        placeholder: placeholder.to_string(),
        reason,
    };

    let mut rendered = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find(OPEN) {
        rendered.push_str(&rest[..open]);
        let inner = &rest[open + OPEN.len()..];
        let close = inner
            .find(CLOSE)
            .ok_or_else(|| error(&rest[open..], "unclosed placeholder".to_string()))?;
        let placeholder = &rest[open..open + OPEN.len() + close + CLOSE.len()];

        let value = lookup(inner[..close].trim(), meta, node)
            .map_err(|reason| error(placeholder, reason))?;
        rendered.push_str(&value);

        rest = &inner[close + CLOSE.len()..];
    }

    rendered.push_str(rest);
    Ok(rendered)
}

fn lookup(expr: &str, meta: &DocumentMeta, node: &Node) -> Result<String, String> {
    if expr.is_empty() {
        return Err("empty expression".to_string());
    }

    let (namespace, field) = expr
        .split_once('.')
        .ok_or_else(|| format!("expected '<namespace>.<field>', found '{}'", expr))?;

    match (namespace, field) {
        ("meta", "doc") => Ok(meta.doc.clone()),
        ("meta", "version") => Ok(meta.version.clone()),
        ("target", "name") => Ok(node.name.clone()),
        ("target", "path") => Ok(node.path.clone()),
        ("target", "doc") => Ok(node.doc.clone()),
        ("target", "version") => node
            .version
            .clone()
            .ok_or_else(|| format!("target '{}' has no version", node.display_path())),
        ("meta", _) | ("target", _) => Err(format!("unknown field '{}' in '{}'", field, namespace)),
        _ => Err(format!("unknown namespace '{}'", namespace)),
    }
}
