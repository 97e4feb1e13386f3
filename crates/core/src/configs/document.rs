use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{YakeError, YakeResult};

/// An environment overlay, in declaration order
pub type EnvOverlay = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    /// A namespace of further targets, without commands of its own
    Group,
    /// An executable target with command steps and no sub-targets
    Callable,
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetType::Group => write!(f, "group"),
            TargetType::Callable => write!(f, "callable"),
        }
    }
}

/// Document level metadata, addressable from templates as `meta.*`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DocumentMeta {
    pub doc: String,
    #[serde(deserialize_with = "scalar_string")]
    #[schemars(with = "String")]
    pub version: String,
    /// Merge the targets of `Yakefile`s found one directory below this one
    #[serde(default)]
    pub include_recursively: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TargetMeta {
    pub doc: String,
    #[serde(rename = "type")]
    pub target_type: TargetType,
    /// Informational only, `{{meta.version}}` always reads the document root
    #[serde(default, deserialize_with = "optional_scalar_string")]
    #[schemars(with = "Option<String>")]
    pub version: Option<String>,
    /// Dotted paths of targets to run first, resolved from the document root
    #[serde(default)]
    pub depends: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub meta: TargetMeta,
    #[serde(default, deserialize_with = "env_overlay")]
    #[schemars(with = "Option<IndexMap<String, String>>")]
    pub env: Option<EnvOverlay>,
    #[serde(default)]
    pub exec: Option<Vec<String>>,
    #[serde(default, deserialize_with = "optional_unique_map")]
    pub targets: Option<IndexMap<String, TargetConfig>>,
}

/// The full document as written on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct YakeFileConfig {
    pub meta: DocumentMeta,
    #[serde(default, deserialize_with = "env_overlay")]
    #[schemars(with = "Option<IndexMap<String, String>>")]
    pub env: Option<EnvOverlay>,
    #[serde(default, deserialize_with = "unique_map")]
    pub targets: IndexMap<String, TargetConfig>,
}

pub fn parse_document(yaml_str: &str) -> YakeResult<YakeFileConfig> {
    let config: YakeFileConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

pub fn load_document(path: &Path) -> YakeResult<YakeFileConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        YakeError::config(
            path.display().to_string(),
            format!("failed to read document: {}", e),
        )
    })?;
    parse_document(&content)
}

/// JSON schema of the document format
pub fn document_schema() -> YakeResult<String> {
    let schema = schemars::schema_for!(YakeFileConfig);
    serde_json::to_string_pretty(&schema)
        .map_err(|e| YakeError::config("<schema>", e.to_string()))
}

fn scalar_to_string<E: serde::de::Error>(value: serde_yaml::Value) -> Result<String, E> {
    match value {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(E::custom(format!(
            "expected a string, number or boolean, found {:?}",
            other
        ))),
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_to_string(serde_yaml::Value::deserialize(deserializer)?)
}

fn optional_scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<serde_yaml::Value>::deserialize(deserializer)?
        .map(scalar_to_string)
        .transpose()
}

/// A string keyed mapping that refuses repeated keys instead of keeping the last one
struct UniqueMap<V>(IndexMap<String, V>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for UniqueMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UniqueMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueMapVisitor<V> {
            type Value = UniqueMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping with unique keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(key) = access.next_key::<String>()? {
                    if map.contains_key(&key) {
                        return Err(<A::Error as serde::de::Error>::custom(format!(
                            "duplicate key '{}'",
                            key
                        )));
                    }
                    let value = access.next_value()?;
                    map.insert(key, value);
                }
                Ok(UniqueMap(map))
            }
        }

        deserializer.deserialize_map(UniqueMapVisitor(PhantomData))
    }
}

fn unique_map<'de, D, V>(deserializer: D) -> Result<IndexMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    UniqueMap::deserialize(deserializer).map(|unique| unique.0)
}

fn optional_unique_map<'de, D, V>(deserializer: D) -> Result<Option<IndexMap<String, V>>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    Option::<UniqueMap<V>>::deserialize(deserializer).map(|raw| raw.map(|unique| unique.0))
}

fn env_overlay<'de, D>(deserializer: D) -> Result<Option<EnvOverlay>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<UniqueMap<serde_yaml::Value>> = Option::deserialize(deserializer)?;
    raw.map(|UniqueMap(map)| {
        map.into_iter()
            .map(|(key, value)| {
                scalar_to_string(value)
                    .map(|s| (key.clone(), s))
                    .map_err(|e: D::Error| {
                        <D::Error as serde::de::Error>::custom(format!(
                            "env variable '{}': {}",
                            key, e
                        ))
                    })
            })
            .collect()
    })
    .transpose()
}
