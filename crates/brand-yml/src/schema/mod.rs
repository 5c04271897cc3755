//! Versioned structural schema for brand documents.
//!
//! The schema is data, not code. It ships with the crate as
//! `schema/brand.schema.yml` (annotated, for people) and
//! `schema/brand.schema.json` (strict, for tools). Both describe the same
//! [`Schema`] value, and the [`Validator`] interprets whichever one it is
//! handed, so the schema can grow without touching the validator.
//!
//! ```rust
//! use brand_yml::schema::{Schema, SchemaVersion};
//!
//! let schema = Schema::builtin(SchemaVersion::V1);
//! assert_eq!(schema.root, "brand");
//! assert!(schema.definition("color").is_some());
//! ```

mod validate;

use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub use validate::{
    UnknownFieldPolicy, ValidationError, ValidationErrorKind, ValidationReport, Validator,
    ValidatorConfig,
};

/// Human-readable form of the version 1 schema.
pub const BRAND_SCHEMA_V1_YAML: &str = include_str!("../../schema/brand.schema.yml");

/// Strict JSON form of the version 1 schema.
pub const BRAND_SCHEMA_V1_JSON: &str = include_str!("../../schema/brand.schema.json");

static BUILTIN_V1: Lazy<Schema> = Lazy::new(|| {
    Schema::from_yaml_str(BRAND_SCHEMA_V1_YAML).expect("bundled brand schema is valid")
});

/// Errors raised while loading a schema artifact.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to parse schema: {0}")]
    Parse(String),

    #[error("unsupported schema version {0}")]
    UnsupportedVersion(u32),

    #[error("schema root '{0}' is not defined")]
    MissingRoot(String),

    #[error("schema reference to undefined definition '{0}'")]
    UnknownDefinition(String),

    #[error("schema definition '{0}' refers only to itself")]
    RefLoop(String),
}

/// Schema format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SchemaVersion {
    V1,
}

impl SchemaVersion {
    pub const LATEST: SchemaVersion = SchemaVersion::V1;
}

impl TryFrom<u32> for SchemaVersion {
    type Error = SchemaError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SchemaVersion::V1),
            other => Err(SchemaError::UnsupportedVersion(other)),
        }
    }
}

impl From<SchemaVersion> for u32 {
    fn from(version: SchemaVersion) -> Self {
        match version {
            SchemaVersion::V1 => 1,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", u32::from(*self))
    }
}

/// A complete schema: named definitions plus the root definition name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    pub version: SchemaVersion,
    pub root: String,
    pub definitions: IndexMap<String, SchemaNode>,
}

/// One node of a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SchemaNode {
    Any,
    String,
    Boolean,
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
    },
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<i64>,
        #[serde(
            default,
            rename = "multiple-of",
            skip_serializing_if = "Option::is_none"
        )]
        multiple_of: Option<i64>,
    },
    Enum {
        values: Vec<String>,
    },
    Object(ObjectSchema),
    Map {
        values: Box<SchemaNode>,
    },
    List {
        items: Box<SchemaNode>,
    },
    OneOf {
        variants: Vec<SchemaNode>,
    },
    Tagged {
        tag: String,
        variants: IndexMap<String, SchemaNode>,
    },
    Ref {
        to: String,
    },
}

/// Fields of an `object` node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    #[serde(default)]
    pub properties: IndexMap<String, SchemaNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Unknown keys are forward-compatible additions rather than mistakes.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub extensible: bool,
    /// Schema for keys not listed in `properties`; such keys are accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Box<SchemaNode>>,
}

impl Schema {
    /// The schema bundled with this crate.
    pub fn builtin(version: SchemaVersion) -> &'static Schema {
        match version {
            SchemaVersion::V1 => &BUILTIN_V1,
        }
    }

    /// Parses and checks a schema written in YAML.
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        let schema: Schema =
            serde_yaml::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))?;
        schema.check()?;
        Ok(schema)
    }

    /// Parses and checks a schema written in JSON.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let schema: Schema =
            serde_json::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))?;
        schema.check()?;
        Ok(schema)
    }

    pub fn definition(&self, name: &str) -> Option<&SchemaNode> {
        self.definitions.get(name)
    }

    /// The node validated against a document's root.
    pub fn root_node(&self) -> Option<&SchemaNode> {
        self.definition(&self.root)
    }

    /// Verifies that the root exists, every `ref` names a definition, and no
    /// definition is a chain of refs that never reaches a concrete node.
    pub fn check(&self) -> Result<(), SchemaError> {
        if !self.definitions.contains_key(&self.root) {
            return Err(SchemaError::MissingRoot(self.root.clone()));
        }
        for node in self.definitions.values() {
            self.check_node(node)?;
        }
        for (name, node) in &self.definitions {
            let mut current = node;
            let mut hops = 0;
            while let SchemaNode::Ref { to } = current {
                hops += 1;
                if hops > self.definitions.len() {
                    return Err(SchemaError::RefLoop(name.clone()));
                }
                current = &self.definitions[to.as_str()];
            }
        }
        Ok(())
    }

    fn check_node(&self, node: &SchemaNode) -> Result<(), SchemaError> {
        match node {
            SchemaNode::Ref { to } => {
                if !self.definitions.contains_key(to) {
                    return Err(SchemaError::UnknownDefinition(to.clone()));
                }
            }
            SchemaNode::Object(obj) => {
                for child in obj.properties.values() {
                    self.check_node(child)?;
                }
                if let Some(extra) = &obj.extra {
                    self.check_node(extra)?;
                }
            }
            SchemaNode::Map { values } => self.check_node(values)?,
            SchemaNode::List { items } => self.check_node(items)?,
            SchemaNode::OneOf { variants } => {
                for v in variants {
                    self.check_node(v)?;
                }
            }
            SchemaNode::Tagged { variants, .. } => {
                for v in variants.values() {
                    self.check_node(v)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Follows `ref` nodes to the node they name.
    pub fn resolve<'a>(&'a self, mut node: &'a SchemaNode) -> &'a SchemaNode {
        let mut hops = 0;
        while let SchemaNode::Ref { to } = node {
            match self.definitions.get(to) {
                Some(next) if hops <= self.definitions.len() => {
                    node = next;
                    hops += 1;
                }
                _ => break,
            }
        }
        node
    }

    /// Short description of what `node` accepts, for type mismatch messages.
    pub fn describe(&self, node: &SchemaNode) -> String {
        match self.resolve(node) {
            SchemaNode::Any => "any value".to_string(),
            SchemaNode::String => "string".to_string(),
            SchemaNode::Boolean => "boolean".to_string(),
            SchemaNode::Number { .. } => "number".to_string(),
            SchemaNode::Integer { .. } => "integer".to_string(),
            SchemaNode::Enum { values } => format!("one of {}", values.join(", ")),
            SchemaNode::Object(_) | SchemaNode::Map { .. } | SchemaNode::Tagged { .. } => {
                "mapping".to_string()
            }
            SchemaNode::List { .. } => "list".to_string(),
            SchemaNode::OneOf { variants } => {
                let mut parts: Vec<String> = Vec::new();
                for v in variants {
                    for d in self.describe(v).split(" or ") {
                        if !parts.iter().any(|p| p == d) {
                            parts.push(d.to_string());
                        }
                    }
                }
                parts.join(" or ")
            }
            SchemaNode::Ref { to } => to.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_schema_loads() {
        let schema = Schema::builtin(SchemaVersion::V1);
        assert_eq!(schema.version, SchemaVersion::V1);
        for section in ["meta", "logo", "color", "typography"] {
            assert!(schema.definition(section).is_some(), "missing {section}");
        }
    }

    #[test]
    fn test_yaml_and_json_artifacts_are_equivalent() {
        let yaml = Schema::from_yaml_str(BRAND_SCHEMA_V1_YAML).unwrap();
        let json = Schema::from_json_str(BRAND_SCHEMA_V1_JSON).unwrap();
        assert_eq!(yaml, json);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let err = Schema::from_yaml_str("version: 7\nroot: a\ndefinitions:\n  a: {type: any}\n")
            .unwrap_err();
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_dangling_ref_rejected() {
        let err =
            Schema::from_yaml_str("version: 1\nroot: a\ndefinitions:\n  a: {type: ref, to: b}\n")
                .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownDefinition(name) if name == "b"));
    }

    #[test]
    fn test_ref_loop_rejected() {
        let text = "version: 1\nroot: a\ndefinitions:\n  a: {type: ref, to: b}\n  b: {type: ref, to: a}\n";
        assert!(matches!(
            Schema::from_yaml_str(text),
            Err(SchemaError::RefLoop(_))
        ));
    }

    #[test]
    fn test_missing_root_rejected() {
        let err = Schema::from_yaml_str("version: 1\nroot: x\ndefinitions: {}\n").unwrap_err();
        assert!(matches!(err, SchemaError::MissingRoot(_)));
    }

    #[test]
    fn test_describe_one_of_deduplicates() {
        let schema = Schema::builtin(SchemaVersion::V1);
        let logo = schema.definition("logo-variant").unwrap();
        assert_eq!(schema.describe(logo), "string or mapping");
    }
}
