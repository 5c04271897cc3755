//! Organization metadata. Structurally validated, never resolved.

use indexmap::IndexMap;
use serde::Serialize;

use crate::build::BuildContext;
use crate::document::{child_path, Node};
use crate::error::BrandError;

/// The organization's name, in full and short forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BrandName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
}

impl BrandName {
    /// The short name when present, otherwise the full name.
    pub fn preferred_short(&self) -> Option<&str> {
        self.short.as_deref().or(self.full.as_deref())
    }
}

/// The `meta` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrandMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<BrandName>,
    /// Named links. A single string in the file becomes the `home` link.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub link: IndexMap<String, String>,
    /// Any other fields, kept as written.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl BrandMeta {
    pub fn home(&self) -> Option<&str> {
        self.link.get("home").map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.link.is_empty() && self.extra.is_empty()
    }

    pub(crate) fn build(
        cx: &BuildContext<'_, '_>,
        node: Option<&Node>,
    ) -> Result<Self, BrandError> {
        let mut meta = BrandMeta::default();
        let Some(entries) = node.and_then(Node::as_mapping) else {
            return Ok(meta);
        };

        for (key, value) in entries {
            if value.is_null() {
                continue;
            }
            let path = child_path("meta", key);
            match key.as_str() {
                "name" if meta.name.is_none() => {
                    meta.name = Some(match value.as_str() {
                        Some(full) => BrandName {
                            full: Some(full.to_string()),
                            short: None,
                        },
                        None => BrandName {
                            full: cx.str_field(value, "full", &path)?.map(str::to_string),
                            short: cx.str_field(value, "short", &path)?.map(str::to_string),
                        },
                    });
                }
                "link" if meta.link.is_empty() => {
                    if let Some(url) = value.as_str() {
                        meta.link.insert("home".to_string(), url.to_string());
                        continue;
                    }
                    for (name, url) in value.as_mapping().unwrap_or_default() {
                        let url = url.as_str().ok_or_else(|| {
                            cx.model_error(&child_path(&path, name), "link must be a string")
                        })?;
                        meta.link.entry(name.clone()).or_insert_with(|| url.to_string());
                    }
                }
                "name" | "link" => {}
                _ => {
                    meta.extra
                        .entry(key.clone())
                        .or_insert_with(|| value.to_yaml_value());
                }
            }
        }
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_short() {
        let name = BrandName {
            full: Some("Acme Corporation".into()),
            short: None,
        };
        assert_eq!(name.preferred_short(), Some("Acme Corporation"));
        let name = BrandName {
            short: Some("Acme".into()),
            ..name
        };
        assert_eq!(name.preferred_short(), Some("Acme"));
    }

    #[test]
    fn test_serializes_extra_fields_inline() {
        let mut meta = BrandMeta::default();
        meta.link.insert("home".into(), "https://acme.example".into());
        meta.extra
            .insert("founded".into(), serde_yaml::Value::Number(1999.into()));
        let value = serde_yaml::to_value(&meta).unwrap();
        assert_eq!(value.get("founded").and_then(|v| v.as_i64()), Some(1999));
        assert_eq!(
            value
                .get("link")
                .and_then(|l| l.get("home"))
                .and_then(|v| v.as_str()),
            Some("https://acme.example")
        );
        assert!(value.get("name").is_none());
    }
}
