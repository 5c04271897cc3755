//! Pipeline configuration.

use std::path::{Path, PathBuf};

use crate::schema::{SchemaVersion, UnknownFieldPolicy, ValidatorConfig};

/// Settings shared by every stage of the brand pipeline.
///
/// ```rust
/// use brand_yml::{BrandConfig, UnknownFieldPolicy};
///
/// let config = BrandConfig::new()
///     .unknown_sections(UnknownFieldPolicy::Deny)
///     .root("/srv/site");
/// assert_eq!(config.validator().unknown_sections, UnknownFieldPolicy::Deny);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandConfig {
    schema_version: SchemaVersion,
    validator: ValidatorConfig,
    root: Option<PathBuf>,
    base_dir: Option<PathBuf>,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            schema_version: SchemaVersion::LATEST,
            validator: ValidatorConfig::default(),
            root: None,
            base_dir: None,
        }
    }
}

impl BrandConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treats every unknown key, including unknown sections, as an error.
    pub fn strict(mut self) -> Self {
        self.validator = ValidatorConfig::strict();
        self
    }

    pub fn schema_version(mut self, version: SchemaVersion) -> Self {
        self.schema_version = version;
        self
    }

    pub fn unknown_sections(mut self, policy: UnknownFieldPolicy) -> Self {
        self.validator.unknown_sections = policy;
        self
    }

    pub fn unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.validator.unknown_fields = policy;
        self
    }

    /// Directory that local file paths must stay inside. Defaults to the
    /// document's own directory.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Directory that relative paths resolve against for in-memory text.
    /// Files always use their own directory.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn get_schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    pub fn validator(&self) -> ValidatorConfig {
        self.validator
    }

    pub fn get_root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn get_base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BrandConfig::default();
        assert_eq!(config.get_schema_version(), SchemaVersion::V1);
        assert_eq!(config.validator(), ValidatorConfig::default());
        assert!(config.get_root().is_none());
        assert!(config.get_base_dir().is_none());
    }

    #[test]
    fn test_strict_then_relax_fields() {
        let config = BrandConfig::new()
            .strict()
            .unknown_fields(UnknownFieldPolicy::Warn);
        assert_eq!(config.validator().unknown_sections, UnknownFieldPolicy::Deny);
        assert_eq!(config.validator().unknown_fields, UnknownFieldPolicy::Warn);
    }

    #[test]
    fn test_paths() {
        let config = BrandConfig::new().root("/srv").base_dir("/srv/site");
        assert_eq!(config.get_root(), Some(Path::new("/srv")));
        assert_eq!(config.get_base_dir(), Some(Path::new("/srv/site")));
    }
}
