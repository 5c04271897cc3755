//! The load → validate → resolve → build pipeline.

use std::path::{Path, PathBuf};

use crate::color::Color;
use crate::config::BrandConfig;
use crate::document::{self, child_path, BrandDocument, Node, Origin};
use crate::error::BrandError;
use crate::model::{Brand, EscapesRoot, FileLocation};
use crate::resolve::{self, ResolvedDocument};
use crate::schema::{Schema, ValidationError, Validator};

/// A successfully built brand plus any validation warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub brand: Brand,
    /// Problems downgraded to warnings by the validator configuration.
    pub warnings: Vec<ValidationError>,
}

/// Builds brands with a fixed [`BrandConfig`].
///
/// ```rust
/// use brand_yml::{BrandConfig, BrandLoader};
///
/// let loader = BrandLoader::with_config(BrandConfig::new());
/// let loaded = loader.load_str("meta:\n  name: Acme\nmotion: {}\n").unwrap();
/// assert_eq!(loaded.warnings.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BrandLoader {
    config: BrandConfig,
}

impl BrandLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BrandConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BrandConfig {
        &self.config
    }

    /// Builds a brand from YAML text. Relative paths resolve against the
    /// configured base directory, if any.
    pub fn load_str(&self, text: &str) -> Result<Loaded, BrandError> {
        let origin = Origin::text(self.config.get_base_dir().map(Path::to_path_buf));
        let doc = document::load_str(text, origin)?;
        self.load_document(&doc)
    }

    /// Builds a brand from a file. Relative paths resolve against the file's
    /// directory.
    pub fn load_file(&self, path: &Path) -> Result<Loaded, BrandError> {
        let doc = document::load_path(path)?;
        self.load_document(&doc)
    }

    /// Validates, resolves and builds an already parsed document.
    pub fn load_document(&self, doc: &BrandDocument) -> Result<Loaded, BrandError> {
        let schema = Schema::builtin(self.config.get_schema_version());
        let report = Validator::new(schema, self.config.validator()).validate(doc);
        for warning in &report.warnings {
            tracing::warn!(path = %warning.path, location = %warning.location, "{}", warning.kind);
        }
        if !report.is_ok() {
            return Err(BrandError::Validation(report));
        }

        let resolved = resolve::resolve(doc)?;
        let cx = BuildContext::new(&resolved, &self.config);
        let brand = Brand::build(&cx)?;
        tracing::debug!(file = ?doc.file(), "built brand");

        Ok(Loaded {
            brand,
            warnings: report.warnings,
        })
    }
}

/// What model builders read from: the resolved document plus path settings.
pub(crate) struct BuildContext<'a, 'd> {
    resolved: &'a ResolvedDocument<'d>,
    base_dir: Option<PathBuf>,
    root: Option<PathBuf>,
}

impl<'a, 'd> BuildContext<'a, 'd> {
    pub(crate) fn new(resolved: &'a ResolvedDocument<'d>, config: &BrandConfig) -> Self {
        let base_dir = resolved.document().origin().base_dir.clone();
        let root = config.get_root().map(Path::to_path_buf);
        Self {
            resolved,
            base_dir,
            root,
        }
    }

    pub(crate) fn document(&self) -> &'d BrandDocument {
        self.resolved.document()
    }

    pub(crate) fn color(&self, path: &str) -> Option<Color> {
        self.resolved.color(path)
    }

    pub(crate) fn logo_reference(&self, path: &str) -> Option<&str> {
        self.resolved.logo_reference(path)
    }

    pub(crate) fn model_error(&self, path: &str, reason: impl Into<String>) -> BrandError {
        BrandError::ModelBuild {
            path: path.to_string(),
            reason: reason.into(),
            location: self.document().location(path),
        }
    }

    /// Classifies `value` and checks local paths against the permitted root.
    pub(crate) fn file_location(
        &self,
        path: &str,
        value: &str,
    ) -> Result<FileLocation, BrandError> {
        FileLocation::resolve(value, self.base_dir.as_deref(), self.root.as_deref()).map_err(
            |EscapesRoot| BrandError::UnsafePath {
                path: path.to_string(),
                value: value.to_string(),
                location: self.document().location(path),
            },
        )
    }

    /// Reads the string at `node.key`. Missing and null fields are `None`.
    pub(crate) fn str_field<'n>(
        &self,
        node: &'n Node,
        key: &str,
        path: &str,
    ) -> Result<Option<&'n str>, BrandError> {
        match node.get(key) {
            None | Some(Node::Null) => Ok(None),
            Some(Node::String(s)) => Ok(Some(s)),
            Some(other) => Err(self.model_error(
                &child_path(path, key),
                format!("expected string, found {}", other.kind()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::UnknownFieldPolicy;
    use crate::FontSource;

    #[test]
    fn test_loader_reports_all_validation_errors() {
        let err = BrandLoader::new()
            .load_str("color:\n  primary: 1\n  secondary: [a]\n")
            .unwrap_err();
        match err {
            BrandError::Validation(report) => assert_eq!(report.errors.len(), 2),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_loader_strict_config_rejects_unknown_sections() {
        let loader = BrandLoader::with_config(BrandConfig::new().strict());
        assert!(matches!(
            loader.load_str("motion: {}\n"),
            Err(BrandError::Validation(_))
        ));

        let loader = BrandLoader::with_config(
            BrandConfig::new().unknown_sections(UnknownFieldPolicy::Allow),
        );
        let loaded = loader.load_str("motion: {}\n").unwrap();
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_empty_document_is_empty_brand() {
        let loaded = BrandLoader::new().load_str("").unwrap();
        assert_eq!(loaded.brand, Brand::default());
    }

    #[test]
    fn test_base_dir_applies_to_in_memory_text() {
        let loader = BrandLoader::with_config(BrandConfig::new().base_dir("/srv/site"));
        let brand = loader.load_str("logo: img/logo.png\n").unwrap().brand;
        let small = brand.logo().small.as_ref().unwrap();
        let image = small.for_mode(crate::ColorMode::Light).unwrap();
        assert_eq!(
            image.location.as_local().unwrap().resolved,
            Some(PathBuf::from("/srv/site/img/logo.png"))
        );

        let err = loader.load_str("logo: ../../etc/passwd\n").unwrap_err();
        assert!(matches!(err, BrandError::UnsafePath { ref path, .. } if path == "logo"));
    }

    #[test]
    fn test_relative_roots_still_bound_local_paths() {
        let loader = BrandLoader::with_config(BrandConfig::new().base_dir("/srv/site").root("."));
        let err = loader.load_str("logo: ../../etc/passwd\n").unwrap_err();
        assert!(matches!(err, BrandError::UnsafePath { .. }));

        let loader = BrandLoader::with_config(BrandConfig::new().base_dir("."));
        let err = loader.load_str("logo: /etc/passwd\n").unwrap_err();
        assert!(matches!(err, BrandError::UnsafePath { .. }));
    }

    #[test]
    fn test_non_finite_line_height_rejected() {
        for value in [".nan", ".inf"] {
            let text = format!("typography:\n  base:\n    line-height: {value}\n");
            let err = BrandLoader::new().load_str(&text).unwrap_err();
            assert!(
                matches!(
                    err,
                    BrandError::ModelBuild { ref path, .. } if path == "typography.base.line-height"
                ),
                "{value}: {err:?}"
            );
        }
    }

    #[test]
    fn test_duplicate_font_family_rejected() {
        let err = BrandLoader::new()
            .load_str(
                "typography:\n  fonts:\n    - family: Inter\n      source: google\n    - family: Inter\n      source: bunny\n",
            )
            .unwrap_err();
        assert!(matches!(
            err,
            BrandError::ModelBuild { ref path, .. } if path == "typography.fonts[1].family"
        ));
    }

    #[test]
    fn test_font_files_must_cover_declared_weights() {
        let text = "\
typography:
  fonts:
    - family: Brand Sans
      source: file
      weight: [400, 700]
      files:
        - path: brand-regular.woff2
          weight: 400
";
        let err = BrandLoader::new().load_str(text).unwrap_err();
        match err {
            BrandError::ModelBuild { path, reason, .. } => {
                assert_eq!(path, "typography.fonts[0].files");
                assert!(reason.contains("700"), "{reason}");
            }
            other => panic!("expected ModelBuild, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_font_format() {
        let text = "typography:\n  fonts:\n    - family: Old\n      source: file\n      files:\n        - old.eot\n";
        let err = BrandLoader::new().load_str(text).unwrap_err();
        assert!(matches!(
            err,
            BrandError::ModelBuild { ref path, .. } if path == "typography.fonts[0].files[0]"
        ));
    }

    #[test]
    fn test_file_font_defaults() {
        let text = "typography:\n  fonts:\n    - family: Brand\n      source: file\n      files:\n        - brand.ttf\n";
        let brand = BrandLoader::new().load_str(text).unwrap().brand;
        match &brand.typography().fonts[0].source {
            FontSource::Files(files) => {
                assert_eq!(files[0].weight.value(), 400);
                assert_eq!(files[0].format.as_str(), "truetype");
            }
            other => panic!("expected file source, got {other:?}"),
        }
    }
}
