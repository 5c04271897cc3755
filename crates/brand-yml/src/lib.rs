//! # brand-yml - Brand Definitions for Tools and Themes
//!
//! `brand-yml` loads `_brand.yml` files, checks them against the brand.yml
//! schema, resolves color references and produces an immutable [`Brand`]
//! that downstream tools can read without further interpretation.
//!
//! ## Pipeline
//!
//! Every document goes through four stages:
//!
//! 1. **Load**: YAML is parsed into a [`document::BrandDocument`] that keeps
//!    the source position of every node. Duplicate keys are kept so they can
//!    be reported.
//! 2. **Validate**: the document is checked against the built-in
//!    [`schema::Schema`]. All problems are collected into one
//!    [`ValidationReport`].
//! 3. **Resolve**: palette names, theme roles and typography colors are
//!    followed to concrete colors. Cycles and dangling names are errors.
//! 4. **Build**: the typed model is assembled, file paths are checked
//!    against the permitted root, and defaults are applied.
//!
//! Every error points at the dotted path and source location that caused it.
//!
//! ## Quick Start
//!
//! ```rust
//! use brand_yml::{Brand, ThemeRole};
//!
//! let brand = Brand::from_yaml_str(
//!     r##"
//! meta:
//!   name: Acme
//! color:
//!   palette:
//!     blue: "#0085c3"
//!   primary: blue
//! typography:
//!   fonts:
//!     - family: Fira Code
//!       source: google
//!   monospace: Fira Code
//! "##,
//! )
//! .unwrap();
//!
//! assert_eq!(brand.color().theme.get(ThemeRole::Primary).unwrap().to_hex(), "#0085c3");
//! assert_eq!(
//!     brand.typography().monospace_inline.family.as_deref(),
//!     Some("Fira Code")
//! );
//! ```
//!
//! ## Configuration
//!
//! [`BrandLoader`] takes a [`BrandConfig`] for stricter validation, a
//! permitted root for local files, or a base directory for in-memory text:
//!
//! ```rust
//! use brand_yml::{BrandConfig, BrandLoader, BrandError};
//!
//! let loader = BrandLoader::with_config(BrandConfig::new().strict());
//! let err = loader.load_str("motion:\n  speed: fast\n").unwrap_err();
//! assert!(matches!(err, BrandError::Validation(_)));
//! ```
//!
//! ## Finding Brand Files
//!
//! [`read_brand_yaml`] accepts a file or a directory. For a directory,
//! [`Discovery`] walks up through the ancestors looking for `_brand.yml`
//! and then `brand.yml`.

mod batch;
mod build;
mod color;
mod config;
mod defaults;
mod discovery;
pub mod document;
mod error;
mod model;
pub mod resolve;
pub mod schema;

use std::path::Path;

pub use batch::{resolve_all, BatchEntry, BatchOutcome, CancellationToken};
pub use build::{BrandLoader, Loaded};
pub use color::{named_color, Color, ColorParseError};
pub use config::BrandConfig;
pub use discovery::{Discovery, DiscoveryError, BRAND_FILENAMES};
pub use error::BrandError;
pub use model::{
    Brand, BrandColor, BrandMeta, BrandName, ColorMode, FileLocation, FontDisplay, FontFamily,
    FontFile, FontFormat, FontProvider, FontSource, FontStyle, FontWeight, HostedFont,
    LocalPath, LogoImage, LogoSet, LogoSize, LogoVariant, ThemeColors, ThemeRole, Typography,
    TypographyRole,
};
pub use schema::{SchemaVersion, UnknownFieldPolicy, ValidationReport, ValidatorConfig};

/// Reads a brand from a file, or discovers one starting at a directory.
///
/// ```rust,no_run
/// let brand = brand_yml::read_brand_yaml("docs/")?;
/// if let Some(home) = brand.meta().home() {
///     println!("{home}");
/// }
/// # Ok::<(), brand_yml::BrandError>(())
/// ```
pub fn read_brand_yaml(path: impl AsRef<Path>) -> Result<Brand, BrandError> {
    let path = path.as_ref();
    if path.is_dir() {
        let found = Discovery::new().find(path)?;
        Brand::from_file(found)
    } else {
        Brand::from_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_brand_yaml_accepts_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("custom.yml");
        fs::write(&file, "meta:\n  name: Acme\n").unwrap();

        let brand = read_brand_yaml(&file).unwrap();
        assert_eq!(
            brand.meta().name.as_ref().and_then(|n| n.full.as_deref()),
            Some("Acme")
        );
    }

    #[test]
    fn test_read_brand_yaml_discovers_from_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_brand.yml"), "meta:\n  name: Acme\n").unwrap();
        let nested = dir.path().join("docs/guide");
        fs::create_dir_all(&nested).unwrap();

        let brand = read_brand_yaml(&nested).unwrap();
        assert_eq!(
            brand.meta().name.as_ref().and_then(|n| n.full.as_deref()),
            Some("Acme")
        );
    }

    #[test]
    fn test_read_brand_yaml_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_brand_yaml(dir.path().join("_brand.yml")).unwrap_err();
        assert!(matches!(err, BrandError::Load(_)));
    }
}
