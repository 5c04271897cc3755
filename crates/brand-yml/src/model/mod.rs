//! The typed brand model.
//!
//! A [`Brand`] is built once from a validated, resolved document and never
//! changes afterwards. It holds concrete values only: colors are RGBA, font
//! weights are numbers, logo references are images and file paths have been
//! checked against the permitted root.

mod color;
mod location;
mod logo;
mod meta;
mod typography;

use std::path::Path;

use serde::Serialize;

pub use color::{BrandColor, ThemeColors, ThemeRole};
pub use location::{FileLocation, LocalPath};
pub use logo::{ColorMode, LogoImage, LogoSet, LogoSize, LogoVariant};
pub use meta::{BrandMeta, BrandName};
pub use typography::{
    FontDisplay, FontFamily, FontFile, FontFormat, FontProvider, FontSource, FontStyle,
    FontWeight, HostedFont, Typography, TypographyRole,
};

pub(crate) use location::EscapesRoot;

use crate::build::{BrandLoader, BuildContext};
use crate::error::BrandError;

/// A fully resolved brand definition.
///
/// ```rust
/// use brand_yml::Brand;
///
/// let brand = Brand::from_yaml_str(
///     r##"
/// color:
///   palette:
///     blue: "#0085c3"
///   primary: blue
/// "##,
/// )
/// .unwrap();
/// assert_eq!(brand.color().theme.primary.unwrap().to_hex(), "#0085c3");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Brand {
    #[serde(skip_serializing_if = "BrandMeta::is_empty")]
    meta: BrandMeta,
    #[serde(skip_serializing_if = "LogoSet::is_empty")]
    logo: LogoSet,
    #[serde(skip_serializing_if = "BrandColor::is_empty")]
    color: BrandColor,
    #[serde(skip_serializing_if = "Typography::is_empty")]
    typography: Typography,
    #[serde(skip_serializing_if = "serde_yaml::Mapping::is_empty")]
    defaults: serde_yaml::Mapping,
}

impl Brand {
    /// Builds a brand from YAML text with the default configuration.
    pub fn from_yaml_str(text: &str) -> Result<Self, BrandError> {
        BrandLoader::new().load_str(text).map(|loaded| loaded.brand)
    }

    /// Builds a brand from a brand file with the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BrandError> {
        BrandLoader::new()
            .load_file(path.as_ref())
            .map(|loaded| loaded.brand)
    }

    pub fn meta(&self) -> &BrandMeta {
        &self.meta
    }

    pub fn logo(&self) -> &LogoSet {
        &self.logo
    }

    pub fn color(&self) -> &BrandColor {
        &self.color
    }

    pub fn typography(&self) -> &Typography {
        &self.typography
    }

    /// Free-form tool defaults, kept as written.
    pub fn defaults(&self) -> &serde_yaml::Mapping {
        &self.defaults
    }

    /// The brand as a normalized document: every reference replaced by its
    /// value and every default filled in. Loading it back produces an equal
    /// brand.
    pub fn to_value(&self) -> Result<serde_yaml::Value, BrandError> {
        Ok(serde_yaml::to_value(self)?)
    }

    /// [`Brand::to_value`] rendered as YAML text.
    pub fn to_yaml_string(&self) -> Result<String, BrandError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub(crate) fn build(cx: &BuildContext<'_, '_>) -> Result<Self, BrandError> {
        let doc = cx.document();
        let color = BrandColor::build(cx, doc.get("color"));
        let mut typography = Typography::build(cx, doc.get("typography"))?;
        crate::defaults::apply(&mut typography, &color.theme);

        let defaults = match doc.get("defaults").map(|n| n.to_yaml_value()) {
            Some(serde_yaml::Value::Mapping(map)) => map,
            _ => serde_yaml::Mapping::new(),
        };

        Ok(Brand {
            meta: BrandMeta::build(cx, doc.get("meta"))?,
            logo: LogoSet::build(cx, doc.get("logo"))?,
            color,
            typography,
            defaults,
        })
    }
}
