//! Logos and their light/dark variants.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::FileLocation;
use crate::build::BuildContext;
use crate::document::{child_path, Node};
use crate::error::BrandError;

/// Display mode used to pick between adaptive logo variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    /// Light mode (light background, dark text).
    #[default]
    Light,
    /// Dark mode (dark background, light text).
    Dark,
}

/// A logo image file with optional alternative text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    pub location: FileLocation,
    pub alt: Option<String>,
}

impl Serialize for LogoImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.alt {
            None => self.location.serialize(serializer),
            Some(alt) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("path", &self.location)?;
                map.serialize_entry("alt", alt)?;
                map.end()
            }
        }
    }
}

/// A logo size: one image, or separate images for light and dark modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LogoVariant {
    Single(LogoImage),
    /// At least one of `light` and `dark` is set.
    Adaptive {
        #[serde(skip_serializing_if = "Option::is_none")]
        light: Option<LogoImage>,
        #[serde(skip_serializing_if = "Option::is_none")]
        dark: Option<LogoImage>,
    },
}

impl LogoVariant {
    /// The image for `mode`, falling back to the other mode's image.
    pub fn for_mode(&self, mode: ColorMode) -> Option<&LogoImage> {
        match self {
            LogoVariant::Single(image) => Some(image),
            LogoVariant::Adaptive { light, dark } => match mode {
                ColorMode::Light => light.as_ref().or(dark.as_ref()),
                ColorMode::Dark => dark.as_ref().or(light.as_ref()),
            },
        }
    }

    pub fn is_adaptive(&self) -> bool {
        matches!(self, LogoVariant::Adaptive { .. })
    }
}

/// Logo sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogoSize {
    Small,
    Medium,
    Large,
}

impl LogoSize {
    pub const ALL: [LogoSize; 3] = [LogoSize::Small, LogoSize::Medium, LogoSize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogoSize::Small => "small",
            LogoSize::Medium => "medium",
            LogoSize::Large => "large",
        }
    }
}

/// The `logo` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogoSet {
    /// Named images that size variants can refer to.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub images: IndexMap<String, LogoImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small: Option<LogoVariant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<LogoVariant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large: Option<LogoVariant>,
}

impl LogoSet {
    pub fn get(&self, size: LogoSize) -> Option<&LogoVariant> {
        match size {
            LogoSize::Small => self.small.as_ref(),
            LogoSize::Medium => self.medium.as_ref(),
            LogoSize::Large => self.large.as_ref(),
        }
    }

    pub fn image(&self, name: &str) -> Option<&LogoImage> {
        self.images.get(name)
    }

    /// The largest available variant's image for `mode`, if any.
    pub fn best(&self, mode: ColorMode) -> Option<&LogoImage> {
        [LogoSize::Large, LogoSize::Medium, LogoSize::Small]
            .into_iter()
            .filter_map(|size| self.get(size))
            .find_map(|variant| variant.for_mode(mode))
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
            && self.small.is_none()
            && self.medium.is_none()
            && self.large.is_none()
    }

    pub(crate) fn build(
        cx: &BuildContext<'_, '_>,
        node: Option<&Node>,
    ) -> Result<Self, BrandError> {
        let mut logo = LogoSet::default();
        let Some(node) = node.filter(|n| !n.is_null()) else {
            return Ok(logo);
        };

        // `logo: path` uses one image for every size.
        if let Some(text) = node.as_str() {
            let image = LogoImage {
                location: cx.file_location("logo", text)?,
                alt: None,
            };
            let variant = LogoVariant::Single(image);
            logo.small = Some(variant.clone());
            logo.medium = Some(variant.clone());
            logo.large = Some(variant);
            return Ok(logo);
        }

        if let Some(images) = node.get("images").and_then(Node::as_mapping) {
            for (name, value) in images {
                if logo.images.contains_key(name) || value.is_null() {
                    continue;
                }
                let path = child_path("logo.images", name);
                let image = build_image(cx, value, &path)?;
                logo.images.insert(name.clone(), image);
            }
        }

        for size in LogoSize::ALL {
            let path = child_path("logo", size.as_str());
            let variant = match node.get(size.as_str()).filter(|n| !n.is_null()) {
                Some(value) => Some(build_variant(cx, &logo.images, value, &path)?),
                None => None,
            };
            match size {
                LogoSize::Small => logo.small = variant,
                LogoSize::Medium => logo.medium = variant,
                LogoSize::Large => logo.large = variant,
            }
        }
        Ok(logo)
    }
}

fn build_image(
    cx: &BuildContext<'_, '_>,
    node: &Node,
    path: &str,
) -> Result<LogoImage, BrandError> {
    if let Some(text) = node.as_str() {
        return Ok(LogoImage {
            location: cx.file_location(path, text)?,
            alt: None,
        });
    }
    let location_path = child_path(path, "path");
    let value = cx
        .str_field(node, "path", path)?
        .ok_or_else(|| cx.model_error(&location_path, "logo image needs a path"))?;
    Ok(LogoImage {
        location: cx.file_location(&location_path, value)?,
        alt: cx.str_field(node, "alt", path)?.map(str::to_string),
    })
}

/// Builds a size variant. Strings naming an entry of `images` use that image.
fn build_variant(
    cx: &BuildContext<'_, '_>,
    images: &IndexMap<String, LogoImage>,
    node: &Node,
    path: &str,
) -> Result<LogoVariant, BrandError> {
    let lookup = |node: &Node, path: &str| -> Result<LogoImage, BrandError> {
        match cx.logo_reference(path).and_then(|name| images.get(name)) {
            Some(image) => Ok(image.clone()),
            None => build_image(cx, node, path),
        }
    };

    if node.as_str().is_some() || node.get("path").is_some() {
        return Ok(LogoVariant::Single(lookup(node, path)?));
    }

    let mode = |key: &str| -> Result<Option<LogoImage>, BrandError> {
        match node.get(key).filter(|n| !n.is_null()) {
            Some(inner) => lookup(inner, &child_path(path, key)).map(Some),
            None => Ok(None),
        }
    };
    let light = mode("light")?;
    let dark = mode("dark")?;
    if light.is_none() && dark.is_none() {
        return Err(cx.model_error(path, "logo variant needs a light or dark image"));
    }
    Ok(LogoVariant::Adaptive { light, dark })
}
