//! Brand colors: the palette and the semantic theme roles.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::build::BuildContext;
use crate::color::Color;
use crate::document::{child_path, Node};

/// The fixed set of semantic color roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ThemeRole {
    Foreground,
    Background,
    Primary,
    Secondary,
    Tertiary,
    Success,
    Info,
    Warning,
    Danger,
    Light,
    Dark,
}

impl ThemeRole {
    pub const ALL: [ThemeRole; 11] = [
        ThemeRole::Foreground,
        ThemeRole::Background,
        ThemeRole::Primary,
        ThemeRole::Secondary,
        ThemeRole::Tertiary,
        ThemeRole::Success,
        ThemeRole::Info,
        ThemeRole::Warning,
        ThemeRole::Danger,
        ThemeRole::Light,
        ThemeRole::Dark,
    ];

    /// The key used for the role in brand files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeRole::Foreground => "foreground",
            ThemeRole::Background => "background",
            ThemeRole::Primary => "primary",
            ThemeRole::Secondary => "secondary",
            ThemeRole::Tertiary => "tertiary",
            ThemeRole::Success => "success",
            ThemeRole::Info => "info",
            ThemeRole::Warning => "warning",
            ThemeRole::Danger => "danger",
            ThemeRole::Light => "light",
            ThemeRole::Dark => "dark",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ThemeRole::ALL.into_iter().find(|r| r.as_str() == name)
    }
}

impl fmt::Display for ThemeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved theme role colors. Unset roles are `None`, meaning "use the
/// renderer's default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThemeColors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tertiary: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark: Option<Color>,
}

impl ThemeColors {
    pub fn get(&self, role: ThemeRole) -> Option<Color> {
        *self.slot(role)
    }

    fn slot(&self, role: ThemeRole) -> &Option<Color> {
        match role {
            ThemeRole::Foreground => &self.foreground,
            ThemeRole::Background => &self.background,
            ThemeRole::Primary => &self.primary,
            ThemeRole::Secondary => &self.secondary,
            ThemeRole::Tertiary => &self.tertiary,
            ThemeRole::Success => &self.success,
            ThemeRole::Info => &self.info,
            ThemeRole::Warning => &self.warning,
            ThemeRole::Danger => &self.danger,
            ThemeRole::Light => &self.light,
            ThemeRole::Dark => &self.dark,
        }
    }

    fn slot_mut(&mut self, role: ThemeRole) -> &mut Option<Color> {
        match role {
            ThemeRole::Foreground => &mut self.foreground,
            ThemeRole::Background => &mut self.background,
            ThemeRole::Primary => &mut self.primary,
            ThemeRole::Secondary => &mut self.secondary,
            ThemeRole::Tertiary => &mut self.tertiary,
            ThemeRole::Success => &mut self.success,
            ThemeRole::Info => &mut self.info,
            ThemeRole::Warning => &mut self.warning,
            ThemeRole::Danger => &mut self.danger,
            ThemeRole::Light => &mut self.light,
            ThemeRole::Dark => &mut self.dark,
        }
    }

    /// Roles that are set, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ThemeRole, Color)> + '_ {
        ThemeRole::ALL
            .into_iter()
            .filter_map(|role| self.get(role).map(|c| (role, c)))
    }

    /// Text color that reads best on top of `role`.
    ///
    /// Picks whichever of the `light` and `dark` roles (white and black when
    /// unset) has the higher contrast ratio against the role color. Returns
    /// `None` when the role itself is unset.
    pub fn contrast_text(&self, role: ThemeRole) -> Option<Color> {
        let background = self.get(role)?;
        let light = self.light.unwrap_or(Color::WHITE);
        let dark = self.dark.unwrap_or(Color::BLACK);
        if background.contrast_ratio(&light) >= background.contrast_ratio(&dark) {
            Some(light)
        } else {
            Some(dark)
        }
    }
}

/// The `color` section: palette plus theme roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BrandColor {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub palette: IndexMap<String, Color>,
    #[serde(flatten)]
    pub theme: ThemeColors,
}

impl BrandColor {
    pub(crate) fn build(cx: &BuildContext<'_, '_>, node: Option<&Node>) -> Self {
        let mut color = BrandColor::default();
        let Some(node) = node else {
            return color;
        };

        let palette = node.get("palette").and_then(Node::as_mapping).unwrap_or_default();
        for (name, _) in palette {
            if color.palette.contains_key(name) {
                continue;
            }
            if let Some(value) = cx.color(&child_path("color.palette", name)) {
                color.palette.insert(name.clone(), value);
            }
        }

        for role in ThemeRole::ALL {
            *color.theme.slot_mut(role) = cx.color(&child_path("color", role.as_str()));
        }
        color
    }

    pub fn palette(&self, name: &str) -> Option<Color> {
        self.palette.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.palette.is_empty() && self.theme.iter().next().is_none()
    }
}
