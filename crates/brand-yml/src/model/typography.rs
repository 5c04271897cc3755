//! Typography: declared font families and the typographic roles.
//!
//! Fonts come from local files, a hosted CSS API (Google Fonts or Bunny
//! Fonts) or the system. Roles (`base`, `headings`, `monospace`, ...) name a
//! family and carry weight, style, size, line height and colors. After
//! defaults are applied every role with a family also carries the family's
//! source.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::FileLocation;
use crate::build::BuildContext;
use crate::color::Color;
use crate::document::{child_path, index_path, Node};
use crate::error::BrandError;

// ============================================================================
// Weights and styles
// ============================================================================

const NAMED_WEIGHTS: [(&str, u16); 13] = [
    ("thin", 100),
    ("extra-light", 200),
    ("ultra-light", 200),
    ("light", 300),
    ("normal", 400),
    ("regular", 400),
    ("medium", 500),
    ("semi-bold", 600),
    ("demi-bold", 600),
    ("bold", 700),
    ("extra-bold", 800),
    ("ultra-bold", 800),
    ("black", 900),
];

/// A numeric font weight: a multiple of 100 from 100 to 900.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(u16);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);

    pub fn new(value: u16) -> Option<Self> {
        ((100..=900).contains(&value) && value % 100 == 0).then_some(FontWeight(value))
    }

    /// Looks up a named weight such as `semi-bold`.
    pub fn from_name(name: &str) -> Option<Self> {
        NAMED_WEIGHTS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, w)| FontWeight(*w))
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    fn from_node(node: &Node) -> Result<Self, String> {
        match node {
            Node::Integer(n) => u16::try_from(*n)
                .ok()
                .and_then(FontWeight::new)
                .ok_or_else(|| format!("invalid font weight {}", n)),
            Node::String(s) => FontWeight::from_name(s)
                .or_else(|| s.parse::<u16>().ok().and_then(FontWeight::new))
                .ok_or_else(|| format!("invalid font weight '{}'", s)),
            other => Err(format!("expected a font weight, found {}", other.kind())),
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for FontWeight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "normal" => Some(FontStyle::Normal),
            "italic" => Some(FontStyle::Italic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }
}

/// CSS `font-display` strategy for hosted fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontDisplay {
    #[default]
    Auto,
    Block,
    Swap,
    Fallback,
    Optional,
}

impl FontDisplay {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "auto" => Some(FontDisplay::Auto),
            "block" => Some(FontDisplay::Block),
            "swap" => Some(FontDisplay::Swap),
            "fallback" => Some(FontDisplay::Fallback),
            "optional" => Some(FontDisplay::Optional),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FontDisplay::Auto => "auto",
            FontDisplay::Block => "block",
            FontDisplay::Swap => "swap",
            FontDisplay::Fallback => "fallback",
            FontDisplay::Optional => "optional",
        }
    }
}

// ============================================================================
// Font sources
// ============================================================================

/// Font file container format, from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFormat {
    OpenType,
    TrueType,
    Woff,
    Woff2,
}

impl FontFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "otf" => Some(FontFormat::OpenType),
            "ttf" => Some(FontFormat::TrueType),
            "woff" => Some(FontFormat::Woff),
            "woff2" => Some(FontFormat::Woff2),
            _ => None,
        }
    }

    /// The name used in CSS `format()` hints.
    pub fn as_str(&self) -> &'static str {
        match self {
            FontFormat::OpenType => "opentype",
            FontFormat::TrueType => "truetype",
            FontFormat::Woff => "woff",
            FontFormat::Woff2 => "woff2",
        }
    }
}

/// One file of a file-based font family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontFile {
    #[serde(rename = "path")]
    pub location: FileLocation,
    pub weight: FontWeight,
    pub style: FontStyle,
    #[serde(skip)]
    pub format: FontFormat,
}

/// Settings for a font served by a hosted CSS API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostedFont {
    #[serde(rename = "weight")]
    pub weights: Vec<FontWeight>,
    #[serde(rename = "style")]
    pub styles: Vec<FontStyle>,
    pub display: FontDisplay,
    pub version: u8,
}

/// Hosted font services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontProvider {
    Google,
    Bunny,
}

impl FontProvider {
    pub fn base_url(&self) -> &'static str {
        match self {
            FontProvider::Google => "https://fonts.googleapis.com/",
            FontProvider::Bunny => "https://fonts.bunny.net/",
        }
    }

    /// CSS API version used when a font does not choose one.
    pub fn default_version(&self) -> u8 {
        match self {
            FontProvider::Google => 2,
            FontProvider::Bunny => 1,
        }
    }
}

impl HostedFont {
    pub fn new(provider: FontProvider) -> Self {
        Self {
            weights: vec![FontWeight::NORMAL, FontWeight::BOLD],
            styles: vec![FontStyle::Normal, FontStyle::Italic],
            display: FontDisplay::Auto,
            version: provider.default_version(),
        }
    }

    /// The stylesheet URL that imports `family` from `provider`.
    ///
    /// Version 1 of the CSS API lists weight/style pairs
    /// (`css?family=Name:400,400i`); version 2 uses axis tuples
    /// (`css2?family=Name:ital,wght@0,400;1,400`).
    pub fn import_url(&self, provider: FontProvider, family: &str) -> String {
        let mut weights: Vec<u16> = self.weights.iter().map(FontWeight::value).collect();
        weights.sort_unstable();
        weights.dedup();
        let mut styles = self.styles.clone();
        styles.sort();
        styles.dedup();

        let (endpoint, spec) = if self.version == 1 {
            ("css", v1_family_spec(&weights, &styles))
        } else {
            ("css2", v2_family_spec(&weights, &styles))
        };
        format!(
            "{}{}?family={}&display={}",
            provider.base_url(),
            endpoint,
            form_urlencode(&format!("{}{}", family, spec)),
            form_urlencode(self.display.as_str()),
        )
    }
}

fn v1_family_spec(weights: &[u16], styles: &[FontStyle]) -> String {
    let suffix = |s: &FontStyle| match s {
        FontStyle::Normal => "",
        FontStyle::Italic => "i",
    };
    let values: Vec<String> = match (weights.is_empty(), styles.is_empty()) {
        (false, false) => weights
            .iter()
            .flat_map(|w| styles.iter().map(move |s| format!("{}{}", w, suffix(s))))
            .collect(),
        (false, true) => weights.iter().map(u16::to_string).collect(),
        (true, false) => styles
            .iter()
            .map(|s| match s {
                FontStyle::Normal => "regular".to_string(),
                FontStyle::Italic => "italic".to_string(),
            })
            .collect(),
        (true, true) => Vec::new(),
    };
    if values.is_empty() {
        String::new()
    } else {
        format!(":{}", values.join(","))
    }
}

fn v2_family_spec(weights: &[u16], styles: &[FontStyle]) -> String {
    let ital = |s: &FontStyle| match s {
        FontStyle::Normal => 0,
        FontStyle::Italic => 1,
    };
    let (axis, values): (&str, Vec<String>) = match (weights.is_empty(), styles.is_empty()) {
        (false, false) => (
            "ital,wght",
            styles
                .iter()
                .flat_map(|s| weights.iter().map(move |w| format!("{},{}", ital(s), w)))
                .collect(),
        ),
        (false, true) => ("wght", weights.iter().map(u16::to_string).collect()),
        (true, false) => ("ital", styles.iter().map(|s| ital(s).to_string()).collect()),
        (true, true) => return String::new(),
    };
    format!(":{}@{}", axis, values.join(";"))
}

/// `application/x-www-form-urlencoded` encoding: unreserved bytes pass
/// through, spaces become `+`, everything else is percent-encoded.
fn form_urlencode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Where a font family's files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    Files(Vec<FontFile>),
    Google(HostedFont),
    Bunny(HostedFont),
    System,
}

impl FontSource {
    /// The `source` key used in brand files.
    pub fn kind(&self) -> &'static str {
        match self {
            FontSource::Files(_) => "file",
            FontSource::Google(_) => "google",
            FontSource::Bunny(_) => "bunny",
            FontSource::System => "system",
        }
    }

    pub fn hosted(&self) -> Option<(FontProvider, &HostedFont)> {
        match self {
            FontSource::Google(font) => Some((FontProvider::Google, font)),
            FontSource::Bunny(font) => Some((FontProvider::Bunny, font)),
            FontSource::Files(_) | FontSource::System => None,
        }
    }
}

/// A declared font family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFamily {
    pub family: String,
    pub source: FontSource,
}

impl FontFamily {
    /// Stylesheet import URL for hosted families.
    pub fn import_url(&self) -> Option<String> {
        self.source
            .hosted()
            .map(|(provider, font)| font.import_url(provider, &self.family))
    }
}

impl Serialize for FontFamily {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("family", &self.family)?;
        map.serialize_entry("source", self.source.kind())?;
        match &self.source {
            FontSource::Files(files) => map.serialize_entry("files", files)?,
            FontSource::Google(font) | FontSource::Bunny(font) => {
                map.serialize_entry("weight", &font.weights)?;
                map.serialize_entry("style", &font.styles)?;
                map.serialize_entry("display", &font.display)?;
                map.serialize_entry("version", &font.version)?;
            }
            FontSource::System => {}
        }
        map.end()
    }
}

// ============================================================================
// Roles
// ============================================================================

/// Settings for one typographic role. Every field is optional; roles never
/// hold partially built values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TypographyRole {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Source of `family`, linked from the declared fonts.
    #[serde(skip)]
    pub source: Option<FontSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<FontStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoration: Option<String>,
}

impl TypographyRole {
    pub fn is_empty(&self) -> bool {
        *self == TypographyRole::default()
    }
}

/// The `typography` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Typography {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<FontFamily>,
    #[serde(skip_serializing_if = "TypographyRole::is_empty")]
    pub base: TypographyRole,
    #[serde(skip_serializing_if = "TypographyRole::is_empty")]
    pub headings: TypographyRole,
    #[serde(skip_serializing_if = "TypographyRole::is_empty")]
    pub monospace: TypographyRole,
    #[serde(skip_serializing_if = "TypographyRole::is_empty")]
    pub monospace_inline: TypographyRole,
    #[serde(skip_serializing_if = "TypographyRole::is_empty")]
    pub monospace_block: TypographyRole,
    #[serde(skip_serializing_if = "TypographyRole::is_empty")]
    pub link: TypographyRole,
}

impl Typography {
    /// Role names as written in brand files.
    pub const ROLES: [&'static str; 6] = [
        "base",
        "headings",
        "monospace",
        "monospace-inline",
        "monospace-block",
        "link",
    ];

    /// Looks up a role by its brand file name.
    pub fn role(&self, name: &str) -> Option<&TypographyRole> {
        match name {
            "base" => Some(&self.base),
            "headings" => Some(&self.headings),
            "monospace" => Some(&self.monospace),
            "monospace-inline" => Some(&self.monospace_inline),
            "monospace-block" => Some(&self.monospace_block),
            "link" => Some(&self.link),
            _ => None,
        }
    }

    pub(crate) fn role_mut(&mut self, name: &str) -> Option<&mut TypographyRole> {
        match name {
            "base" => Some(&mut self.base),
            "headings" => Some(&mut self.headings),
            "monospace" => Some(&mut self.monospace),
            "monospace-inline" => Some(&mut self.monospace_inline),
            "monospace-block" => Some(&mut self.monospace_block),
            "link" => Some(&mut self.link),
            _ => None,
        }
    }

    /// The declared font family named `family`.
    pub fn font(&self, family: &str) -> Option<&FontFamily> {
        self.fonts.iter().find(|f| f.family == family)
    }

    /// Import URLs of every hosted family, in declaration order.
    pub fn import_urls(&self) -> Vec<String> {
        self.fonts.iter().filter_map(FontFamily::import_url).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
            && Typography::ROLES
                .iter()
                .all(|r| self.role(r).is_some_and(TypographyRole::is_empty))
    }

    pub(crate) fn build(
        cx: &BuildContext<'_, '_>,
        node: Option<&Node>,
    ) -> Result<Self, BrandError> {
        let mut typography = Typography::default();
        let Some(node) = node.filter(|n| !n.is_null()) else {
            return Ok(typography);
        };

        let fonts = node.get("fonts").and_then(Node::as_sequence).unwrap_or_default();
        for (i, font) in fonts.iter().enumerate() {
            let path = index_path("typography.fonts", i);
            let family = build_font(cx, font, &path)?;
            if typography.font(&family.family).is_some() {
                return Err(cx.model_error(
                    &child_path(&path, "family"),
                    format!("font family '{}' is declared more than once", family.family),
                ));
            }
            typography.fonts.push(family);
        }

        for name in Typography::ROLES {
            let Some(value) = node.get(name).filter(|n| !n.is_null()) else {
                continue;
            };
            let role = build_role(cx, value, &child_path("typography", name))?;
            if let Some(slot) = typography.role_mut(name) {
                *slot = role;
            }
        }
        Ok(typography)
    }
}

// ============================================================================
// Building
// ============================================================================

fn build_font(
    cx: &BuildContext<'_, '_>,
    node: &Node,
    path: &str,
) -> Result<FontFamily, BrandError> {
    let family = cx
        .str_field(node, "family", path)?
        .ok_or_else(|| cx.model_error(&child_path(path, "family"), "font needs a family"))?
        .to_string();
    let source_path = child_path(path, "source");
    let source = match cx.str_field(node, "source", path)?.unwrap_or("system") {
        "file" => FontSource::Files(build_files(cx, node, path)?),
        "google" => FontSource::Google(build_hosted(cx, node, path, FontProvider::Google)?),
        "bunny" => FontSource::Bunny(build_hosted(cx, node, path, FontProvider::Bunny)?),
        "system" => FontSource::System,
        other => {
            return Err(cx.model_error(&source_path, format!("unknown font source '{}'", other)))
        }
    };
    tracing::trace!(family = %family, source = source.kind(), "font family");
    Ok(FontFamily { family, source })
}

fn build_files(
    cx: &BuildContext<'_, '_>,
    node: &Node,
    path: &str,
) -> Result<Vec<FontFile>, BrandError> {
    let files_path = child_path(path, "files");
    let entries = node.get("files").and_then(Node::as_sequence).unwrap_or_default();
    if entries.is_empty() {
        return Err(cx.model_error(&files_path, "file fonts need at least one file"));
    }

    let mut files = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let entry_path = index_path(&files_path, i);
        let (value, location_path) = match entry.as_str() {
            Some(text) => (text, entry_path.clone()),
            None => {
                let location_path = child_path(&entry_path, "path");
                let text = cx
                    .str_field(entry, "path", &entry_path)?
                    .ok_or_else(|| cx.model_error(&location_path, "font file needs a path"))?;
                (text, location_path)
            }
        };
        let location = cx.file_location(&location_path, value)?;
        let format = location
            .extension()
            .and_then(|ext| FontFormat::from_extension(&ext))
            .ok_or_else(|| {
                cx.model_error(
                    &location_path,
                    format!("unsupported font file format '{}'", value),
                )
            })?;
        let weight = match entry.get("weight").filter(|n| !n.is_null()) {
            Some(w) => FontWeight::from_node(w)
                .map_err(|reason| cx.model_error(&child_path(&entry_path, "weight"), reason))?,
            None => FontWeight::NORMAL,
        };
        let style = match entry.get("style").filter(|n| !n.is_null()) {
            Some(s) => parse_style(cx, s, &child_path(&entry_path, "style"))?,
            None => FontStyle::Normal,
        };
        files.push(FontFile {
            location,
            weight,
            style,
            format,
        });
    }

    // Declared weights and styles must each have a file.
    let weights = optional_list(cx, node, "weight", path, |cx, n, p| {
        FontWeight::from_node(n).map_err(|reason| cx.model_error(p, reason))
    })?;
    let styles = optional_list(cx, node, "style", path, parse_style)?;
    let wanted_weights: Vec<Option<FontWeight>> = match weights {
        Some(ws) => ws.into_iter().map(Some).collect(),
        None => vec![None],
    };
    let wanted_styles: Vec<Option<FontStyle>> = match styles {
        Some(ss) => ss.into_iter().map(Some).collect(),
        None => vec![None],
    };
    for weight in &wanted_weights {
        for style in &wanted_styles {
            let covered = files.iter().any(|f| {
                weight.map_or(true, |w| f.weight == w) && style.map_or(true, |s| f.style == s)
            });
            if !covered {
                let mut wanted = Vec::new();
                if let Some(w) = weight {
                    wanted.push(w.to_string());
                }
                if let Some(s) = style {
                    wanted.push(s.as_str().to_string());
                }
                return Err(cx.model_error(
                    &files_path,
                    format!("no font file provides {}", wanted.join(" ")),
                ));
            }
        }
    }
    Ok(files)
}

fn build_hosted(
    cx: &BuildContext<'_, '_>,
    node: &Node,
    path: &str,
    provider: FontProvider,
) -> Result<HostedFont, BrandError> {
    let mut font = HostedFont::new(provider);
    if let Some(weights) = optional_list(cx, node, "weight", path, |cx, n, p| {
        FontWeight::from_node(n).map_err(|reason| cx.model_error(p, reason))
    })? {
        font.weights = weights;
    }
    if let Some(styles) = optional_list(cx, node, "style", path, parse_style)? {
        font.styles = styles;
    }
    if let Some(display) = cx.str_field(node, "display", path)? {
        font.display = FontDisplay::from_name(display).ok_or_else(|| {
            cx.model_error(
                &child_path(path, "display"),
                format!("unknown font display '{}'", display),
            )
        })?;
    }
    if let Some(version) = node.get("version").filter(|n| !n.is_null()) {
        let version_path = child_path(path, "version");
        font.version = version
            .as_i64()
            .filter(|v| (1..=2).contains(v))
            .map(|v| v as u8)
            .ok_or_else(|| cx.model_error(&version_path, "font API version must be 1 or 2"))?;
    }
    Ok(font)
}

fn build_role(
    cx: &BuildContext<'_, '_>,
    node: &Node,
    path: &str,
) -> Result<TypographyRole, BrandError> {
    // `base: Open Sans` is shorthand for `base: {family: Open Sans}`.
    if let Some(family) = node.as_str() {
        return Ok(TypographyRole {
            family: Some(family.to_string()),
            ..TypographyRole::default()
        });
    }

    let mut role = TypographyRole {
        family: cx.str_field(node, "family", path)?.map(str::to_string),
        size: cx.str_field(node, "size", path)?.map(str::to_string),
        decoration: cx.str_field(node, "decoration", path)?.map(str::to_string),
        color: cx.color(&child_path(path, "color")),
        background_color: cx.color(&child_path(path, "background-color")),
        ..TypographyRole::default()
    };
    if let Some(weight) = node.get("weight").filter(|n| !n.is_null()) {
        role.weight = Some(
            FontWeight::from_node(weight)
                .map_err(|reason| cx.model_error(&child_path(path, "weight"), reason))?,
        );
    }
    if let Some(style) = node.get("style").filter(|n| !n.is_null()) {
        role.style = Some(parse_style(cx, style, &child_path(path, "style"))?);
    }
    if let Some(line_height) = node.get("line-height").filter(|n| !n.is_null()) {
        role.line_height = Some(
            line_height
                .as_f64()
                .filter(|value| value.is_finite())
                .ok_or_else(|| {
                    cx.model_error(
                        &child_path(path, "line-height"),
                        "line height must be a finite number",
                    )
                })?,
        );
    }
    Ok(role)
}

fn parse_style(
    cx: &BuildContext<'_, '_>,
    node: &Node,
    path: &str,
) -> Result<FontStyle, BrandError> {
    node.as_str()
        .and_then(FontStyle::from_name)
        .ok_or_else(|| cx.model_error(path, "font style must be 'normal' or 'italic'"))
}

/// Reads `key` as one value or a list of values.
fn optional_list<T>(
    cx: &BuildContext<'_, '_>,
    node: &Node,
    key: &str,
    path: &str,
    parse: impl Fn(&BuildContext<'_, '_>, &Node, &str) -> Result<T, BrandError>,
) -> Result<Option<Vec<T>>, BrandError> {
    let field_path = child_path(path, key);
    match node.get(key).filter(|n| !n.is_null()) {
        None => Ok(None),
        Some(Node::Sequence(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| parse(cx, item, &index_path(&field_path, i)))
            .collect::<Result<Vec<T>, _>>()
            .map(Some),
        Some(single) => parse(cx, single, &field_path).map(|v| Some(vec![v])),
    }
}
