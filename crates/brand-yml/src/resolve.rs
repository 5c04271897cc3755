//! Symbolic reference resolution.
//!
//! Color fields in a brand file hold either a literal color or a name. Names
//! are looked up in this order:
//!
//! 1. a theme role set in `color` (`primary`, `dark`, ...)
//! 2. an entry of `color.palette`
//! 3. a CSS color keyword
//!
//! Theme roles may name other theme roles, so role lookups follow chains and
//! fail on cycles. A role naming itself skips step 1, which lets
//! `primary: primary` pick up `palette.primary`. Palette entries are plain
//! declarations and must be literal colors.
//!
//! Logo size variants written as strings may name an entry of `logo.images`;
//! those are recorded here so the builder can substitute the image.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::color::{named_color, Color};
use crate::document::{child_path, BrandDocument, Node};
use crate::error::BrandError;
use crate::model::{ThemeRole, Typography};

/// A color field as written: a literal, or a name to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorRef {
    Literal(String),
    Reference(String),
}

impl ColorRef {
    /// Hex and functional notations are literals; bare words are names.
    pub fn classify(text: &str) -> Self {
        let text = text.trim();
        if Color::looks_like_literal(text) {
            ColorRef::Literal(text.to_string())
        } else {
            ColorRef::Reference(text.to_string())
        }
    }
}

/// A validated document with every symbolic reference resolved.
#[derive(Debug)]
pub struct ResolvedDocument<'d> {
    doc: &'d BrandDocument,
    colors: IndexMap<String, Color>,
    logo_refs: IndexMap<String, String>,
}

impl<'d> ResolvedDocument<'d> {
    pub fn document(&self) -> &'d BrandDocument {
        self.doc
    }

    /// The concrete color for the color field at `path`.
    pub fn color(&self, path: &str) -> Option<Color> {
        self.colors.get(path).copied()
    }

    /// Every resolved color field, keyed by field path, in resolution order.
    pub fn colors(&self) -> &IndexMap<String, Color> {
        &self.colors
    }

    /// The `logo.images` key a logo variant at `path` refers to.
    pub fn logo_reference(&self, path: &str) -> Option<&str> {
        self.logo_refs.get(path).map(String::as_str)
    }
}

/// Resolves every color and logo reference in a validated document.
pub fn resolve(doc: &BrandDocument) -> Result<ResolvedDocument<'_>, BrandError> {
    let mut resolver = Resolver::new(doc);
    resolver.resolve_palette()?;
    resolver.collect_roles();
    resolver.resolve_theme()?;
    resolver.resolve_typography()?;
    resolver.resolve_logo();
    tracing::debug!(
        colors = resolver.colors.len(),
        logo_references = resolver.logo_refs.len(),
        "resolved brand references"
    );
    Ok(ResolvedDocument {
        doc,
        colors: resolver.colors,
        logo_refs: resolver.logo_refs,
    })
}

struct Resolver<'d> {
    doc: &'d BrandDocument,
    palette: IndexMap<&'d str, Color>,
    roles: IndexMap<ThemeRole, &'d str>,
    role_colors: HashMap<ThemeRole, Color>,
    colors: IndexMap<String, Color>,
    logo_refs: IndexMap<String, String>,
}

impl<'d> Resolver<'d> {
    fn new(doc: &'d BrandDocument) -> Self {
        Self {
            doc,
            palette: IndexMap::new(),
            roles: IndexMap::new(),
            role_colors: HashMap::new(),
            colors: IndexMap::new(),
            logo_refs: IndexMap::new(),
        }
    }

    fn entries(&self, path: &str) -> &'d [(String, Node)] {
        self.doc
            .get(path)
            .and_then(Node::as_mapping)
            .unwrap_or_default()
    }

    fn resolve_palette(&mut self) -> Result<(), BrandError> {
        let entries = self.entries("color.palette");
        let names: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        for (name, value) in entries {
            let Some(text) = value.as_str() else {
                continue;
            };
            if self.palette.contains_key(name.as_str()) {
                continue;
            }
            let path = child_path("color.palette", name);
            let color = match ColorRef::classify(text) {
                ColorRef::Literal(literal) => self.parse_literal(&path, &literal)?,
                ColorRef::Reference(word) => match named_color(&word) {
                    // Palette names shadow CSS keywords, as they do for roles.
                    _ if word != *name && names.contains(&word.as_str()) => {
                        return Err(BrandError::ModelBuild {
                            reason: format!(
                                "palette entries must be literal colors, '{}' names another color",
                                word
                            ),
                            location: self.doc.location(&path),
                            path,
                        });
                    }
                    Some(color) => color,
                    None if names.contains(&word.as_str())
                        || ThemeRole::from_name(&word).is_some() =>
                    {
                        return Err(BrandError::ModelBuild {
                            reason: format!(
                                "palette entries must be literal colors, '{}' names another color",
                                word
                            ),
                            location: self.doc.location(&path),
                            path,
                        });
                    }
                    None => {
                        return Err(BrandError::UnresolvedReference {
                            location: self.doc.location(&path),
                            path,
                            name: word,
                        });
                    }
                },
            };
            tracing::trace!(name = %name, color = %color, "palette entry");
            self.palette.insert(name.as_str(), color);
            self.colors.insert(path, color);
        }
        Ok(())
    }

    fn collect_roles(&mut self) {
        for (key, value) in self.entries("color") {
            if let (Some(role), Some(text)) = (ThemeRole::from_name(key), value.as_str()) {
                self.roles.entry(role).or_insert(text);
            }
        }
    }

    fn resolve_theme(&mut self) -> Result<(), BrandError> {
        for role in ThemeRole::ALL {
            let Some(text) = self.roles.get(&role).copied() else {
                continue;
            };
            let path = child_path("color", role.as_str());
            let color = self.resolve_value(&path, text, Some(role))?;
            self.colors.insert(path, color);
        }
        Ok(())
    }

    fn resolve_typography(&mut self) -> Result<(), BrandError> {
        for role in Typography::ROLES {
            let role_path = child_path("typography", role);
            for field in ["color", "background-color"] {
                let path = child_path(&role_path, field);
                let Some(text) = self.doc.get(&path).and_then(Node::as_str) else {
                    continue;
                };
                let color = self.resolve_value(&path, text, None)?;
                self.colors.insert(path, color);
            }
        }
        Ok(())
    }

    fn resolve_logo(&mut self) {
        let images: Vec<&str> = self
            .entries("logo.images")
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        if images.is_empty() {
            return;
        }
        for size in ["small", "medium", "large"] {
            let path = child_path("logo", size);
            let Some(node) = self.doc.get(&path) else {
                continue;
            };
            let mut candidates = vec![(path.clone(), node)];
            for mode in ["light", "dark"] {
                if let Some(inner) = node.get(mode) {
                    candidates.push((child_path(&path, mode), inner));
                }
            }
            for (path, node) in candidates {
                if let Some(name) = node.as_str().filter(|n| images.contains(n)) {
                    tracing::trace!(path = %path, image = name, "logo image reference");
                    self.logo_refs.insert(path, name.to_string());
                }
            }
        }
    }

    /// Follows `text` to a concrete color. `start` is the role being resolved,
    /// when the value belongs to a theme role.
    fn resolve_value(
        &mut self,
        path: &str,
        text: &'d str,
        start: Option<ThemeRole>,
    ) -> Result<Color, BrandError> {
        let mut chain: Vec<ThemeRole> = start.into_iter().collect();
        let mut at = path.to_string();
        let mut current = text;

        let color = loop {
            let name = match ColorRef::classify(current) {
                ColorRef::Literal(literal) => break self.parse_literal(&at, &literal)?,
                ColorRef::Reference(name) => name,
            };

            let role = ThemeRole::from_name(&name)
                .filter(|r| self.roles.contains_key(r) && chain.last() != Some(r));
            if let Some(role) = role {
                if let Some(color) = self.role_colors.get(&role) {
                    break *color;
                }
                let looped = chain.contains(&role);
                chain.push(role);
                if looped {
                    return Err(BrandError::CyclicReference {
                        path: path.to_string(),
                        chain: chain.iter().map(|r| r.as_str().to_string()).collect(),
                        location: self.doc.location(path),
                    });
                }
                at = child_path("color", role.as_str());
                current = self.roles[&role];
                continue;
            }

            if let Some(color) = self.palette.get(name.as_str()) {
                break *color;
            }
            if let Some(color) = named_color(&name) {
                break color;
            }
            return Err(BrandError::UnresolvedReference {
                location: self.doc.location(&at),
                path: at,
                name,
            });
        };

        for role in chain {
            self.role_colors.insert(role, color);
        }
        Ok(color)
    }

    fn parse_literal(&self, path: &str, literal: &str) -> Result<Color, BrandError> {
        Color::parse(literal).map_err(|e| BrandError::ModelBuild {
            path: path.to_string(),
            reason: e.to_string(),
            location: self.doc.location(path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{load_str, Origin};

    fn doc(text: &str) -> BrandDocument {
        load_str(text, Origin::default()).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(ColorRef::classify("#fff"), ColorRef::Literal("#fff".into()));
        assert_eq!(
            ColorRef::classify(" rgb(0, 0, 0) "),
            ColorRef::Literal("rgb(0, 0, 0)".into())
        );
        assert_eq!(ColorRef::classify("blue"), ColorRef::Reference("blue".into()));
    }

    // =========================================================================
    // Palette
    // =========================================================================

    #[test]
    fn test_palette_literals() {
        let d = doc("color:\n  palette:\n    blue: '#0085c3'\n    ink: black\n");
        let resolved = resolve(&d).unwrap();
        assert_eq!(
            resolved.color("color.palette.blue"),
            Some(Color::rgb(0x00, 0x85, 0xc3))
        );
        assert_eq!(resolved.color("color.palette.ink"), Some(Color::BLACK));
    }

    #[test]
    fn test_palette_entry_cannot_reference_palette() {
        let d = doc("color:\n  palette:\n    blue: '#0085c3'\n    brand: blue\n  primary: blue\n");
        let err = resolve(&d).unwrap_err();
        assert!(matches!(
            err,
            BrandError::ModelBuild { ref path, .. } if path == "color.palette.brand"
        ));

        let d = doc("color:\n  palette:\n    navy-ish: '#004'\n    brand: navy-ish\n");
        let err = resolve(&d).unwrap_err();
        assert!(matches!(
            err,
            BrandError::ModelBuild { ref path, .. } if path == "color.palette.brand"
        ));
    }

    #[test]
    fn test_palette_keyword_under_its_own_name() {
        let d = doc("color:\n  palette:\n    white: white\n    ink: black\n");
        let resolved = resolve(&d).unwrap();
        assert_eq!(resolved.color("color.palette.white"), Some(Color::WHITE));
        assert_eq!(resolved.color("color.palette.ink"), Some(Color::BLACK));
    }

    #[test]
    fn test_palette_malformed_literal() {
        let d = doc("color:\n  palette:\n    bad: '#12345'\n");
        let err = resolve(&d).unwrap_err();
        assert!(matches!(
            err,
            BrandError::ModelBuild { ref path, .. } if path == "color.palette.bad"
        ));
        assert_eq!(err.location().and_then(|l| l.span).map(|s| s.line), Some(3));
    }

    // =========================================================================
    // Theme roles
    // =========================================================================

    #[test]
    fn test_theme_role_from_palette() {
        let d = doc("color:\n  palette:\n    blue: '#0085c3'\n  primary: blue\n");
        let resolved = resolve(&d).unwrap();
        assert_eq!(resolved.color("color.primary"), Some(Color::rgb(0x00, 0x85, 0xc3)));
    }

    #[test]
    fn test_palette_wins_over_css_keyword() {
        let d = doc("color:\n  palette:\n    red: '#e0301e'\n  danger: red\n");
        let resolved = resolve(&d).unwrap();
        assert_eq!(resolved.color("color.danger"), Some(Color::rgb(0xe0, 0x30, 0x1e)));
    }

    #[test]
    fn test_theme_role_chain() {
        let d = doc(
            "color:\n  palette:\n    ink: '#111'\n  foreground: dark\n  dark: ink\n",
        );
        let resolved = resolve(&d).unwrap();
        assert_eq!(resolved.color("color.foreground"), Some(Color::rgb(0x11, 0x11, 0x11)));
        assert_eq!(resolved.color("color.dark"), Some(Color::rgb(0x11, 0x11, 0x11)));
    }

    #[test]
    fn test_role_naming_itself_uses_palette() {
        let d = doc("color:\n  palette:\n    primary: '#abcdef'\n  primary: primary\n");
        let resolved = resolve(&d).unwrap();
        assert_eq!(resolved.color("color.primary"), Some(Color::rgb(0xab, 0xcd, 0xef)));
    }

    #[test]
    fn test_cycle_reports_chain() {
        let d = doc("color:\n  primary: secondary\n  secondary: tertiary\n  tertiary: primary\n");
        match resolve(&d).unwrap_err() {
            BrandError::CyclicReference { path, chain, .. } => {
                assert_eq!(path, "color.primary");
                assert_eq!(chain, vec!["primary", "secondary", "tertiary", "primary"]);
            }
            other => panic!("expected CyclicReference, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_name() {
        let d = doc("color:\n  palette:\n    blue: '#00f'\n  primary: unknownColor\n");
        match resolve(&d).unwrap_err() {
            BrandError::UnresolvedReference { path, name, location } => {
                assert_eq!(path, "color.primary");
                assert_eq!(name, "unknownColor");
                assert_eq!(location.span.unwrap().line, 4);
            }
            other => panic!("expected UnresolvedReference, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_name_through_chain_points_at_last_hop() {
        let d = doc("color:\n  primary: secondary\n  secondary: nope\n");
        let err = resolve(&d).unwrap_err();
        assert!(matches!(
            err,
            BrandError::UnresolvedReference { ref path, ref name, .. }
                if path == "color.secondary" && name == "nope"
        ));
    }

    // =========================================================================
    // Typography and logo
    // =========================================================================

    #[test]
    fn test_typography_colors() {
        let d = doc(
            "color:\n  palette:\n    blue: '#0085c3'\n  primary: blue\ntypography:\n  link:\n    color: primary\n  headings:\n    background-color: '#fff'\n",
        );
        let resolved = resolve(&d).unwrap();
        assert_eq!(
            resolved.color("typography.link.color"),
            Some(Color::rgb(0x00, 0x85, 0xc3))
        );
        assert_eq!(
            resolved.color("typography.headings.background-color"),
            Some(Color::WHITE)
        );
    }

    #[test]
    fn test_logo_references() {
        let d = doc(
            "logo:\n  images:\n    icon: icon.png\n    mark: mark.svg\n  small: icon\n  large:\n    light: mark\n    dark: dark.svg\n",
        );
        let resolved = resolve(&d).unwrap();
        assert_eq!(resolved.logo_reference("logo.small"), Some("icon"));
        assert_eq!(resolved.logo_reference("logo.large.light"), Some("mark"));
        assert_eq!(resolved.logo_reference("logo.large.dark"), None);
    }
}
