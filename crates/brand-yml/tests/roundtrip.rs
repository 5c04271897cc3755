//! Property-based tests for brand building using proptest.

use std::collections::BTreeMap;

use brand_yml::{Brand, BrandError};
use proptest::prelude::*;

// ============================================================================
// Document generation
// ============================================================================

#[derive(Debug, Clone)]
struct DocSpec {
    palette: BTreeMap<String, (u8, u8, u8)>,
    /// Index into the palette for `primary`, or a literal when out of range.
    primary: (usize, (u8, u8, u8)),
    secondary_is_primary: bool,
    font: Option<(String, bool)>,
    monospace_size: Option<String>,
}

fn hex((r, g, b): (u8, u8, u8)) -> String {
    format!("\"#{:02x}{:02x}{:02x}\"", r, g, b)
}

impl DocSpec {
    fn to_yaml(&self) -> String {
        let mut out = String::from("meta:\n  name: Generated\ncolor:\n");
        if !self.palette.is_empty() {
            out.push_str("  palette:\n");
            for (name, rgb) in &self.palette {
                out.push_str(&format!("    {}: {}\n", name, hex(*rgb)));
            }
        }
        let (index, literal) = self.primary;
        match self.palette.keys().nth(index) {
            Some(name) => out.push_str(&format!("  primary: {}\n", name)),
            None => out.push_str(&format!("  primary: {}\n", hex(literal))),
        }
        if self.secondary_is_primary {
            out.push_str("  secondary: primary\n");
        }

        out.push_str("typography:\n");
        if let Some((family, google)) = &self.font {
            let source = if *google { "google" } else { "bunny" };
            out.push_str(&format!(
                "  fonts:\n    - family: {}\n      source: {}\n",
                family, source
            ));
            out.push_str(&format!("  base: {}\n", family));
        }
        out.push_str("  monospace:\n    family: Fira Code\n");
        if let Some(size) = &self.monospace_size {
            out.push_str(&format!("    size: {}\n", size));
        }
        out
    }
}

fn rgb() -> impl Strategy<Value = (u8, u8, u8)> {
    (any::<u8>(), any::<u8>(), any::<u8>())
}

fn doc_strategy() -> impl Strategy<Value = DocSpec> {
    (
        prop::collection::btree_map("brand-[a-z]{2,6}", rgb(), 0..5),
        (0usize..6, rgb()),
        any::<bool>(),
        prop::option::of(("[A-Z][a-z]{2,8} Sans", any::<bool>())),
        prop::option::of("[1-9]\\.[0-9]em"),
    )
        .prop_map(
            |(palette, primary, secondary_is_primary, font, monospace_size)| DocSpec {
                palette,
                primary,
                secondary_is_primary,
                font,
                monospace_size,
            },
        )
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Serializing a built brand and building it again gives the same brand.
    #[test]
    fn build_is_idempotent_through_serialization(spec in doc_strategy()) {
        let brand = Brand::from_yaml_str(&spec.to_yaml()).unwrap();
        let text = brand.to_yaml_string().unwrap();
        let rebuilt = Brand::from_yaml_str(&text).unwrap();
        prop_assert_eq!(rebuilt, brand);
    }

    /// Every theme color is concrete after building.
    #[test]
    fn primary_always_resolves(spec in doc_strategy()) {
        let brand = Brand::from_yaml_str(&spec.to_yaml()).unwrap();
        prop_assert!(brand.color().theme.primary.is_some());
        if spec.secondary_is_primary {
            prop_assert_eq!(brand.color().theme.secondary, brand.color().theme.primary);
        }
    }

    /// Unset monospace children are always filled from `monospace`.
    #[test]
    fn monospace_children_never_partial(spec in doc_strategy()) {
        let brand = Brand::from_yaml_str(&spec.to_yaml()).unwrap();
        let typography = brand.typography();
        for child in [&typography.monospace_inline, &typography.monospace_block] {
            prop_assert_eq!(child.family.as_deref(), Some("Fira Code"));
            prop_assert_eq!(&child.size, &typography.monospace.size);
        }
    }

    /// A reference to a name the palette does not declare fails with that name.
    #[test]
    fn undeclared_palette_name_is_reported(
        palette in prop::collection::btree_map("brand-[a-z]{2,6}", rgb(), 0..4),
        missing in "missing-[a-z]{2,6}",
    ) {
        let mut text = String::from("color:\n");
        if !palette.is_empty() {
            text.push_str("  palette:\n");
            for (name, color) in &palette {
                text.push_str(&format!("    {}: {}\n", name, hex(*color)));
            }
        }
        text.push_str(&format!("  primary: {}\n", missing));

        match Brand::from_yaml_str(&text) {
            Err(BrandError::UnresolvedReference { path, name, .. }) => {
                prop_assert_eq!(path, "color.primary");
                prop_assert_eq!(name, missing);
            }
            other => prop_assert!(false, "expected UnresolvedReference, got {:?}", other),
        }
    }
}
