//! Structural validation of a document against a [`Schema`].
//!
//! Validation never resolves references. It walks the document once, in
//! document order, and collects every problem it finds so a single run
//! reports everything an author needs to fix.
//!
//! # Unknown keys
//!
//! Unknown keys are the only problem that can be downgraded. Objects marked
//! `extensible` in the schema (the document root) treat unknown keys as
//! forward-compatible sections and apply
//! [`ValidatorConfig::unknown_sections`], a warning by default. Unknown keys
//! anywhere else apply [`ValidatorConfig::unknown_fields`], an error by
//! default.

use std::collections::HashMap;
use std::fmt;

use super::{ObjectSchema, Schema, SchemaNode};
use crate::document::{child_path, index_path, BrandDocument, Node, SourceLocation};

/// How to treat keys the schema does not describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    /// Accept silently.
    Allow,
    /// Report as a warning.
    Warn,
    /// Report as an error.
    Deny,
}

/// Validator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Policy for unknown keys in extensible objects (top-level sections).
    pub unknown_sections: UnknownFieldPolicy,
    /// Policy for unknown keys everywhere else.
    pub unknown_fields: UnknownFieldPolicy,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            unknown_sections: UnknownFieldPolicy::Warn,
            unknown_fields: UnknownFieldPolicy::Deny,
        }
    }
}

impl ValidatorConfig {
    /// Every unknown key is an error.
    pub fn strict() -> Self {
        Self {
            unknown_sections: UnknownFieldPolicy::Deny,
            unknown_fields: UnknownFieldPolicy::Deny,
        }
    }
}

/// What went wrong at a field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationErrorKind {
    #[error("missing required field")]
    MissingRequiredField,

    #[error("unknown field")]
    UnknownField,

    #[error("expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("'{value}' is not one of: {}", .allowed.join(", "))]
    EnumViolation { value: String, allowed: Vec<String> },

    #[error("duplicate key")]
    DuplicateKey,

    #[error("{0}")]
    InvalidValue(String),
}

/// A structural problem at a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: String,
    pub kind: ValidationErrorKind,
    pub location: SourceLocation,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "<root>"
        } else {
            &self.path
        };
        write!(f, "{}: {}: {}", self.location, path, self.kind)
    }
}

impl std::error::Error for ValidationError {}

/// Errors and warnings from one validation run, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, severity: UnknownFieldPolicy, error: ValidationError) {
        match severity {
            UnknownFieldPolicy::Allow => {}
            UnknownFieldPolicy::Warn => self.warnings.push(error),
            UnknownFieldPolicy::Deny => self.errors.push(error),
        }
    }

    fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.errors.len();
        write!(
            f,
            "brand document failed validation with {} error{}",
            n,
            if n == 1 { "" } else { "s" }
        )?;
        for error in &self.errors {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}

/// Validates documents against a schema.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'s> {
    schema: &'s Schema,
    config: ValidatorConfig,
}

impl<'s> Validator<'s> {
    pub fn new(schema: &'s Schema, config: ValidatorConfig) -> Self {
        Self { schema, config }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Validates `doc` and returns everything that is wrong with it.
    pub fn validate(&self, doc: &BrandDocument) -> ValidationReport {
        let mut report = ValidationReport::default();
        match self.schema.root_node() {
            // An empty file is an empty brand.
            Some(_) if doc.root().is_null() => {}
            Some(root) => self.visit(doc, doc.root(), root, "", &mut report),
            None => report.errors.push(ValidationError {
                path: String::new(),
                kind: ValidationErrorKind::InvalidValue(format!(
                    "schema root '{}' is not defined",
                    self.schema.root
                )),
                location: doc.location(""),
            }),
        }
        tracing::debug!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "validated brand document"
        );
        report
    }

    fn visit(
        &self,
        doc: &BrandDocument,
        node: &Node,
        schema: &SchemaNode,
        path: &str,
        report: &mut ValidationReport,
    ) {
        let error = |kind: ValidationErrorKind| ValidationError {
            path: path.to_string(),
            kind,
            location: doc.location(path),
        };
        let mismatch = || {
            error(ValidationErrorKind::TypeMismatch {
                expected: self.schema.describe(schema),
                actual: node.kind().to_string(),
            })
        };

        match self.schema.resolve(schema) {
            SchemaNode::Any => {}
            SchemaNode::String => {
                if node.as_str().is_none() {
                    report.errors.push(mismatch());
                }
            }
            SchemaNode::Boolean => {
                if !matches!(node, Node::Bool(_)) {
                    report.errors.push(mismatch());
                }
            }
            SchemaNode::Number { minimum, maximum } => match node.as_f64() {
                None => report.errors.push(mismatch()),
                Some(n) => {
                    if minimum.is_some_and(|min| n < min) || maximum.is_some_and(|max| n > max) {
                        report.errors.push(error(ValidationErrorKind::InvalidValue(
                            range_message(n, *minimum, *maximum),
                        )));
                    }
                }
            },
            SchemaNode::Integer {
                minimum,
                maximum,
                multiple_of,
            } => match node.as_i64() {
                None => report.errors.push(mismatch()),
                Some(n) => {
                    if minimum.is_some_and(|min| n < min) || maximum.is_some_and(|max| n > max) {
                        report.errors.push(error(ValidationErrorKind::InvalidValue(
                            range_message(
                                n as f64,
                                minimum.map(|m| m as f64),
                                maximum.map(|m| m as f64),
                            ),
                        )));
                    } else if let Some(step) = multiple_of.filter(|s| *s != 0) {
                        if n % step != 0 {
                            report.errors.push(error(ValidationErrorKind::InvalidValue(
                                format!("{} is not a multiple of {}", n, step),
                            )));
                        }
                    }
                }
            },
            SchemaNode::Enum { values } => match node.as_str() {
                None => report.errors.push(mismatch()),
                Some(s) if values.iter().any(|v| v == s) => {}
                Some(s) => report.errors.push(error(ValidationErrorKind::EnumViolation {
                    value: s.to_string(),
                    allowed: values.clone(),
                })),
            },
            SchemaNode::Object(object) => match node.as_mapping() {
                None => report.errors.push(mismatch()),
                Some(entries) => self.visit_object(doc, entries, object, path, report),
            },
            SchemaNode::Map { values } => match node.as_mapping() {
                None => report.errors.push(mismatch()),
                Some(entries) => {
                    let mut seen: HashMap<&str, usize> = HashMap::new();
                    for (key, value) in entries {
                        let child = child_path(path, key);
                        if self.check_duplicate(doc, &mut seen, key, &child, report) {
                            continue;
                        }
                        self.visit(doc, value, values, &child, report);
                    }
                }
            },
            SchemaNode::List { items } => match node.as_sequence() {
                None => report.errors.push(mismatch()),
                Some(seq) => {
                    for (i, item) in seq.iter().enumerate() {
                        self.visit(doc, item, items, &index_path(path, i), report);
                    }
                }
            },
            SchemaNode::OneOf { variants } => {
                let mut first_failure: Option<ValidationReport> = None;
                for variant in variants {
                    if !self.accepts_kind(variant, node) {
                        continue;
                    }
                    let mut attempt = ValidationReport::default();
                    self.visit(doc, node, variant, path, &mut attempt);
                    if attempt.is_ok() {
                        report.merge(attempt);
                        return;
                    }
                    first_failure.get_or_insert(attempt);
                }
                match first_failure {
                    Some(failure) => report.merge(failure),
                    None => report.errors.push(mismatch()),
                }
            }
            SchemaNode::Tagged { tag, variants } => {
                if node.as_mapping().is_none() {
                    report.errors.push(mismatch());
                    return;
                }
                let tag_path = child_path(path, tag);
                match node.get(tag).and_then(Node::as_str) {
                    None => report.errors.push(ValidationError {
                        location: doc.location(&tag_path),
                        path: tag_path,
                        kind: ValidationErrorKind::MissingRequiredField,
                    }),
                    Some(value) => match variants.get(value) {
                        Some(variant) => self.visit(doc, node, variant, path, report),
                        None => report.errors.push(ValidationError {
                            location: doc.location(&tag_path),
                            path: tag_path,
                            kind: ValidationErrorKind::EnumViolation {
                                value: value.to_string(),
                                allowed: variants.keys().cloned().collect(),
                            },
                        }),
                    },
                }
            }
            // Only reachable for refs the schema check would have rejected.
            SchemaNode::Ref { .. } => {}
        }
    }

    fn visit_object(
        &self,
        doc: &BrandDocument,
        entries: &[(String, Node)],
        object: &ObjectSchema,
        path: &str,
        report: &mut ValidationReport,
    ) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (key, value) in entries {
            let child = child_path(path, key);
            if self.check_duplicate(doc, &mut seen, key, &child, report) {
                continue;
            }
            match object.properties.get(key) {
                // An explicit null is the same as leaving the field out.
                Some(_) if value.is_null() => {}
                Some(field) => self.visit(doc, value, field, &child, report),
                None => match &object.extra {
                    Some(extra) => self.visit(doc, value, extra, &child, report),
                    None => {
                        let policy = if object.extensible {
                            self.config.unknown_sections
                        } else {
                            self.config.unknown_fields
                        };
                        report.push(
                            policy,
                            ValidationError {
                                location: doc.location(&child),
                                path: child,
                                kind: ValidationErrorKind::UnknownField,
                            },
                        );
                    }
                },
            }
        }

        for required in &object.required {
            let present = entries
                .iter()
                .any(|(k, v)| k == required && !v.is_null());
            if !present {
                let child = child_path(path, required);
                report.errors.push(ValidationError {
                    location: doc.location(&child),
                    path: child,
                    kind: ValidationErrorKind::MissingRequiredField,
                });
            }
        }
    }

    /// Records a duplicate-key error and returns true for repeated keys.
    fn check_duplicate<'k>(
        &self,
        doc: &BrandDocument,
        seen: &mut HashMap<&'k str, usize>,
        key: &'k str,
        child: &str,
        report: &mut ValidationReport,
    ) -> bool {
        let count = seen.entry(key).or_insert(0);
        *count += 1;
        if *count == 1 {
            return false;
        }
        report.errors.push(ValidationError {
            path: child.to_string(),
            kind: ValidationErrorKind::DuplicateKey,
            location: doc.location_nth(child, *count - 1),
        });
        true
    }

    /// Whether `schema` could accept a node of this kind at all.
    fn accepts_kind(&self, schema: &SchemaNode, node: &Node) -> bool {
        match self.schema.resolve(schema) {
            SchemaNode::Any => true,
            SchemaNode::String | SchemaNode::Enum { .. } => matches!(node, Node::String(_)),
            SchemaNode::Boolean => matches!(node, Node::Bool(_)),
            SchemaNode::Number { .. } => matches!(node, Node::Integer(_) | Node::Float(_)),
            SchemaNode::Integer { .. } => matches!(node, Node::Integer(_)),
            SchemaNode::Object(_) | SchemaNode::Map { .. } | SchemaNode::Tagged { .. } => {
                matches!(node, Node::Mapping(_))
            }
            SchemaNode::List { .. } => matches!(node, Node::Sequence(_)),
            SchemaNode::OneOf { variants } => variants.iter().any(|v| self.accepts_kind(v, node)),
            SchemaNode::Ref { .. } => true,
        }
    }
}

fn range_message(n: f64, minimum: Option<f64>, maximum: Option<f64>) -> String {
    match (minimum, maximum) {
        (Some(min), Some(max)) => format!("{} is out of range ({}..={})", n, min, max),
        (Some(min), None) => format!("{} is below the minimum of {}", n, min),
        (None, Some(max)) => format!("{} is above the maximum of {}", n, max),
        (None, None) => format!("{} is out of range", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{load_str, Origin};
    use crate::schema::SchemaVersion;

    fn validate_with(text: &str, config: ValidatorConfig) -> ValidationReport {
        let doc = load_str(text, Origin::default()).unwrap();
        Validator::new(Schema::builtin(SchemaVersion::V1), config).validate(&doc)
    }

    fn validate(text: &str) -> ValidationReport {
        validate_with(text, ValidatorConfig::default())
    }

    fn kinds(errors: &[ValidationError]) -> Vec<(&str, &ValidationErrorKind)> {
        errors.iter().map(|e| (e.path.as_str(), &e.kind)).collect()
    }

    // =========================================================================
    // Valid documents
    // =========================================================================

    #[test]
    fn test_valid_document_has_no_errors() {
        let report = validate(
            r##"
meta:
  name:
    full: Acme Corporation
    short: Acme
  link:
    home: https://acme.example
logo:
  images:
    icon: icon.png
  small: icon
  large:
    light: logo-light.svg
    dark: logo-dark.svg
color:
  palette:
    blue: "#0085c3"
  primary: blue
typography:
  fonts:
    - family: Open Sans
      source: google
      weight: [400, bold]
    - family: Fira Code
      source: file
      files:
        - path: fira.woff2
          weight: 400
  base: Open Sans
  monospace:
    family: Fira Code
    size: 0.9em
  link:
    decoration: underline
defaults:
  bootstrap:
    enable-rounded: false
"##,
        );
        assert!(report.is_ok(), "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_explicit_null_is_unset() {
        let report = validate("color:\n  primary:\n");
        assert!(report.is_ok(), "{:?}", report.errors);
    }

    // =========================================================================
    // Structural errors
    // =========================================================================

    #[test]
    fn test_type_mismatch() {
        let report = validate("color:\n  palette:\n    blue: 12\n");
        assert_eq!(
            kinds(&report.errors),
            vec![(
                "color.palette.blue",
                &ValidationErrorKind::TypeMismatch {
                    expected: "string".into(),
                    actual: "integer".into()
                }
            )]
        );
        assert_eq!(report.errors[0].location.span.unwrap().line, 3);
    }

    #[test]
    fn test_missing_required_field() {
        let report = validate("typography:\n  fonts:\n    - source: google\n");
        assert_eq!(
            kinds(&report.errors),
            vec![(
                "typography.fonts[0].family",
                &ValidationErrorKind::MissingRequiredField
            )]
        );
    }

    #[test]
    fn test_enum_violation() {
        let report = validate("typography:\n  headings:\n    style: oblique\n");
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "typography.headings.style");
        assert!(matches!(
            &report.errors[0].kind,
            ValidationErrorKind::EnumViolation { value, .. } if value == "oblique"
        ));
    }

    #[test]
    fn test_invalid_font_weight_number() {
        let report = validate("typography:\n  base:\n    weight: 750\n");
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            &report.errors[0].kind,
            ValidationErrorKind::InvalidValue(msg) if msg.contains("multiple of 100")
        ));
    }

    #[test]
    fn test_unknown_font_source() {
        let report = validate("typography:\n  fonts:\n    - family: X\n      source: adobe\n");
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "typography.fonts[0].source");
        assert!(matches!(
            &report.errors[0].kind,
            ValidationErrorKind::EnumViolation { allowed, .. } if allowed.len() == 4
        ));
    }

    #[test]
    fn test_duplicate_palette_key() {
        let report = validate("color:\n  palette:\n    blue: '#00f'\n    blue: '#11f'\n");
        assert_eq!(
            kinds(&report.errors),
            vec![("color.palette.blue", &ValidationErrorKind::DuplicateKey)]
        );
        assert_eq!(report.errors[0].location.span.unwrap().line, 4);
    }

    #[test]
    fn test_collects_all_errors_in_document_order() {
        let report = validate(
            "color:\n  primary: 1\n  secondary: 2\ntypography:\n  base:\n    weight: heavy\n",
        );
        let paths: Vec<&str> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["color.primary", "color.secondary", "typography.base.weight"]
        );
    }

    #[test]
    fn test_root_must_be_mapping() {
        let report = validate("- a\n- b\n");
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "");
    }

    // =========================================================================
    // Unknown keys
    // =========================================================================

    #[test]
    fn test_unknown_top_level_section_warns_by_default() {
        let report = validate("meta:\n  name: Acme\nmotion:\n  speed: fast\n");
        assert!(report.is_ok());
        assert_eq!(
            kinds(&report.warnings),
            vec![("motion", &ValidationErrorKind::UnknownField)]
        );
    }

    #[test]
    fn test_unknown_top_level_section_denied_when_strict() {
        let report = validate_with("motion: {}\n", ValidatorConfig::strict());
        assert_eq!(
            kinds(&report.errors),
            vec![("motion", &ValidationErrorKind::UnknownField)]
        );
    }

    #[test]
    fn test_unknown_top_level_section_allowed() {
        let config = ValidatorConfig {
            unknown_sections: UnknownFieldPolicy::Allow,
            ..ValidatorConfig::default()
        };
        let report = validate_with("motion: {}\n", config);
        assert!(report.is_ok());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_unknown_nested_field_is_error() {
        let report = validate("color:\n  primray: blue\n");
        assert_eq!(
            kinds(&report.errors),
            vec![("color.primray", &ValidationErrorKind::UnknownField)]
        );
    }

    #[test]
    fn test_unknown_nested_field_can_warn() {
        let config = ValidatorConfig {
            unknown_fields: UnknownFieldPolicy::Warn,
            ..ValidatorConfig::default()
        };
        let report = validate_with("color:\n  primray: blue\n", config);
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_meta_accepts_free_form_fields() {
        let report = validate("meta:\n  name: Acme\n  founded: 1999\n");
        assert!(report.is_ok());
        assert!(report.warnings.is_empty());
    }

    // =========================================================================
    // One-of selection
    // =========================================================================

    #[test]
    fn test_logo_variant_light_dark() {
        let report = validate("logo:\n  medium:\n    light: a.png\n    dark: b.png\n");
        assert!(report.is_ok(), "{:?}", report.errors);
    }

    #[test]
    fn test_one_of_with_no_matching_kind() {
        let report = validate("logo: 5\n");
        assert_eq!(
            kinds(&report.errors),
            vec![(
                "logo",
                &ValidationErrorKind::TypeMismatch {
                    expected: "string or mapping".into(),
                    actual: "integer".into()
                }
            )]
        );
    }

    #[test]
    fn test_report_display_lists_errors() {
        let report = validate("color:\n  primary: 1\n");
        let text = report.to_string();
        assert!(text.contains("1 error"));
        assert!(text.contains("<input>:2:3: color.primary: expected string, found integer"));
    }
}
