//! Error types for the brand pipeline.
//!
//! Errors are layered by the stage that raised them. Loading and validation
//! wrap their own error types; the semantic stages (reference resolution and
//! model building) report directly through [`BrandError`] with the field path
//! and source location of the offending value.

use crate::discovery::DiscoveryError;
use crate::document::{LoadError, SourceLocation};
use crate::schema::{SchemaError, ValidationReport};

/// Errors that can occur while turning a brand file into a [`Brand`].
///
/// [`Brand`]: crate::Brand
#[derive(Debug, thiserror::Error)]
pub enum BrandError {
    /// The document could not be read or parsed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// No brand file could be located.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// The document does not match the schema. Holds every structural error.
    #[error("{0}")]
    Validation(ValidationReport),

    /// A color name that is neither declared nor a color.
    #[error("{location}: {path}: unresolved color reference '{name}'")]
    UnresolvedReference {
        path: String,
        name: String,
        location: SourceLocation,
    },

    /// A chain of color references that loops back on itself.
    #[error("{location}: {path}: cyclic color reference: {}", .chain.join(" -> "))]
    CyclicReference {
        path: String,
        chain: Vec<String>,
        location: SourceLocation,
    },

    /// A value that passed validation but cannot become a typed field.
    #[error("{location}: {path}: {reason}")]
    ModelBuild {
        path: String,
        reason: String,
        location: SourceLocation,
    },

    /// A local file path that escapes the permitted root.
    #[error("{location}: {path}: path '{value}' escapes the permitted root")]
    UnsafePath {
        path: String,
        value: String,
        location: SourceLocation,
    },

    /// A schema artifact could not be used.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A brand could not be written out.
    #[error("failed to serialize brand: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

impl BrandError {
    /// The source location the error points at, for document errors.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            BrandError::UnresolvedReference { location, .. }
            | BrandError::CyclicReference { location, .. }
            | BrandError::ModelBuild { location, .. }
            | BrandError::UnsafePath { location, .. } => Some(location),
            BrandError::Validation(report) => report.errors.first().map(|e| &e.location),
            _ => None,
        }
    }

    /// The field path the error is about, for document errors.
    pub fn path(&self) -> Option<&str> {
        match self {
            BrandError::UnresolvedReference { path, .. }
            | BrandError::CyclicReference { path, .. }
            | BrandError::ModelBuild { path, .. }
            | BrandError::UnsafePath { path, .. } => Some(path),
            BrandError::Validation(report) => report.errors.first().map(|e| e.path.as_str()),
            _ => None,
        }
    }
}
