//! Raw brand documents.
//!
//! A [`BrandDocument`] is the parsed-but-unvalidated form of a brand file:
//! an order-preserving [`Node`] tree, a [`SourceMap`] for diagnostics, and
//! the [`Origin`] the text came from. It exists only while a [`Brand`] is
//! being built and is never exposed through the finished model.
//!
//! [`Brand`]: crate::Brand

mod loader;
mod node;
mod span;

use std::fmt;
use std::path::{Path, PathBuf};

pub use loader::{load_path, load_str, LoadError};
pub use node::Node;
pub use span::{child_path, index_path, SourceMap, Span};

/// Where a document's text came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Origin {
    /// The file the text was read from, if any.
    pub file: Option<PathBuf>,
    /// Directory that relative file locations resolve against.
    pub base_dir: Option<PathBuf>,
}

impl Origin {
    /// Origin for text read from `path`; the base directory is its parent.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let file = path.into();
        let base_dir = file
            .parent()
            .map(|p| p.to_path_buf())
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| Some(PathBuf::from(".")));
        Self {
            file: Some(file),
            base_dir,
        }
    }

    /// Origin for in-memory text with an optional base directory.
    pub fn text(base_dir: Option<PathBuf>) -> Self {
        Self {
            file: None,
            base_dir,
        }
    }
}

/// A file plus a span, attached to every document-level error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Option<PathBuf>,
    pub span: Option<Span>,
}

impl SourceLocation {
    pub fn new(file: Option<PathBuf>, span: Option<Span>) -> Self {
        Self { file, span }
    }

    pub fn is_known(&self) -> bool {
        self.file.is_some() || self.span.is_some()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self
            .file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<input>".to_string());
        match self.span {
            Some(span) => write!(f, "{}:{}", file, span),
            None => write!(f, "{}", file),
        }
    }
}

/// A parsed brand document.
#[derive(Debug, Clone)]
pub struct BrandDocument {
    root: Node,
    source_map: SourceMap,
    origin: Origin,
}

impl BrandDocument {
    pub(crate) fn new(root: Node, source_map: SourceMap, origin: Origin) -> Self {
        Self {
            root,
            source_map,
            origin,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    pub fn file(&self) -> Option<&Path> {
        self.origin.file.as_deref()
    }

    /// Location of the field at `path`.
    pub fn location(&self, path: &str) -> SourceLocation {
        SourceLocation::new(self.origin.file.clone(), self.source_map.lookup(path))
    }

    /// Location of the `n`th occurrence of a (duplicated) field.
    pub fn location_nth(&self, path: &str, n: usize) -> SourceLocation {
        SourceLocation::new(self.origin.file.clone(), self.source_map.lookup_nth(path, n))
    }

    /// Node at a dotted path of mapping keys (no sequence indices).
    pub fn get(&self, path: &str) -> Option<&Node> {
        path.split('.')
            .filter(|s| !s.is_empty())
            .try_fold(&self.root, |node, key| node.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_file_uses_parent_dir() {
        let origin = Origin::file("/srv/site/_brand.yml");
        assert_eq!(origin.base_dir, Some(PathBuf::from("/srv/site")));
    }

    #[test]
    fn test_origin_bare_filename_uses_current_dir() {
        let origin = Origin::file("_brand.yml");
        assert_eq!(origin.base_dir, Some(PathBuf::from(".")));
    }

    #[test]
    fn test_location_display() {
        let loc = SourceLocation::new(
            Some(PathBuf::from("_brand.yml")),
            Some(Span {
                offset: 10,
                line: 3,
                column: 5,
            }),
        );
        assert_eq!(loc.to_string(), "_brand.yml:3:5");
        assert_eq!(SourceLocation::default().to_string(), "<input>");
    }

    #[test]
    fn test_get_dotted_path() {
        let doc = load_str("color:\n  palette:\n    blue: '#00f'\n", Origin::default()).unwrap();
        assert_eq!(
            doc.get("color.palette.blue"),
            Some(&Node::String("#00f".into()))
        );
        assert!(doc.get("color.missing").is_none());
    }
}
