//! Reading brand documents from files and strings.

use std::io;
use std::path::{Path, PathBuf};

use super::node::Node;
use super::span::SourceMap;
use super::{BrandDocument, Origin};

/// Errors raised while reading or parsing a document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("brand file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied reading {}", .0.display())]
    PermissionDenied(PathBuf),

    /// The text is not well-formed YAML.
    #[error("{}:{line}:{column}: {message}", origin_name(.file))]
    MalformedSyntax {
        file: Option<PathBuf>,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn origin_name(file: &Option<PathBuf>) -> String {
    file.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<input>".to_string())
}

/// Reads and parses the document at `path`.
pub fn load_path(path: &Path) -> Result<BrandDocument, LoadError> {
    tracing::debug!(path = %path.display(), "loading brand document");
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => LoadError::PermissionDenied(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    load_str(&text, Origin::file(path))
}

/// Parses `text` as a brand document.
pub fn load_str(text: &str, origin: Origin) -> Result<BrandDocument, LoadError> {
    let root = if is_blank(text) {
        Node::Null
    } else {
        serde_yaml::from_str::<Node>(text).map_err(|e| {
            let (line, column) = e
                .location()
                .map(|loc| (loc.line(), loc.column()))
                .unwrap_or((1, 1));
            LoadError::MalformedSyntax {
                file: origin.file.clone(),
                line,
                column,
                message: e.to_string(),
            }
        })?
    };
    let source_map = SourceMap::scan(text);
    tracing::trace!(fields = source_map.len(), "indexed document spans");
    Ok(BrandDocument::new(root, source_map, origin))
}

fn is_blank(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}
