//! File locations referenced from a brand file.
//!
//! A location is either a remote URL or a local path. Local paths resolve
//! against the document's directory and must stay inside the permitted root,
//! which is the document directory unless configured otherwise. Relative
//! directories are anchored at the working directory first. The check is
//! lexical: `.` and `..` are folded without touching the filesystem, so paths
//! to files that do not exist yet can still be checked.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Serialize, Serializer};

/// A local path or a remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileLocation {
    Local(LocalPath),
    Remote(String),
}

/// A local file path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalPath {
    /// The path as written in the brand file.
    pub path: PathBuf,
    /// The normalized path joined onto the document directory, when the
    /// document directory is known.
    pub resolved: Option<PathBuf>,
}

/// Raised when a local path escapes the permitted root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EscapesRoot;

impl FileLocation {
    /// Classifies and checks `value`.
    pub(crate) fn resolve(
        value: &str,
        base_dir: Option<&Path>,
        root: Option<&Path>,
    ) -> Result<Self, EscapesRoot> {
        if is_remote(value) {
            return Ok(FileLocation::Remote(value.to_string()));
        }

        let written = Path::new(value);
        let base_dir = base_dir.map(absolute_dir).transpose()?;
        let candidate = if written.is_absolute() {
            Some(written.to_path_buf())
        } else {
            base_dir.as_ref().map(|dir| dir.join(written))
        };

        let resolved = match candidate {
            Some(candidate) => {
                let normalized = normalize(&candidate).ok_or(EscapesRoot)?;
                let root = match root {
                    Some(root) => Some(absolute_dir(root)?),
                    None => base_dir,
                };
                if let Some(root) = root {
                    if !normalized.starts_with(&root) {
                        return Err(EscapesRoot);
                    }
                }
                Some(normalized)
            }
            None => {
                normalize(written).ok_or(EscapesRoot)?;
                None
            }
        };

        Ok(FileLocation::Local(LocalPath {
            path: written.to_path_buf(),
            resolved,
        }))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, FileLocation::Remote(_))
    }

    pub fn as_local(&self) -> Option<&LocalPath> {
        match self {
            FileLocation::Local(local) => Some(local),
            FileLocation::Remote(_) => None,
        }
    }

    pub fn as_url(&self) -> Option<&str> {
        match self {
            FileLocation::Remote(url) => Some(url),
            FileLocation::Local(_) => None,
        }
    }

    /// The location as written: the URL, or the local path.
    pub fn as_written(&self) -> String {
        match self {
            FileLocation::Remote(url) => url.clone(),
            FileLocation::Local(local) => local.path.to_string_lossy().into_owned(),
        }
    }

    /// File extension of the path or URL, lowercased.
    pub fn extension(&self) -> Option<String> {
        let last = match self {
            FileLocation::Local(local) => local.path.file_name()?.to_string_lossy().into_owned(),
            FileLocation::Remote(url) => {
                let path = url.split(['?', '#']).next().unwrap_or(url);
                path.rsplit('/').next().unwrap_or(path).to_string()
            }
        };
        let (stem, ext) = last.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_written())
    }
}

impl Serialize for FileLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_written())
    }
}

/// Makes `dir` absolute against the working directory and folds it. A
/// directory that cannot be anchored at a filesystem root bounds nothing, so
/// it is rejected rather than compared.
fn absolute_dir(dir: &Path) -> Result<PathBuf, EscapesRoot> {
    let absolute = std::path::absolute(dir).map_err(|_| EscapesRoot)?;
    normalize(&absolute)
        .filter(|path| path.has_root())
        .ok_or(EscapesRoot)
}

fn is_remote(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Folds `.` and `..` components. Returns `None` when `..` climbs above the
/// start of the path.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                out.pop();
                depth -= 1;
            }
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::RootDir | Component::Prefix(_) => out.push(component.as_os_str()),
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(
        value: &str,
        base: Option<&str>,
        root: Option<&str>,
    ) -> Result<FileLocation, EscapesRoot> {
        FileLocation::resolve(value, base.map(Path::new), root.map(Path::new))
    }

    #[test]
    fn test_remote_urls() {
        let loc = local("https://example.com/logo.svg", Some("/srv/site"), None).unwrap();
        assert_eq!(loc.as_url(), Some("https://example.com/logo.svg"));
        assert!(loc.is_remote());
        assert_eq!(loc.extension().as_deref(), Some("svg"));
    }

    #[test]
    fn test_relative_path_resolves_against_document_dir() {
        let loc = local("./assets/../img/logo.png", Some("/srv/site"), None).unwrap();
        let path = loc.as_local().unwrap();
        assert_eq!(path.path, PathBuf::from("./assets/../img/logo.png"));
        assert_eq!(path.resolved, Some(PathBuf::from("/srv/site/img/logo.png")));
    }

    #[test]
    fn test_parent_traversal_outside_document_dir_rejected() {
        assert_eq!(
            local("../../etc/passwd", Some("/srv/site"), None),
            Err(EscapesRoot)
        );
    }

    #[test]
    fn test_parent_traversal_allowed_inside_configured_root() {
        let loc = local("../shared/logo.png", Some("/srv/site/docs"), Some("/srv/site")).unwrap();
        assert_eq!(
            loc.as_local().unwrap().resolved,
            Some(PathBuf::from("/srv/site/shared/logo.png"))
        );
    }

    #[test]
    fn test_absolute_path_outside_root_rejected() {
        assert_eq!(local("/etc/passwd", Some("/srv/site"), None), Err(EscapesRoot));
        assert!(local("/srv/site/logo.png", Some("/srv/site"), None).is_ok());
    }

    #[test]
    fn test_relative_document_dir() {
        let cwd = std::env::current_dir().unwrap();
        let loc = local("logo.png", Some("."), None).unwrap();
        assert_eq!(loc.as_local().unwrap().resolved, Some(cwd.join("logo.png")));
        assert_eq!(local("../logo.png", Some("."), None), Err(EscapesRoot));
    }

    #[test]
    fn test_absolute_path_with_relative_document_dir_rejected() {
        assert_eq!(local("/etc/passwd", Some("."), None), Err(EscapesRoot));
        assert_eq!(local("/etc/passwd", Some("docs"), None), Err(EscapesRoot));
    }

    #[test]
    fn test_dot_root_bounds_to_working_directory() {
        assert_eq!(
            local("../../etc/passwd", Some("/srv/site"), Some(".")),
            Err(EscapesRoot)
        );
        assert!(local("logo.png", Some("."), Some(".")).is_ok());
    }

    #[test]
    fn test_relative_root_is_anchored_at_working_directory() {
        let site = std::env::current_dir().unwrap().join("site");
        let base = site.to_str().unwrap();
        let loc = local("img/logo.png", Some(base), Some("site")).unwrap();
        assert_eq!(
            loc.as_local().unwrap().resolved,
            Some(site.join("img/logo.png"))
        );
        assert!(local("../other/logo.png", Some(base), Some("site")).is_err());
    }

    #[test]
    fn test_without_document_dir() {
        let loc = local("img/logo.png", None, None).unwrap();
        assert_eq!(loc.as_local().unwrap().resolved, None);
        assert_eq!(local("../logo.png", None, None), Err(EscapesRoot));
    }

    #[test]
    fn test_extension() {
        let loc = local("fonts/Inter.WOFF2", None, None).unwrap();
        assert_eq!(loc.extension().as_deref(), Some("woff2"));
        let loc = local("https://cdn.example/f.ttf?v=2", None, None).unwrap();
        assert_eq!(loc.extension().as_deref(), Some("ttf"));
        assert_eq!(local("README", None, None).unwrap().extension(), None);
    }
}
