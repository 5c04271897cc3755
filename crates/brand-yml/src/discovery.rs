//! Locating the brand file for a project.
//!
//! Discovery walks from a starting directory up through its ancestors and
//! returns the first brand file it finds. In each directory `_brand.yml` is
//! checked before `brand.yml`. The walk stops at the search root (inclusive)
//! or at the filesystem root.
//!
//! Symbolic links are only followed when their target lies inside the search
//! root, so a link cannot pull in a file from elsewhere on the system.

use std::io;
use std::path::{Path, PathBuf};

/// Brand file names, in order of precedence.
pub const BRAND_FILENAMES: [&str; 2] = ["_brand.yml", "brand.yml"];

/// Errors raised while searching for a brand file.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("no _brand.yml or brand.yml found in {} or its parents", .start.display())]
    NotFound { start: PathBuf },

    #[error("{} is outside the search root {}", .start.display(), .root.display())]
    OutsideRoot { start: PathBuf, root: PathBuf },

    #[error("failed to inspect {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Ancestor search for brand files.
///
/// ```rust,no_run
/// use brand_yml::Discovery;
///
/// let path = Discovery::new().root("/srv/site").find("/srv/site/docs/guide")?;
/// # Ok::<(), brand_yml::DiscoveryError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    root: Option<PathBuf>,
}

impl Discovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the search: the walk never looks above `root`, and symlinks
    /// must point inside it.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Finds the nearest brand file at or above `start`.
    ///
    /// `start` may be a directory or a file; for a file the search begins in
    /// its directory. Returns an absolute path.
    pub fn find(&self, start: impl AsRef<Path>) -> Result<PathBuf, DiscoveryError> {
        let start = start.as_ref();
        let mut dir = canonical(start)?;
        if dir.is_file() {
            if let Some(parent) = dir.parent() {
                dir = parent.to_path_buf();
            }
        }

        let root = match &self.root {
            Some(root) => {
                let root = canonical(root)?;
                if !dir.starts_with(&root) {
                    return Err(DiscoveryError::OutsideRoot {
                        start: dir,
                        root,
                    });
                }
                Some(root)
            }
            None => None,
        };

        tracing::debug!(start = %dir.display(), "searching for brand file");
        for current in dir.ancestors() {
            for name in BRAND_FILENAMES {
                let candidate = current.join(name);
                if self.accept(&candidate, root.as_deref().unwrap_or(current))? {
                    tracing::debug!(path = %candidate.display(), "found brand file");
                    return Ok(candidate);
                }
            }
            if root.as_deref() == Some(current) {
                break;
            }
        }

        Err(DiscoveryError::NotFound {
            start: start.to_path_buf(),
        })
    }

    /// Whether `candidate` is a usable brand file. Symlinks must resolve to a
    /// file inside `bound`.
    fn accept(&self, candidate: &Path, bound: &Path) -> Result<bool, DiscoveryError> {
        let meta = match std::fs::symlink_metadata(candidate) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(DiscoveryError::Io {
                    path: candidate.to_path_buf(),
                    source: e,
                })
            }
        };

        if meta.file_type().is_symlink() {
            let Ok(target) = candidate.canonicalize() else {
                tracing::debug!(path = %candidate.display(), "skipping dangling symlink");
                return Ok(false);
            };
            if !target.starts_with(bound) {
                tracing::debug!(
                    path = %candidate.display(),
                    target = %target.display(),
                    "skipping symlink that leaves the search root"
                );
                return Ok(false);
            }
            return Ok(target.is_file());
        }
        Ok(meta.is_file())
    }
}

fn canonical(path: &Path) -> Result<PathBuf, DiscoveryError> {
    path.canonicalize().map_err(|source| DiscoveryError::Io {
        path: path.to_path_buf(),
        source,
    })
}
