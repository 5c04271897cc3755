//! Building many brand files in parallel.
//!
//! Each file runs through the whole pipeline independently, so files are
//! spread across the rayon thread pool with no shared state beyond the
//! loader configuration. A [`CancellationToken`] is checked before each file
//! starts; a file that has started always finishes.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::build::{BrandLoader, Loaded};
use crate::error::BrandError;

/// Shared flag that stops a batch between files.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What happened to one file of a batch.
#[derive(Debug)]
pub enum BatchOutcome {
    Loaded(Loaded),
    Failed(BrandError),
    /// The batch was cancelled before this file started.
    Cancelled,
}

impl BatchOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, BatchOutcome::Loaded(_))
    }
}

/// One file of a batch and its outcome.
#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub outcome: BatchOutcome,
}

/// Loads every file in `paths`. Results come back in input order.
pub fn resolve_all(
    loader: &BrandLoader,
    paths: &[PathBuf],
    cancel: &CancellationToken,
) -> Vec<BatchEntry> {
    tracing::debug!(files = paths.len(), "starting brand batch");
    let entries: Vec<BatchEntry> = paths
        .par_iter()
        .map(|path| {
            let outcome = if cancel.is_cancelled() {
                BatchOutcome::Cancelled
            } else {
                match loader.load_file(path) {
                    Ok(loaded) => BatchOutcome::Loaded(loaded),
                    Err(err) => BatchOutcome::Failed(err),
                }
            };
            BatchEntry {
                path: path.clone(),
                outcome,
            }
        })
        .collect();

    let cancelled = entries
        .iter()
        .filter(|e| matches!(e.outcome, BatchOutcome::Cancelled))
        .count();
    if cancelled > 0 {
        tracing::debug!(cancelled, "brand batch cancelled");
    }
    entries
}
