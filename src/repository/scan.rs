//! Scan driver
//!
//! Walks every reference the caller's filter lets through, sizes each
//! target through the solver, and hands back the accumulated rollup.

use anyhow::Result;
use tracing::info;

use super::progress::ScanProgress;
use super::solver::SizeSolver;
use super::store::{ObjectStore, Reference};
use crate::model::HistorySize;

/// Repository scanner for computing whole-history size statistics.
pub struct RepoScanner {
    verbose: bool,
    preload: bool,
}

impl RepoScanner {
    pub fn new() -> Self {
        RepoScanner {
            verbose: true,
            preload: true,
        }
    }

    /// A scanner with no progress output (tests and benchmarks).
    pub fn quiet() -> Self {
        RepoScanner {
            verbose: false,
            preload: true,
        }
    }

    /// Resolve everything lazily instead of priming blobs and commits up
    /// front. Results are identical; only the access pattern changes.
    pub fn skip_preload(mut self) -> Self {
        self.preload = false;
        self
    }

    /// Scan all references passing `filter` and return the rollup.
    pub fn scan<S, F>(&self, store: S, filter: F) -> Result<HistorySize>
    where
        S: ObjectStore,
        F: Fn(&Reference) -> bool,
    {
        let mut solver = if self.preload {
            SizeSolver::new(store)?
        } else {
            SizeSolver::without_preload(store)
        };

        let references: Vec<Reference> = solver
            .store()
            .iter_references()?
            .collect::<Result<_>>()?;
        info!("measuring {} references", references.len());

        let bar = ScanProgress::new(self.verbose, "Measuring references", references.len() as u64);
        for reference in &references {
            bar.inc(1);
            if !filter(reference) {
                continue;
            }
            solver.reference_size(reference)?;
        }
        bar.finish();

        Ok(solver.into_history())
    }
}

impl Default for RepoScanner {
    fn default() -> Self {
        Self::new()
    }
}
