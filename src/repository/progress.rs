//! Scan progress
//!
//! One bar per scan phase, or nothing at all when the scanner is quiet so
//! tests and benchmarks produce no terminal output.

use indicatif::{ProgressBar, ProgressStyle};

/// Progress for one scan phase: a live bar, or silence.
pub(crate) struct ScanProgress {
    bar: Option<ProgressBar>,
}

impl ScanProgress {
    /// A bar over `total` items when `verbose`, silence otherwise.
    pub(crate) fn new(verbose: bool, label: &str, total: u64) -> Self {
        if !verbose {
            return ScanProgress { bar: None };
        }
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} {}: [{{bar:40.cyan/blue}}] {{pos}}/{{len}}",
                    label
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        ScanProgress { bar: Some(bar) }
    }

    pub(crate) fn inc(&self, n: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(n);
        }
    }

    pub(crate) fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
