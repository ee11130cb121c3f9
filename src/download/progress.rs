//! CLI progress bar for one chapter's page downloads.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub struct PageBar {
    bar: ProgressBar,
}

impl PageBar {
    pub fn new(total_pages: usize, label: &str) -> Self {
        let style = ProgressStyle::with_template(
            "{prefix} [{elapsed_precise}] {wide_bar} {pos}/{len} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        let bar = ProgressBar::with_draw_target(
            Some(total_pages as u64),
            ProgressDrawTarget::stderr(),
        );
        bar.set_style(style);
        bar.set_prefix(format!("chapter {label}"));
        Self { bar }
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
