//! Bounded worker pool for one chapter's page downloads.
//!
//! At most [`PAGE_WORKERS`] requests are in flight at once. Each page task
//! retries independently and reports a terminal state; the pool joins every
//! worker before returning, so partially failed chapters degrade to partial
//! folders instead of aborting siblings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossbeam_channel as channel;
use tracing::{debug, error, info, warn};

use super::progress::PageBar;
use crate::base_system::work_paths::{PAGE_EXTENSION, page_file_name};
use crate::mangadex::client::MdClient;

pub const PAGE_WORKERS: usize = 5;
pub const PAGE_RETRIES: usize = 5;
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Default, Clone, Copy)]
pub struct DownloadReport {
    pub downloaded: u32,
    pub skipped: u32,
    pub failed: u32,
}

impl DownloadReport {
    pub fn complete(&self) -> bool {
        self.failed == 0
    }
}

struct PageTask {
    url: String,
    ordinal: usize,
}

enum PageEvent {
    Downloaded,
    Skipped,
    Failed,
}

/// Ensure every page of `urls` is present in `folder` as a numbered file.
///
/// Resume is two-level: when the folder already holds at least as many page
/// files as requested the whole call short-circuits without any request;
/// otherwise each task no-ops if its own destination file exists, so partial
/// folders only re-fetch the missing ordinals.
pub fn download_chapter_pages(
    client: &MdClient,
    urls: &[String],
    folder: &Path,
    progress: Option<&PageBar>,
) -> Result<DownloadReport> {
    fs::create_dir_all(folder)
        .with_context(|| format!("creating chapter folder {}", folder.display()))?;

    let existing = count_page_files(folder);
    if existing >= urls.len() {
        info!(
            target: "download",
            folder = %folder.display(),
            existing,
            "chapter already fully downloaded"
        );
        return Ok(DownloadReport {
            skipped: urls.len() as u32,
            ..DownloadReport::default()
        });
    }

    let (tx, rx) = channel::unbounded::<PageTask>();
    let (tx_evt, rx_evt) = channel::unbounded::<PageEvent>();
    for (i, url) in urls.iter().enumerate() {
        let _ = tx.send(PageTask {
            url: url.clone(),
            ordinal: i + 1,
        });
    }
    drop(tx);

    let mut handles = Vec::with_capacity(PAGE_WORKERS);
    for _ in 0..PAGE_WORKERS {
        let rx = rx.clone();
        let tx_evt = tx_evt.clone();
        let client = client.clone();
        let folder = folder.to_path_buf();
        handles.push(std::thread::spawn(move || {
            while let Ok(task) = rx.recv() {
                let dest = folder.join(page_file_name(task.ordinal));
                if dest.exists() {
                    let _ = tx_evt.send(PageEvent::Skipped);
                    continue;
                }
                let event = match fetch_page(&client, &task, &dest) {
                    Ok(()) => PageEvent::Downloaded,
                    Err(err) => {
                        error!(
                            target: "download",
                            ordinal = task.ordinal,
                            url = %task.url,
                            error = %err,
                            "page given up"
                        );
                        PageEvent::Failed
                    }
                };
                let _ = tx_evt.send(event);
            }
        }));
    }
    drop(tx_evt);

    let mut report = DownloadReport::default();
    for event in rx_evt.iter() {
        match event {
            PageEvent::Downloaded => report.downloaded += 1,
            PageEvent::Skipped => report.skipped += 1,
            PageEvent::Failed => report.failed += 1,
        }
        if let Some(bar) = progress {
            bar.inc();
        }
    }
    for handle in handles {
        let _ = handle.join();
    }

    if report.failed > 0 {
        warn!(
            target: "download",
            folder = %folder.display(),
            failed = report.failed,
            "some pages are still missing after retries"
        );
    }
    Ok(report)
}

fn fetch_page(client: &MdClient, task: &PageTask, dest: &Path) -> Result<()> {
    for attempt in 1..=PAGE_RETRIES {
        match client.get_bytes(&task.url, PAGE_TIMEOUT) {
            Ok(bytes) => {
                write_atomic(dest, &bytes)?;
                debug!(target: "download", ordinal = task.ordinal, "page downloaded");
                return Ok(());
            }
            Err(err) => {
                warn!(
                    target: "download",
                    ordinal = task.ordinal,
                    attempt,
                    error = %err,
                    "page download attempt failed"
                );
            }
        }
    }
    Err(anyhow!(
        "page {} failed after {} attempts",
        task.ordinal,
        PAGE_RETRIES
    ))
}

/// Count of page files in the folder; the resume-completeness signal.
pub fn count_page_files(folder: &Path) -> usize {
    let Ok(rd) = fs::read_dir(folder) else {
        return 0;
    };
    rd.filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|s| s.eq_ignore_ascii_case(PAGE_EXTENSION))
                .unwrap_or(false)
        })
        .count()
}

/// Write via a temp file in the same directory plus rename, so an interrupted
/// attempt never leaves a truncated page that would satisfy the resume check.
fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<()> {
    let tmp: PathBuf = dest.with_extension("part");
    fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, dest).with_context(|| format!("renaming into {}", dest.display()))?;
    Ok(())
}
