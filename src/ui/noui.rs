//! Interactive CLI flow: search a work, pick languages and chapters, then
//! drive download + assembly chapter by chapter.
//!
//! Every per-unit failure (one language, one page, one chapter) is reported
//! and skipped; only the deliberate "nothing to do" checks end a run early.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::warn;

use crate::base_system::context::Config;
use crate::base_system::work_paths;
use crate::book_builder::pdf_generator::{AssembleOutcome, assemble_chapter_pdf};
use crate::catalog::fetcher::{FetchOptions, fetch_all_chapters};
use crate::catalog::select::resolve_best_translations;
use crate::catalog::selection::parse_chapter_selection;
use crate::download::page_pool::download_chapter_pages;
use crate::download::progress::PageBar;
use crate::mangadex::client::{ClientOptions, MdClient};
use crate::mangadex::models::MangaSummary;

pub fn run(config: &Config) -> Result<()> {
    let client = MdClient::new(ClientOptions::default())?;

    println!("Search MangaDex");
    let title = read_line("Enter the manga title: ")?;
    let title = title.trim();
    if title.is_empty() {
        println!("Nothing to search for.");
        return Ok(());
    }

    let results = match client.search_manga(title, config.search_limit) {
        Ok(results) => results,
        Err(err) => {
            println!("Search failed: {err}");
            return Ok(());
        }
    };
    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("\nResults found:");
    for (i, manga) in results.iter().enumerate() {
        println!("{}. {}", i + 1, manga.display_title());
    }
    let Some(manga) = pick_result(&results)? else {
        println!("Invalid selection.");
        return Ok(());
    };

    let available = manga.languages();
    if available.is_empty() {
        println!("This work lists no translated languages.");
        return Ok(());
    }
    println!("Available languages: {}", available.join(", "));
    let languages_input = read_line("Select languages separated by comma (e.g.: en,fr,es): ")?;
    let selected_languages: Vec<String> = languages_input
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| available.iter().any(|a| a == l))
        .map(str::to_string)
        .collect();
    if selected_languages.is_empty() {
        println!("No valid languages selected.");
        return Ok(());
    }

    println!("\nFetching chapters in selected languages...");
    let records = fetch_all_chapters(
        &client,
        &manga.id,
        &selected_languages,
        &FetchOptions::default(),
    );
    if records.is_empty() {
        println!("No chapters found.");
        return Ok(());
    }

    let resolved = resolve_best_translations(records, &selected_languages);
    if resolved.is_empty() {
        println!("No chapters available in the selected languages.");
        return Ok(());
    }

    println!("\n{} chapters available:", resolved.len());
    for (label, record) in resolved.iter() {
        match record.title() {
            Some(title) => println!("- Chapter {label}: {title}"),
            None => println!("- Chapter {label}"),
        }
    }

    let selection = read_line("Enter chapters (e.g.: 5,6,10-15) or 'all': ")?;
    let selection = selection.trim().to_lowercase();
    let chosen_labels: Vec<String> = if selection == "all" {
        resolved.labels().map(str::to_string).collect()
    } else {
        // Permissive parse; strict filter against the resolved map, keeping
        // the resolved display order.
        let wanted = parse_chapter_selection(&selection);
        resolved
            .labels()
            .filter(|l| wanted.contains(*l))
            .map(str::to_string)
            .collect()
    };
    if chosen_labels.is_empty() {
        println!("No valid chapters found in selection.");
        return Ok(());
    }

    let work_dir = work_paths::work_folder_path(config, manga.display_title());
    for label in &chosen_labels {
        let Some(record) = resolved.get(label) else {
            continue;
        };
        match record.title() {
            Some(title) => println!("\nDownloading chapter {label}: {title}"),
            None => println!("\nDownloading chapter {label}"),
        }

        let urls = match client.page_urls(&record.id) {
            Ok(urls) => urls,
            Err(err) => {
                warn!(target: "download", chapter = %record.id, error = %err, "page resolution failed");
                println!("Could not resolve pages for chapter {label}: {err}");
                continue;
            }
        };

        let folder = work_paths::chapter_folder_path(&work_dir, label);
        let bar = PageBar::new(urls.len(), label);
        let report = match download_chapter_pages(&client, &urls, &folder, Some(&bar)) {
            Ok(report) => {
                bar.finish();
                report
            }
            Err(err) => {
                bar.finish();
                println!("Chapter {label} download failed: {err}");
                continue;
            }
        };
        if report.complete() {
            println!(
                "Chapter {label} saved in '{}' ({} downloaded, {} already present)",
                folder.display(),
                report.downloaded,
                report.skipped
            );
        } else {
            println!(
                "Chapter {label}: {} page(s) still missing after retries",
                report.failed
            );
        }

        let pdf_path = work_paths::chapter_pdf_path(&work_dir, label, record.title());
        match assemble_chapter_pdf(&folder, &pdf_path, config.jpeg_quality) {
            Ok(AssembleOutcome::Written(path)) => println!("PDF created at: {}", path.display()),
            Ok(AssembleOutcome::NoPages) => {
                println!("No images found for chapter {label}, PDF skipped.")
            }
            Err(err) => println!("PDF assembly failed for chapter {label}: {err}"),
        }
    }

    println!("\nProcess completed.");
    Ok(())
}

fn pick_result(results: &[MangaSummary]) -> Result<Option<&MangaSummary>> {
    let answer = read_line("Select a manga number: ")?;
    let index: usize = match answer.trim().parse() {
        Ok(n) => n,
        Err(_) => return Ok(None),
    };
    Ok(index.checked_sub(1).and_then(|i| results.get(i)))
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush().context("flushing prompt")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading input")?;
    Ok(line)
}
