//! Paginated chapter-list retrieval, one language at a time.

use std::time::Duration;

use tracing::{info, warn};

use crate::mangadex::client::{FetchError, MdClient};
use crate::mangadex::models::ChapterRecord;

/// The listing endpoint's stated maximum page size.
pub const PAGE_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Pause between successive pages of one language, to respect the
    /// service's rate limits. No pause between languages.
    pub page_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(500),
        }
    }
}

/// Fetch every chapter record for each of the requested languages.
///
/// Pagination walks an offset cursor and stops on a short page rather than
/// trusting a total count. Any fetch error aborts that language only: records
/// already collected for it are kept and the next language proceeds.
pub fn fetch_all_chapters(
    client: &MdClient,
    manga_id: &str,
    languages: &[String],
    options: &FetchOptions,
) -> Vec<ChapterRecord> {
    let mut chapters = Vec::new();
    for language in languages {
        info!(target: "catalog", %language, "fetching chapter list");
        let mut offset = 0usize;
        loop {
            match client.list_chapters(manga_id, language, PAGE_LIMIT, offset) {
                Ok(page) => {
                    info!(
                        target: "catalog",
                        %language,
                        offset,
                        count = page.len(),
                        "chapter page fetched"
                    );
                    let short_page = page.len() < PAGE_LIMIT;
                    chapters.extend(page);
                    if short_page {
                        break;
                    }
                    offset += PAGE_LIMIT;
                    std::thread::sleep(options.page_delay);
                }
                Err(FetchError::Http { status, url }) => {
                    warn!(
                        target: "catalog",
                        %language, status, %url,
                        "http error, keeping partial results for this language"
                    );
                    break;
                }
                Err(FetchError::Network(err)) => {
                    warn!(
                        target: "catalog",
                        %language, error = %err,
                        "network error, keeping partial results for this language"
                    );
                    break;
                }
                Err(FetchError::Unexpected(msg)) => {
                    warn!(
                        target: "catalog",
                        %language, %msg,
                        "unexpected response, keeping partial results for this language"
                    );
                    break;
                }
            }
        }
    }
    chapters
}
