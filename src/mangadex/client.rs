//! Blocking MangaDex client.
//!
//! One client is built at startup and passed into the fetcher and the page
//! pool. Catalog GETs get the retry policy (5xx, exponential backoff); page
//! image GETs are single-attempt here because the download pool owns that
//! retry loop.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{AtHomeResponse, ChapterRecord, ListResponse, MangaSummary};

pub const API_BASE: &str = "https://api.mangadex.org";

/// Error kinds a fetch can end in; callers decide continue/abort/retry per kind.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("http status {status} from {url}")]
    Http { status: u16, url: String },
    #[error("network error: {0}")]
    Network(reqwest::Error),
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Attempt cap for idempotent catalog GETs hitting server errors.
    pub max_retries: usize,
    /// First backoff delay; doubles per retried attempt.
    pub retry_backoff: Duration,
    pub api_base: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            user_agent: format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ),
            max_retries: 5,
            retry_backoff: Duration::from_millis(500),
            api_base: API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MdClient {
    http: Client,
    options: ClientOptions,
}

impl MdClient {
    pub fn new(options: ClientOptions) -> anyhow::Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(ua) = HeaderValue::from_str(&options.user_agent) {
            default_headers.insert(USER_AGENT, ua);
        }

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(options.request_timeout)
            .build()?;

        Ok(Self { http, options })
    }

    /// GET + JSON decode with the retry policy: 500/502/503/504 are retried
    /// with exponential backoff up to the attempt cap, other statuses fail
    /// immediately, transport errors fail immediately, and a body that fails
    /// to decode is an `Unexpected` error.
    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let mut backoff = self.options.retry_backoff;
        let attempts = self.options.max_retries.max(1);
        for attempt in 1..=attempts {
            let resp = self
                .http
                .get(url)
                .query(query)
                .send()
                .map_err(FetchError::Network)?;

            let status = resp.status();
            if status.is_success() {
                return resp.json::<T>().map_err(|err| {
                    FetchError::Unexpected(format!("decoding body from {url}: {err}"))
                });
            }

            if is_retryable_status(status) && attempt < attempts {
                debug!(
                    target: "mangadex",
                    %url,
                    status = status.as_u16(),
                    attempt,
                    "server error, backing off before retry"
                );
                std::thread::sleep(backoff);
                backoff *= 2;
                continue;
            }

            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Err(FetchError::Unexpected(format!(
            "retry loop exhausted for {url}"
        )))
    }

    pub fn search_manga(&self, title: &str, limit: usize) -> Result<Vec<MangaSummary>, FetchError> {
        let url = format!("{}/manga", self.options.api_base);
        let query = [
            ("title", title.to_string()),
            ("limit", limit.to_string()),
        ];
        let resp: ListResponse<MangaSummary> = self.get_json(&url, &query)?;
        Ok(resp.data)
    }

    /// One page of the chapter listing for one language, ascending chapter
    /// order. A short page (fewer than `limit` records) signals end-of-results.
    pub fn list_chapters(
        &self,
        manga_id: &str,
        language: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ChapterRecord>, FetchError> {
        let url = format!("{}/chapter", self.options.api_base);
        let query = [
            ("manga", manga_id.to_string()),
            ("translatedLanguage[]", language.to_string()),
            ("order[chapter]", "asc".to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        let resp: ListResponse<ChapterRecord> = self.get_json(&url, &query)?;
        Ok(resp.data)
    }

    /// Resolve a chapter's page URLs through the at-home endpoint.
    pub fn page_urls(&self, chapter_id: &str) -> Result<Vec<String>, FetchError> {
        let url = format!("{}/at-home/server/{chapter_id}", self.options.api_base);
        let resp: AtHomeResponse = self.get_json(&url, &[])?;
        let base = resp.base_url.trim_end_matches('/').to_string();
        let hash = resp.chapter.hash;
        if resp.chapter.data.is_empty() {
            warn!(target: "mangadex", chapter_id, "at-home response lists no pages");
        }
        Ok(resp
            .chapter
            .data
            .iter()
            .map(|page| format!("{base}/data/{hash}/{page}"))
            .collect())
    }

    /// Single-attempt body fetch for a page image. Any failure (transport,
    /// non-success status, mid-stream read) is reported back for the caller's
    /// retry loop.
    pub fn get_bytes(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let resp = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(FetchError::Network)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let bytes = resp.bytes().map_err(FetchError::Network)?;
        Ok(bytes.to_vec())
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 502 | 503 | 504)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn serve_json(
        responses: Vec<(u16, &'static str)>,
    ) -> (String, Arc<AtomicUsize>, std::thread::JoinHandle<()>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let base = format!("http://{}", server.server_addr());
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in_thread = hits.clone();
        let handle = std::thread::spawn(move || {
            for (status, body) in responses {
                let Ok(request) = server.recv() else { return };
                hits_in_thread.fetch_add(1, Ordering::SeqCst);
                let response = tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(
                        tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                            .unwrap(),
                    );
                let _ = request.respond(response);
            }
        });
        (base, hits, handle)
    }

    fn test_client(api_base: String) -> MdClient {
        MdClient::new(ClientOptions {
            api_base,
            retry_backoff: Duration::from_millis(1),
            ..ClientOptions::default()
        })
        .unwrap()
    }

    #[test]
    fn retries_server_errors_then_succeeds() {
        let (base, hits, handle) = serve_json(vec![
            (503, "busy"),
            (502, "busy"),
            (200, r#"{"data": [{"id": "x", "attributes": {"translatedLanguage": "en"}}]}"#),
        ]);
        let client = test_client(base);
        let page = client.list_chapters("m1", "en", 100, 0).unwrap();
        handle.join().unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn non_retryable_status_fails_immediately() {
        let (base, hits, handle) = serve_json(vec![(404, "nope")]);
        let client = test_client(base);
        let err = client.list_chapters("m1", "en", 100, 0).unwrap_err();
        handle.join().unwrap();
        assert!(matches!(err, FetchError::Http { status: 404, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn malformed_body_is_unexpected() {
        let (base, _hits, handle) = serve_json(vec![(200, "not json")]);
        let client = test_client(base);
        let err = client.search_manga("title", 10).unwrap_err();
        handle.join().unwrap();
        assert!(matches!(err, FetchError::Unexpected(_)));
    }

    #[test]
    fn page_urls_concatenate_base_hash_and_names() {
        let (base, _hits, handle) = serve_json(vec![(
            200,
            r#"{"baseUrl": "https://cdn.example/", "chapter": {"hash": "h4sh", "data": ["a.jpg", "b.jpg"]}}"#,
        )]);
        let client = test_client(base);
        let urls = client.page_urls("ch1").unwrap();
        handle.join().unwrap();
        assert_eq!(
            urls,
            vec![
                "https://cdn.example/data/h4sh/a.jpg",
                "https://cdn.example/data/h4sh/b.jpg"
            ]
        );
    }
}
