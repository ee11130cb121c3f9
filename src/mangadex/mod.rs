//! MangaDex API surface.
//!
//! - `models` — serde views of the search, chapter-listing and at-home responses
//! - `client` — one blocking HTTP client with the retry policy for catalog GETs

pub mod client;
pub mod models;
