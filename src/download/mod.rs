//! Page download pipeline.
//!
//! - `progress`  — CLI page progress bar
//! - `page_pool` — bounded worker pool with per-page retry and resume

pub mod page_pool;
pub mod progress;
