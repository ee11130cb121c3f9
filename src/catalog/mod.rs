//! Chapter resolution: pagination, language selection, chapter picking.
//!
//! - `fetcher`   — per-language paginated retrieval of raw chapter records
//! - `select`    — one preferred-language winner per chapter-number label
//! - `selection` — the `5,6,10-15` chapter-selection expression parser

pub mod fetcher;
pub mod select;
pub mod selection;
