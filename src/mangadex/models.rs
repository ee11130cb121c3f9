//! Serde views of the MangaDex responses, trimmed to the fields this tool
//! reads. Unknown fields are ignored so catalog-side additions stay harmless.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Common `{"data": [...]}` envelope of the listing endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

// ── search ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct MangaSummary {
    pub id: String,
    #[serde(default)]
    pub attributes: MangaAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MangaAttributes {
    /// Localized titles keyed by language tag.
    pub title: BTreeMap<String, String>,
    /// May contain nulls on the wire; use [`MangaSummary::languages`].
    pub available_translated_languages: Vec<Option<String>>,
}

impl MangaSummary {
    /// Title shown in pickers: English first, then any localized title.
    pub fn display_title(&self) -> &str {
        self.attributes
            .title
            .get("en")
            .or_else(|| self.attributes.title.values().next())
            .map(String::as_str)
            .unwrap_or("Unknown title")
    }

    pub fn languages(&self) -> Vec<String> {
        self.attributes
            .available_translated_languages
            .iter()
            .filter_map(|l| l.clone())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

// ── chapter listing ─────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ChapterRecord {
    pub id: String,
    #[serde(default)]
    pub attributes: ChapterAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChapterAttributes {
    /// Chapter-number label; may be absent or non-numeric (e.g. a prologue).
    pub chapter: Option<String>,
    pub translated_language: String,
    pub title: Option<String>,
}

impl ChapterRecord {
    /// Chapter-number label, with absent labels treated as the literal "0".
    pub fn label(&self) -> &str {
        self.attributes.chapter.as_deref().unwrap_or("0")
    }

    pub fn language(&self) -> &str {
        &self.attributes.translated_language
    }

    pub fn title(&self) -> Option<&str> {
        self.attributes
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

// ── at-home page location ───────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AtHomeResponse {
    pub base_url: String,
    pub chapter: AtHomeChapter,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AtHomeChapter {
    pub hash: String,
    /// Full-quality page file names, in page order.
    #[serde(default)]
    pub data: Vec<String>,
}

#[cfg(test)]
pub(crate) fn chapter_record(id: &str, chapter: Option<&str>, language: &str) -> ChapterRecord {
    ChapterRecord {
        id: id.to_string(),
        attributes: ChapterAttributes {
            chapter: chapter.map(str::to_string),
            translated_language: language.to_string(),
            title: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerates_null_languages_and_unknown_fields() {
        let raw = r#"{
            "id": "abc",
            "type": "manga",
            "attributes": {
                "title": {"en": "Some Work", "ja": "何か"},
                "availableTranslatedLanguages": ["en", null, "fr"],
                "year": 2019
            }
        }"#;
        let summary: MangaSummary = serde_json::from_str(raw).unwrap();
        assert_eq!(summary.display_title(), "Some Work");
        assert_eq!(summary.languages(), vec!["en", "fr"]);
    }

    #[test]
    fn absent_chapter_label_reads_as_zero() {
        let raw = r#"{"id": "c1", "attributes": {"translatedLanguage": "en", "title": null}}"#;
        let record: ChapterRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.label(), "0");
        assert_eq!(record.title(), None);
    }
}
