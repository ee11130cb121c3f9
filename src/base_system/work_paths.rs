//! Deterministic on-disk layout: one folder per work, one folder and one PDF
//! per chapter, pages named by zero-padded ordinal.

use std::path::{Path, PathBuf};

use crate::base_system::context::{Config, safe_fs_name};

pub const PAGE_EXTENSION: &str = "jpg";

pub fn work_folder_path(config: &Config, work_title: &str) -> PathBuf {
    config
        .default_save_dir()
        .join(safe_fs_name(work_title, "_", 120))
}

pub fn chapter_folder_path(work_dir: &Path, label: &str) -> PathBuf {
    work_dir.join(format!("chapter_{}", safe_fs_name(label, "_", 40)))
}

pub fn chapter_pdf_path(work_dir: &Path, label: &str, chapter_title: Option<&str>) -> PathBuf {
    let name = match chapter_title {
        Some(title) if !title.trim().is_empty() => format!(
            "chapter_{}-{}.pdf",
            safe_fs_name(label, "_", 40),
            safe_fs_name(title, "_", 80)
        ),
        _ => format!("chapter_{}.pdf", safe_fs_name(label, "_", 40)),
    };
    work_dir.join(name)
}

/// Page file name for a 1-based ordinal, e.g. `001.jpg`.
pub fn page_file_name(ordinal: usize) -> String {
    format!("{ordinal:03}.{PAGE_EXTENSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_names_sort_lexically() {
        let names: Vec<String> = (1..=12).map(page_file_name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "001.jpg");
        assert_eq!(names[11], "012.jpg");
    }

    #[test]
    fn pdf_path_includes_title_when_present() {
        let work = Path::new("mangas/Some_Work");
        let with_title = chapter_pdf_path(work, "10.5", Some("The Reveal"));
        assert_eq!(
            with_title.file_name().unwrap().to_str().unwrap(),
            "chapter_10.5-The_Reveal.pdf"
        );
        let without = chapter_pdf_path(work, "3", None);
        assert_eq!(
            without.file_name().unwrap().to_str().unwrap(),
            "chapter_3.pdf"
        );
    }
}
