//! One chapter folder of page images -> one paginated PDF.
//!
//! Pages are embedded as DCTDecode image XObjects, one per PDF page, with the
//! MediaBox matching the pixel dimensions (72 dpi). Page order is the lexical
//! file-name order, which the zero-padded ordinals make the download order.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use tracing::{info, warn};

use super::image_utils::normalize_to_jpeg;
use crate::base_system::work_paths::PAGE_EXTENSION;

#[derive(Debug, PartialEq, Eq)]
pub enum AssembleOutcome {
    Written(PathBuf),
    /// The folder held no page images; no document was produced.
    NoPages,
}

pub fn assemble_chapter_pdf(
    folder: &Path,
    output: &Path,
    jpeg_quality: u8,
) -> Result<AssembleOutcome> {
    let pages = sorted_page_files(folder)?;
    if pages.is_empty() {
        warn!(
            target: "assemble",
            folder = %folder.display(),
            "no page images found, skipping pdf"
        );
        return Ok(AssembleOutcome::NoPages);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

    for (index, page_path) in pages.iter().enumerate() {
        let bytes = fs::read(page_path)
            .with_context(|| format!("reading page {}", page_path.display()))?;
        let page = normalize_to_jpeg(&bytes, jpeg_quality)
            .with_context(|| format!("normalizing page {}", page_path.display()))?;

        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => page.width as i64,
                "Height" => page.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            page.jpeg,
        );
        let image_id = doc.add_object(image_stream);

        let image_name = format!("Im{index}");
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(page.width as f32),
                        0.into(),
                        0.into(),
                        Object::Real(page.height as f32),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(image_name.clone().into_bytes())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().context("encoding page content stream")?,
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(page.width as f32),
                Object::Real(page.height as f32),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { image_name => image_id },
            },
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    doc.save(output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(
        target: "assemble",
        output = %output.display(),
        pages = page_count,
        "pdf written"
    );
    Ok(AssembleOutcome::Written(output.to_path_buf()))
}

fn sorted_page_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let Ok(rd) = fs::read_dir(folder) else {
        return Ok(Vec::new());
    };
    let mut pages: Vec<PathBuf> = rd
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .map(|s| s.eq_ignore_ascii_case(PAGE_EXTENSION))
                .unwrap_or(false)
        })
        .collect();
    pages.sort();
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_system::work_paths::page_file_name;
    use image::{ImageBuffer, Rgb};

    fn write_test_page(path: &Path, width: u32, height: u32) {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(width, height, Rgb([120, 30, 200]));
        img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
    }

    #[test]
    fn empty_folder_is_a_reported_noop() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("chapter_1.pdf");
        let outcome = assemble_chapter_pdf(dir.path(), &output, 85).unwrap();
        assert_eq!(outcome, AssembleOutcome::NoPages);
        assert!(!output.exists());
    }

    #[test]
    fn missing_folder_is_also_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = assemble_chapter_pdf(
            &dir.path().join("never_downloaded"),
            &dir.path().join("out.pdf"),
            85,
        )
        .unwrap();
        assert_eq!(outcome, AssembleOutcome::NoPages);
    }

    #[test]
    fn pages_become_a_loadable_pdf_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let pages_dir = dir.path().join("chapter_3");
        fs::create_dir_all(&pages_dir).unwrap();
        // Written out of order on purpose; lexical name order must win.
        write_test_page(&pages_dir.join(page_file_name(2)), 20, 30);
        write_test_page(&pages_dir.join(page_file_name(1)), 10, 15);
        // Non-page files are ignored.
        fs::write(pages_dir.join("notes.txt"), b"ignore me").unwrap();

        let output = dir.path().join("chapter_3.pdf");
        let outcome = assemble_chapter_pdf(&pages_dir, &output, 85).unwrap();
        assert_eq!(outcome, AssembleOutcome::Written(output.clone()));

        let doc = Document::load(&output).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);

        // First page carries the 10x15 image's MediaBox.
        let first_id = pages[&1];
        let first = doc.get_object(first_id).unwrap().as_dict().unwrap();
        let media_box = first.get(b"MediaBox").unwrap().as_array().unwrap();
        assert!(approx(&media_box[2], 10.0));
        assert!(approx(&media_box[3], 15.0));
    }

    /// Numbers may round-trip as Real or Integer depending on the writer.
    fn approx(obj: &Object, expected: f32) -> bool {
        match *obj {
            Object::Real(v) => (v - expected).abs() < 0.01,
            Object::Integer(v) => (v as f32 - expected).abs() < 0.01,
            _ => false,
        }
    }
}
