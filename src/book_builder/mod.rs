//! Chapter assembly: downloaded page images into one PDF.

pub mod image_utils;
pub mod pdf_generator;
