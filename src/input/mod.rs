//! Input processing module
//! Handles file detection, source enumeration and text extraction

pub mod file_detector;
pub mod pdf;
pub mod source;
pub mod text_extractor;
