//! Text recognition for ticket images.
//!
//! The checker only needs "image in, text lines out", expressed by the
//! [`TextSource`] trait. [`TesseractSource`] runs the tesseract CLI on a
//! binarized copy of the photo; [`TextFileSource`] reads lines that were
//! recognized elsewhere.

pub mod engine;
pub mod preprocess;
pub mod setup;

pub use engine::{OcrLine, OcrWord, TesseractEngine};
pub use preprocess::binarize_ticket;
pub use setup::ensure_tesseract;

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

use crate::config::AppConfig;
use crate::log;

/// Produces recognized text lines for a ticket.
pub trait TextSource: Send + Sync {
    fn recognize(&self, path: &Path) -> Result<Vec<String>>;
}

/// Tesseract-backed recognition of ticket photos.
pub struct TesseractSource {
    engine: TesseractEngine,
    threshold: u8,
}

impl TesseractSource {
    pub fn new(engine: TesseractEngine, threshold: u8) -> Self {
        Self { engine, threshold }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let engine = ensure_tesseract(config.tesseract_path.as_deref(), &config.ocr_languages)?;
        Ok(Self::new(engine, config.ocr_threshold))
    }
}

impl TextSource for TesseractSource {
    fn recognize(&self, path: &Path) -> Result<Vec<String>> {
        let img = image::open(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        let binary = binarize_ticket(&img, self.threshold);
        let lines = self.engine.recognize(&binary)?;

        log(&format!(
            "OCR {}: {} lines",
            path.display(),
            lines.len()
        ));

        Ok(lines.into_iter().map(|line| line.text).collect())
    }
}

/// Path that stands for standard input.
pub const STDIN_PATH: &str = "-";

/// Reads pre-recognized text, one OCR line per file line.
///
/// The path `-` answers with lines captured from stdin, if any were given.
#[derive(Debug, Default)]
pub struct TextFileSource {
    stdin: Option<Vec<String>>,
}

impl TextFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stdin(contents: &str) -> Self {
        Self {
            stdin: Some(split_lines(contents)),
        }
    }
}

impl TextSource for TextFileSource {
    fn recognize(&self, path: &Path) -> Result<Vec<String>> {
        if path.as_os_str() == STDIN_PATH {
            return self
                .stdin
                .clone()
                .ok_or_else(|| anyhow!("No stdin input was read"));
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(split_lines(&contents))
    }
}

/// Splits text into non-blank lines.
pub fn split_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
