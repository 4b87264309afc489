//! Text recognition engines
//!
//! OCR always happens out of process: [`TesseractEngine`] shells out to
//! `tesseract`, rasterizing PDFs with Poppler's `pdftoppm` first.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::{debug, info};

use crate::error::{OcrError, OcrResult};

/// Turns document bytes into text
pub trait OcrEngine {
    /// Recognize the text of a whole document, pages in order
    fn recognize(&self, document: &[u8]) -> OcrResult<String>;
}

impl<E: OcrEngine + ?Sized> OcrEngine for &E {
    fn recognize(&self, document: &[u8]) -> OcrResult<String> {
        (**self).recognize(document)
    }
}

impl<E: OcrEngine + ?Sized> OcrEngine for Box<E> {
    fn recognize(&self, document: &[u8]) -> OcrResult<String> {
        (**self).recognize(document)
    }
}

/// Raster image formats recognized by magic number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Tiff,
}

impl ImageFormat {
    /// File extension used when handing the image to `tesseract`
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Tiff => "tif",
        }
    }
}

/// What kind of document a byte buffer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image(ImageFormat),
    /// Already-extracted UTF-8 text
    Text,
    Unsupported,
}

impl DocumentKind {
    /// Sniff the document kind from its leading bytes
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(b"%PDF") {
            DocumentKind::Pdf
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            DocumentKind::Image(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            DocumentKind::Image(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            DocumentKind::Image(ImageFormat::Tiff)
        } else if !bytes.contains(&0) && std::str::from_utf8(bytes).is_ok() {
            DocumentKind::Text
        } else {
            DocumentKind::Unsupported
        }
    }

    fn describe(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Image(_) => "image",
            DocumentKind::Text => "text",
            DocumentKind::Unsupported => "binary data",
        }
    }
}

/// Passes text documents through unchanged and rejects everything else
#[derive(Debug, Clone, Copy, Default)]
pub struct TextEngine;

impl OcrEngine for TextEngine {
    fn recognize(&self, document: &[u8]) -> OcrResult<String> {
        match DocumentKind::detect(document) {
            DocumentKind::Text => Ok(String::from_utf8_lossy(document).into_owned()),
            other => Err(OcrError::UnsupportedDocument(format!(
                "{} (only plain text is accepted without OCR)",
                other.describe()
            ))),
        }
    }
}

/// Settings for [`TesseractEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesseractConfig {
    /// `tesseract` binary
    pub tesseract: PathBuf,
    /// Poppler `pdftoppm` binary
    pub pdftoppm: PathBuf,
    /// Rasterization resolution for PDF pages
    pub dpi: u32,
    /// Tesseract language (`-l`), e.g. `eng`
    pub language: Option<String>,
    /// Tesseract page segmentation mode (`--psm`)
    pub psm: Option<u8>,
    /// Extra arguments appended to every `tesseract` call
    pub extra_args: Vec<String>,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            tesseract: PathBuf::from("tesseract"),
            pdftoppm: PathBuf::from("pdftoppm"),
            dpi: 200,
            language: None,
            psm: None,
            extra_args: Vec::new(),
        }
    }
}

/// OCR through the `tesseract` command-line tool
#[derive(Debug, Clone, Default)]
pub struct TesseractEngine {
    config: TesseractConfig,
}

impl TesseractEngine {
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TesseractConfig {
        &self.config
    }

    fn recognize_pdf(&self, document: &[u8]) -> OcrResult<String> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.pdf");
        fs::write(&input, document)?;

        let prefix = dir.path().join("page");
        let mut cmd = Command::new(&self.config.pdftoppm);
        cmd.arg("-r")
            .arg(self.config.dpi.to_string())
            .arg("-png")
            .arg(&input)
            .arg(&prefix);
        run(cmd, &self.config.pdftoppm)?;

        let pages = page_images(dir.path())?;
        if pages.is_empty() {
            return Err(OcrError::NoPages);
        }

        let mut text = String::new();
        for page in &pages {
            text.push_str(&self.recognize_file(page)?);
            text.push('\n');
        }
        info!("Recognized {} page(s)", pages.len());
        Ok(text)
    }

    fn recognize_image(&self, document: &[u8], format: ImageFormat) -> OcrResult<String> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join(format!("input.{}", format.extension()));
        fs::write(&input, document)?;
        self.recognize_file(&input)
    }

    fn recognize_file(&self, image: &Path) -> OcrResult<String> {
        let mut cmd = Command::new(&self.config.tesseract);
        cmd.arg(image).arg("stdout");
        if let Some(language) = &self.config.language {
            cmd.arg("-l").arg(language);
        }
        if let Some(psm) = self.config.psm {
            cmd.arg("--psm").arg(psm.to_string());
        }
        cmd.args(&self.config.extra_args);

        let output = run(cmd, &self.config.tesseract)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, document: &[u8]) -> OcrResult<String> {
        match DocumentKind::detect(document) {
            DocumentKind::Pdf => self.recognize_pdf(document),
            DocumentKind::Image(format) => self.recognize_image(document, format),
            DocumentKind::Text => Ok(String::from_utf8_lossy(document).into_owned()),
            DocumentKind::Unsupported => Err(OcrError::UnsupportedDocument(
                "expected a PDF, PNG, JPEG or TIFF file".into(),
            )),
        }
    }
}

/// Run a command to completion, mapping a missing binary and a non-zero exit
fn run(mut cmd: Command, program: &Path) -> OcrResult<Output> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("Running {:?}", cmd);
    let output = cmd.output().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            OcrError::NotFound(program.display().to_string())
        } else {
            OcrError::Io(e)
        }
    })?;

    if !output.status.success() {
        return Err(OcrError::Failed {
            program: program.display().to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

/// `pdftoppm` page images in page order
///
/// Pages are named `page-N.png`, zero-padded to the width of the page count.
fn page_images(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut pages: Vec<(u32, PathBuf)> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| {
            let stem = path.file_stem()?.to_str()?;
            let number = stem.strip_prefix("page-")?.parse().ok()?;
            (path.extension()? == "png").then_some((number, path))
        })
        .collect();
    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}
