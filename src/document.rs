//! Document types and per-side loading.
//!
//! A "document" here is one side of the reading pair: a PDF navigated by
//! native page numbers, or an EPUB navigated by its filtered chapter list.
//! Rendering a unit to pixels is someone else's job; this module only
//! exposes the ordered unit space the alignment engine works over.

use crate::config::AppConfig;
use crate::epub_loader::{self, EpubBook};
use crate::pdf_loader::{self, PdfBook};
use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::info;

/// Which side of the pair a document plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Original,
    Translation,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Side::Original => "original",
            Side::Translation => "translation",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Epub,
}

impl DocumentKind {
    /// Human name for one unit of this document ("Page 3" vs "Chapter 3").
    pub fn format_location(&self, position: u32) -> String {
        match self {
            DocumentKind::Pdf => format!("Page {position}"),
            DocumentKind::Epub => format!("Chapter {position}"),
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Epub => "EPUB",
        };
        write!(f, "{}", label)
    }
}

/// A loaded document of either kind.
pub enum Document {
    Pdf(PdfBook),
    Epub(EpubBook),
}

impl Document {
    /// Open a document, dispatching on the file extension.
    pub fn open(path: &Path, config: &AppConfig) -> Result<Document> {
        if is_epub(path) {
            let book = epub_loader::load_epub(path, config.filter_front_matter)?;
            Ok(Document::Epub(book))
        } else if is_pdf(path) {
            let book = pdf_loader::load_pdf(path)?;
            Ok(Document::Pdf(book))
        } else {
            bail!(
                "Unsupported document format for {} (expected .pdf or .epub)",
                path.display()
            );
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Pdf(_) => DocumentKind::Pdf,
            Document::Epub(_) => DocumentKind::Epub,
        }
    }

    /// Number of navigable units: native page count for PDF, filtered
    /// chapter count for EPUB.
    pub fn total_units(&self) -> u32 {
        match self {
            Document::Pdf(book) => book.pages,
            Document::Epub(book) => book.entries.len() as u32,
        }
    }

    /// Describe the unit at a 1-based position, for display.
    pub fn unit_description(&self, position: u32) -> String {
        let entry = match self {
            Document::Pdf(_) => None,
            Document::Epub(book) => (position as usize)
                .checked_sub(1)
                .and_then(|idx| book.entries.get(idx)),
        };
        match entry {
            Some(entry) if !entry.label.trim().is_empty() => {
                format!("{} ({})", self.kind().format_location(position), entry.label)
            }
            _ => self.kind().format_location(position),
        }
    }

    /// The raw reading-order index behind a 1-based position. This is the
    /// join key content loaders use to address the unfiltered spine; PDF
    /// pages have no separate raw space.
    pub fn raw_index(&self, position: u32) -> Option<usize> {
        match self {
            Document::Pdf(_) => None,
            Document::Epub(book) => (position as usize)
                .checked_sub(1)
                .and_then(|idx| book.entries.get(idx))
                .map(|e| e.index),
        }
    }
}

/// Load both sides. The two loads are independent, so they run on their own
/// threads and are joined here; navigation must not start before both
/// totals are known. A failure names the side it came from and leaves no
/// partial state behind.
pub fn load_pair(
    original_path: &Path,
    translation_path: &Path,
    config: &AppConfig,
) -> Result<(Document, Document)> {
    let (original, translation) = std::thread::scope(|scope| {
        let original = scope.spawn(|| Document::open(original_path, config));
        let translation = scope.spawn(|| Document::open(translation_path, config));
        (original.join(), translation.join())
    });

    let original = unwrap_side(original, Side::Original, original_path)?;
    let translation = unwrap_side(translation, Side::Translation, translation_path)?;

    info!(
        original_kind = %original.kind(),
        original_units = original.total_units(),
        translation_kind = %translation.kind(),
        translation_units = translation.total_units(),
        "Both sides loaded"
    );
    Ok((original, translation))
}

fn unwrap_side(
    joined: std::thread::Result<Result<Document>>,
    side: Side,
    path: &Path,
) -> Result<Document> {
    match joined {
        Ok(result) => {
            result.with_context(|| format!("Failed to load the {side} side from {}", path.display()))
        }
        Err(_) => bail!("The {side} document loader panicked"),
    }
}

fn is_epub(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase()),
        Some(ext) if ext == "epub"
    )
}

fn is_pdf(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase()),
        Some(ext) if ext == "pdf"
    )
}
