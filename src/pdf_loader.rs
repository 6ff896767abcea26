//! PDF loading.
//!
//! PDFs navigate by native page number, so all the alignment engine needs
//! from a PDF is its page count. Page rendering belongs to a collaborator.

use anyhow::{Context, Result, bail};
use lopdf::Document;
use std::path::Path;
use tracing::info;

/// One side's PDF, reduced to its navigable page space.
pub struct PdfBook {
    pub pages: u32,
}

/// Load a PDF from disk and count its pages.
pub fn load_pdf(path: &Path) -> Result<PdfBook> {
    info!(path = %path.display(), "Loading PDF");
    let doc =
        Document::load(path).with_context(|| format!("Failed to open PDF at {}", path.display()))?;

    let pages = doc.get_pages().len() as u32;
    if pages == 0 {
        bail!("PDF at {} has no pages", path.display());
    }

    info!(path = %path.display(), pages, "Finished loading PDF");
    Ok(PdfBook { pages })
}
