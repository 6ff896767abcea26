//! EPUB loading utilities.
//!
//! This module is intentionally small: it knows how to open an EPUB, walk
//! its spine into `ChapterEntry` values (raw index, href, label, filename),
//! and run the chapter classifier over the result. Labels come from the
//! table of contents when a nav point targets the spine item; otherwise the
//! filename stands in.

use crate::classifier::{self, ChapterEntry};
use anyhow::{Context, Result, bail};
use epub::doc::{EpubDoc, NavPoint};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info, warn};

/// One side's EPUB, reduced to its navigable chapter space.
pub struct EpubBook {
    /// Filtered chapter list, or the full reading order when classification
    /// would have removed everything. Entries keep their raw spine index.
    pub entries: Vec<ChapterEntry>,
    /// Length of the unfiltered spine.
    pub spine_len: usize,
}

/// Load an EPUB from disk and build its filtered chapter list.
pub fn load_epub(path: &Path, filter_front_matter: bool) -> Result<EpubBook> {
    info!(path = %path.display(), "Loading EPUB reading order");
    let doc =
        EpubDoc::new(path).with_context(|| format!("Failed to open EPUB at {}", path.display()))?;

    let raw = spine_entries(&doc);
    if raw.is_empty() {
        bail!("EPUB at {} has an empty reading order", path.display());
    }

    let entries = if filter_front_matter {
        let filtered = classifier::classify(&raw);
        if filtered.is_empty() {
            // The heuristic is allowed to be wrong; never hide real content.
            warn!(
                path = %path.display(),
                spine = raw.len(),
                "Chapter filter removed every entry, keeping the full reading order"
            );
            raw.clone()
        } else {
            filtered
        }
    } else {
        raw.clone()
    };

    info!(
        path = %path.display(),
        spine = raw.len(),
        chapters = entries.len(),
        "Finished loading EPUB reading order"
    );
    Ok(EpubBook {
        entries,
        spine_len: raw.len(),
    })
}

fn spine_entries(doc: &EpubDoc<BufReader<File>>) -> Vec<ChapterEntry> {
    let toc = flatten_toc(&doc.toc);
    doc.spine
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let idref = &item.idref;
            let href = doc
                .resources
                .get(idref)
                .map(|res| res.path.to_string_lossy().into_owned())
                .unwrap_or_else(|| idref.clone());
            let filename = file_stem(&href);
            let label = toc
                .iter()
                .find(|(content, _)| paths_refer_to_same_item(content, &href))
                .map(|(_, label)| label.clone())
                .unwrap_or_default();
            debug!(index, href = %href, label = %label, "Spine entry");
            ChapterEntry {
                index,
                href,
                label,
                filename,
            }
        })
        .collect()
}

/// Depth-first flatten of the table of contents into (content path, label)
/// pairs, fragments stripped.
fn flatten_toc(points: &[NavPoint]) -> Vec<(String, String)> {
    let mut flat = Vec::new();
    for point in points {
        let content = point.content.to_string_lossy();
        let content = content.split('#').next().unwrap_or_default().to_string();
        flat.push((content, point.label.trim().to_string()));
        flat.extend(flatten_toc(&point.children));
    }
    flat
}

/// Nav-point content paths and spine hrefs may disagree on leading
/// directories depending on where the navigation document lives.
fn paths_refer_to_same_item(toc_path: &str, href: &str) -> bool {
    !toc_path.is_empty() && (toc_path.ends_with(href) || href.ends_with(toc_path))
}

/// Final path component with the extension stripped; the classifier's
/// filename patterns operate on this.
fn file_stem(href: &str) -> String {
    let name = href.rsplit(['/', '\\']).next().unwrap_or(href);
    match name.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_strips_directories_and_extension() {
        assert_eq!(file_stem("OEBPS/text/chapter1.xhtml"), "chapter1");
        assert_eq!(file_stem("cover.xhtml"), "cover");
        assert_eq!(file_stem("3"), "3");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }

    #[test]
    fn toc_paths_match_hrefs_with_differing_prefixes() {
        assert!(paths_refer_to_same_item(
            "text/ch1.xhtml",
            "OEBPS/text/ch1.xhtml"
        ));
        assert!(paths_refer_to_same_item(
            "OEBPS/text/ch1.xhtml",
            "text/ch1.xhtml"
        ));
        assert!(!paths_refer_to_same_item("", "text/ch1.xhtml"));
        assert!(!paths_refer_to_same_item("text/ch2.xhtml", "text/ch1.xhtml"));
    }
}
