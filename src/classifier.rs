//! Chapter classification for EPUB reading orders.
//!
//! EPUB spines routinely open with covers, title pages and tables of
//! contents, and close with appendices and colophons. Navigating by spine
//! position therefore disagrees between two editions of the same book as
//! soon as their front matter differs. This module filters a raw reading
//! order down to the entries that look like narrative chapters, so that
//! "chapter N" means the same kind of thing on both sides.
//!
//! The policy is an ordered chain of predicate rules over human-authored,
//! non-standardized file naming; the first matching rule decides and the
//! default is to keep. It is allowed to be wrong, and callers must tolerate
//! that (a classification that would empty the list falls back to the
//! unfiltered spine upstream).

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// One entry of an EPUB's raw reading order.
///
/// `index` is the position in the untouched spine and survives filtering,
/// so content loading can always address the original reading-order slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterEntry {
    pub index: usize,
    pub href: String,
    pub label: String,
    /// Final path component of `href` with the extension stripped.
    pub filename: String,
}

/// Spine entries this early with no digit in the filename are assumed to be
/// front matter.
const FRONT_MATTER_WINDOW: usize = 5;

/// Filename substrings that mark front or back matter.
const MATTER_DENYLIST: &[&str] = &[
    "cover",
    "title",
    "copyright",
    "toc",
    "contents",
    "dedication",
    "acknowledgment",
    "preface",
    "introduction",
    "prologue",
    "epilogue",
    "appendix",
    "bibliography",
    "index",
    "about",
    "publisher",
    "colophon",
    "frontmatter",
    "backmatter",
    "halftitle",
];

static RE_CHAPTER_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^chapter\s*\d+").unwrap());
static RE_LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+").unwrap());
static RE_ROMAN_NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^[ivxlcdm]{1,5}$").unwrap());
static RE_INTL_CHAPTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(capitolo|chapitre|cap[ií]tulo|kapitel)\s*\d+").unwrap());
static RE_CHAPTER_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(chapter|ch|cap|capitolo|chapitre)[-_ ]?\d+").unwrap());
static RE_NUMERIC_FILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Keep,
    Skip,
}

/// A single classification rule; the chain is evaluated first-match-wins.
struct Rule {
    name: &'static str,
    decision: Decision,
    matches: fn(&ChapterEntry) -> bool,
}

static RULES: [Rule; 4] = [
    Rule {
        name: "chapter-like-label",
        decision: Decision::Keep,
        matches: label_is_chapter_like,
    },
    Rule {
        name: "chapter-like-filename",
        decision: Decision::Keep,
        matches: filename_is_chapter_like,
    },
    Rule {
        name: "front-back-matter-filename",
        decision: Decision::Skip,
        matches: filename_is_matter,
    },
    Rule {
        name: "early-file-without-digit",
        decision: Decision::Skip,
        matches: early_file_without_digit,
    },
];

/// Filter a raw reading order down to narrative chapters.
///
/// The result is a subsequence of `entries`: order and the original `index`
/// values are preserved, nothing is re-indexed. An empty input yields an
/// empty output; the non-empty-input fallback belongs to the caller.
pub fn classify(entries: &[ChapterEntry]) -> Vec<ChapterEntry> {
    entries
        .iter()
        .filter(|entry| {
            let (decision, rule) = decide(entry);
            if decision == Decision::Skip {
                debug!(
                    index = entry.index,
                    filename = %entry.filename,
                    rule,
                    "Filtered reading-order entry"
                );
            }
            decision == Decision::Keep
        })
        .cloned()
        .collect()
}

fn decide(entry: &ChapterEntry) -> (Decision, &'static str) {
    for rule in &RULES {
        if (rule.matches)(entry) {
            return (rule.decision, rule.name);
        }
    }
    (Decision::Keep, "default-keep")
}

fn label_is_chapter_like(entry: &ChapterEntry) -> bool {
    let label = entry.label.trim();
    RE_CHAPTER_LABEL.is_match(label)
        || RE_LEADING_NUMBER.is_match(label)
        || RE_ROMAN_NUMERAL.is_match(label)
        || RE_INTL_CHAPTER.is_match(label)
}

fn filename_is_chapter_like(entry: &ChapterEntry) -> bool {
    let name = entry.filename.to_ascii_lowercase();
    RE_CHAPTER_FILE.is_match(&name) || RE_NUMERIC_FILE.is_match(&name)
}

fn filename_is_matter(entry: &ChapterEntry) -> bool {
    let name = entry.filename.to_ascii_lowercase();
    MATTER_DENYLIST.iter().any(|word| name.contains(word))
}

fn early_file_without_digit(entry: &ChapterEntry) -> bool {
    entry.index < FRONT_MATTER_WINDOW && !entry.filename.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: usize, filename: &str, label: &str) -> ChapterEntry {
        ChapterEntry {
            index,
            href: format!("{filename}.xhtml"),
            label: label.to_string(),
            filename: filename.to_string(),
        }
    }

    #[test]
    fn keeps_chapter_files_and_drops_front_matter() {
        let entries = vec![
            entry(0, "cover", ""),
            entry(1, "chapter1", ""),
            entry(2, "toc", ""),
            entry(3, "3", ""),
        ];
        let kept: Vec<usize> = classify(&entries).iter().map(|e| e.index).collect();
        assert_eq!(kept, vec![1, 3]);
    }

    #[test]
    fn keeps_entries_with_chapter_like_labels() {
        let entries = vec![
            entry(0, "part0001", "Chapter 1"),
            entry(1, "part0002", "12. The Sea"),
            entry(2, "part0003", "XIV"),
            entry(3, "part0004", "Capitolo 3"),
        ];
        assert_eq!(classify(&entries).len(), 4);
    }

    #[test]
    fn label_rule_wins_over_denylist() {
        // An explicit chapter label keeps the entry even when the filename
        // would be denylisted.
        let entries = vec![entry(7, "index-split-004", "Chapter 22")];
        assert_eq!(classify(&entries).len(), 1);
    }

    #[test]
    fn skips_early_files_without_digits() {
        let entries = vec![entry(2, "map", ""), entry(9, "map", "")];
        let kept: Vec<usize> = classify(&entries).iter().map(|e| e.index).collect();
        // Same filename survives past the front-matter window.
        assert_eq!(kept, vec![9]);
    }

    #[test]
    fn international_filenames_are_chapter_like() {
        let entries = vec![
            entry(0, "capitolo_01", ""),
            entry(1, "chapitre-2", ""),
            entry(2, "ch03", ""),
        ];
        assert_eq!(classify(&entries).len(), 3);
    }

    #[test]
    fn classification_is_idempotent() {
        let entries = vec![
            entry(0, "titlepage", ""),
            entry(1, "chapter1", ""),
            entry(2, "notes", ""),
            entry(3, "chapter2", ""),
        ];
        let once = classify(&entries);
        let twice = classify(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn preserves_original_indices_and_fields() {
        let entries = vec![
            entry(0, "cover", ""),
            entry(1, "chapter1", "Chapter 1"),
            entry(2, "chapter2", "Chapter 2"),
        ];
        for kept in classify(&entries) {
            let source = &entries[kept.index];
            assert_eq!(kept.href, source.href);
            assert_eq!(kept.label, source.label);
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(classify(&[]).is_empty());
    }

    #[test]
    fn long_roman_numeral_labels_are_not_bare_numerals() {
        // Six letters is past the bare-numeral cutoff; the entry still
        // survives on the default-keep rule when nothing else fires.
        let entries = vec![entry(8, "body12", "mmcmxc1")];
        assert_eq!(classify(&entries).len(), 1);
    }
}
