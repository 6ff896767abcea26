//! Persisted sync points, one record per document pair.
//!
//! Records live under the cache dir as JSON, keyed by an identifier built
//! from both filenames with every non-alphanumeric character replaced by
//! `_`. The record is rewritten on every sync-point add or remove; save
//! failures are logged and never interrupt the session.

use crate::sync::SyncPoint;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const STORE_VERSION: u32 = 1;

/// On-disk record for one document pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRecord {
    pub version: u32,
    pub sync_points: Vec<SyncPoint>,
    pub original_name: String,
    pub translation_name: String,
}

/// Deterministic identifier for a document pair, safe to use as a filename.
pub fn pair_id(original_name: &str, translation_name: &str) -> String {
    format!("{original_name}_{translation_name}")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn record_path(cache_dir: &str, original_name: &str, translation_name: &str) -> PathBuf {
    let id = pair_id(original_name, translation_name);
    Path::new(cache_dir).join(format!("sync_{id}.json"))
}

/// Load the persisted sync points for a document pair, if any. Records
/// with an unrecognized version are treated as absent.
pub fn load_sync_points(
    cache_dir: &str,
    original_name: &str,
    translation_name: &str,
) -> Option<Vec<SyncPoint>> {
    let path = record_path(cache_dir, original_name, translation_name);
    let data = fs::read_to_string(&path).ok()?;
    let record: SyncRecord = match serde_json::from_str(&data) {
        Ok(record) => record,
        Err(err) => {
            warn!(path = %path.display(), "Ignoring unreadable sync record: {err}");
            return None;
        }
    };
    if record.version != STORE_VERSION {
        warn!(
            path = %path.display(),
            version = record.version,
            "Ignoring sync record with unknown version"
        );
        return None;
    }
    debug!(
        path = %path.display(),
        points = record.sync_points.len(),
        "Loaded sync points"
    );
    Some(record.sync_points)
}

/// Persist the sync points for a document pair. Errors are logged and
/// swallowed so a failing disk never blocks navigation.
pub fn save_sync_points(
    cache_dir: &str,
    original_name: &str,
    translation_name: &str,
    points: &[SyncPoint],
) {
    let path = record_path(cache_dir, original_name, translation_name);
    let record = SyncRecord {
        version: STORE_VERSION,
        sync_points: points.to_vec(),
        original_name: original_name.to_string(),
        translation_name: translation_name.to_string(),
    };

    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            warn!(path = %path.display(), "Failed to create cache dir: {err}");
            return;
        }
    }
    match serde_json::to_string_pretty(&record) {
        Ok(contents) => {
            if let Err(err) = fs::write(&path, contents) {
                warn!(path = %path.display(), "Failed to save sync points: {err}");
            } else {
                debug!(path = %path.display(), points = points.len(), "Saved sync points");
            }
        }
        Err(err) => warn!("Failed to serialize sync record: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_id_replaces_non_alphanumerics() {
        assert_eq!(
            pair_id("war & peace.pdf", "guerra.epub"),
            "war___peace_pdf_guerra_epub"
        );
    }

    #[test]
    fn pair_id_is_order_sensitive() {
        assert_ne!(pair_id("a.pdf", "b.pdf"), pair_id("b.pdf", "a.pdf"));
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = SyncRecord {
            version: STORE_VERSION,
            sync_points: vec![SyncPoint {
                original: 3,
                translation: 5,
            }],
            original_name: "a.pdf".to_string(),
            translation_name: "b.epub".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: SyncRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sync_points, record.sync_points);
        assert_eq!(back.version, STORE_VERSION);
    }

    #[test]
    fn unknown_version_is_treated_as_absent() {
        let dir = std::env::temp_dir().join("tandem-reader-store-test");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let cache_dir = dir.to_string_lossy().into_owned();

        let record = SyncRecord {
            version: 99,
            sync_points: vec![],
            original_name: "a.pdf".to_string(),
            translation_name: "b.pdf".to_string(),
        };
        let path = record_path(&cache_dir, "a.pdf", "b.pdf");
        fs::write(&path, serde_json::to_string(&record).unwrap()).unwrap();

        assert!(load_sync_points(&cache_dir, "a.pdf", "b.pdf").is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = std::env::temp_dir().join("tandem-reader-store-roundtrip");
        let _ = fs::remove_dir_all(&dir);
        let cache_dir = dir.to_string_lossy().into_owned();

        let points = vec![
            SyncPoint {
                original: 1,
                translation: 1,
            },
            SyncPoint {
                original: 10,
                translation: 12,
            },
        ];
        save_sync_points(&cache_dir, "a.pdf", "b.epub", &points);
        assert_eq!(
            load_sync_points(&cache_dir, "a.pdf", "b.epub"),
            Some(points)
        );
        let _ = fs::remove_dir_all(&dir);
    }
}
