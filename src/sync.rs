//! User-declared correspondence anchors between the two document sides.
//!
//! A sync point says "position `original` in the first edition corresponds
//! to position `translation` in the second". The set is kept sorted by
//! `original` with strictly increasing values; adding a point at an
//! already-anchored original replaces the previous point (last write wins).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_LOCATION_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// A pair of corresponding positions, one per document side. Both are
/// 1-based unit positions (pages for PDF, filtered chapters for EPUB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPoint {
    pub original: u32,
    pub translation: u32,
}

/// A sorted set of sync points with strictly increasing `original` values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSet {
    points: Vec<SyncPoint>,
}

impl SyncSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from arbitrary input order. Duplicate originals collapse
    /// to the last occurrence.
    pub fn from_points(points: impl IntoIterator<Item = SyncPoint>) -> Self {
        let mut set = Self::new();
        for point in points {
            set.insert(point);
        }
        set
    }

    /// Insert a point, keeping the set sorted. A point with an
    /// already-anchored `original` replaces the existing one.
    pub fn insert(&mut self, point: SyncPoint) {
        match self
            .points
            .binary_search_by_key(&point.original, |p| p.original)
        {
            Ok(idx) => self.points[idx] = point,
            Err(idx) => self.points.insert(idx, point),
        }
    }

    /// Remove the point at `idx` in sorted order.
    pub fn remove(&mut self, idx: usize) -> Option<SyncPoint> {
        if idx < self.points.len() {
            Some(self.points.remove(idx))
        } else {
            None
        }
    }

    pub fn points(&self) -> &[SyncPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Reduce free-form location text ("page 5", "chapter 3", "12") to a unit
/// position. Returns `None` for text without a usable number; positions are
/// 1-based, so a bare `0` is rejected too. This is the boundary check that
/// keeps malformed anchors out of the mapper.
pub fn parse_location(text: &str) -> Option<u32> {
    let digits = RE_LOCATION_NUMBER.find(text)?;
    match digits.as_str().parse::<u32>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
