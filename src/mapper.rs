//! Position mapping between the two document sides.
//!
//! The mapper is a pure function from an original-side position to a
//! translation-side position. Three strategies cover the system's needs:
//! no mapping (1:1), a single mutable chapter offset for lightweight
//! EPUB-to-EPUB sessions, and piecewise-linear interpolation over a sorted
//! set of user-declared sync points. The strategy is chosen at session-load
//! time and the session routes every navigation through it.

use crate::sync::{SyncPoint, SyncSet};

/// Mapping strategy active for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingStrategy {
    /// Identity mapping; position N maps to position N.
    NoMapping,
    /// Constant chapter delta, adjustable by ±1 per user action.
    FixedOffset(i64),
    /// Piecewise-linear interpolation between sync-point anchors.
    Anchored(SyncSet),
}

impl MappingStrategy {
    /// Map an original-side position into the translation's unit space,
    /// clamped to `[1, translation_total]`. Anchored extrapolation past the
    /// last sync point is clamped here rather than in `map_anchored`, which
    /// does not know the translation's bounds.
    pub fn map(&self, original_pos: u32, translation_total: u32) -> u32 {
        let mapped = match self {
            MappingStrategy::NoMapping => original_pos,
            MappingStrategy::FixedOffset(offset) => {
                map_offset(original_pos, *offset, translation_total)
            }
            MappingStrategy::Anchored(set) => map_anchored(original_pos, set.points()),
        };
        mapped.clamp(1, translation_total.max(1))
    }
}

/// Fixed-offset mapping: `clamp(pos + offset, 1, translation_total)`.
pub fn map_offset(original_pos: u32, offset: i64, translation_total: u32) -> u32 {
    let shifted = i64::from(original_pos) + offset;
    shifted.clamp(1, i64::from(translation_total.max(1))) as u32
}

/// Sync-point mapping over a set sorted by `original`.
///
/// With no points this is the identity; with one point, a constant offset.
/// With two or more, the position is interpolated linearly between the
/// nearest bracketing anchors and extrapolated with the first/last anchor's
/// offset outside the anchored range. A position exactly on an anchor
/// returns that anchor's translation without interpolation, so anchors are
/// never perturbed by rounding.
///
/// The result is always >= 1. The upper bound is the caller's to clamp;
/// this function does not know the translation document's length.
pub fn map_anchored(original_pos: u32, points: &[SyncPoint]) -> u32 {
    match points {
        [] => original_pos,
        [point] => shift_by_anchor(original_pos, point),
        _ => {
            let before = points.iter().rev().find(|p| p.original <= original_pos);
            let after = points.iter().find(|p| p.original >= original_pos);
            match (before, after) {
                // Before the first anchor: extrapolate with its offset.
                (None, _) => shift_by_anchor(original_pos, &points[0]),
                // Past the last anchor: extrapolate with its offset.
                (_, None) => shift_by_anchor(original_pos, &points[points.len() - 1]),
                (Some(before), Some(after)) => {
                    if before.original == original_pos {
                        return before.translation;
                    }
                    let ratio = f64::from(original_pos - before.original)
                        / f64::from(after.original - before.original);
                    let span = f64::from(after.translation) - f64::from(before.translation);
                    let mapped = (f64::from(before.translation) + ratio * span).round() as i64;
                    mapped.max(1) as u32
                }
            }
        }
    }
}

fn shift_by_anchor(original_pos: u32, point: &SyncPoint) -> u32 {
    let offset = i64::from(point.translation) - i64::from(point.original);
    (i64::from(original_pos) + offset).max(1) as u32
}
