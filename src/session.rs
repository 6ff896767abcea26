//! Session state machine for a loaded document pair.
//!
//! One session owns the two `DocumentSide`s, the active mapping strategy,
//! and the current phase. All position changes route through the session's
//! transition methods; there is no other mutator. Transitions return a list
//! of `Effect` values describing work the caller must perform (re-render a
//! side, persist the sync-point set), keeping the state machine itself pure.

use crate::document::{DocumentKind, Side};
use crate::mapper::MappingStrategy;
use crate::sync::SyncPoint;
use anyhow::{Result, bail};
use tracing::{debug, info};

/// Lifecycle phase. Navigation is only valid in `Reading`; entering
/// `Reading` requires both sides to be fully loaded, which `load` enforces
/// by construction (a `Session` cannot exist without both totals).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loaded,
    Reading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Work the caller must perform outside the pure transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Render { side: Side, position: u32 },
    SaveSyncPoints,
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    Moved(Vec<Effect>),
    /// The requested move would cross a document edge; position unchanged.
    AtBoundary,
}

/// One side of the pair as the engine sees it: a kind, a unit count, and a
/// current position always clamped to `[1, total_units]`.
#[derive(Debug, Clone)]
pub struct DocumentSide {
    pub kind: DocumentKind,
    pub name: String,
    pub total_units: u32,
    pub current_position: u32,
}

impl DocumentSide {
    pub fn new(kind: DocumentKind, name: impl Into<String>, total_units: u32) -> Self {
        DocumentSide {
            kind,
            name: name.into(),
            total_units: total_units.max(1),
            current_position: 1,
        }
    }
}

pub struct Session {
    phase: Phase,
    original: DocumentSide,
    translation: DocumentSide,
    strategy: MappingStrategy,
}

impl Session {
    /// Build a session over a freshly loaded pair. Both positions start at
    /// 1 and any prior session state is simply discarded by dropping it.
    pub fn load(
        original: DocumentSide,
        translation: DocumentSide,
        strategy: MappingStrategy,
    ) -> Self {
        info!(
            original = %original.name,
            original_units = original.total_units,
            translation = %translation.name,
            translation_units = translation.total_units,
            "Session loaded"
        );
        Session {
            phase: Phase::Loaded,
            original,
            translation,
            strategy,
        }
    }

    /// Enter `Reading` and produce the initial render effects.
    pub fn begin_reading(&mut self) -> Result<Vec<Effect>> {
        if self.phase == Phase::Reading {
            bail!("Session is already reading");
        }
        self.phase = Phase::Reading;
        Ok(self.remap())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn original(&self) -> &DocumentSide {
        &self.original
    }

    pub fn translation(&self) -> &DocumentSide {
        &self.translation
    }

    /// Move the original position by one unit. Edges are boundaries, not
    /// errors.
    pub fn advance(&mut self, direction: Direction) -> Result<NavOutcome> {
        self.require_reading("advance")?;
        let target = match direction {
            Direction::Forward => self.original.current_position.saturating_add(1),
            Direction::Backward => self.original.current_position.saturating_sub(1),
        };
        if target < 1 || target > self.original.total_units {
            debug!(position = self.original.current_position, "At document edge");
            return Ok(NavOutcome::AtBoundary);
        }
        Ok(NavOutcome::Moved(self.set_position(target)))
    }

    /// Jump straight to a position (direct chapter/page selection),
    /// clamped to the original's bounds.
    pub fn jump_to(&mut self, position: u32) -> Result<Vec<Effect>> {
        self.require_reading("jump")?;
        let clamped = position.clamp(1, self.original.total_units);
        Ok(self.set_position(clamped))
    }

    /// Whether an `advance` in `direction` would move.
    pub fn can_go(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.original.current_position < self.original.total_units,
            Direction::Backward => self.original.current_position > 1,
        }
    }

    /// Add a sync anchor at the given pair of positions. Valid only for
    /// anchored sessions; the offset strategy has its own adjustment.
    pub fn add_sync_point(&mut self, point: SyncPoint) -> Result<Vec<Effect>> {
        let MappingStrategy::Anchored(set) = &mut self.strategy else {
            bail!("Sync points are not active for this session");
        };
        set.insert(point);
        info!(
            original = point.original,
            translation = point.translation,
            points = set.len(),
            "Added sync point"
        );
        let mut effects = self.remap();
        effects.push(Effect::SaveSyncPoints);
        Ok(effects)
    }

    /// Remove the sync anchor at `idx` in sorted order.
    pub fn remove_sync_point(&mut self, idx: usize) -> Result<Vec<Effect>> {
        let MappingStrategy::Anchored(set) = &mut self.strategy else {
            bail!("Sync points are not active for this session");
        };
        let Some(removed) = set.remove(idx) else {
            bail!("No sync point at index {idx}");
        };
        info!(
            original = removed.original,
            translation = removed.translation,
            points = set.len(),
            "Removed sync point"
        );
        let mut effects = self.remap();
        effects.push(Effect::SaveSyncPoints);
        Ok(effects)
    }

    pub fn sync_points(&self) -> &[SyncPoint] {
        match &self.strategy {
            MappingStrategy::Anchored(set) => set.points(),
            _ => &[],
        }
    }

    /// Nudge the fixed offset by `delta` chapters (±1 per user action).
    pub fn nudge_offset(&mut self, delta: i64) -> Result<Vec<Effect>> {
        let MappingStrategy::FixedOffset(offset) = &mut self.strategy else {
            bail!("Offset adjustment is only available in offset mode");
        };
        *offset += delta;
        info!(offset = *offset, "Adjusted chapter offset");
        Ok(self.remap())
    }

    pub fn offset(&self) -> Option<i64> {
        match self.strategy {
            MappingStrategy::FixedOffset(offset) => Some(offset),
            _ => None,
        }
    }

    /// One-line summary of the active mapping, for the status display.
    pub fn mapping_summary(&self) -> String {
        match &self.strategy {
            MappingStrategy::NoMapping => "No mapping (1:1)".to_string(),
            MappingStrategy::FixedOffset(offset) => format!("Chapter offset {offset:+}"),
            MappingStrategy::Anchored(set) if set.is_empty() => {
                "No sync points (1:1 mapping)".to_string()
            }
            MappingStrategy::Anchored(set) => format!("{} sync points active", set.len()),
        }
    }

    /// Both positions against their totals, e.g.
    /// `Page 5 / 230 <-> Chapter 2 / 18`.
    pub fn position_info(&self) -> String {
        format!(
            "{} / {} <-> {} / {}",
            self.original.kind.format_location(self.original.current_position),
            self.original.total_units,
            self.translation
                .kind
                .format_location(self.translation.current_position),
            self.translation.total_units,
        )
    }

    fn require_reading(&self, action: &str) -> Result<()> {
        if self.phase != Phase::Reading {
            bail!("Cannot {action}: session is not reading yet");
        }
        Ok(())
    }

    fn set_position(&mut self, position: u32) -> Vec<Effect> {
        self.original.current_position = position;
        self.remap()
    }

    /// Recompute the translation position through the active strategy and
    /// emit render effects for both sides.
    fn remap(&mut self) -> Vec<Effect> {
        let mapped = self
            .strategy
            .map(self.original.current_position, self.translation.total_units);
        self.translation.current_position = mapped;
        debug!(
            original = self.original.current_position,
            translation = mapped,
            "Mapped position"
        );
        vec![
            Effect::Render {
                side: Side::Original,
                position: self.original.current_position,
            },
            Effect::Render {
                side: Side::Translation,
                position: mapped,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncSet;

    fn pdf_side(name: &str, total: u32) -> DocumentSide {
        DocumentSide::new(DocumentKind::Pdf, name, total)
    }

    fn epub_side(name: &str, total: u32) -> DocumentSide {
        DocumentSide::new(DocumentKind::Epub, name, total)
    }

    fn anchored(points: &[(u32, u32)]) -> MappingStrategy {
        MappingStrategy::Anchored(SyncSet::from_points(points.iter().map(|&(o, t)| {
            SyncPoint {
                original: o,
                translation: t,
            }
        })))
    }

    fn reading_session(strategy: MappingStrategy) -> Session {
        let mut session = Session::load(pdf_side("a.pdf", 20), epub_side("b.epub", 15), strategy);
        session.begin_reading().unwrap();
        session
    }

    #[test]
    fn navigation_is_rejected_before_reading() {
        let mut session = Session::load(
            pdf_side("a.pdf", 20),
            epub_side("b.epub", 15),
            MappingStrategy::NoMapping,
        );
        assert_eq!(session.phase(), Phase::Loaded);
        assert!(session.advance(Direction::Forward).is_err());
        assert!(session.jump_to(5).is_err());
    }

    #[test]
    fn begin_reading_renders_both_sides() {
        let mut session = Session::load(
            pdf_side("a.pdf", 20),
            epub_side("b.epub", 15),
            MappingStrategy::NoMapping,
        );
        let effects = session.begin_reading().unwrap();
        assert_eq!(
            effects,
            vec![
                Effect::Render {
                    side: Side::Original,
                    position: 1
                },
                Effect::Render {
                    side: Side::Translation,
                    position: 1
                },
            ]
        );
        assert_eq!(session.phase(), Phase::Reading);
        assert!(session.begin_reading().is_err());
    }

    #[test]
    fn advance_moves_and_remaps() {
        let mut session = reading_session(anchored(&[(1, 1), (10, 12)]));
        session.jump_to(4).unwrap();
        let outcome = session.advance(Direction::Forward).unwrap();
        assert!(matches!(outcome, NavOutcome::Moved(_)));
        assert_eq!(session.original().current_position, 5);
        // ratio (5-1)/(10-1) over span 11 rounds to 6.
        assert_eq!(session.translation().current_position, 6);
    }

    #[test]
    fn edges_are_boundaries_not_errors() {
        let mut session = reading_session(MappingStrategy::NoMapping);
        assert_eq!(
            session.advance(Direction::Backward).unwrap(),
            NavOutcome::AtBoundary
        );
        session.jump_to(20).unwrap();
        assert_eq!(
            session.advance(Direction::Forward).unwrap(),
            NavOutcome::AtBoundary
        );
        assert_eq!(session.original().current_position, 20);
    }

    #[test]
    fn jump_is_clamped_to_document_bounds() {
        let mut session = reading_session(MappingStrategy::NoMapping);
        session.jump_to(999).unwrap();
        assert_eq!(session.original().current_position, 20);
        // Identity mapping still clamps to the shorter translation.
        assert_eq!(session.translation().current_position, 15);
    }

    #[test]
    fn can_go_reflects_edges() {
        let mut session = reading_session(MappingStrategy::NoMapping);
        assert!(!session.can_go(Direction::Backward));
        assert!(session.can_go(Direction::Forward));
        session.jump_to(20).unwrap();
        assert!(!session.can_go(Direction::Forward));
        assert!(session.can_go(Direction::Backward));
    }

    #[test]
    fn adding_a_sync_point_remaps_and_persists() {
        let mut session = reading_session(anchored(&[]));
        session.jump_to(5).unwrap();
        let effects = session
            .add_sync_point(SyncPoint {
                original: 5,
                translation: 9,
            })
            .unwrap();
        assert!(effects.contains(&Effect::SaveSyncPoints));
        assert_eq!(session.translation().current_position, 9);
        assert_eq!(session.sync_points().len(), 1);
    }

    #[test]
    fn removing_a_missing_sync_point_is_an_error() {
        let mut session = reading_session(anchored(&[(1, 1)]));
        assert!(session.remove_sync_point(3).is_err());
        assert!(session.remove_sync_point(0).is_ok());
        assert!(session.sync_points().is_empty());
    }

    #[test]
    fn sync_points_are_rejected_in_offset_mode() {
        let mut session = reading_session(MappingStrategy::FixedOffset(0));
        assert!(
            session
                .add_sync_point(SyncPoint {
                    original: 1,
                    translation: 2,
                })
                .is_err()
        );
    }

    #[test]
    fn offset_nudges_shift_the_translation() {
        let mut session = reading_session(MappingStrategy::FixedOffset(0));
        session.jump_to(3).unwrap();
        session.nudge_offset(-2).unwrap();
        // clamp(3 - 2, 1, 15) = 1.
        assert_eq!(session.translation().current_position, 1);
        session.nudge_offset(-2).unwrap();
        assert_eq!(session.offset(), Some(-4));
        assert_eq!(session.translation().current_position, 1);
        assert!(session.nudge_offset(1).is_ok());
        assert!(session.remove_sync_point(0).is_err());
    }

    #[test]
    fn mapping_summary_tracks_the_strategy() {
        let session = reading_session(anchored(&[]));
        assert_eq!(session.mapping_summary(), "No sync points (1:1 mapping)");
        let session = reading_session(anchored(&[(1, 1), (4, 6)]));
        assert_eq!(session.mapping_summary(), "2 sync points active");
        let session = reading_session(MappingStrategy::FixedOffset(-2));
        assert_eq!(session.mapping_summary(), "Chapter offset -2");
    }

    #[test]
    fn position_info_formats_both_sides() {
        let mut session = reading_session(MappingStrategy::NoMapping);
        session.jump_to(5).unwrap();
        assert_eq!(session.position_info(), "Page 5 / 20 <-> Chapter 5 / 15");
    }
}
