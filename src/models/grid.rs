//! The weekly slot grid.
//!
//! One `Slot` per (day, period, grade, section), built from the
//! canonical configuration. Pure storage: mutation primitives and read
//! queries only; no constraint logic lives here. A fresh grid is built
//! per attempt and never shared across attempts.

use serde::{Deserialize, Serialize};

use super::{Configuration, Day};

/// Coordinates of one grid cell. Period and section are 1-based.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SlotKey {
    pub day: Day,
    pub period: u8,
    pub grade: u8,
    pub section: u8,
}

impl SlotKey {
    /// Creates a slot key.
    pub fn new(day: Day, period: u8, grade: u8, section: u8) -> Self {
        Self {
            day,
            period,
            grade,
            section,
        }
    }
}

/// The (teacher, subject, classroom?) triple occupying a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Assigned teacher.
    pub teacher_id: String,
    /// Assigned subject.
    pub subject_id: String,
    /// Assigned special room, when the subject needed one and a room
    /// could be claimed.
    pub classroom_id: Option<String>,
}

impl Placement {
    /// Creates a placement without a special room.
    pub fn new(teacher_id: impl Into<String>, subject_id: impl Into<String>) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            subject_id: subject_id.into(),
            classroom_id: None,
        }
    }

    /// Sets the claimed room.
    pub fn with_classroom(mut self, classroom_id: impl Into<String>) -> Self {
        self.classroom_id = Some(classroom_id.into());
        self
    }
}

/// Violation tag attached by the forced phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotTag {
    /// Placed while ignoring constraints.
    Forced,
    /// Placed over a previously occupied slot.
    ForcedOverwrite,
}

/// One grid cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Cell coordinates.
    pub key: SlotKey,
    /// Current occupant, if any.
    pub placement: Option<Placement>,
    /// Violation tags introduced by forced placement.
    pub tags: Vec<SlotTag>,
}

impl Slot {
    /// Whether the slot holds a placement.
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.placement.is_some()
    }

    /// Whether the slot carries any forced tag.
    pub fn is_forced(&self) -> bool {
        !self.tags.is_empty()
    }
}

/// The mutable slot matrix, flattened.
///
/// Slot order is deterministic: days in configuration order, then
/// periods, then grades, then sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleGrid {
    slots: Vec<Slot>,
}

impl ScheduleGrid {
    /// Builds one empty slot per (day, period, grade, section), honoring
    /// the per-day period count (Saturday may differ from weekdays).
    pub fn initialize(config: &Configuration) -> Self {
        let classes = config.classes();
        let mut slots = Vec::with_capacity(config.total_slots());
        for &day in &config.days {
            for period in 1..=config.periods_for(day) {
                for &(grade, section) in &classes {
                    slots.push(Slot {
                        key: SlotKey::new(day, period, grade, section),
                        placement: None,
                        tags: Vec::new(),
                    });
                }
            }
        }
        Self { slots }
    }

    /// All slots in grid order.
    #[inline]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the grid has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The slot at the given key.
    pub fn slot(&self, key: SlotKey) -> Option<&Slot> {
        self.slots.iter().find(|s| s.key == key)
    }

    /// Whether the slot at the key is occupied.
    pub fn is_occupied(&self, key: SlotKey) -> bool {
        self.slot(key).is_some_and(|s| s.is_occupied())
    }

    /// Installs a placement, replacing any occupant and its tags.
    ///
    /// Returns `false` when no slot exists at the key.
    pub fn occupy(&mut self, key: SlotKey, placement: Placement, tags: Vec<SlotTag>) -> bool {
        match self.slots.iter_mut().find(|s| s.key == key) {
            Some(slot) => {
                slot.placement = Some(placement);
                slot.tags = tags;
                true
            }
            None => false,
        }
    }

    /// Empties the slot at the key, clearing placement and tags.
    ///
    /// Returns `false` when no slot exists at the key.
    pub fn clear(&mut self, key: SlotKey) -> bool {
        match self.slots.iter_mut().find(|s| s.key == key) {
            Some(slot) => {
                slot.placement = None;
                slot.tags.clear();
                true
            }
            None => false,
        }
    }

    /// Slots of one (grade, section) class.
    pub fn slots_for_class(&self, grade: u8, section: u8) -> impl Iterator<Item = &Slot> {
        self.slots
            .iter()
            .filter(move |s| s.key.grade == grade && s.key.section == section)
    }

    /// Keys of the empty slots of one class.
    pub fn empty_keys_for_class(&self, grade: u8, section: u8) -> Vec<SlotKey> {
        self.slots_for_class(grade, section)
            .filter(|s| !s.is_occupied())
            .map(|s| s.key)
            .collect()
    }

    /// Keys of the occupied slots of one class.
    pub fn occupied_keys_for_class(&self, grade: u8, section: u8) -> Vec<SlotKey> {
        self.slots_for_class(grade, section)
            .filter(|s| s.is_occupied())
            .map(|s| s.key)
            .collect()
    }

    /// Whether the teacher occupies any slot at (day, period).
    pub fn teacher_busy_at(&self, teacher_id: &str, day: Day, period: u8) -> bool {
        self.slots.iter().any(|s| {
            s.key.day == day
                && s.key.period == period
                && s.placement
                    .as_ref()
                    .is_some_and(|p| p.teacher_id == teacher_id)
        })
    }

    /// Whether the room is claimed by any slot at (day, period).
    pub fn classroom_busy_at(&self, classroom_id: &str, day: Day, period: u8) -> bool {
        self.slots.iter().any(|s| {
            s.key.day == day
                && s.key.period == period
                && s.placement
                    .as_ref()
                    .and_then(|p| p.classroom_id.as_deref())
                    .is_some_and(|c| c == classroom_id)
        })
    }

    /// Number of occupied slots.
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_occupied()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawSettings;

    fn small_config() -> Configuration {
        Configuration::normalize(
            &RawSettings::new()
                .with_days(vec!["mon".into(), "tue".into()])
                .with_periods_per_day(3)
                .with_grades(vec![1])
                .with_sections_per_grade(vec![2]),
        )
    }

    #[test]
    fn test_initialize_dimensions() {
        let grid = ScheduleGrid::initialize(&small_config());
        // 2 days × 3 periods × 2 sections
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_initialize_saturday_period_count() {
        let config = Configuration::normalize(
            &RawSettings::new()
                .with_days(vec!["fri".into(), "sat".into()])
                .with_periods_per_day(6)
                .with_saturday_periods(4)
                .with_grades(vec![1])
                .with_sections_per_grade(vec![1]),
        );
        let grid = ScheduleGrid::initialize(&config);
        assert_eq!(grid.len(), 10);
        let sat_slots = grid
            .slots()
            .iter()
            .filter(|s| s.key.day == Day::Saturday)
            .count();
        assert_eq!(sat_slots, 4);
    }

    #[test]
    fn test_occupy_and_clear() {
        let mut grid = ScheduleGrid::initialize(&small_config());
        let key = SlotKey::new(Day::Monday, 1, 1, 1);

        assert!(!grid.is_occupied(key));
        assert!(grid.occupy(key, Placement::new("T1", "math"), vec![]));
        assert!(grid.is_occupied(key));

        let slot = grid.slot(key).unwrap();
        assert_eq!(slot.placement.as_ref().unwrap().teacher_id, "T1");
        assert!(!slot.is_forced());

        assert!(grid.clear(key));
        assert!(!grid.is_occupied(key));
    }

    #[test]
    fn test_occupy_replaces_tags() {
        let mut grid = ScheduleGrid::initialize(&small_config());
        let key = SlotKey::new(Day::Monday, 1, 1, 1);
        grid.occupy(key, Placement::new("T1", "math"), vec![SlotTag::Forced]);
        grid.occupy(key, Placement::new("T2", "art"), vec![]);

        let slot = grid.slot(key).unwrap();
        assert_eq!(slot.placement.as_ref().unwrap().teacher_id, "T2");
        assert!(slot.tags.is_empty());
    }

    #[test]
    fn test_occupy_unknown_key() {
        let mut grid = ScheduleGrid::initialize(&small_config());
        let key = SlotKey::new(Day::Friday, 1, 1, 1); // Friday not configured
        assert!(!grid.occupy(key, Placement::new("T1", "math"), vec![]));
        assert!(!grid.clear(key));
    }

    #[test]
    fn test_empty_keys_for_class() {
        let mut grid = ScheduleGrid::initialize(&small_config());
        assert_eq!(grid.empty_keys_for_class(1, 1).len(), 6);

        grid.occupy(
            SlotKey::new(Day::Monday, 1, 1, 1),
            Placement::new("T1", "math"),
            vec![],
        );
        assert_eq!(grid.empty_keys_for_class(1, 1).len(), 5);
        assert_eq!(grid.empty_keys_for_class(1, 2).len(), 6);
        assert_eq!(grid.occupied_keys_for_class(1, 1).len(), 1);
    }

    #[test]
    fn test_teacher_busy_at() {
        let mut grid = ScheduleGrid::initialize(&small_config());
        grid.occupy(
            SlotKey::new(Day::Monday, 2, 1, 1),
            Placement::new("T1", "math"),
            vec![],
        );

        assert!(grid.teacher_busy_at("T1", Day::Monday, 2));
        assert!(!grid.teacher_busy_at("T1", Day::Monday, 1));
        assert!(!grid.teacher_busy_at("T2", Day::Monday, 2));
    }

    #[test]
    fn test_classroom_busy_at() {
        let mut grid = ScheduleGrid::initialize(&small_config());
        grid.occupy(
            SlotKey::new(Day::Monday, 2, 1, 1),
            Placement::new("T1", "sci").with_classroom("lab1"),
            vec![],
        );

        assert!(grid.classroom_busy_at("lab1", Day::Monday, 2));
        assert!(!grid.classroom_busy_at("lab1", Day::Tuesday, 2));
        assert!(!grid.classroom_busy_at("lab2", Day::Monday, 2));
    }
}
