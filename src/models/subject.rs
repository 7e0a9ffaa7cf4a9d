//! Subject (course) model.
//!
//! Subjects are caller-supplied and read-only to the engine. Weekly
//! hours may be configured per grade, as a single number, or left to a
//! fallback for grade-agnostic subjects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::RoomKind;

/// A course taught to a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Grades the subject applies to. Empty = every configured grade.
    pub applicable_grades: Vec<u8>,
    /// Weekly hours per grade.
    pub weekly_hours_by_grade: BTreeMap<u8, u8>,
    /// Single weekly-hours value, used when no per-grade entry applies.
    pub weekly_hours: Option<u8>,
    /// Whether lessons need a special room.
    pub requires_special_room: bool,
    /// Kind of room required when `requires_special_room`.
    pub room_type: Option<RoomKind>,
}

impl Subject {
    /// Creates a new subject with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            applicable_grades: Vec::new(),
            weekly_hours_by_grade: BTreeMap::new(),
            weekly_hours: None,
            requires_special_room: false,
            room_type: None,
        }
    }

    /// Sets the subject name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Limits the subject to the given grades.
    pub fn with_applicable_grades(mut self, grades: Vec<u8>) -> Self {
        self.applicable_grades = grades;
        self
    }

    /// Sets the weekly hours for one grade.
    pub fn with_hours_for_grade(mut self, grade: u8, hours: u8) -> Self {
        self.weekly_hours_by_grade.insert(grade, hours);
        self
    }

    /// Sets the single weekly-hours value.
    pub fn with_weekly_hours(mut self, hours: u8) -> Self {
        self.weekly_hours = Some(hours);
        self
    }

    /// Requires a special room of the given kind.
    pub fn with_special_room(mut self, kind: RoomKind) -> Self {
        self.requires_special_room = true;
        self.room_type = Some(kind);
        self
    }

    /// Whether the subject applies to the grade.
    #[inline]
    pub fn applies_to_grade(&self, grade: u8) -> bool {
        self.applicable_grades.is_empty() || self.applicable_grades.contains(&grade)
    }

    /// Whether the subject is not pinned to specific grades.
    #[inline]
    pub fn is_grade_agnostic(&self) -> bool {
        self.applicable_grades.is_empty()
    }

    /// Weekly hours required for a grade.
    ///
    /// Resolution order: the grade's own positive entry, then the
    /// single weekly-hours value, then (for grade-agnostic subjects
    /// only) any other grade's positive entry. Zero means the subject
    /// places no hours in that grade.
    pub fn weekly_hours_for(&self, grade: u8) -> u8 {
        if let Some(&hours) = self.weekly_hours_by_grade.get(&grade) {
            if hours > 0 {
                return hours;
            }
        }
        if let Some(hours) = self.weekly_hours {
            if hours > 0 {
                return hours;
            }
        }
        if self.is_grade_agnostic() {
            if let Some(&hours) = self.weekly_hours_by_grade.values().find(|&&h| h > 0) {
                return hours;
            }
        }
        0
    }
}
