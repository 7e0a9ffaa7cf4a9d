//! Teacher model and availability restrictions.
//!
//! Teachers are caller-supplied and read-only to the engine. A
//! `required`-level restriction confines the teacher to its day/period
//! window; a `recommended` one is informational and never blocks
//! placement.

use serde::{Deserialize, Serialize};

use super::Day;

/// Severity of a day/period restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestrictionLevel {
    /// Placement is valid only inside the restriction's window.
    Required,
    /// Advisory; never blocks placement.
    Recommended,
}

/// A teacher's day/period limitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    /// Day the restriction applies to.
    pub day: Day,
    /// Periods within the day (1-based).
    pub periods: Vec<u8>,
    /// Whether the window is binding or advisory.
    pub level: RestrictionLevel,
}

impl Restriction {
    /// Creates a binding restriction.
    pub fn required(day: Day, periods: Vec<u8>) -> Self {
        Self {
            day,
            periods,
            level: RestrictionLevel::Required,
        }
    }

    /// Creates an advisory restriction.
    pub fn recommended(day: Day, periods: Vec<u8>) -> Self {
        Self {
            day,
            periods,
            level: RestrictionLevel::Recommended,
        }
    }

    /// Whether this restriction's window contains (day, period).
    #[inline]
    pub fn contains(&self, day: Day, period: u8) -> bool {
        self.day == day && self.periods.contains(&period)
    }
}

/// A staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Subjects this teacher can teach.
    pub teachable_subject_ids: Vec<String>,
    /// Grades this teacher may serve. Empty = all grades.
    pub eligible_grades: Vec<u8>,
    /// Day/period limitations.
    pub restrictions: Vec<Restriction>,
}

impl Teacher {
    /// Creates a new teacher with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            teachable_subject_ids: Vec::new(),
            eligible_grades: Vec::new(),
            restrictions: Vec::new(),
        }
    }

    /// Sets the teacher name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a teachable subject.
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.teachable_subject_ids.push(subject_id.into());
        self
    }

    /// Restricts eligibility to the given grades.
    pub fn with_eligible_grades(mut self, grades: Vec<u8>) -> Self {
        self.eligible_grades = grades;
        self
    }

    /// Adds a restriction.
    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.restrictions.push(restriction);
        self
    }

    /// Whether this teacher can teach the subject.
    pub fn can_teach(&self, subject_id: &str) -> bool {
        self.teachable_subject_ids.iter().any(|s| s == subject_id)
    }

    /// Whether this teacher serves the grade.
    #[inline]
    pub fn covers_grade(&self, grade: u8) -> bool {
        self.eligible_grades.is_empty() || self.eligible_grades.contains(&grade)
    }

    /// Whether any `Required`-level restriction exists.
    pub fn has_required_window(&self) -> bool {
        self.restrictions
            .iter()
            .any(|r| r.level == RestrictionLevel::Required)
    }

    /// Whether (day, period) lies inside the union of required windows.
    ///
    /// Meaningful only when `has_required_window()`: a teacher without
    /// required restrictions is available everywhere.
    pub fn in_required_window(&self, day: Day, period: u8) -> bool {
        self.restrictions
            .iter()
            .filter(|r| r.level == RestrictionLevel::Required)
            .any(|r| r.contains(day, period))
    }
}
