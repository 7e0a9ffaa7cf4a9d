//! Placement obligations derived from the roster.
//!
//! A `Requirement` is one obligation to place a fixed number of weekly
//! hours for a (teacher, subject, grade, section) tuple. The catalog
//! derives the flat list once per attempt; the placement phases mutate
//! only the `assigned_hours` counter.

use serde::{Deserialize, Serialize};

use super::{Configuration, Subject, Teacher};

/// One obligation to place weekly hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Obligated teacher.
    pub teacher_id: String,
    /// Subject to place.
    pub subject_id: String,
    /// Target grade.
    pub grade: u8,
    /// Target section (1-based).
    pub section: u8,
    /// Hours to place per week.
    pub required_hours: u8,
    /// Hours placed so far this attempt.
    pub assigned_hours: u8,
}

impl Requirement {
    /// Creates a requirement with nothing assigned yet.
    pub fn new(
        teacher_id: impl Into<String>,
        subject_id: impl Into<String>,
        grade: u8,
        section: u8,
        required_hours: u8,
    ) -> Self {
        Self {
            teacher_id: teacher_id.into(),
            subject_id: subject_id.into(),
            grade,
            section,
            required_hours,
            assigned_hours: 0,
        }
    }

    /// Hours still missing.
    #[inline]
    pub fn deficit(&self) -> u8 {
        self.required_hours.saturating_sub(self.assigned_hours)
    }

    /// Whether all required hours are placed.
    #[inline]
    pub fn is_satisfied(&self) -> bool {
        self.assigned_hours >= self.required_hours
    }
}

/// Derives the flat requirement list from teachers, subjects, and the
/// canonical configuration.
pub struct RequirementCatalog;

impl RequirementCatalog {
    /// Builds the obligations: for each teacher, each subject the
    /// teacher can teach, each configured grade the subject applies to
    /// and the teacher serves, each section of that grade. Required
    /// hours come from `Subject::weekly_hours_for`; zero-hour
    /// requirements are omitted. Teachers referencing unknown subjects
    /// contribute nothing for those references. Inputs are untouched.
    pub fn build(
        teachers: &[Teacher],
        subjects: &[Subject],
        config: &Configuration,
    ) -> Vec<Requirement> {
        let mut requirements = Vec::new();
        for teacher in teachers {
            for subject_id in &teacher.teachable_subject_ids {
                let Some(subject) = subjects.iter().find(|s| &s.id == subject_id) else {
                    continue;
                };
                for &grade in &config.grades {
                    if !subject.applies_to_grade(grade) || !teacher.covers_grade(grade) {
                        continue;
                    }
                    let hours = subject.weekly_hours_for(grade);
                    if hours == 0 {
                        continue;
                    }
                    for section in 1..=config.sections_for(grade) {
                        requirements.push(Requirement::new(
                            &teacher.id,
                            &subject.id,
                            grade,
                            section,
                            hours,
                        ));
                    }
                }
            }
        }
        requirements
    }
}
