//! Teacher placement-difficulty ranking.
//!
//! Orders Phase 1 processing so scarce teachers get first pick of
//! favorable slots. Difficulty is a scarcity metric: the weekly hours a
//! teacher competes for, discounted by how many colleagues could take
//! them, divided by the teacher's available-hour budget.

use crate::models::{Configuration, Subject, Teacher};

/// Ranks teachers by placement difficulty.
pub struct DifficultyAnalyzer;

impl DifficultyAnalyzer {
    /// Teacher indices sorted hardest-to-place first.
    ///
    /// The sort is stable: ties keep the original roster order.
    pub fn rank(teachers: &[Teacher], subjects: &[Subject], config: &Configuration) -> Vec<usize> {
        let scores: Vec<f64> = teachers
            .iter()
            .map(|t| Self::difficulty(t, teachers, subjects, config))
            .collect();
        let mut indices: Vec<usize> = (0..teachers.len()).collect();
        indices.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        indices
    }

    /// Difficulty of one teacher: scarcity over available budget.
    ///
    /// Scarcity sums, per teachable subject and per grade the pairing
    /// actually serves, the weekly hours divided by the number of
    /// teachers who could teach that subject.
    pub fn difficulty(
        teacher: &Teacher,
        teachers: &[Teacher],
        subjects: &[Subject],
        config: &Configuration,
    ) -> f64 {
        let mut scarcity = 0.0;
        for subject_id in &teacher.teachable_subject_ids {
            let Some(subject) = subjects.iter().find(|s| &s.id == subject_id) else {
                continue;
            };
            let competitors = teachers
                .iter()
                .filter(|t| t.can_teach(subject_id))
                .count()
                .max(1) as f64;
            for &grade in &config.grades {
                if !subject.applies_to_grade(grade) || !teacher.covers_grade(grade) {
                    continue;
                }
                scarcity += subject.weekly_hours_for(grade) as f64 / competitors;
            }
        }
        scarcity / Self::available_budget(teacher, config) as f64
    }

    /// Weekly slots the teacher may be placed into, floor 1.
    ///
    /// A `required` restriction confines the teacher to its window, so
    /// the budget shrinks to the union of required windows.
    pub fn available_budget(teacher: &Teacher, config: &Configuration) -> u32 {
        if !teacher.has_required_window() {
            return config.weekly_periods().max(1);
        }
        let mut budget = 0;
        for &day in &config.days {
            for period in 1..=config.periods_for(day) {
                if teacher.in_required_window(day, period) {
                    budget += 1;
                }
            }
        }
        budget.max(1)
    }
}
