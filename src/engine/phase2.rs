//! Phase 2: forced completion.
//!
//! Fills every slot Phase 1 left behind, ignoring constraints and
//! tagging each placement it forces. Two passes: the backlog pass
//! places (or overwrites for) every unmet hour; the final sweep fills
//! whatever is still empty from the neediest requirement of the class.
//!
//! The one exception to the 100%-fill guarantee: a class for which no
//! requirement exists at all. Such slots stay empty and are reported,
//! never silently ignored.

use rand::Rng;
use tracing::{debug, warn};

use crate::engine::phase1::BacklogEntry;
use crate::models::{Placement, Requirement, ScheduleGrid, SlotKey, SlotTag};

/// What the forced phase did.
#[derive(Debug, Default)]
pub struct Phase2Outcome {
    /// Backlogged hours placed into empty slots.
    pub forced_fills: u32,
    /// Backlogged hours placed over existing occupants.
    pub forced_overwrites: u32,
    /// Slots filled by the final sweep.
    pub sweep_fills: u32,
    /// Slots no requirement could fill (data gap in the roster).
    pub unfillable: Vec<SlotKey>,
}

/// The constraint-ignoring assigner.
pub struct ForceAssigner;

impl ForceAssigner {
    /// Completes the grid.
    ///
    /// Counters are best-effort from here on: an overwrite discards the
    /// previous occupant without decrementing its owning requirement.
    pub fn run<R: Rng>(
        grid: &mut ScheduleGrid,
        requirements: &mut [Requirement],
        backlog: &[BacklogEntry],
        rng: &mut R,
    ) -> Phase2Outcome {
        let mut outcome = Phase2Outcome::default();

        Self::place_backlog(grid, requirements, backlog, rng, &mut outcome);
        Self::sweep(grid, requirements, &mut outcome);

        debug!(
            forced = outcome.forced_fills,
            overwrites = outcome.forced_overwrites,
            swept = outcome.sweep_fills,
            "phase 2 completion finished"
        );
        if !outcome.unfillable.is_empty() {
            warn!(
                count = outcome.unfillable.len(),
                "slots left unfillable: no requirement covers their class"
            );
        }

        outcome
    }

    fn place_backlog<R: Rng>(
        grid: &mut ScheduleGrid,
        requirements: &mut [Requirement],
        backlog: &[BacklogEntry],
        rng: &mut R,
        outcome: &mut Phase2Outcome,
    ) {
        for entry in backlog {
            for _ in 0..entry.remaining_hours {
                let requirement = &requirements[entry.requirement_index];
                let placement =
                    Placement::new(&requirement.teacher_id, &requirement.subject_id);
                let empties =
                    grid.empty_keys_for_class(requirement.grade, requirement.section);

                if !empties.is_empty() {
                    let key = empties[rng.random_range(0..empties.len())];
                    grid.occupy(key, placement, vec![SlotTag::Forced]);
                    outcome.forced_fills += 1;
                } else {
                    let occupied =
                        grid.occupied_keys_for_class(requirement.grade, requirement.section);
                    if occupied.is_empty() {
                        // Class with zero slots: nothing to force into.
                        break;
                    }
                    let key = occupied[rng.random_range(0..occupied.len())];
                    grid.occupy(key, placement, vec![SlotTag::ForcedOverwrite]);
                    outcome.forced_overwrites += 1;
                }
                requirements[entry.requirement_index].assigned_hours += 1;
            }
        }
    }

    fn sweep(
        grid: &mut ScheduleGrid,
        requirements: &mut [Requirement],
        outcome: &mut Phase2Outcome,
    ) {
        let empty_keys: Vec<SlotKey> = grid
            .slots()
            .iter()
            .filter(|s| !s.is_occupied())
            .map(|s| s.key)
            .collect();

        for key in empty_keys {
            let neediest = requirements
                .iter()
                .enumerate()
                .filter(|(_, r)| r.grade == key.grade && r.section == key.section)
                .max_by_key(|(index, r)| (r.deficit(), std::cmp::Reverse(*index)))
                .map(|(index, _)| index);

            match neediest {
                Some(index) => {
                    let requirement = &requirements[index];
                    grid.occupy(
                        key,
                        Placement::new(&requirement.teacher_id, &requirement.subject_id),
                        vec![SlotTag::Forced],
                    );
                    requirements[index].assigned_hours += 1;
                    outcome.sweep_fills += 1;
                }
                None => outcome.unfillable.push(key),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Configuration, Day, RawSettings};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config(days: &[&str], periods: i64, grades: Vec<i64>, sections: Vec<i64>) -> Configuration {
        Configuration::normalize(
            &RawSettings::new()
                .with_days(days.iter().map(|d| d.to_string()).collect())
                .with_periods_per_day(periods)
                .with_grades(grades)
                .with_sections_per_grade(sections),
        )
    }

    #[test]
    fn test_backlog_fills_empty_slots() {
        let config = config(&["mon"], 2, vec![1], vec![1]);
        let mut grid = ScheduleGrid::initialize(&config);
        let mut requirements = vec![Requirement::new("T1", "math", 1, 1, 2)];
        let backlog = vec![BacklogEntry {
            requirement_index: 0,
            remaining_hours: 2,
        }];
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let outcome = ForceAssigner::run(&mut grid, &mut requirements, &backlog, &mut rng);
        assert_eq!(outcome.forced_fills, 2);
        assert_eq!(outcome.forced_overwrites, 0);
        assert_eq!(grid.occupied_count(), 2);
        assert_eq!(requirements[0].assigned_hours, 2);
        assert!(grid
            .slots()
            .iter()
            .all(|s| s.tags == vec![SlotTag::Forced]));
    }

    #[test]
    fn test_backlog_overwrites_when_class_full() {
        let config = config(&["mon"], 1, vec![1], vec![1]);
        let mut grid = ScheduleGrid::initialize(&config);
        let key = SlotKey::new(Day::Monday, 1, 1, 1);
        grid.occupy(key, Placement::new("T0", "art"), vec![]);

        let mut requirements = vec![
            Requirement::new("T0", "art", 1, 1, 1),
            Requirement::new("T1", "math", 1, 1, 1),
        ];
        requirements[0].assigned_hours = 1;
        let backlog = vec![BacklogEntry {
            requirement_index: 1,
            remaining_hours: 1,
        }];
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let outcome = ForceAssigner::run(&mut grid, &mut requirements, &backlog, &mut rng);
        assert_eq!(outcome.forced_overwrites, 1);

        let slot = grid.slot(key).unwrap();
        assert_eq!(slot.placement.as_ref().unwrap().teacher_id, "T1");
        assert_eq!(slot.tags, vec![SlotTag::ForcedOverwrite]);
        // The displaced requirement keeps its counter: best-effort accounting
        assert_eq!(requirements[0].assigned_hours, 1);
        assert_eq!(requirements[1].assigned_hours, 1);
    }

    #[test]
    fn test_sweep_prefers_largest_deficit() {
        let config = config(&["mon"], 3, vec![1], vec![1]);
        let mut grid = ScheduleGrid::initialize(&config);
        let mut requirements = vec![
            Requirement::new("T1", "math", 1, 1, 1),
            Requirement::new("T2", "art", 1, 1, 3),
        ];
        requirements[0].assigned_hours = 1; // deficit 0
        requirements[1].assigned_hours = 1; // deficit 2
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let outcome = ForceAssigner::run(&mut grid, &mut requirements, &[], &mut rng);
        assert_eq!(outcome.sweep_fills, 3);
        // First two sweep fills go to the deficit-2 requirement
        let art_slots = grid
            .slots()
            .iter()
            .filter(|s| {
                s.placement
                    .as_ref()
                    .is_some_and(|p| p.subject_id == "art")
            })
            .count();
        assert_eq!(art_slots, 2);
        assert!(requirements[1].is_satisfied());
    }

    #[test]
    fn test_sweep_falls_back_to_any_requirement() {
        let config = config(&["mon"], 2, vec![1], vec![1]);
        let mut grid = ScheduleGrid::initialize(&config);
        let mut requirements = vec![Requirement::new("T1", "math", 1, 1, 1)];
        requirements[0].assigned_hours = 1; // already satisfied
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let outcome = ForceAssigner::run(&mut grid, &mut requirements, &[], &mut rng);
        assert_eq!(outcome.sweep_fills, 2);
        assert_eq!(grid.occupied_count(), 2);
        assert!(outcome.unfillable.is_empty());
    }

    #[test]
    fn test_sweep_reports_unfillable_class() {
        // Grade 2 has slots but no requirement at all.
        let config = config(&["mon"], 1, vec![1, 2], vec![1, 1]);
        let mut grid = ScheduleGrid::initialize(&config);
        let mut requirements = vec![Requirement::new("T1", "math", 1, 1, 1)];
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let outcome = ForceAssigner::run(&mut grid, &mut requirements, &[], &mut rng);
        assert_eq!(outcome.unfillable.len(), 1);
        assert_eq!(outcome.unfillable[0].grade, 2);
        assert!(!grid.is_occupied(outcome.unfillable[0]));
        // Grade 1's slot is still filled
        assert!(grid.is_occupied(SlotKey::new(Day::Monday, 1, 1, 1)));
    }

    #[test]
    fn test_full_grid_after_both_passes() {
        let config = config(&["mon", "tue"], 4, vec![1], vec![2]);
        let mut grid = ScheduleGrid::initialize(&config);
        let mut requirements = vec![
            Requirement::new("T1", "math", 1, 1, 2),
            Requirement::new("T1", "math", 1, 2, 2),
        ];
        let backlog = vec![
            BacklogEntry {
                requirement_index: 0,
                remaining_hours: 2,
            },
            BacklogEntry {
                requirement_index: 1,
                remaining_hours: 2,
            },
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(21);

        ForceAssigner::run(&mut grid, &mut requirements, &backlog, &mut rng);
        assert_eq!(grid.occupied_count(), grid.len());
    }
}
