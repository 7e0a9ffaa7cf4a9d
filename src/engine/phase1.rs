//! Phase 1: constraint-respecting randomized placement.
//!
//! Walks teachers in difficulty order and places each requirement's
//! hours into uniformly random slots among those every applicable rule
//! admits. Exhaustion is a normal outcome: unmet remainders go onto a
//! backlog for the forced phase, never into an error.

use rand::Rng;
use tracing::debug;

use crate::constraints::{find_free_room, ConstraintSet, DayUsage, PlacementContext};
use crate::models::{
    Classroom, Placement, Requirement, RoomKind, ScheduleGrid, SlotKey, Subject, Teacher,
};

/// Hours Phase 1 could not place for one requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacklogEntry {
    /// Index into the attempt's requirement list.
    pub requirement_index: usize,
    /// Hours still to place when Phase 1 gave up on the requirement.
    pub remaining_hours: u8,
}

/// What Phase 1 left behind.
#[derive(Debug)]
pub struct Phase1Outcome {
    /// Requirements with unmet hours, in processing order.
    pub backlog: Vec<BacklogEntry>,
    /// Days used per (grade, section, subject), for later inspection.
    pub day_usage: DayUsage,
    /// Hours successfully placed.
    pub placed_hours: u32,
}

/// The constraint-respecting assigner.
pub struct Phase1Assigner<'a> {
    teachers: &'a [Teacher],
    subjects: &'a [Subject],
    classrooms: &'a [Classroom],
    constraints: &'a ConstraintSet,
    honor_soft: bool,
}

impl<'a> Phase1Assigner<'a> {
    /// Creates an assigner honoring both hard and soft rules.
    pub fn new(
        teachers: &'a [Teacher],
        subjects: &'a [Subject],
        classrooms: &'a [Classroom],
        constraints: &'a ConstraintSet,
    ) -> Self {
        Self {
            teachers,
            subjects,
            classrooms,
            constraints,
            honor_soft: true,
        }
    }

    /// Controls whether soft rules filter candidates (tolerant mode
    /// turns them off).
    pub fn with_soft_rules(mut self, honor: bool) -> Self {
        self.honor_soft = honor;
        self
    }

    /// Places hours for every requirement, teacher by teacher.
    ///
    /// `teacher_order` carries indices into the teacher slice, hardest
    /// to place first. Requirements are processed in catalog order
    /// within each teacher. Candidates are drawn uniformly at random
    /// with `rng`.
    pub fn run<R: Rng>(
        &self,
        grid: &mut ScheduleGrid,
        requirements: &mut [Requirement],
        teacher_order: &[usize],
        rng: &mut R,
    ) -> Phase1Outcome {
        let mut day_usage = DayUsage::new();
        let mut backlog = Vec::new();
        let mut placed_hours: u32 = 0;

        for &teacher_index in teacher_order {
            let teacher = &self.teachers[teacher_index];
            for index in 0..requirements.len() {
                if requirements[index].teacher_id != teacher.id {
                    continue;
                }
                let Some(subject) = self
                    .subjects
                    .iter()
                    .find(|s| s.id == requirements[index].subject_id)
                else {
                    // Catalog never emits unknown subjects; hand-built
                    // requirement lists defer straight to the backlog.
                    let deficit = requirements[index].deficit();
                    if deficit > 0 {
                        backlog.push(BacklogEntry {
                            requirement_index: index,
                            remaining_hours: deficit,
                        });
                    }
                    continue;
                };

                while requirements[index].assigned_hours < requirements[index].required_hours {
                    let requirement = &requirements[index];
                    let grid_view: &ScheduleGrid = grid;
                    let candidates: Vec<SlotKey> = grid_view
                        .empty_keys_for_class(requirement.grade, requirement.section)
                        .into_iter()
                        .filter(|&key| {
                            let ctx = PlacementContext {
                                grid: grid_view,
                                key,
                                requirement,
                                teacher,
                                subject,
                                classrooms: self.classrooms,
                                day_usage: &day_usage,
                            };
                            if self.honor_soft {
                                self.constraints.admits_all(&ctx)
                            } else {
                                self.constraints.admits_hard(&ctx)
                            }
                        })
                        .collect();

                    if candidates.is_empty() {
                        backlog.push(BacklogEntry {
                            requirement_index: index,
                            remaining_hours: requirement.deficit(),
                        });
                        break;
                    }

                    let key = candidates[rng.random_range(0..candidates.len())];
                    let mut placement =
                        Placement::new(&requirement.teacher_id, &requirement.subject_id);
                    if subject.requires_special_room {
                        let kind = subject.room_type.clone().unwrap_or(RoomKind::Standard);
                        if let Some(room) =
                            find_free_room(grid, self.classrooms, &kind, key.day, key.period)
                        {
                            placement = placement.with_classroom(&room.id);
                        }
                    }
                    day_usage.record(
                        requirement.grade,
                        requirement.section,
                        &requirement.subject_id,
                        key.day,
                    );
                    grid.occupy(key, placement, Vec::new());
                    requirements[index].assigned_hours += 1;
                    placed_hours += 1;
                }
            }
        }

        debug!(
            placed = placed_hours,
            backlogged = backlog.len(),
            "phase 1 placement finished"
        );

        Phase1Outcome {
            backlog,
            day_usage,
            placed_hours,
        }
    }
}
