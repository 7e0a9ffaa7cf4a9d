//! Pluggable placement rules.
//!
//! Hard rules block Phase 1 placement outright; soft rules are only
//! consulted to prefer better placements and never block the forced
//! phase. Rules are evaluated against a candidate (slot, requirement)
//! pair through a borrowed `PlacementContext`.
//!
//! The stock set:
//!
//! | Rule | Kind | Blocks when |
//! |------|------|-------------|
//! | `TeacherConflict` | Hard | teacher already busy at that day+period |
//! | `ClassroomConflict` | Hard | no required special room free |
//! | `RequiredWindow` | Hard | outside a `required` restriction window |
//! | `ConsecutivePeriod` | Soft | same subject in an adjacent period |
//! | `DaySpread` | Soft | same subject already that day (≥2 weekly hours) |
//!
//! `Recommended` restrictions participate in no rule.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::models::{
    Classroom, Day, Requirement, RoomKind, ScheduleGrid, SlotKey, Subject, Teacher,
};

/// Whether a rule blocks placement or merely filters preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Violation blocks Phase 1 placement.
    Hard,
    /// Filtered in Phase 1 only; never blocks the forced phase.
    Soft,
}

/// Days already used per (grade, section, subject) during Phase 1.
///
/// Backs the `DaySpread` rule. Tracks only the running phase's own
/// placements; rebuilt fresh per attempt.
#[derive(Debug, Clone, Default)]
pub struct DayUsage {
    used: HashMap<(u8, u8, String), HashSet<Day>>,
}

impl DayUsage {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a placement day for the class/subject.
    pub fn record(&mut self, grade: u8, section: u8, subject_id: &str, day: Day) {
        self.used
            .entry((grade, section, subject_id.to_string()))
            .or_default()
            .insert(day);
    }

    /// Whether the class/subject already has a placement that day.
    pub fn contains(&self, grade: u8, section: u8, subject_id: &str, day: Day) -> bool {
        self.used
            .get(&(grade, section, subject_id.to_string()))
            .is_some_and(|days| days.contains(&day))
    }
}

/// Borrowed view of one candidate placement.
pub struct PlacementContext<'a> {
    /// Current grid state.
    pub grid: &'a ScheduleGrid,
    /// Candidate slot.
    pub key: SlotKey,
    /// Obligation being placed.
    pub requirement: &'a Requirement,
    /// Resolved teacher of the requirement.
    pub teacher: &'a Teacher,
    /// Resolved subject of the requirement.
    pub subject: &'a Subject,
    /// All rooms.
    pub classrooms: &'a [Classroom],
    /// Phase-1 day-usage tracker.
    pub day_usage: &'a DayUsage,
}

/// A single placement check.
pub trait PlacementRule: Send + Sync {
    /// Rule name, for diagnostics.
    fn name(&self) -> &'static str;
    /// Hard or soft.
    fn kind(&self) -> RuleKind;
    /// Whether the candidate placement is admitted.
    fn admits(&self, ctx: &PlacementContext<'_>) -> bool;
}

/// Finds a room of the given kind that is free at (day, period).
pub fn find_free_room<'a>(
    grid: &ScheduleGrid,
    classrooms: &'a [Classroom],
    kind: &RoomKind,
    day: Day,
    period: u8,
) -> Option<&'a Classroom> {
    classrooms
        .iter()
        .filter(|room| &room.kind == kind)
        .find(|room| !grid.classroom_busy_at(&room.id, day, period))
}

/// Teacher already occupies another slot at the same day+period.
pub struct TeacherConflict;

impl PlacementRule for TeacherConflict {
    fn name(&self) -> &'static str {
        "teacher-conflict"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Hard
    }

    fn admits(&self, ctx: &PlacementContext<'_>) -> bool {
        !ctx.grid
            .teacher_busy_at(&ctx.requirement.teacher_id, ctx.key.day, ctx.key.period)
    }
}

/// Subject needs a special room and none of the required kind is free.
pub struct ClassroomConflict;

impl PlacementRule for ClassroomConflict {
    fn name(&self) -> &'static str {
        "classroom-conflict"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Hard
    }

    fn admits(&self, ctx: &PlacementContext<'_>) -> bool {
        if !ctx.subject.requires_special_room {
            return true;
        }
        let kind = ctx.subject.room_type.clone().unwrap_or(RoomKind::Standard);
        find_free_room(ctx.grid, ctx.classrooms, &kind, ctx.key.day, ctx.key.period).is_some()
    }
}

/// Any `required` restriction confines the teacher to its window.
pub struct RequiredWindow;

impl PlacementRule for RequiredWindow {
    fn name(&self) -> &'static str {
        "required-window"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Hard
    }

    fn admits(&self, ctx: &PlacementContext<'_>) -> bool {
        !ctx.teacher.has_required_window()
            || ctx.teacher.in_required_window(ctx.key.day, ctx.key.period)
    }
}

/// Same subject in the immediately adjacent period for the same class.
pub struct ConsecutivePeriod;

impl PlacementRule for ConsecutivePeriod {
    fn name(&self) -> &'static str {
        "consecutive-period"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Soft
    }

    fn admits(&self, ctx: &PlacementContext<'_>) -> bool {
        let key = ctx.key;
        let mut adjacent = Vec::with_capacity(2);
        if key.period > 1 {
            adjacent.push(key.period - 1);
        }
        adjacent.push(key.period + 1);

        !adjacent.into_iter().any(|period| {
            ctx.grid
                .slot(SlotKey::new(key.day, period, key.grade, key.section))
                .and_then(|s| s.placement.as_ref())
                .is_some_and(|p| p.subject_id == ctx.subject.id)
        })
    }
}

/// Same subject already placed that day for the same class.
///
/// Applies only to requirements of two or more weekly hours; a
/// single-hour subject has nothing to spread.
pub struct DaySpread;

impl PlacementRule for DaySpread {
    fn name(&self) -> &'static str {
        "day-spread"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Soft
    }

    fn admits(&self, ctx: &PlacementContext<'_>) -> bool {
        if ctx.requirement.required_hours < 2 {
            return true;
        }
        !ctx.day_usage.contains(
            ctx.key.grade,
            ctx.key.section,
            &ctx.subject.id,
            ctx.key.day,
        )
    }
}

/// An ordered collection of placement rules.
#[derive(Clone)]
pub struct ConstraintSet {
    rules: Vec<Arc<dyn PlacementRule>>,
}

impl ConstraintSet {
    /// Creates an empty set (every placement admitted).
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The five stock rules.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(TeacherConflict)
            .with_rule(ClassroomConflict)
            .with_rule(RequiredWindow)
            .with_rule(ConsecutivePeriod)
            .with_rule(DaySpread)
    }

    /// Adds a rule.
    pub fn with_rule<R: PlacementRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Whether every hard rule admits the candidate.
    pub fn admits_hard(&self, ctx: &PlacementContext<'_>) -> bool {
        self.rules
            .iter()
            .filter(|r| r.kind() == RuleKind::Hard)
            .all(|r| r.admits(ctx))
    }

    /// Whether every soft rule admits the candidate.
    pub fn admits_soft(&self, ctx: &PlacementContext<'_>) -> bool {
        self.rules
            .iter()
            .filter(|r| r.kind() == RuleKind::Soft)
            .all(|r| r.admits(ctx))
    }

    /// Whether every rule, hard and soft, admits the candidate.
    pub fn admits_all(&self, ctx: &PlacementContext<'_>) -> bool {
        self.rules.iter().all(|r| r.admits(ctx))
    }

    /// Number of installed rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are installed.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for ConstraintSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Configuration, Placement, RawSettings, Restriction};

    fn test_config() -> Configuration {
        Configuration::normalize(
            &RawSettings::new()
                .with_days(vec!["mon".into(), "tue".into()])
                .with_periods_per_day(4)
                .with_grades(vec![1])
                .with_sections_per_grade(vec![2]),
        )
    }

    struct Fixture {
        grid: ScheduleGrid,
        requirement: Requirement,
        teacher: Teacher,
        subject: Subject,
        classrooms: Vec<Classroom>,
        day_usage: DayUsage,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                grid: ScheduleGrid::initialize(&test_config()),
                requirement: Requirement::new("T1", "math", 1, 1, 3),
                teacher: Teacher::new("T1").with_subject("math"),
                subject: Subject::new("math").with_weekly_hours(3),
                classrooms: Vec::new(),
                day_usage: DayUsage::new(),
            }
        }

        fn ctx(&self, key: SlotKey) -> PlacementContext<'_> {
            PlacementContext {
                grid: &self.grid,
                key,
                requirement: &self.requirement,
                teacher: &self.teacher,
                subject: &self.subject,
                classrooms: &self.classrooms,
                day_usage: &self.day_usage,
            }
        }
    }

    #[test]
    fn test_teacher_conflict_blocks_same_period() {
        let mut f = Fixture::new();
        // T1 teaches section 2 at Monday period 1
        f.grid.occupy(
            SlotKey::new(Day::Monday, 1, 1, 2),
            Placement::new("T1", "math"),
            vec![],
        );

        let busy = SlotKey::new(Day::Monday, 1, 1, 1);
        let free = SlotKey::new(Day::Monday, 2, 1, 1);
        assert!(!TeacherConflict.admits(&f.ctx(busy)));
        assert!(TeacherConflict.admits(&f.ctx(free)));
    }

    #[test]
    fn test_classroom_conflict_needs_free_room() {
        let mut f = Fixture::new();
        f.subject = Subject::new("sci")
            .with_weekly_hours(2)
            .with_special_room(RoomKind::ScienceLab);
        f.classrooms = vec![Classroom::new("lab1", RoomKind::ScienceLab)];

        let key = SlotKey::new(Day::Monday, 1, 1, 1);
        assert!(ClassroomConflict.admits(&f.ctx(key)));

        // lab1 claimed by the other section at the same period
        f.grid.occupy(
            SlotKey::new(Day::Monday, 1, 1, 2),
            Placement::new("T2", "sci").with_classroom("lab1"),
            vec![],
        );
        assert!(!ClassroomConflict.admits(&f.ctx(key)));

        // A later period is fine
        assert!(ClassroomConflict.admits(&f.ctx(SlotKey::new(Day::Monday, 2, 1, 1))));
    }

    #[test]
    fn test_classroom_conflict_ignores_ordinary_subjects() {
        let f = Fixture::new();
        assert!(ClassroomConflict.admits(&f.ctx(SlotKey::new(Day::Monday, 1, 1, 1))));
    }

    #[test]
    fn test_required_window_confines_placement() {
        let mut f = Fixture::new();
        f.teacher = Teacher::new("T1")
            .with_subject("math")
            .with_restriction(Restriction::required(Day::Monday, vec![1, 2]));

        assert!(RequiredWindow.admits(&f.ctx(SlotKey::new(Day::Monday, 1, 1, 1))));
        assert!(RequiredWindow.admits(&f.ctx(SlotKey::new(Day::Monday, 2, 1, 1))));
        assert!(!RequiredWindow.admits(&f.ctx(SlotKey::new(Day::Monday, 3, 1, 1))));
        assert!(!RequiredWindow.admits(&f.ctx(SlotKey::new(Day::Tuesday, 1, 1, 1))));
    }

    #[test]
    fn test_recommended_restriction_never_blocks() {
        let mut f = Fixture::new();
        f.teacher = Teacher::new("T1")
            .with_subject("math")
            .with_restriction(Restriction::recommended(Day::Monday, vec![1]));

        assert!(RequiredWindow.admits(&f.ctx(SlotKey::new(Day::Friday, 4, 1, 1))));
    }

    #[test]
    fn test_consecutive_period_blocks_adjacency() {
        let mut f = Fixture::new();
        f.grid.occupy(
            SlotKey::new(Day::Monday, 2, 1, 1),
            Placement::new("T1", "math"),
            vec![],
        );

        assert!(!ConsecutivePeriod.admits(&f.ctx(SlotKey::new(Day::Monday, 1, 1, 1))));
        assert!(!ConsecutivePeriod.admits(&f.ctx(SlotKey::new(Day::Monday, 3, 1, 1))));
        assert!(ConsecutivePeriod.admits(&f.ctx(SlotKey::new(Day::Monday, 4, 1, 1))));
        // Other section unaffected
        assert!(ConsecutivePeriod.admits(&f.ctx(SlotKey::new(Day::Monday, 1, 1, 2))));
    }

    #[test]
    fn test_day_spread_blocks_second_hour_same_day() {
        let mut f = Fixture::new();
        f.day_usage.record(1, 1, "math", Day::Monday);

        assert!(!DaySpread.admits(&f.ctx(SlotKey::new(Day::Monday, 4, 1, 1))));
        assert!(DaySpread.admits(&f.ctx(SlotKey::new(Day::Tuesday, 1, 1, 1))));
    }

    #[test]
    fn test_day_spread_skips_single_hour_requirements() {
        let mut f = Fixture::new();
        f.requirement = Requirement::new("T1", "math", 1, 1, 1);
        f.day_usage.record(1, 1, "math", Day::Monday);

        assert!(DaySpread.admits(&f.ctx(SlotKey::new(Day::Monday, 4, 1, 1))));
    }

    #[test]
    fn test_constraint_set_partitions_hard_and_soft() {
        let set = ConstraintSet::standard();
        assert_eq!(set.len(), 5);

        let mut f = Fixture::new();
        // Soft violation only: math already on Monday
        f.day_usage.record(1, 1, "math", Day::Monday);
        let key = SlotKey::new(Day::Monday, 4, 1, 1);
        assert!(set.admits_hard(&f.ctx(key)));
        assert!(!set.admits_soft(&f.ctx(key)));
        assert!(!set.admits_all(&f.ctx(key)));
    }

    #[test]
    fn test_empty_set_admits_everything() {
        let set = ConstraintSet::empty();
        let f = Fixture::new();
        assert!(set.admits_all(&f.ctx(SlotKey::new(Day::Monday, 1, 1, 1))));
    }
}
