//! Restart-based optimization across full attempts.
//!
//! Each attempt rebuilds the grid and catalog from scratch, runs both
//! placement phases, and is scored by the validator. Attempts share no
//! mutable state; only the difficulty ranking is computed once. The
//! best attempt by (violation count ascending, quality score
//! descending) wins; a clean attempt returns immediately.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::debug;

use crate::constraints::ConstraintSet;
use crate::engine::difficulty::DifficultyAnalyzer;
use crate::engine::phase1::Phase1Assigner;
use crate::engine::phase2::ForceAssigner;
use crate::models::{
    Classroom, Configuration, RequirementCatalog, ScheduleGrid, SlotKey, Subject, Teacher,
};
use crate::validation::ValidationReport;

/// Progression of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStage {
    Init,
    GridReady,
    Phase1,
    Phase2,
    Scored,
}

/// One full run's outcome.
#[derive(Debug, Clone)]
pub struct AttemptResult {
    /// The completed grid.
    pub grid: ScheduleGrid,
    /// Post-hoc analysis of the grid.
    pub report: ValidationReport,
    /// Slots no requirement could fill.
    pub unfillable: Vec<SlotKey>,
    /// Occupied slots at the end of the attempt.
    pub filled_count: usize,
    /// 1-based attempt number.
    pub attempt_number: usize,
}

impl AttemptResult {
    /// Number of violations the validator found.
    #[inline]
    pub fn violation_count(&self) -> usize {
        self.report.violations.len()
    }

    /// Overall quality score in [0, 100].
    #[inline]
    pub fn quality_score(&self) -> f64 {
        self.report.score
    }

    /// Comparator: fewer violations first, higher score on ties.
    pub fn is_better_than(&self, other: &AttemptResult) -> bool {
        match self.violation_count().cmp(&other.violation_count()) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => self.quality_score() > other.quality_score(),
        }
    }
}

/// What the optimizer settled on.
#[derive(Debug)]
pub struct OptimizerOutcome {
    /// The winning attempt.
    pub best: AttemptResult,
    /// Attempts actually executed.
    pub attempts_used: usize,
}

/// Runs the full pipeline repeatedly and keeps the best attempt.
pub struct RetryOptimizer<'a> {
    config: &'a Configuration,
    teachers: &'a [Teacher],
    subjects: &'a [Subject],
    classrooms: &'a [Classroom],
    constraints: &'a ConstraintSet,
    max_attempts: usize,
    tolerant: bool,
    time_limit: Option<Duration>,
}

impl<'a> RetryOptimizer<'a> {
    /// Creates an optimizer over the given inputs.
    pub fn new(
        config: &'a Configuration,
        teachers: &'a [Teacher],
        subjects: &'a [Subject],
        classrooms: &'a [Classroom],
        constraints: &'a ConstraintSet,
    ) -> Self {
        Self {
            config,
            teachers,
            subjects,
            classrooms,
            constraints,
            max_attempts: 5,
            tolerant: false,
            time_limit: None,
        }
    }

    /// Sets the attempt bound (floor 1).
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Enables tolerant mode: soft rules become advisory and the first
    /// attempt without critical violations is accepted.
    pub fn with_tolerant(mut self, tolerant: bool) -> Self {
        self.tolerant = tolerant;
        self
    }

    /// Sets a wall-clock budget, checked between attempts only.
    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    /// Runs up to the attempt bound and returns the best result.
    pub fn run<R: Rng>(&self, rng: &mut R) -> OptimizerOutcome {
        let started = Instant::now();
        let ranking = DifficultyAnalyzer::rank(self.teachers, self.subjects, self.config);

        let mut best: Option<AttemptResult> = None;
        let mut attempts_used = 0;

        for attempt in 1..=self.max_attempts {
            if best.is_some() {
                if let Some(limit) = self.time_limit {
                    if started.elapsed() >= limit {
                        debug!(attempt, "time limit reached between attempts");
                        break;
                    }
                }
            }

            attempts_used = attempt;
            let result = self.run_attempt(attempt, &ranking, rng);
            let acceptable = if self.tolerant {
                !result.report.has_critical()
            } else {
                result.violation_count() == 0
            };

            if best
                .as_ref()
                .map_or(true, |current| result.is_better_than(current))
            {
                best = Some(result);
            }

            if acceptable {
                break;
            }
        }

        let best = best.expect("at least one attempt runs");
        debug!(
            winner = best.attempt_number,
            violations = best.violation_count(),
            score = best.quality_score(),
            attempts_used,
            "optimizer finished"
        );

        OptimizerOutcome {
            best,
            attempts_used,
        }
    }

    fn run_attempt<R: Rng>(
        &self,
        attempt_number: usize,
        ranking: &[usize],
        rng: &mut R,
    ) -> AttemptResult {
        let mut stage = AttemptStage::Init;
        debug!(attempt = attempt_number, stage = ?stage, "attempt started");

        let mut grid = ScheduleGrid::initialize(self.config);
        let mut requirements =
            RequirementCatalog::build(self.teachers, self.subjects, self.config);
        stage = AttemptStage::GridReady;
        debug!(
            attempt = attempt_number,
            stage = ?stage,
            slots = grid.len(),
            requirements = requirements.len(),
        );

        let phase1 = Phase1Assigner::new(
            self.teachers,
            self.subjects,
            self.classrooms,
            self.constraints,
        )
        .with_soft_rules(!self.tolerant)
        .run(&mut grid, &mut requirements, ranking, rng);
        stage = AttemptStage::Phase1;
        debug!(
            attempt = attempt_number,
            stage = ?stage,
            placed = phase1.placed_hours,
            backlogged = phase1.backlog.len(),
        );

        let phase2 = ForceAssigner::run(&mut grid, &mut requirements, &phase1.backlog, rng);
        stage = AttemptStage::Phase2;
        debug!(
            attempt = attempt_number,
            stage = ?stage,
            forced = phase2.forced_fills + phase2.forced_overwrites,
            swept = phase2.sweep_fills,
        );

        let report = ValidationReport::analyze(
            &grid,
            self.teachers,
            self.subjects,
            &requirements,
            self.config,
        );
        stage = AttemptStage::Scored;
        debug!(
            attempt = attempt_number,
            stage = ?stage,
            violations = report.violations.len(),
            score = report.score,
        );

        let filled_count = grid.occupied_count();
        AttemptResult {
            grid,
            report,
            unfillable: phase2.unfillable,
            filled_count,
            attempt_number,
        }
    }
}
