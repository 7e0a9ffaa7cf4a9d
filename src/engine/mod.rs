//! The timetable engine: pipeline wiring and public entry point.
//!
//! # Pipeline
//!
//! 1. Normalize raw settings into the canonical configuration.
//! 2. Audit the roster (non-fatal findings).
//! 3. Rank teachers by placement difficulty.
//! 4. Per attempt: fresh grid + catalog → Phase 1 (constrained random
//!    placement) → Phase 2 (forced completion) → validation score.
//! 5. Keep the best attempt by (violations, quality score).
//!
//! # Submodules
//!
//! - `difficulty`: teacher scarcity ranking
//! - `phase1`: constraint-respecting assigner
//! - `phase2`: forced completion
//! - `retry`: restart loop and attempt comparison

mod difficulty;
mod phase1;
mod phase2;
mod retry;

pub use difficulty::DifficultyAnalyzer;
pub use phase1::{BacklogEntry, Phase1Assigner, Phase1Outcome};
pub use phase2::{ForceAssigner, Phase2Outcome};
pub use retry::{AttemptResult, AttemptStage, OptimizerOutcome, RetryOptimizer};

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constraints::ConstraintSet;
use crate::error::EngineError;
use crate::models::{
    Classroom, Configuration, RawSettings, ScheduleGrid, SlotKey, Subject, Teacher,
};
use crate::validation::{
    audit_roster, RosterIssue, UnmetRequirement, Violation,
};

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Attempt bound for the retry optimizer.
    pub max_attempts: usize,
    /// Tolerant mode: soft rules become advisory; the first attempt
    /// without critical violations is accepted.
    pub tolerant: bool,
    /// RNG seed. `None` seeds from the operating system.
    pub seed: Option<u64>,
    /// Wall-clock budget, checked between attempts.
    pub time_limit: Option<Duration>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            tolerant: false,
            seed: None,
            time_limit: None,
        }
    }
}

impl EngineOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attempt bound.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Enables tolerant mode.
    pub fn with_tolerant(mut self, tolerant: bool) -> Self {
        self.tolerant = tolerant;
        self
    }

    /// Fixes the RNG seed for reproducible output.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// Everything the caller supplies for one generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimetableRequest {
    /// Raw school settings; defaults apply to whatever is missing.
    pub settings: RawSettings,
    /// Staff roster.
    pub teachers: Vec<Teacher>,
    /// Course list.
    pub subjects: Vec<Subject>,
    /// Available rooms.
    pub classrooms: Vec<Classroom>,
}

impl TimetableRequest {
    /// Creates a request from the two mandatory inputs.
    pub fn new(teachers: Vec<Teacher>, subjects: Vec<Subject>) -> Self {
        Self {
            settings: RawSettings::default(),
            teachers,
            subjects,
            classrooms: Vec::new(),
        }
    }

    /// Sets the raw settings.
    pub fn with_settings(mut self, settings: RawSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the room list.
    pub fn with_classrooms(mut self, classrooms: Vec<Classroom>) -> Self {
        self.classrooms = classrooms;
        self
    }
}

/// Aggregate numbers for the winning attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    /// Slots in the grid.
    pub total_slots: usize,
    /// Occupied slots.
    pub filled_slots: usize,
    /// Violations found by the validator.
    pub violation_count: usize,
    /// Attempts the optimizer executed.
    pub retry_attempts_used: usize,
    /// Overall score in [0, 100].
    pub quality_score: f64,
}

/// Everything the caller may want to inspect or surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Violations on the winning grid.
    pub violations: Vec<Violation>,
    /// Requirements with hours still missing.
    pub unmet_requirements: Vec<UnmetRequirement>,
    /// Advisory improvement suggestions.
    pub suggestions: Vec<String>,
    /// Non-fatal roster integrity findings.
    pub roster_issues: Vec<RosterIssue>,
    /// Slots no requirement could fill: a data-completeness problem
    /// the caller must handle.
    pub unfillable_slots: Vec<SlotKey>,
}

/// The engine's result: the grid plus its paper trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableOutcome {
    /// The completed grid, flattened in grid order.
    pub grid: ScheduleGrid,
    /// Aggregate numbers.
    pub statistics: Statistics,
    /// Violations, unmet hours, suggestions, roster findings.
    pub diagnostics: Diagnostics,
}

/// The public entry point.
///
/// # Example
///
/// ```
/// use classgrid::engine::{EngineOptions, TimetableEngine, TimetableRequest};
/// use classgrid::models::{Subject, Teacher};
///
/// let request = TimetableRequest::new(
///     vec![Teacher::new("T1").with_subject("math")],
///     vec![Subject::new("math").with_weekly_hours(4)],
/// );
/// let engine = TimetableEngine::new()
///     .with_options(EngineOptions::new().with_seed(42).with_max_attempts(3));
/// let outcome = engine.generate(&request).unwrap();
/// assert_eq!(outcome.statistics.filled_slots, outcome.statistics.total_slots);
/// ```
pub struct TimetableEngine {
    constraints: ConstraintSet,
    options: EngineOptions,
}

impl TimetableEngine {
    /// Creates an engine with the standard constraint set and default
    /// options.
    pub fn new() -> Self {
        Self {
            constraints: ConstraintSet::standard(),
            options: EngineOptions::default(),
        }
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the constraint set.
    pub fn with_constraints(mut self, constraints: ConstraintSet) -> Self {
        self.constraints = constraints;
        self
    }

    /// Generates a timetable using the engine's own seeded generator.
    pub fn generate(&self, request: &TimetableRequest) -> Result<TimetableOutcome, EngineError> {
        let mut rng = match self.options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        self.generate_with(request, &mut rng)
    }

    /// Generates a timetable with a caller-supplied generator.
    ///
    /// Fixed generator state and identical inputs reproduce the grid
    /// exactly.
    pub fn generate_with<R: Rng>(
        &self,
        request: &TimetableRequest,
        rng: &mut R,
    ) -> Result<TimetableOutcome, EngineError> {
        if request.teachers.is_empty() {
            return Err(EngineError::NoTeachers);
        }
        if request.subjects.is_empty() {
            return Err(EngineError::NoSubjects);
        }

        let config = Configuration::normalize(&request.settings);
        let roster_issues = audit_roster(&request.teachers, &request.subjects, &request.classrooms);
        for issue in &roster_issues {
            warn!(finding = %issue.message, "roster audit");
        }

        let optimizer = RetryOptimizer::new(
            &config,
            &request.teachers,
            &request.subjects,
            &request.classrooms,
            &self.constraints,
        )
        .with_max_attempts(self.options.max_attempts)
        .with_tolerant(self.options.tolerant)
        .with_time_limit(self.options.time_limit);

        let outcome = optimizer.run(rng);
        let attempts_used = outcome.attempts_used;
        let AttemptResult {
            grid,
            report,
            unfillable,
            filled_count,
            attempt_number: _,
        } = outcome.best;

        info!(
            filled = filled_count,
            total = grid.len(),
            violations = report.violations.len(),
            score = report.score,
            attempts = attempts_used,
            "timetable generated"
        );

        Ok(TimetableOutcome {
            statistics: Statistics {
                total_slots: grid.len(),
                filled_slots: filled_count,
                violation_count: report.violations.len(),
                retry_attempts_used: attempts_used,
                quality_score: report.score,
            },
            diagnostics: Diagnostics {
                violations: report.violations,
                unmet_requirements: report.unmet_requirements,
                suggestions: report.suggestions,
                roster_issues,
                unfillable_slots: unfillable,
            },
            grid,
        })
    }
}

impl Default for TimetableEngine {
    fn default() -> Self {
        Self::new()
    }
}
