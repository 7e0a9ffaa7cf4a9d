//! Post-hoc schedule analysis and roster integrity audit.
//!
//! The analysis scans a finished grid for violations (double-bookings,
//! capability mismatches, forced placements), computes quality metrics,
//! scores the attempt on a 0–100 scale, and derives advisory improvement
//! suggestions. The roster audit checks input integrity before
//! generation; its findings never block anything.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{
    Classroom, Configuration, Requirement, ScheduleGrid, SlotKey, SlotTag, Subject, Teacher,
};

/// Violation severity, in decreasing order of score penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Breaks a hard scheduling rule (e.g. double-booking).
    Critical,
    /// Wrong but workable (e.g. capability mismatch).
    Major,
    /// A recorded trade-off (e.g. forced placement).
    Minor,
}

impl Severity {
    /// Score penalty for one violation of this severity.
    pub fn penalty(&self) -> f64 {
        match self {
            Severity::Critical => 15.0,
            Severity::Major => 8.0,
            Severity::Minor => 3.0,
        }
    }
}

/// Classification of schedule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Teacher occupies two slots at the same day+period.
    DoubleBooking,
    /// Slot's teacher cannot teach the slot's subject.
    CapabilityMismatch,
    /// Slot was filled while ignoring constraints.
    ForcedPlacement,
    /// Slot was overwritten while ignoring constraints.
    ForcedOverwrite,
}

/// One detected violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// What went wrong.
    pub kind: ViolationKind,
    /// How bad it is.
    pub severity: Severity,
    /// Affected slot, when the violation is slot-local.
    pub slot: Option<SlotKey>,
    /// Affected teacher.
    pub teacher_id: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    /// Creates a double-booking violation.
    pub fn double_booking(teacher_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::DoubleBooking,
            severity: Severity::Critical,
            slot: None,
            teacher_id: Some(teacher_id.into()),
            message: message.into(),
        }
    }

    /// Creates a capability-mismatch violation.
    pub fn capability_mismatch(
        slot: SlotKey,
        teacher_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: ViolationKind::CapabilityMismatch,
            severity: Severity::Major,
            slot: Some(slot),
            teacher_id: Some(teacher_id.into()),
            message: message.into(),
        }
    }

    /// Creates a forced-placement violation.
    pub fn forced(slot: SlotKey, overwrite: bool, message: impl Into<String>) -> Self {
        Self {
            kind: if overwrite {
                ViolationKind::ForcedOverwrite
            } else {
                ViolationKind::ForcedPlacement
            },
            severity: Severity::Minor,
            slot: Some(slot),
            teacher_id: None,
            message: message.into(),
        }
    }
}

/// A requirement that kept a positive deficit after both phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmetRequirement {
    pub teacher_id: String,
    pub subject_id: String,
    pub grade: u8,
    pub section: u8,
    /// Hours that could not be placed.
    pub missing_hours: u8,
}

/// Quality metrics of a finished grid. All rates in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// Occupied slots over total slots.
    pub completion_rate: f64,
    /// Mean teaching-hour share of the weekly slot count, per teacher.
    pub teacher_utilization: f64,
    /// 1 − normalized std-dev of per-subject hour counts, in [0, 1].
    pub subject_balance: f64,
    /// 1 − normalized std-dev of per-teacher hour counts, in [0, 1].
    pub load_balance: f64,
}

/// Full post-hoc analysis of one attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Everything wrong with the grid.
    pub violations: Vec<Violation>,
    /// Quality metrics.
    pub quality: QualityReport,
    /// Requirements with hours still missing.
    pub unmet_requirements: Vec<UnmetRequirement>,
    /// Advisory improvement suggestions.
    pub suggestions: Vec<String>,
    /// Overall score in [0, 100].
    pub score: f64,
}

impl ValidationReport {
    /// Analyzes a finished grid.
    ///
    /// Scans for double-bookings (critical; Phase 2 can introduce them
    /// intentionally), capability mismatches (major), and forced tags
    /// (minor), then computes quality metrics and the overall score:
    /// 100 minus weighted violation penalties and the load-balance
    /// deficit, clamped to [0, 100].
    pub fn analyze(
        grid: &ScheduleGrid,
        teachers: &[Teacher],
        subjects: &[Subject],
        requirements: &[Requirement],
        config: &Configuration,
    ) -> Self {
        let mut violations = Vec::new();

        scan_double_bookings(grid, &mut violations);
        scan_capability_mismatches(grid, teachers, &mut violations);
        scan_forced_tags(grid, &mut violations);

        let quality = compute_quality(grid, teachers, subjects, config);

        let unmet_requirements: Vec<UnmetRequirement> = requirements
            .iter()
            .filter(|r| r.deficit() > 0)
            .map(|r| UnmetRequirement {
                teacher_id: r.teacher_id.clone(),
                subject_id: r.subject_id.clone(),
                grade: r.grade,
                section: r.section,
                missing_hours: r.deficit(),
            })
            .collect();

        let penalty: f64 = violations.iter().map(|v| v.severity.penalty()).sum();
        let balance_deficit = (1.0 - quality.load_balance) * 10.0;
        let score = (100.0 - penalty - balance_deficit).clamp(0.0, 100.0);

        let suggestions = derive_suggestions(&violations, &unmet_requirements, &quality);

        Self {
            violations,
            quality,
            unmet_requirements,
            suggestions,
            score,
        }
    }

    /// Whether any violation is `Critical`.
    pub fn has_critical(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Critical)
    }
}

fn scan_double_bookings(grid: &ScheduleGrid, violations: &mut Vec<Violation>) {
    let mut seen: HashMap<(&str, crate::models::Day, u8), u32> = HashMap::new();
    for slot in grid.slots() {
        if let Some(placement) = &slot.placement {
            *seen
                .entry((placement.teacher_id.as_str(), slot.key.day, slot.key.period))
                .or_insert(0) += 1;
        }
    }
    let mut booked: Vec<_> = seen
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .collect();
    booked.sort_by(|a, b| a.0.cmp(&b.0));
    for ((teacher_id, day, period), count) in booked {
        violations.push(Violation::double_booking(
            teacher_id,
            format!(
                "teacher '{}' booked {} times at {} period {}",
                teacher_id,
                count,
                day.as_str(),
                period
            ),
        ));
    }
}

fn scan_capability_mismatches(
    grid: &ScheduleGrid,
    teachers: &[Teacher],
    violations: &mut Vec<Violation>,
) {
    for slot in grid.slots() {
        let Some(placement) = &slot.placement else {
            continue;
        };
        let capable = teachers
            .iter()
            .find(|t| t.id == placement.teacher_id)
            .is_some_and(|t| t.can_teach(&placement.subject_id));
        if !capable {
            violations.push(Violation::capability_mismatch(
                slot.key,
                &placement.teacher_id,
                format!(
                    "teacher '{}' cannot teach subject '{}'",
                    placement.teacher_id, placement.subject_id
                ),
            ));
        }
    }
}

fn scan_forced_tags(grid: &ScheduleGrid, violations: &mut Vec<Violation>) {
    for slot in grid.slots() {
        for tag in &slot.tags {
            let overwrite = *tag == SlotTag::ForcedOverwrite;
            violations.push(Violation::forced(
                slot.key,
                overwrite,
                format!(
                    "slot {} period {} (grade {} section {}) was {}",
                    slot.key.day.as_str(),
                    slot.key.period,
                    slot.key.grade,
                    slot.key.section,
                    if overwrite {
                        "forcibly overwritten"
                    } else {
                        "force-filled"
                    }
                ),
            ));
        }
    }
}

fn compute_quality(
    grid: &ScheduleGrid,
    teachers: &[Teacher],
    subjects: &[Subject],
    config: &Configuration,
) -> QualityReport {
    let total = grid.len();
    let completion_rate = if total == 0 {
        100.0
    } else {
        grid.occupied_count() as f64 / total as f64 * 100.0
    };

    let mut teacher_hours: HashMap<&str, u32> = HashMap::new();
    let mut subject_hours: HashMap<&str, u32> = HashMap::new();
    for slot in grid.slots() {
        if let Some(placement) = &slot.placement {
            *teacher_hours.entry(placement.teacher_id.as_str()).or_insert(0) += 1;
            *subject_hours.entry(placement.subject_id.as_str()).or_insert(0) += 1;
        }
    }

    let weekly = config.weekly_periods().max(1) as f64;
    let teacher_utilization = if teachers.is_empty() {
        0.0
    } else {
        teachers
            .iter()
            .map(|t| {
                let hours = teacher_hours.get(t.id.as_str()).copied().unwrap_or(0) as f64;
                (hours / weekly).min(1.0)
            })
            .sum::<f64>()
            / teachers.len() as f64
            * 100.0
    };

    let subject_counts: Vec<f64> = subjects
        .iter()
        .map(|s| subject_hours.get(s.id.as_str()).copied().unwrap_or(0) as f64)
        .collect();
    let teacher_counts: Vec<f64> = teachers
        .iter()
        .map(|t| teacher_hours.get(t.id.as_str()).copied().unwrap_or(0) as f64)
        .collect();

    QualityReport {
        completion_rate,
        teacher_utilization,
        subject_balance: balance_score(&subject_counts),
        load_balance: balance_score(&teacher_counts),
    }
}

/// 1 − coefficient of variation, clamped to [0, 1].
///
/// 1.0 means perfectly even counts; 0.0 means spread at least as wide
/// as the mean. Degenerate inputs (≤1 count, all zero) score 1.0.
fn balance_score(counts: &[f64]) -> f64 {
    if counts.len() <= 1 {
        return 1.0;
    }
    let mean = counts.iter().sum::<f64>() / counts.len() as f64;
    if mean == 0.0 {
        return 1.0;
    }
    let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;
    let cv = variance.sqrt() / mean;
    (1.0 - cv).clamp(0.0, 1.0)
}

fn derive_suggestions(
    violations: &[Violation],
    unmet: &[UnmetRequirement],
    quality: &QualityReport,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    let forced = violations
        .iter()
        .filter(|v| {
            matches!(
                v.kind,
                ViolationKind::ForcedPlacement | ViolationKind::ForcedOverwrite
            )
        })
        .count();
    if forced > 0 {
        suggestions.push(format!(
            "{forced} placement(s) ignored constraints; add teachers or rooms, or reduce weekly hours"
        ));
    }

    if violations
        .iter()
        .any(|v| v.kind == ViolationKind::DoubleBooking)
    {
        suggestions.push(
            "teachers are double-booked; add staff for the affected periods or relax restrictions"
                .to_string(),
        );
    }

    let missing: u32 = unmet.iter().map(|u| u.missing_hours as u32).sum();
    if missing > 0 {
        suggestions.push(format!(
            "{missing} required hour(s) could not be placed; revisit weekly hour totals"
        ));
    }

    if quality.load_balance < 0.7 {
        suggestions
            .push("teaching load is uneven; rebalance subject assignments across teachers".to_string());
    }
    if quality.subject_balance < 0.7 {
        suggestions
            .push("subject hours are uneven across the week; review per-subject weekly hours".to_string());
    }

    suggestions
}

/// Categories of roster integrity findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RosterIssueKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A teacher references a subject that doesn't exist.
    UnknownSubjectReference,
    /// A teacher has no teachable subjects.
    NoTeachableSubjects,
    /// A subject requires a special room no classroom provides.
    MissingSpecialRoom,
}

/// A non-fatal roster integrity finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterIssue {
    /// Finding category.
    pub kind: RosterIssueKind,
    /// Human-readable description.
    pub message: String,
}

impl RosterIssue {
    fn new(kind: RosterIssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Checks roster integrity before generation.
///
/// Findings are advisory: generation proceeds regardless, with the
/// affected references simply contributing nothing. Detects duplicate
/// IDs, dangling subject references, teachers with nothing to teach,
/// and special-room subjects without a matching room.
pub fn audit_roster(
    teachers: &[Teacher],
    subjects: &[Subject],
    classrooms: &[Classroom],
) -> Vec<RosterIssue> {
    let mut issues = Vec::new();

    let mut teacher_ids = std::collections::HashSet::new();
    for t in teachers {
        if !teacher_ids.insert(t.id.as_str()) {
            issues.push(RosterIssue::new(
                RosterIssueKind::DuplicateId,
                format!("duplicate teacher ID: {}", t.id),
            ));
        }
        if t.teachable_subject_ids.is_empty() {
            issues.push(RosterIssue::new(
                RosterIssueKind::NoTeachableSubjects,
                format!("teacher '{}' has no teachable subjects", t.id),
            ));
        }
    }

    let mut subject_ids = std::collections::HashSet::new();
    for s in subjects {
        if !subject_ids.insert(s.id.as_str()) {
            issues.push(RosterIssue::new(
                RosterIssueKind::DuplicateId,
                format!("duplicate subject ID: {}", s.id),
            ));
        }
    }

    let mut room_ids = std::collections::HashSet::new();
    for c in classrooms {
        if !room_ids.insert(c.id.as_str()) {
            issues.push(RosterIssue::new(
                RosterIssueKind::DuplicateId,
                format!("duplicate classroom ID: {}", c.id),
            ));
        }
    }

    for t in teachers {
        for subject_id in &t.teachable_subject_ids {
            if !subject_ids.contains(subject_id.as_str()) {
                issues.push(RosterIssue::new(
                    RosterIssueKind::UnknownSubjectReference,
                    format!("teacher '{}' references unknown subject '{}'", t.id, subject_id),
                ));
            }
        }
    }

    for s in subjects {
        if s.requires_special_room {
            let kind = s.room_type.clone();
            let available = classrooms
                .iter()
                .any(|c| Some(&c.kind) == kind.as_ref());
            if !available {
                issues.push(RosterIssue::new(
                    RosterIssueKind::MissingSpecialRoom,
                    format!("subject '{}' requires a special room but no classroom provides it", s.id),
                ));
            }
        }
    }

    issues
}
