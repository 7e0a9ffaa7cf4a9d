//! Fatal input errors.
//!
//! Only missing input categories abort generation. Ordinary scheduling
//! conflicts never surface here: constraint failures defer to the forced
//! phase, forced placements become tagged violations, and exhausted
//! retries return the best attempt found.

use thiserror::Error;

/// A fatal precondition failure. No grid is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The request carried no teachers.
    #[error("no teachers provided: at least one teacher is required")]
    NoTeachers,
    /// The request carried no subjects.
    #[error("no subjects provided: at least one subject is required")]
    NoSubjects,
}
