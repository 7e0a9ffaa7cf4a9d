//! Timetable domain models.
//!
//! Core data types for the engine: the canonical school layout, the
//! caller-supplied roster (teachers, subjects, classrooms), the weekly
//! slot grid, and the derived placement obligations.
//!
//! Roster types are read-only to the engine. Mutable state lives in
//! `ScheduleGrid` slots and `Requirement` counters, both rebuilt fresh
//! for every attempt.

mod classroom;
mod config;
mod grid;
mod requirement;
mod subject;
mod teacher;

pub use classroom::{Classroom, RoomKind};
pub use config::{
    Configuration, Day, RawSettings, DEFAULT_GRADES, DEFAULT_PERIODS_PER_DAY, DEFAULT_SECTIONS,
};
pub use grid::{Placement, ScheduleGrid, Slot, SlotKey, SlotTag};
pub use requirement::{Requirement, RequirementCatalog};
pub use subject::Subject;
pub use teacher::{Restriction, RestrictionLevel, Teacher};
