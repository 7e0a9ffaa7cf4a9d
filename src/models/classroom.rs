//! Classroom model.
//!
//! Rooms matter to the engine only through their kind: a subject that
//! requires a special room competes for the rooms of that kind.

use serde::{Deserialize, Serialize};

/// Room classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomKind {
    /// Ordinary homeroom.
    Standard,
    ScienceLab,
    Music,
    Art,
    Gym,
    Computer,
    /// Domain-specific kind.
    Custom(String),
}

/// A physical room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classroom {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Room classification.
    pub kind: RoomKind,
}

impl Classroom {
    /// Creates a new room of the given kind.
    pub fn new(id: impl Into<String>, kind: RoomKind) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            kind,
        }
    }

    /// Creates a standard homeroom.
    pub fn standard(id: impl Into<String>) -> Self {
        Self::new(id, RoomKind::Standard)
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classroom_builder() {
        let room = Classroom::new("lab1", RoomKind::ScienceLab).with_name("Science Lab 1");
        assert_eq!(room.id, "lab1");
        assert_eq!(room.kind, RoomKind::ScienceLab);
        assert_eq!(room.name, "Science Lab 1");
    }

    #[test]
    fn test_custom_kind() {
        let room = Classroom::new("pool", RoomKind::Custom("pool".into()));
        assert_eq!(room.kind, RoomKind::Custom("pool".into()));
        assert_ne!(room.kind, RoomKind::Gym);
    }
}
