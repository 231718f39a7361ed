//! Machine model.
//!
//! Machines are identical processors: any task runs on any machine
//! with the same duration. A machine carries identity only.

use serde::{Deserialize, Serialize};

/// An identical parallel machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Machine {
    /// Unique positive machine identifier.
    pub id: u32,
    /// Human-readable name.
    pub name: String,
}

impl Machine {
    /// Creates a new machine.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Creates `count` machines with ids `1..=count`, named `Machine #<id>`.
    pub fn numbered(count: u32) -> Vec<Self> {
        (1..=count)
            .map(|id| Self::new(id, format!("Machine #{id}")))
            .collect()
    }
}
