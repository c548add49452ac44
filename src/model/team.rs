//! Team data model.

use serde::{Deserialize, Serialize};

use super::Color;

/// Identifier of a team. Small integers starting at 1.
pub type TeamId = u32;

/// A team with a display name and color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier for the team
    pub id: TeamId,
    /// Display name of the team
    pub name: String,
    /// Color used for team tokens and member tokens
    pub color: Color,
}

impl Team {
    /// Create a new team with the given ID, name, and color.
    pub fn new(id: TeamId, name: &str, color: Color) -> Self {
        Self {
            id,
            name: name.to_string(),
            color,
        }
    }

    /// Short label drawn on team tokens: the first word of the name.
    pub fn short_label(&self) -> &str {
        self.name.split(' ').next().unwrap_or_default()
    }
}

/// Field changes for [`Team`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TeamPatch {
    pub name: Option<String>,
    pub color: Option<Color>,
}

impl TeamPatch {
    pub(crate) fn apply(self, team: &mut Team) {
        if let Some(name) = self.name {
            team.name = name;
        }
        if let Some(color) = self.color {
            team.color = color;
        }
    }
}

/// The six teams every new plan starts with.
pub fn default_teams() -> Vec<Team> {
    vec![
        Team::new(1, "Team 1 — Vanguard", Color::rgb(0xef, 0x44, 0x44)),
        Team::new(2, "Team 2 — Phoenix", Color::rgb(0xf5, 0x9e, 0x0b)),
        Team::new(3, "Team 3 — Dragon", Color::rgb(0x10, 0xb9, 0x81)),
        Team::new(4, "Team 4 — Tiger", Color::rgb(0x3b, 0x82, 0xf6)),
        Team::new(5, "Team 5 — Crane", Color::rgb(0x8b, 0x5c, 0xf6)),
        Team::new(6, "Team 6 — Serpent", Color::rgb(0xec, 0x48, 0x99)),
    ]
}
