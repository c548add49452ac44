//! Roster participants and their combat roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::TeamId;

/// Unique identifier of a participant (UUID v4 text for new entries).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Combat role of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ParticipantClass {
    Healer,
    Tank,
    #[serde(rename = "DPS Strategic")]
    DpsStrategic,
    #[serde(rename = "DPS Silkbind")]
    DpsSilkbind,
    #[serde(rename = "DPS Bamboo")]
    DpsBamboo,
    #[serde(rename = "DPS Nameless")]
    DpsNameless,
    #[default]
    #[serde(rename = "DPS Misto")]
    DpsMisto,
}

impl ParticipantClass {
    /// Get the display name for this class.
    pub fn name(&self) -> &'static str {
        match self {
            ParticipantClass::Healer => "Healer",
            ParticipantClass::Tank => "Tank",
            ParticipantClass::DpsStrategic => "DPS Strategic",
            ParticipantClass::DpsSilkbind => "DPS Silkbind",
            ParticipantClass::DpsBamboo => "DPS Bamboo",
            ParticipantClass::DpsNameless => "DPS Nameless",
            ParticipantClass::DpsMisto => "DPS Misto",
        }
    }

    /// Get all classes in roster order.
    pub fn all() -> &'static [ParticipantClass] {
        &[
            ParticipantClass::Healer,
            ParticipantClass::Tank,
            ParticipantClass::DpsStrategic,
            ParticipantClass::DpsSilkbind,
            ParticipantClass::DpsBamboo,
            ParticipantClass::DpsNameless,
            ParticipantClass::DpsMisto,
        ]
    }
}

/// Error returned when a class name is not one of [`ParticipantClass::all`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown class '{0}'")]
pub struct ParseClassError(pub String);

impl FromStr for ParticipantClass {
    type Err = ParseClassError;

    /// Accepts the display name in any case, with `-` or `_` in place of the
    /// space (`dps-strategic`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], " ");
        ParticipantClass::all()
            .iter()
            .copied()
            .find(|class| class.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ParseClassError(s.to_string()))
    }
}

/// A roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub class: ParticipantClass,
    /// Team assignment, `None` while unassigned.
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_leader: Option<bool>,
}

impl Participant {
    /// Build a participant from a draft, assigning a fresh id.
    pub fn from_draft(draft: NewParticipant) -> Self {
        Self {
            id: ParticipantId::generate(),
            name: draft.name,
            class: draft.class,
            team_id: draft.team_id,
            notes: draft.notes,
            is_leader: draft.is_leader,
        }
    }

    /// Whether this participant is flagged as a leader.
    pub fn leads(&self) -> bool {
        self.is_leader.unwrap_or(false)
    }

    /// Short label drawn on participant tokens.
    pub fn token_label(&self) -> String {
        self.name.chars().take(3).collect::<String>().to_uppercase()
    }
}

/// Everything needed to add a participant except its id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParticipant {
    pub name: String,
    #[serde(default)]
    pub class: ParticipantClass,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_leader: Option<bool>,
}

impl NewParticipant {
    pub fn new(name: impl Into<String>, class: ParticipantClass) -> Self {
        Self {
            name: name.into(),
            class,
            ..Default::default()
        }
    }

    pub fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    pub fn leader(mut self) -> Self {
        self.is_leader = Some(true);
        self
    }
}

/// Field changes for [`Participant`]. `None` leaves a field untouched;
/// the nested options clear the field when set to `Some(None)`.
///
/// In JSON an absent key leaves the field alone and an explicit `null`
/// clears it: `{"teamId": null}` unassigns.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantPatch {
    pub name: Option<String>,
    pub class: Option<ParticipantClass>,
    #[serde(deserialize_with = "present")]
    pub team_id: Option<Option<TeamId>>,
    #[serde(deserialize_with = "present")]
    pub notes: Option<Option<String>>,
    pub is_leader: Option<bool>,
}

/// Wrap any value that is present, `null` included, in `Some`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ParticipantPatch {
    /// Patch that only moves the participant to a team (or unassigns it).
    pub fn assign(team_id: Option<TeamId>) -> Self {
        Self {
            team_id: Some(team_id),
            ..Default::default()
        }
    }

    pub(crate) fn apply(self, participant: &mut Participant) {
        if let Some(name) = self.name {
            participant.name = name;
        }
        if let Some(class) = self.class {
            participant.class = class;
        }
        if let Some(team_id) = self.team_id {
            participant.team_id = team_id;
        }
        if let Some(notes) = self.notes {
            participant.notes = notes;
        }
        if let Some(is_leader) = self.is_leader {
            participant.is_leader = Some(is_leader);
        }
    }
}
