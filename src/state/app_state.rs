//! The application state tree: the unit of undo snapshots and of
//! import/export.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CANVAS_SIZE, MAX_PARTICIPANTS, STATE_VERSION, STATE_VERSION_MAJOR};
use crate::error::{PlannerError, Result};
use crate::model::{
    Annotation, AnnotationId, AnnotationKind, Participant, ParticipantId, Team, TeamId,
    default_teams,
};
use crate::viewport::Viewport;

/// Background image of the map, embedded as a data URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapBackground {
    /// Original file name of the upload
    pub name: String,
    /// `data:` URL holding the encoded image
    pub url: String,
    /// Pixel width, also the canvas width in map units
    pub width: u32,
    /// Pixel height, also the canvas height in map units
    pub height: u32,
}

/// Map section of the state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    #[serde(default)]
    pub background_image: Option<MapBackground>,
    #[serde(default)]
    pub viewport: Viewport,
    /// Annotations in paint order (last is topmost).
    #[serde(rename = "elements", default)]
    pub annotations: Vec<Annotation>,
}

/// Complete application state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Snapshot format version.
    pub version: String,
    /// Time the snapshot was last persisted.
    pub last_updated: DateTime<Utc>,
    pub teams: Vec<Team>,
    #[serde(rename = "players")]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub strategy_notes: String,
    pub map: MapData,
}

impl AppState {
    /// Default state: the six seeded teams, an empty roster and an empty map.
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION.to_string(),
            last_updated: Utc::now(),
            teams: default_teams(),
            participants: Vec::new(),
            strategy_notes: String::new(),
            map: MapData::default(),
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize to compact JSON (used for persistence).
    pub fn to_json_compact(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let state: Self = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }

    /// Check structural invariants that the JSON shape alone cannot express.
    pub fn validate(&self) -> Result<()> {
        check_version(&self.version)?;

        if self.participants.len() > MAX_PARTICIPANTS {
            return Err(PlannerError::invalid_snapshot(format!(
                "{} players exceed the maximum of {}",
                self.participants.len(),
                MAX_PARTICIPANTS
            )));
        }

        let mut team_ids = HashSet::new();
        for team in &self.teams {
            if !team_ids.insert(team.id) {
                return Err(PlannerError::invalid_snapshot(format!(
                    "duplicate team id {}",
                    team.id
                )));
            }
        }

        let mut participant_ids = HashSet::new();
        for participant in &self.participants {
            if !participant_ids.insert(&participant.id) {
                return Err(PlannerError::invalid_snapshot(format!(
                    "duplicate player id {}",
                    participant.id
                )));
            }
        }

        let mut annotation_ids = HashSet::new();
        for ann in &self.map.annotations {
            if !annotation_ids.insert(&ann.id) {
                return Err(PlannerError::invalid_snapshot(format!(
                    "duplicate element id {}",
                    ann.id
                )));
            }
        }

        self.check_geometry()
    }

    /// Check that every coordinate is finite, area opacities lie in 0..1 and
    /// the viewport is in range. A state that fails this cannot be written
    /// and read back.
    pub fn check_geometry(&self) -> Result<()> {
        for ann in &self.map.annotations {
            if !ann.is_finite() {
                return Err(PlannerError::invalid_snapshot(format!(
                    "element {} has non-finite geometry",
                    ann.id
                )));
            }
            if let AnnotationKind::Area { opacity, .. } = ann.kind {
                if !(0.0..=1.0).contains(&opacity) {
                    return Err(PlannerError::invalid_snapshot(format!(
                        "element {} has opacity {} outside 0..1",
                        ann.id, opacity
                    )));
                }
            }
        }

        if !self.map.viewport.is_valid() {
            return Err(PlannerError::invalid_snapshot(format!(
                "viewport ({}, {}, {}) is out of range",
                self.map.viewport.zoom, self.map.viewport.pan_x, self.map.viewport.pan_y
            )));
        }

        Ok(())
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn annotation(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.map.annotations.iter().find(|a| &a.id == id)
    }

    pub fn annotation_mut(&mut self, id: &AnnotationId) -> Option<&mut Annotation> {
        self.map.annotations.iter_mut().find(|a| &a.id == id)
    }

    /// Members of a team in roster order.
    pub fn team_members(&self, team_id: TeamId) -> impl Iterator<Item = &Participant> {
        self.participants
            .iter()
            .filter(move |p| p.team_id == Some(team_id))
    }

    /// Participants without a team in roster order.
    pub fn unassigned(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.team_id.is_none())
    }

    /// Canvas size in map units: the background's pixel size, or the
    /// default canvas when no background is set.
    pub fn canvas_size(&self) -> (u32, u32) {
        self.map
            .background_image
            .as_ref()
            .map(|bg| (bg.width, bg.height))
            .unwrap_or(DEFAULT_CANVAS_SIZE)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn check_version(version: &str) -> Result<()> {
    let major = version
        .split('.')
        .next()
        .and_then(|m| m.trim().parse::<u64>().ok())
        .ok_or_else(|| PlannerError::invalid_snapshot(format!("unreadable version '{version}'")))?;

    if major > STATE_VERSION_MAJOR {
        return Err(PlannerError::VersionTooNew {
            found: version.to_string(),
            supported: STATE_VERSION.to_string(),
        });
    }
    Ok(())
}
