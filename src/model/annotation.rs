//! Map annotation types, creation defaults and hit testing.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Color, ParticipantId, TeamId};
use crate::constants::{
    ARROW_HIT_THRESHOLD, DEFAULT_AREA_OPACITY, DEFAULT_AREA_SIZE, DEFAULT_ARROW_WIDTH,
    DEFAULT_FONT_SIZE, DEFAULT_MARKER_SIZE, DEFAULT_PLAYER_TOKEN_SIZE, DEFAULT_TEAM_TOKEN_SIZE,
    TEXT_HIT_HALF_HEIGHT, TEXT_HIT_HALF_WIDTH,
};
use crate::geometry::{self, Point};

/// Unique identifier for an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub String);

impl AnnotationId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnnotationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Tool modes available on the map canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolMode {
    /// Select and drag existing annotations
    #[default]
    Select,
    /// Place a marker per click
    Marker,
    /// Place a text label per click
    Text,
    /// Drag out an arrow
    Arrow,
    /// Place a zone per click
    Area,
    /// Place a token for the first team
    TeamToken,
    /// Place a token for the first participant
    PlayerToken,
}

impl ToolMode {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            ToolMode::Select => "Select",
            ToolMode::Marker => "Marker",
            ToolMode::Text => "Text",
            ToolMode::Arrow => "Arrow",
            ToolMode::Area => "Area",
            ToolMode::TeamToken => "Team",
            ToolMode::PlayerToken => "Player",
        }
    }

    /// Get all tools in toolbar order.
    pub fn all() -> &'static [ToolMode] {
        &[
            ToolMode::Select,
            ToolMode::Marker,
            ToolMode::Text,
            ToolMode::Arrow,
            ToolMode::Area,
            ToolMode::TeamToken,
            ToolMode::PlayerToken,
        ]
    }
}

/// Error returned for a tool name that is not in the toolbar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool '{0}'")]
pub struct ParseToolError(pub String);

impl std::str::FromStr for ToolMode {
    type Err = ParseToolError;

    /// Match a toolbar name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolMode::all()
            .iter()
            .copied()
            .find(|tool| tool.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseToolError(s.to_string()))
    }
}

/// Outline of an area annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaShape {
    #[default]
    Rectangle,
    Circle,
}

/// Variant-specific payload of an annotation, tagged by `type` in snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AnnotationKind {
    /// Round marker with an icon and a label underneath.
    Marker {
        icon: String,
        label: String,
        color: Color,
        size: f32,
    },
    /// Free text anchored at its center.
    Text {
        content: String,
        color: Color,
        font_size: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        background_color: Option<Color>,
    },
    /// Arrow from the annotation position to `(x2, y2)`.
    Arrow {
        x2: f32,
        y2: f32,
        color: Color,
        width: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// Zone anchored at its top-left corner.
    Area {
        width: f32,
        height: f32,
        color: Color,
        opacity: f32,
        shape: AreaShape,
    },
    /// Token standing for a whole team.
    TeamToken { team_id: TeamId, size: f32 },
    /// Token standing for a single participant.
    PlayerToken { player_id: ParticipantId, size: f32 },
}

impl AnnotationKind {
    pub fn default_marker() -> Self {
        AnnotationKind::Marker {
            icon: "flag".to_string(),
            label: "Marker".to_string(),
            color: Color::RED,
            size: DEFAULT_MARKER_SIZE,
        }
    }

    pub fn default_text() -> Self {
        AnnotationKind::Text {
            content: "Text".to_string(),
            color: Color::AMBER,
            font_size: DEFAULT_FONT_SIZE,
            background_color: None,
        }
    }

    /// Arrow ending at `end`.
    pub fn default_arrow(end: Point) -> Self {
        AnnotationKind::Arrow {
            x2: end.x,
            y2: end.y,
            color: Color::AMBER,
            width: DEFAULT_ARROW_WIDTH,
            label: None,
        }
    }

    pub fn default_area() -> Self {
        AnnotationKind::Area {
            width: DEFAULT_AREA_SIZE,
            height: DEFAULT_AREA_SIZE,
            color: Color::RED,
            opacity: DEFAULT_AREA_OPACITY,
            shape: AreaShape::Rectangle,
        }
    }

    pub fn default_team_token(team_id: TeamId) -> Self {
        AnnotationKind::TeamToken {
            team_id,
            size: DEFAULT_TEAM_TOKEN_SIZE,
        }
    }

    pub fn default_player_token(player_id: ParticipantId) -> Self {
        AnnotationKind::PlayerToken {
            player_id,
            size: DEFAULT_PLAYER_TOKEN_SIZE,
        }
    }

    /// The tool that creates this kind of annotation.
    pub fn tool(&self) -> ToolMode {
        match self {
            AnnotationKind::Marker { .. } => ToolMode::Marker,
            AnnotationKind::Text { .. } => ToolMode::Text,
            AnnotationKind::Arrow { .. } => ToolMode::Arrow,
            AnnotationKind::Area { .. } => ToolMode::Area,
            AnnotationKind::TeamToken { .. } => ToolMode::TeamToken,
            AnnotationKind::PlayerToken { .. } => ToolMode::PlayerToken,
        }
    }
}

/// A completed annotation placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique identifier.
    pub id: AnnotationId,
    /// Anchor position in map space.
    pub x: f32,
    pub y: f32,
    /// Variant payload.
    #[serde(flatten)]
    pub kind: AnnotationKind,
}

impl Annotation {
    /// Create a new annotation at `position` with a fresh id.
    pub fn new(position: Point, kind: AnnotationKind) -> Self {
        Self {
            id: AnnotationId::generate(),
            x: position.x,
            y: position.y,
            kind,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move the anchor. For arrows only the start point moves.
    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    /// The participant this annotation refers to, if it is a participant token.
    pub fn player_ref(&self) -> Option<&ParticipantId> {
        match &self.kind {
            AnnotationKind::PlayerToken { player_id, .. } => Some(player_id),
            _ => None,
        }
    }

    /// Check if a map-space point hits this annotation.
    ///
    /// Round shapes use their bounding square, areas use their bounding
    /// rectangle regardless of shape.
    pub fn contains_point(&self, p: Point) -> bool {
        let anchor = self.position();
        match &self.kind {
            AnnotationKind::Marker { size, .. }
            | AnnotationKind::TeamToken { size, .. }
            | AnnotationKind::PlayerToken { size, .. } => {
                geometry::within_half_extents_strict(p, anchor, size / 2.0, size / 2.0)
            }
            AnnotationKind::Text { .. } => {
                geometry::within_half_extents(p, anchor, TEXT_HIT_HALF_WIDTH, TEXT_HIT_HALF_HEIGHT)
            }
            AnnotationKind::Area { width, height, .. } => {
                geometry::within_rect(p, anchor, *width, *height)
            }
            AnnotationKind::Arrow { x2, y2, .. } => {
                geometry::distance_to_segment(p, anchor, Point::new(*x2, *y2)) < ARROW_HIT_THRESHOLD
            }
        }
    }

    /// Whether every coordinate and size of this annotation is finite.
    pub fn is_finite(&self) -> bool {
        let payload_finite = match &self.kind {
            AnnotationKind::Marker { size, .. }
            | AnnotationKind::TeamToken { size, .. }
            | AnnotationKind::PlayerToken { size, .. } => size.is_finite(),
            AnnotationKind::Text { font_size, .. } => font_size.is_finite(),
            AnnotationKind::Arrow { x2, y2, width, .. } => {
                x2.is_finite() && y2.is_finite() && width.is_finite()
            }
            AnnotationKind::Area {
                width,
                height,
                opacity,
                ..
            } => width.is_finite() && height.is_finite() && opacity.is_finite(),
        };
        self.position().is_finite() && payload_finite
    }
}

/// Find the topmost annotation under `p`. Later entries are drawn on top,
/// so the search runs from the end.
pub fn hit_test(annotations: &[Annotation], p: Point) -> Option<&Annotation> {
    annotations.iter().rev().find(|ann| ann.contains_point(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 0.001;

    fn marker_at(x: f32, y: f32) -> Annotation {
        Annotation::new(Point::new(x, y), AnnotationKind::default_marker())
    }

    #[test]
    fn test_marker_hit_boundary() {
        let marker = marker_at(100.0, 100.0);
        // size 30 => half extent 15
        assert!(marker.contains_point(Point::new(100.0 + 15.0 - EPS, 100.0)));
        assert!(!marker.contains_point(Point::new(100.0 + 15.0 + EPS, 100.0)));
        assert!(!marker.contains_point(Point::new(115.0, 100.0)));
    }

    #[test]
    fn test_marker_uses_bounding_square() {
        let marker = marker_at(0.0, 0.0);
        // Corner of the square lies outside the circle but still hits
        assert!(marker.contains_point(Point::new(14.0, 14.0)));
    }

    #[test]
    fn test_text_box_is_fixed_size() {
        let text = Annotation::new(Point::new(0.0, 0.0), AnnotationKind::default_text());
        assert!(text.contains_point(Point::new(50.0, 20.0)));
        assert!(text.contains_point(Point::new(-50.0, -20.0)));
        assert!(!text.contains_point(Point::new(51.0, 0.0)));
        assert!(!text.contains_point(Point::new(0.0, 21.0)));
    }

    #[test]
    fn test_area_uses_bounding_rect_for_circles() {
        let mut area = Annotation::new(Point::new(10.0, 10.0), AnnotationKind::default_area());
        if let AnnotationKind::Area { shape, .. } = &mut area.kind {
            *shape = AreaShape::Circle;
        }
        assert!(area.contains_point(Point::new(10.0, 10.0)));
        assert!(area.contains_point(Point::new(110.0, 110.0)));
        assert!(!area.contains_point(Point::new(9.0, 50.0)));
    }

    #[test]
    fn test_arrow_hit_threshold() {
        let arrow = Annotation::new(
            Point::new(0.0, 0.0),
            AnnotationKind::default_arrow(Point::new(100.0, 0.0)),
        );
        assert!(arrow.contains_point(Point::new(50.0, 9.9)));
        assert!(!arrow.contains_point(Point::new(50.0, 10.0)));
        // Past the end point the distance is measured to the endpoint
        assert!(!arrow.contains_point(Point::new(108.0, 8.0)));
        assert!(arrow.contains_point(Point::new(105.0, 5.0)));
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let bottom = marker_at(0.0, 0.0);
        let top = marker_at(5.0, 5.0);
        let annotations = vec![bottom.clone(), top.clone()];

        let hit = hit_test(&annotations, Point::new(3.0, 3.0)).unwrap();
        assert_eq!(hit.id, top.id);

        let hit = hit_test(&annotations, Point::new(-10.0, -10.0)).unwrap();
        assert_eq!(hit.id, bottom.id);

        assert!(hit_test(&annotations, Point::new(500.0, 500.0)).is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let ann = Annotation::new(
            Point::new(1.5, 2.0),
            AnnotationKind::default_player_token(ParticipantId::from("p-1")),
        );
        let value = serde_json::to_value(&ann).unwrap();
        assert_eq!(value["type"], "playerToken");
        assert_eq!(value["playerId"], "p-1");
        assert_eq!(value["x"], 1.5);
        assert_eq!(value["size"], 40.0);
    }

    #[test]
    fn test_deserializes_snapshot_element() {
        let json = r##"{
            "id": "a1", "type": "text", "x": 10, "y": 20,
            "content": "Hold", "color": "#fbbf24", "fontSize": 16,
            "backgroundColor": "#000000"
        }"##;
        let ann: Annotation = serde_json::from_str(json).unwrap();
        assert_eq!(ann.id, AnnotationId::from("a1"));
        assert_eq!(ann.position(), Point::new(10.0, 20.0));
        match ann.kind {
            AnnotationKind::Text {
                content,
                background_color,
                ..
            } => {
                assert_eq!(content, "Hold");
                assert_eq!(background_color, Some(Color::BLACK));
            }
            other => panic!("Expected text annotation, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let json = r#"{"id": "a1", "type": "polygon", "x": 0, "y": 0}"#;
        assert!(serde_json::from_str::<Annotation>(json).is_err());
    }

    #[test]
    fn test_kind_tool_mapping() {
        assert_eq!(AnnotationKind::default_area().tool(), ToolMode::Area);
        assert_eq!("area".parse(), Ok(ToolMode::Area));
        assert_eq!("Player".parse(), Ok(ToolMode::PlayerToken));
        assert!("lasso".parse::<ToolMode>().is_err());
    }
}
