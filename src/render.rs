//! Pure mapping from the plan to drawable primitives.
//!
//! [`render`] reads the state, the selection and the background cache and
//! produces a [`Scene`] in map coordinates. The host applies the scene's
//! viewport transform and draws the primitives in order. Nothing here
//! touches the state or talks to a graphics API.

use serde::Serialize;

use crate::background::BackgroundCache;
use crate::model::{Annotation, AnnotationId, AnnotationKind, AreaShape, Color};
use crate::state::AppState;
use crate::viewport::Viewport;

/// Opacity of the background image.
const BACKGROUND_OPACITY: f32 = 0.7;
/// Radius of the endpoint handles on a selected arrow.
const ARROW_HANDLE_RADIUS: f32 = 5.0;
/// Gap between a marker's circle and its label baseline.
const MARKER_LABEL_GAP: f32 = 15.0;
const MARKER_LABEL_FONT_SIZE: f32 = 14.0;
const MARKER_OPACITY: f32 = 0.8;
const TOKEN_OPACITY: f32 = 0.9;
const TEAM_TOKEN_FONT_SIZE: f32 = 14.0;
const PLAYER_TOKEN_FONT_SIZE: f32 = 10.0;
const ARROW_LABEL_FONT_SIZE: f32 = 14.0;
/// Fixed box drawn behind text that has a background color.
const TEXT_BOX_SIZE: (f32, f32) = (100.0, 30.0);
const TEXT_BOX_OPACITY: f32 = 0.7;
const TEXT_BOX_RADIUS: f32 = 4.0;

/// Line style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }

    /// Amber outline when selected, `normal` otherwise.
    fn highlighted(selected: bool, normal: Stroke, selected_width: f32) -> Self {
        if selected {
            Stroke::new(Color::AMBER, selected_width)
        } else {
            normal
        }
    }
}

/// A single drawable shape in map coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Primitive {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        opacity: f32,
        corner_radius: f32,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        opacity: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Stroke,
        /// Draw an arrowhead at `(x2, y2)`
        arrowhead: bool,
    },
    /// Text centered on `(x, y)`.
    Text {
        x: f32,
        y: f32,
        content: String,
        color: Color,
        font_size: f32,
        stroke: Option<Stroke>,
    },
}

/// The primitives drawn for one annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneItem {
    pub id: AnnotationId,
    pub selected: bool,
    pub primitives: Vec<Primitive>,
}

/// Background image layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackgroundLayer {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub opacity: f32,
}

/// Everything needed to draw one frame of the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub viewport: Viewport,
    /// Canvas size in map units
    pub width: u32,
    pub height: u32,
    pub background: Option<BackgroundLayer>,
    /// Items in paint order
    pub items: Vec<SceneItem>,
}

/// Build the scene for `state`.
///
/// The background layer appears only once the cache holds a completed load
/// for the current background URL. Tokens whose team or participant no
/// longer exists are skipped.
pub fn render(state: &AppState, selection: Option<&AnnotationId>, cache: &BackgroundCache) -> Scene {
    let (width, height) = state.canvas_size();

    let background = state.map.background_image.as_ref().and_then(|bg| {
        cache.ready_for(&bg.url).map(|loaded| BackgroundLayer {
            url: loaded.url.clone(),
            width: bg.width,
            height: bg.height,
            opacity: BACKGROUND_OPACITY,
        })
    });

    let items = state
        .map
        .annotations
        .iter()
        .filter_map(|ann| {
            let selected = selection == Some(&ann.id);
            render_annotation(state, ann, selected).map(|primitives| SceneItem {
                id: ann.id.clone(),
                selected,
                primitives,
            })
        })
        .collect();

    Scene {
        viewport: state.map.viewport,
        width,
        height,
        background,
        items,
    }
}

fn render_annotation(state: &AppState, ann: &Annotation, selected: bool) -> Option<Vec<Primitive>> {
    let (x, y) = (ann.x, ann.y);

    let primitives = match &ann.kind {
        AnnotationKind::Area {
            width,
            height,
            color,
            opacity,
            shape,
        } => {
            let stroke = Some(Stroke::highlighted(selected, Stroke::new(*color, 1.0), 3.0));
            let shape = match shape {
                AreaShape::Rectangle => Primitive::Rect {
                    x,
                    y,
                    width: *width,
                    height: *height,
                    fill: Some(*color),
                    stroke,
                    opacity: *opacity,
                    corner_radius: 0.0,
                },
                // The circle takes its radius from the width only
                AreaShape::Circle => Primitive::Circle {
                    cx: x + width / 2.0,
                    cy: y + height / 2.0,
                    r: width / 2.0,
                    fill: Some(*color),
                    stroke,
                    opacity: *opacity,
                },
            };
            vec![shape]
        }

        AnnotationKind::Arrow {
            x2,
            y2,
            color,
            width,
            label,
        } => {
            let mut primitives = vec![Primitive::Line {
                x1: x,
                y1: y,
                x2: *x2,
                y2: *y2,
                stroke: Stroke::new(*color, *width),
                arrowhead: true,
            }];
            if let Some(label) = label.as_deref().filter(|l| !l.is_empty()) {
                primitives.push(Primitive::Text {
                    x: (x + x2) / 2.0,
                    y: (y + y2) / 2.0 - MARKER_LABEL_GAP,
                    content: label.to_string(),
                    color: *color,
                    font_size: ARROW_LABEL_FONT_SIZE,
                    stroke: None,
                });
            }
            if selected {
                for (cx, cy) in [(x, y), (*x2, *y2)] {
                    primitives.push(Primitive::Circle {
                        cx,
                        cy,
                        r: ARROW_HANDLE_RADIUS,
                        fill: Some(Color::AMBER),
                        stroke: None,
                        opacity: 1.0,
                    });
                }
            }
            primitives
        }

        AnnotationKind::Marker {
            label, color, size, ..
        } => vec![
            Primitive::Circle {
                cx: x,
                cy: y,
                r: size / 2.0,
                fill: Some(*color),
                stroke: Some(Stroke::highlighted(selected, Stroke::new(Color::BLACK, 2.0), 3.0)),
                opacity: MARKER_OPACITY,
            },
            Primitive::Text {
                x,
                y: y + size / 2.0 + MARKER_LABEL_GAP,
                content: label.clone(),
                color: *color,
                font_size: MARKER_LABEL_FONT_SIZE,
                stroke: None,
            },
        ],

        AnnotationKind::Text {
            content,
            color,
            font_size,
            background_color,
        } => {
            let mut primitives = Vec::with_capacity(2);
            if let Some(bg) = background_color {
                let (w, h) = TEXT_BOX_SIZE;
                primitives.push(Primitive::Rect {
                    x: x - w / 2.0,
                    y: y - h / 2.0,
                    width: w,
                    height: h,
                    fill: Some(*bg),
                    stroke: None,
                    opacity: TEXT_BOX_OPACITY,
                    corner_radius: TEXT_BOX_RADIUS,
                });
            }
            primitives.push(Primitive::Text {
                x,
                y,
                content: content.clone(),
                color: *color,
                font_size: *font_size,
                stroke: selected.then(|| Stroke::new(Color::AMBER, 1.0)),
            });
            primitives
        }

        AnnotationKind::TeamToken { team_id, size } => {
            let team = state.team(*team_id)?;
            vec![
                Primitive::Circle {
                    cx: x,
                    cy: y,
                    r: size / 2.0,
                    fill: Some(team.color),
                    stroke: Some(Stroke::highlighted(selected, Stroke::new(Color::BLACK, 3.0), 4.0)),
                    opacity: TOKEN_OPACITY,
                },
                Primitive::Text {
                    x,
                    y,
                    content: team.short_label().to_string(),
                    color: Color::WHITE,
                    font_size: TEAM_TOKEN_FONT_SIZE,
                    stroke: None,
                },
            ]
        }

        AnnotationKind::PlayerToken { player_id, size } => {
            let participant = state.participant(player_id)?;
            let fill = participant
                .team_id
                .and_then(|id| state.team(id))
                .map(|team| team.color)
                .unwrap_or(Color::GRAY);
            vec![
                Primitive::Circle {
                    cx: x,
                    cy: y,
                    r: size / 2.0,
                    fill: Some(fill),
                    stroke: Some(Stroke::highlighted(selected, Stroke::new(Color::BLACK, 2.0), 3.0)),
                    opacity: TOKEN_OPACITY,
                },
                Primitive::Text {
                    x,
                    y,
                    content: participant.token_label(),
                    color: Color::WHITE,
                    font_size: PLAYER_TOKEN_FONT_SIZE,
                    stroke: None,
                },
            ]
        }
    };

    Some(primitives)
}
