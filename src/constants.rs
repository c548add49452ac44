//! Global constants for the planner core.

use std::time::Duration;

/// Maximum number of participants on the roster.
pub const MAX_PARTICIPANTS: usize = 30;

/// Maximum number of snapshots kept on the undo stack.
pub const HISTORY_LIMIT: usize = 200;

/// Key under which the state snapshot is persisted.
pub const STORAGE_KEY: &str = "gvg-planner-state";

/// Quiet period after the last change before the snapshot is written.
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Snapshot format version written by this crate.
pub const STATE_VERSION: &str = "1.0.0";

/// Highest snapshot major version this crate can read.
pub const STATE_VERSION_MAJOR: u64 = 1;

/// Prefix of exported snapshot files (`gvg-plan-YYYY-MM-DD.json`).
pub const EXPORT_FILE_PREFIX: &str = "gvg-plan";

// ============================================================================
// Viewport
// ============================================================================

/// Minimum zoom factor.
pub const ZOOM_MIN: f32 = 0.1;

/// Maximum zoom factor.
pub const ZOOM_MAX: f32 = 5.0;

/// Multiplier applied by a single zoom-in step (zoom-out divides by it).
pub const ZOOM_STEP: f32 = 1.1;

/// Wheel factor when scrolling up.
pub const WHEEL_ZOOM_IN: f32 = 1.1;

/// Wheel factor when scrolling down.
pub const WHEEL_ZOOM_OUT: f32 = 0.9;

/// Canvas size in map units when no background image is set.
pub const DEFAULT_CANVAS_SIZE: (u32, u32) = (2000, 2000);

// ============================================================================
// Hit testing
// ============================================================================

/// Half width of the fixed hit box around a text anchor.
pub const TEXT_HIT_HALF_WIDTH: f32 = 50.0;

/// Half height of the fixed hit box around a text anchor.
pub const TEXT_HIT_HALF_HEIGHT: f32 = 20.0;

/// Maximum distance from an arrow's segment that still counts as a hit.
pub const ARROW_HIT_THRESHOLD: f32 = 10.0;

// ============================================================================
// Creation defaults
// ============================================================================

/// Default marker diameter.
pub const DEFAULT_MARKER_SIZE: f32 = 30.0;

/// Default text font size.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Default area width and height.
pub const DEFAULT_AREA_SIZE: f32 = 100.0;

/// Default area fill opacity.
pub const DEFAULT_AREA_OPACITY: f32 = 0.3;

/// Default arrow stroke width.
pub const DEFAULT_ARROW_WIDTH: f32 = 3.0;

/// Default team token diameter.
pub const DEFAULT_TEAM_TOKEN_SIZE: f32 = 60.0;

/// Default participant token diameter.
pub const DEFAULT_PLAYER_TOKEN_SIZE: f32 = 40.0;
