//! Data models for the planner: roster, teams and map annotations.

mod annotation;
mod color;
mod participant;
mod team;

pub use annotation::{
    Annotation, AnnotationId, AnnotationKind, AreaShape, ParseToolError, ToolMode, hit_test,
};
pub use color::{Color, ParseColorError};
pub use participant::{
    NewParticipant, ParseClassError, Participant, ParticipantClass, ParticipantId,
    ParticipantPatch,
};
pub use team::{Team, TeamId, TeamPatch, default_teams};
