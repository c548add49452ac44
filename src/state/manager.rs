//! The state owner: mutations, snapshot history, selection and persistence.

use chrono::{DateTime, NaiveDate, Utc};
use web_time::Instant;

use super::{AppState, MapBackground, UndoStack};
use crate::config::PlannerConfig;
use crate::constants::{EXPORT_FILE_PREFIX, MAX_PARTICIPANTS, STORAGE_KEY};
use crate::error::{PlannerError, Result};
use crate::geometry::Point;
use crate::model::{
    Annotation, AnnotationId, AnnotationKind, NewParticipant, Participant, ParticipantId,
    ParticipantPatch, TeamId, TeamPatch,
};
use crate::persist::{AutoSaveManager, KeyValueStore, MemoryStore};
use crate::viewport::Viewport;

/// Whether a mutation becomes an undo step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMode {
    /// Push the previous state onto the undo stack
    Record,
    /// Apply without touching history (pan, zoom, drag continuation)
    Transient,
}

/// Owns the application state and everything that watches it.
///
/// Callers hold one manager and pass it by `&mut` to whatever needs to
/// change the plan. All mutations go through [`StateManager::mutate`], so a
/// failed operation never leaves a half-applied state or a history entry.
pub struct StateManager {
    state: AppState,
    history: UndoStack<AppState>,
    selection: Option<AnnotationId>,
    store: Box<dyn KeyValueStore>,
    auto_save: AutoSaveManager,
    /// `lastUpdated` of the snapshot last read from or written to the store
    last_saved: Option<DateTime<Utc>>,
}

impl StateManager {
    /// Create a manager over `store`, loading any saved plan from it.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_config(store, &PlannerConfig::default())
    }

    /// Create a manager over `store` with history and autosave settings from
    /// `config`.
    pub fn with_config(store: Box<dyn KeyValueStore>, config: &PlannerConfig) -> Self {
        let (state, last_saved, auto_save) = match Self::load_initial(store.as_ref()) {
            Ok(Some(state)) => {
                let saved = state.last_updated;
                (state, Some(saved), AutoSaveManager::new())
            }
            Ok(None) => (AppState::new(), None, AutoSaveManager::new()),
            Err(e) => {
                log::warn!(
                    "Cannot read {}: {}; continuing in memory",
                    store.describe(),
                    e
                );
                (AppState::new(), None, AutoSaveManager::disabled())
            }
        };

        Self {
            state,
            history: UndoStack::new(config.preferences.history_limit()),
            selection: None,
            store,
            auto_save: auto_save.with_debounce_delay(config.preferences.autosave_debounce()),
            last_saved,
        }
    }

    /// Manager with no persistent backing.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Read the saved plan. Absent or unusable data yields `None`; only a
    /// failing backend is an error.
    fn load_initial(store: &dyn KeyValueStore) -> Result<Option<AppState>> {
        let Some(json) = store.get(STORAGE_KEY)? else {
            log::info!("No saved plan in {}, starting fresh", store.describe());
            return Ok(None);
        };

        match AppState::from_json(&json) {
            Ok(state) => {
                log::info!(
                    "Loaded plan from {} ({} players, {} elements)",
                    store.describe(),
                    state.participants.len(),
                    state.map.annotations.len()
                );
                Ok(Some(state))
            }
            Err(e) => {
                log::warn!("Ignoring saved plan in {}: {}", store.describe(), e);
                Ok(None)
            }
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.state.map.viewport
    }

    pub fn selection(&self) -> Option<&AnnotationId> {
        self.selection.as_ref()
    }

    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.selection.as_ref().and_then(|id| self.state.annotation(id))
    }

    /// Select an annotation, or clear the selection with `None`.
    ///
    /// Selection is UI state: it is neither historized nor persisted.
    pub fn select(&mut self, id: Option<AnnotationId>) {
        self.selection = id.filter(|id| self.state.annotation(id).is_some());
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_count(&self) -> usize {
        self.history.undo_count()
    }

    pub fn redo_count(&self) -> usize {
        self.history.redo_count()
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn is_autosave_enabled(&self) -> bool {
        self.auto_save.is_enabled()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.auto_save.is_dirty()
    }

    /// When the stored snapshot was written, if this session has read or
    /// written one.
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    // ------------------------------------------------------------------
    // Core mutation and history
    // ------------------------------------------------------------------

    /// Apply `f` to a copy of the state and commit it.
    ///
    /// If `f` fails, or leaves geometry that could not be saved (non-finite
    /// coordinates, opacity outside 0..1, viewport out of range), nothing
    /// changes and the error is returned. A recorded mutation that leaves
    /// the state equal to before adds no history entry. Returns whether the
    /// state changed.
    pub fn mutate<F>(&mut self, mode: MutationMode, f: F) -> Result<bool>
    where
        F: FnOnce(&mut AppState) -> Result<()>,
    {
        let mut next = self.state.clone();
        f(&mut next)?;
        next.check_geometry()?;

        if next == self.state {
            return Ok(false);
        }

        let previous = std::mem::replace(&mut self.state, next);
        if mode == MutationMode::Record {
            self.history.push(previous);
            log::debug!(
                "Recorded change ({} undo, {} redo)",
                self.history.undo_count(),
                self.history.redo_count()
            );
        }

        self.prune_selection();
        self.auto_save.mark_dirty();
        Ok(true)
    }

    /// Restore the previous snapshot. Returns false if there is none.
    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        let viewport = self.state.map.viewport;
        let Some(mut previous) = self.history.undo(self.state.clone()) else {
            return false;
        };
        previous.map.viewport = viewport;
        self.state = previous;
        log::debug!(
            "Undo ({} undo, {} redo)",
            self.history.undo_count(),
            self.history.redo_count()
        );
        self.prune_selection();
        self.auto_save.mark_dirty();
        true
    }

    /// Re-apply the most recently undone snapshot. Returns false if there is
    /// none.
    pub fn redo(&mut self) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        let viewport = self.state.map.viewport;
        let Some(mut next) = self.history.redo(self.state.clone()) else {
            return false;
        };
        next.map.viewport = viewport;
        self.state = next;
        log::debug!(
            "Redo ({} undo, {} redo)",
            self.history.undo_count(),
            self.history.redo_count()
        );
        self.prune_selection();
        self.auto_save.mark_dirty();
        true
    }

    fn prune_selection(&mut self) {
        if let Some(id) = &self.selection {
            if self.state.annotation(id).is_none() {
                log::trace!("Selected element {} is gone, clearing selection", id);
                self.selection = None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Roster and teams
    // ------------------------------------------------------------------

    /// Add a participant. Fails with [`PlannerError::RosterFull`] once the
    /// roster holds [`MAX_PARTICIPANTS`] entries.
    pub fn add_participant(&mut self, draft: NewParticipant) -> Result<ParticipantId> {
        let participant = Participant::from_draft(draft);
        let id = participant.id.clone();

        self.mutate(MutationMode::Record, |state| {
            if state.participants.len() >= MAX_PARTICIPANTS {
                return Err(PlannerError::RosterFull {
                    max: MAX_PARTICIPANTS,
                });
            }
            if let Some(team_id) = participant.team_id {
                ensure_team(state, team_id)?;
            }
            state.participants.push(participant);
            Ok(())
        })
        .inspect_err(|e| log::info!("Participant not added: {}", e))?;

        Ok(id)
    }

    pub fn update_participant(&mut self, id: &ParticipantId, patch: ParticipantPatch) -> Result<()> {
        self.mutate(MutationMode::Record, |state| {
            if let Some(Some(team_id)) = patch.team_id {
                ensure_team(state, team_id)?;
            }
            let participant = state
                .participants
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or_else(|| PlannerError::UnknownParticipant(id.clone()))?;
            patch.apply(participant);
            Ok(())
        })?;
        Ok(())
    }

    /// Remove a participant together with every token that stands for them,
    /// as a single undo step.
    pub fn remove_participant(&mut self, id: &ParticipantId) -> Result<()> {
        self.mutate(MutationMode::Record, |state| {
            let before = state.participants.len();
            state.participants.retain(|p| &p.id != id);
            if state.participants.len() == before {
                return Err(PlannerError::UnknownParticipant(id.clone()));
            }

            let tokens_before = state.map.annotations.len();
            state.map.annotations.retain(|a| a.player_ref() != Some(id));
            log::debug!(
                "Removed participant {} and {} token(s)",
                id,
                tokens_before - state.map.annotations.len()
            );
            Ok(())
        })?;
        Ok(())
    }

    pub fn update_team(&mut self, id: TeamId, patch: TeamPatch) -> Result<()> {
        self.mutate(MutationMode::Record, |state| {
            let team = state
                .teams
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or(PlannerError::UnknownTeam(id))?;
            patch.apply(team);
            Ok(())
        })?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Map annotations
    // ------------------------------------------------------------------

    /// Append an annotation on top of the others.
    pub fn add_annotation(&mut self, annotation: Annotation) -> Result<AnnotationId> {
        let id = annotation.id.clone();
        self.mutate(MutationMode::Record, |state| {
            state.map.annotations.push(annotation);
            Ok(())
        })?;
        Ok(id)
    }

    /// Edit the variant payload of an annotation. The id and position stay.
    pub fn update_annotation<F>(&mut self, id: &AnnotationId, update: F) -> Result<()>
    where
        F: FnOnce(&mut AnnotationKind),
    {
        self.mutate(MutationMode::Record, |state| {
            let ann = state
                .annotation_mut(id)
                .ok_or_else(|| PlannerError::UnknownAnnotation(id.clone()))?;
            update(&mut ann.kind);
            Ok(())
        })?;
        Ok(())
    }

    /// Merge the fields of a JSON object into an annotation, the way the
    /// snapshot spells them (`{"label": "Boss", "color": "#fbbf24"}`).
    ///
    /// `id` and `type` cannot be changed. Keys the annotation's kind does not
    /// have are ignored.
    pub fn patch_annotation(&mut self, id: &AnnotationId, patch: &serde_json::Value) -> Result<()> {
        let fields = patch
            .as_object()
            .ok_or_else(|| PlannerError::invalid_patch("expected a JSON object"))?;
        if let Some(key) = ["id", "type"].into_iter().find(|k| fields.contains_key(*k)) {
            return Err(PlannerError::invalid_patch(format!("'{key}' cannot be changed")));
        }

        self.mutate(MutationMode::Record, |state| {
            let ann = state
                .annotation_mut(id)
                .ok_or_else(|| PlannerError::UnknownAnnotation(id.clone()))?;
            let mut value = serde_json::to_value(&*ann)?;
            if let Some(target) = value.as_object_mut() {
                target.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            *ann = serde_json::from_value(value)
                .map_err(|e| PlannerError::invalid_patch(e.to_string()))?;
            Ok(())
        })?;
        Ok(())
    }

    /// Move an annotation's anchor. Drags record only their first step.
    pub fn move_annotation(
        &mut self,
        id: &AnnotationId,
        position: Point,
        mode: MutationMode,
    ) -> Result<bool> {
        self.mutate(mode, |state| {
            let ann = state
                .annotation_mut(id)
                .ok_or_else(|| PlannerError::UnknownAnnotation(id.clone()))?;
            ann.set_position(position);
            Ok(())
        })
    }

    pub fn remove_annotation(&mut self, id: &AnnotationId) -> Result<()> {
        self.mutate(MutationMode::Record, |state| {
            let before = state.map.annotations.len();
            state.map.annotations.retain(|a| &a.id != id);
            if state.map.annotations.len() == before {
                return Err(PlannerError::UnknownAnnotation(id.clone()));
            }
            Ok(())
        })?;
        Ok(())
    }

    /// Remove every annotation. A no-op on an empty map.
    pub fn clear_annotations(&mut self) -> Result<()> {
        self.mutate(MutationMode::Record, |state| {
            state.map.annotations.clear();
            Ok(())
        })?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Map settings and notes
    // ------------------------------------------------------------------

    /// Replace the viewport without recording history. A viewport with
    /// non-finite pan or zoom is dropped.
    pub fn update_viewport(&mut self, viewport: Viewport) {
        let result = self.mutate(MutationMode::Transient, |state| {
            state.map.viewport = viewport;
            Ok(())
        });
        if let Err(e) = result {
            log::warn!("Viewport change dropped: {}", e);
        }
    }

    pub fn set_background(&mut self, background: Option<MapBackground>) -> Result<()> {
        self.mutate(MutationMode::Record, |state| {
            state.map.background_image = background;
            Ok(())
        })?;
        Ok(())
    }

    pub fn set_strategy_notes(&mut self, notes: impl Into<String>) -> Result<()> {
        let notes = notes.into();
        self.mutate(MutationMode::Record, |state| {
            state.strategy_notes = notes;
            Ok(())
        })?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Import / export / reset
    // ------------------------------------------------------------------

    /// Pretty-printed JSON of the whole state.
    pub fn export_json(&self) -> Result<String> {
        self.state.to_json()
    }

    /// Replace the state with an imported snapshot.
    ///
    /// History and selection are cleared on success. Malformed or invalid
    /// input leaves everything untouched.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let imported = AppState::from_json(json).inspect_err(|e| {
            log::warn!("Import rejected: {}", e);
        })?;

        log::info!(
            "Imported plan ({} players, {} elements)",
            imported.participants.len(),
            imported.map.annotations.len()
        );
        self.replace_all(imported);
        Ok(())
    }

    /// Start over from the default state.
    pub fn reset_all(&mut self) {
        log::info!("Resetting plan to defaults");
        self.replace_all(AppState::new());
    }

    fn replace_all(&mut self, state: AppState) {
        self.state = state;
        self.history.clear();
        self.selection = None;
        self.auto_save.mark_dirty();
    }

    /// Suggested export file name for `date`.
    pub fn export_filename(date: NaiveDate) -> String {
        format!("{}-{}.json", EXPORT_FILE_PREFIX, date.format("%Y-%m-%d"))
    }

    /// Suggested export file name for today (local time).
    pub fn export_filename_today() -> String {
        Self::export_filename(chrono::Local::now().date_naive())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the state if the debounce period has passed. Returns whether a
    /// write happened.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> bool {
        if !self.auto_save.should_save_at(now) {
            return false;
        }

        match self.write_snapshot() {
            Ok(()) => {
                self.auto_save.mark_saved();
                true
            }
            Err(e) => {
                log::warn!("Autosave failed, continuing in memory: {}", e);
                self.auto_save.mark_save_failed();
                false
            }
        }
    }

    /// Write the state immediately.
    pub fn flush(&mut self) -> Result<()> {
        match self.write_snapshot() {
            Ok(()) => {
                self.auto_save.mark_saved();
                Ok(())
            }
            Err(e) => {
                log::warn!("Saving to {} failed: {}", self.store.describe(), e);
                self.auto_save.mark_save_failed();
                Err(e)
            }
        }
    }

    fn write_snapshot(&mut self) -> Result<()> {
        let mut snapshot = self.state.clone();
        snapshot.last_updated = Utc::now();
        let json = snapshot.to_json_compact()?;
        self.store.set(STORAGE_KEY, &json)?;
        self.last_saved = Some(snapshot.last_updated);
        log::debug!("Saved plan to {} ({} bytes)", self.store.describe(), json.len());
        Ok(())
    }
}

fn ensure_team(state: &AppState, team_id: TeamId) -> Result<()> {
    state
        .team(team_id)
        .map(|_| ())
        .ok_or(PlannerError::UnknownTeam(team_id))
}
