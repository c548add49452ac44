//! Auto-save manager with debouncing.
//!
//! Every change pushes the save time back; the snapshot is written once no
//! change has arrived for the debounce delay. A single pending slot (the time
//! of the last change) is kept, not a queue.

use std::time::Duration;
use web_time::Instant;

use crate::constants::AUTOSAVE_DEBOUNCE;

/// Manages auto-save timing with debouncing.
#[derive(Debug)]
pub struct AutoSaveManager {
    /// Debounce delay (wait this long after last change before saving).
    debounce_delay: Duration,

    /// Time of last change that needs saving.
    last_change: Option<Instant>,

    /// Whether auto-save is enabled.
    enabled: bool,

    /// Whether there are unsaved changes.
    dirty: bool,
}

impl AutoSaveManager {
    /// Create a new auto-save manager with the default debounce delay.
    pub fn new() -> Self {
        Self {
            debounce_delay: AUTOSAVE_DEBOUNCE,
            last_change: None,
            enabled: true,
            dirty: false,
        }
    }

    /// Create a disabled auto-save manager.
    pub fn disabled() -> Self {
        let mut manager = Self::new();
        manager.enabled = false;
        manager
    }

    /// Set the debounce delay.
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    /// Mark that a change occurred that needs saving.
    pub fn mark_dirty(&mut self) {
        self.mark_dirty_at(Instant::now());
    }

    /// Mark a change that happened at `now`.
    pub fn mark_dirty_at(&mut self, now: Instant) {
        self.dirty = true;
        self.last_change = Some(now);
        log::trace!("Auto-save: marked dirty");
    }

    /// Check if there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns true if auto-save is enabled, there are unsaved changes and
    /// the debounce delay has passed since the last change.
    pub fn should_save_at(&self, now: Instant) -> bool {
        if !self.enabled || !self.dirty {
            return false;
        }

        let Some(last_change) = self.last_change else {
            return false;
        };

        now.saturating_duration_since(last_change) >= self.debounce_delay
    }

    /// Mark that a save completed successfully.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
        self.last_change = None;
        log::trace!("Auto-save: marked saved");
    }

    /// Mark that a save failed.
    ///
    /// The session continues in memory: auto-save is switched off and the
    /// dirty flag kept so a later explicit flush can still try.
    pub fn mark_save_failed(&mut self) {
        self.enabled = false;
        log::trace!("Auto-save: marked save failed, disabled");
    }

    /// Check if auto-save is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for AutoSaveManager {
    fn default() -> Self {
        Self::new()
    }
}
