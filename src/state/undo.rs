//! Snapshot-based undo/redo history.

use crate::constants::HISTORY_LIMIT;

/// Bounded snapshot history.
///
/// The stack stores whole values, not commands: before a change the caller
/// pushes the value it is about to replace, and `undo`/`redo` hand back the
/// value to restore in exchange for the current one.
///
/// ```
/// use gvgplan::state::UndoStack;
///
/// let mut stack: UndoStack<String> = UndoStack::new(50);
///
/// // Before making a change, push current state
/// stack.push("hello".to_string());
/// let current = "hello world".to_string();
///
/// assert_eq!(stack.undo(current).as_deref(), Some("hello"));
/// ```
#[derive(Debug, Clone)]
pub struct UndoStack<T: Clone> {
    /// Values that can be restored by undo, oldest first
    undo_stack: Vec<T>,
    /// Values that can be restored by redo, most recently undone last
    redo_stack: Vec<T>,
    /// Maximum number of undo entries
    max_history: usize,
}

impl<T: Clone> Default for UndoStack<T> {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

impl<T: Clone> UndoStack<T> {
    /// Create a new undo stack with specified max history size
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_history,
        }
    }

    /// Push the value about to be replaced.
    ///
    /// This clears the redo stack since a new change invalidates the redo
    /// history. The oldest entry is dropped once the limit is exceeded.
    pub fn push(&mut self, state: T) {
        self.undo_stack.push(state);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.max_history {
            let excess = self.undo_stack.len() - self.max_history;
            self.undo_stack.drain(..excess);
            log::trace!("History limit {} reached, dropped {excess} entries", self.max_history);
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Returns the previous value, or None if there is nothing to undo.
    ///
    /// `current` goes onto the redo stack.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let prev = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(prev)
    }

    /// Returns the next value, or None if there is nothing to redo.
    ///
    /// `current` goes back onto the undo stack.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_undo() {
        let mut stack = UndoStack::new(10);
        stack.push(1);
        stack.push(2);
        assert!(stack.can_undo());
        assert!(!stack.can_redo());

        assert_eq!(stack.undo(3), Some(2));
        assert_eq!(stack.undo(2), Some(1));
        assert_eq!(stack.undo(1), None);
        assert_eq!(stack.redo_count(), 2);
    }

    #[test]
    fn test_redo_after_undo() {
        let mut stack = UndoStack::new(10);
        stack.push("a");
        let restored = stack.undo("b").unwrap();
        assert_eq!(restored, "a");
        assert_eq!(stack.redo(restored), Some("b"));
        assert_eq!(stack.undo_count(), 1);
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut stack = UndoStack::new(10);
        stack.push(1);
        stack.undo(2);
        assert!(stack.can_redo());

        stack.push(5);
        assert!(!stack.can_redo());
        assert_eq!(stack.redo(6), None);
    }

    #[test]
    fn test_history_limit_drops_oldest() {
        let mut stack = UndoStack::new(3);
        for i in 0..5 {
            stack.push(i);
        }
        assert_eq!(stack.undo_count(), 3);
        assert_eq!(stack.undo(5), Some(4));
        assert_eq!(stack.undo(4), Some(3));
        assert_eq!(stack.undo(3), Some(2));
        assert_eq!(stack.undo(2), None);
    }

    #[test]
    fn test_clear() {
        let mut stack = UndoStack::new(10);
        stack.push(1);
        stack.undo(2);
        stack.push(3);
        stack.clear();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_default_uses_history_limit() {
        let stack: UndoStack<u8> = UndoStack::default();
        assert_eq!(stack.max_history(), HISTORY_LIMIT);
    }
}
