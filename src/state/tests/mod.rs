//! Tests for the state manager.
//!
//! These cover history behavior, roster rules, import/export and the
//! debounced persistence path.

mod history_tests;
mod import_export_tests;
