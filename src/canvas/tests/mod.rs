//! Tests for the canvas controller.
//!
//! Each test drives the controller with pointer events against an in-memory
//! state manager and checks the resulting plan and history.

mod select_tests;
