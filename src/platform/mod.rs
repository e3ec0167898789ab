//! Platform layer
//!
//! Everything that touches the real terminal:
//! - Raw mode and alternate screen setup/teardown
//! - Keyboard input mapped to session events

pub mod input;
pub mod terminal;

pub use input::{KeyMapper, TerminalInput, wait_for_key};
pub use terminal::TerminalGuard;
