//! Terminal rendering module
//!
//! Rasterizes level coordinates onto character cells with 24-bit colour.

pub mod terminal;

pub use terminal::{Canvas, TerminalRenderer, Viewport};
