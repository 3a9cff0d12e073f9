//! Low-level primitives
//!
//! This module contains syntax highlighting and display width helpers.

pub mod display_width;
pub mod highlighter;
