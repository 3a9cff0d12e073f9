//! View and UI layer
//!
//! Viewport bookkeeping, colours and frame rendering.

pub mod render;
pub mod theme;
pub mod viewport;
