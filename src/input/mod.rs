//! Input handling: key events to editor commands

pub mod keybindings;
