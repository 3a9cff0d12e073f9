pub mod clipboard;
pub mod terminal_modes;
pub mod tracing_setup;
