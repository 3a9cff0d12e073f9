// Editor library - exposes all core modules for testing

pub mod config;
pub mod state;

// Organized modules
pub mod app;
pub mod input;
pub mod model;
pub mod primitives;
pub mod services;
pub mod view;
