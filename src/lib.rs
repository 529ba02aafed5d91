// Library surface for headless/integration tests and reuse.
// The terminal shell itself lives in main.rs.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod game;
pub mod logging;
pub mod rules;
pub mod runtime;
pub mod session;
pub mod task_generator;
pub mod timer;
pub mod ui;
pub mod words;
