// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod db;
pub mod export;
pub mod keymap;
pub mod logging;
pub mod marking;
pub mod playback;
pub mod queue;
pub mod runtime;
pub mod segment;
pub mod session;
pub mod timeline;
pub mod util;
