//! Wallpaper app: CLI, local HTTP API and the glue between session and engine.
pub mod cli;
pub mod config;
pub mod effects;
pub mod logging;
pub mod progress;
pub mod server;
pub mod session;
