//! Lane layout and windowed rendering for a git client's commit history view.
//!
//! The backend streams commit batches in; [`GraphEngine`] assigns lanes,
//! materializes drawables for the visible window, and turns pointer input
//! into requests back to the backend.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod graph;
pub mod protocol;
pub mod scene;

pub use config::GraphConfig;
pub use graph::GraphEngine;
