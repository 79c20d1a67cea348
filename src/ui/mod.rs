//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All command output goes through this module so formatting stays
//! consistent and `--quiet` is honored in one place.

pub mod output;
