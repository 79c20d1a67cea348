//! core
//!
//! Core domain types and configuration for revfs.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Revision, ContentId, ObjectKind, CanonicalPath
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing

pub mod config;
pub mod types;
