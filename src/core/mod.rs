//! core
//!
//! Domain types, persistence and configuration for LineCook.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Revision, UtcTimestamp
//! - [`document`] - The persisted document and its seed
//! - [`task`] - Task tree model and derived views
//! - [`store`] - Atomic, compare-and-swap document storage
//! - [`lock`] - Cross-process document lock
//! - [`paths`] - Centralized path routing for the data directory
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - The store treats the payload as opaque; only views interpret tasks
//! - All mutation flows through a single compare-and-swap
//! - A reader never observes a partially written document

pub mod config;
pub mod document;
pub mod lock;
pub mod paths;
pub mod store;
pub mod task;
pub mod types;
