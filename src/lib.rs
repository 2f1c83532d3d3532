//! LineCook - a single-document task board with optimistic concurrency
//!
//! LineCook stores one JSON document holding a task list and serves it over
//! HTTP. Clients edit a local copy and propose the whole document back along
//! with the revision they started from. The proposal lands only if that
//! revision is still current; otherwise the caller gets the current document
//! and reconciles.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, resolves config)
//! - [`server`] - HTTP routes, static assets and the accept loop
//! - [`gateway`] - Request validation and the read-then-conditionally-write protocol
//! - [`core`] - Domain types, atomic storage, locking and configuration
//!
//! # Correctness Invariants
//!
//! 1. The revision advances by exactly one per committed write
//! 2. A write based on a stale revision never reaches disk
//! 3. Readers never observe a partially written document
//! 4. Writers are serialized across threads and processes

pub mod cli;
pub mod core;
pub mod gateway;
pub mod server;
