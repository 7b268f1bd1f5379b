//! Core domain types
//!
//! This module contains the core domain structures used across Weaver
//! services. These types represent the fundamental business entities and
//! are shared between the server (which owns the job store) and the CLI
//! (which renders them for humans).

pub mod bundle;
pub mod job;
pub mod log;
pub mod report;
pub mod stage;
