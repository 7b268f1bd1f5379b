//! Weaver Core
//!
//! Core types and logic for the Weaver generation-job system.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, FileBundle, VerificationReport)
//! - DTOs: Data transfer objects for the server API
//! - Harvester: recovery of structured values from raw LLM output
//! - Verifier: static (no-execution) validation of generated file bundles
//! - Pipelines: stage specifications and prompt rendering
//!
//! Note: HTTP, the job store, and the LLM provider live in weaver-server;
//! this crate performs no I/O.

pub mod domain;
pub mod dto;
pub mod harvest;
pub mod pipeline;
pub mod verify;
