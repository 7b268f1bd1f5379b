//! Service layer
//!
//! Business logic between the HTTP handlers and the job store/runner.

pub mod job;
