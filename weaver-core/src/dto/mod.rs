//! Data Transfer Objects for the server API
//!
//! DTOs are lightweight representations of domain entities optimized for
//! the wire: job summaries omit bundles, job details carry file lists and
//! stage summaries instead of full raw stage text.

pub mod job;
pub mod validate;
