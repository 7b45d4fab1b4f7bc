//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`fetch`] - Fetch a single tile through the pipeline and save it
//! - [`init`] - Write a default maps.conf
//! - [`sources`] - List configured map sources

pub mod fetch;
pub mod init;
pub mod sources;
