//! Gateway HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules plus the shared error and payload types.
pub mod authz;
pub mod bootstrap;
pub mod error;
pub mod openapi;
pub mod system;
pub mod types;
