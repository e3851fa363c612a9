//! EventHub gateway library crate.
//!
//! # Purpose
//! Exposes the HTTP API surface, Cognito token resolution, configuration, and
//! permission store backends for use by the binary and tests.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod observability;
pub mod store;
