//! Permission store backends.
//!
//! Both backends implement [`eventhub_authz::PermissionStore`]. The gateway
//! runs without a store when none is configured and the evaluator falls back
//! to the built-in matrix.
pub mod memory;
pub mod postgres;
