//! EventHub authorization primitives shared by the gateway and record handlers.
//!
//! # Purpose
//! Holds the role model, the resource/action table, permission records and
//! their storage contract, the permission evaluator, and permission seeding.
//!
//! # How it fits
//! The gateway resolves a bearer credential into an [`Identity`], then asks a
//! [`PermissionEvaluator`] whether that identity may act on a resource. The
//! evaluator reads seeded [`PermissionRecord`]s from a [`PermissionStore`] or,
//! when no store is configured, the built-in [`FallbackMatrix`].
//!
//! # Key invariants
//! - Seeded records and the fallback matrix are both generated from
//!   [`rules`], so they agree for every role and table entry.
//! - At most one record exists per `(resource, action, role)`.
//! - Evaluation fails closed: unknown pairs, missing records, and store errors deny.
//!
//! # Examples
//! ```rust
//! use eventhub_authz::{Conditions, Identity, Role};
//!
//! let identity = Identity::new("u1", vec!["volunteer".to_string(), "admin".to_string()]);
//! assert_eq!(identity.role, Role::Admin);
//! assert!(Conditions::OWN_ONLY.evaluate("u1", Some("u1")).is_allowed());
//! ```
//!
//! # Common pitfalls
//! - `assigned_only` checks only that a resource id is present. Handlers must
//!   scope their own queries to the assignee.

mod action;
mod conditions;
mod decision;
mod errors;
mod evaluator;
mod identity;
mod matrix;
mod permission;
mod resource;
mod role;
pub mod rules;
mod seed;
mod store;

pub use action::Action;
pub use conditions::Conditions;
pub use decision::{Decision, DenyReason};
pub use errors::{AuthzError, AuthzResult};
pub use evaluator::PermissionEvaluator;
pub use identity::{AuthContext, Identity};
pub use matrix::{FallbackMatrix, MatrixEntry};
pub use permission::{PermissionKey, PermissionRecord};
pub use resource::Resource;
pub use role::{ROLE_HIERARCHY, Role};
pub use seed::{SeedReport, default_permissions, seed_permissions, write_batched};
pub use store::{MAX_BATCH_SIZE, PermissionStore, PermissionStoreError, PermissionStoreResult};
