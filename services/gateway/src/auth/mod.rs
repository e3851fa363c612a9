//! Bearer token resolution and request authentication.
pub mod authenticate;
pub mod cognito;
pub mod request;

pub use authenticate::{AuthOutcome, Authenticator};
pub use cognito::{CognitoTokenResolver, IdentityResolver, OidcError, ResolverSettings};
pub use request::{RequestContext, ResourceIdExtractor};
