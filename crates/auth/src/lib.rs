//! `folio-auth` — authentication/authorization core.
//!
//! Decoupled from HTTP: the transport hands in the raw `Authorization` value,
//! the method and the route's [`AccessRequirement`]; storage is reached only
//! through [`IdentityStore`].

pub mod authorize;
pub mod claims;
pub mod codec;
pub mod permissions;
pub mod principal;
pub mod resolver;
pub mod roles;
pub mod user;

pub use authorize::{
    bearer_token, decide_access, AccessEngine, AccessRequest, AccessRequirement, Authorization, Grant,
};
pub use claims::{validate_claims, SessionClaim, TokenValidationError, ISSUED_AT_LEEWAY_SECS};
pub use codec::{decode, Hs256SessionCodec, SessionCodec, DEFAULT_SESSION_TTL_SECS};
pub use permissions::{HttpMethod, MatrixParseError, PermissionMatrix, Resource, UnsupportedMethod};
pub use principal::Principal;
pub use resolver::{IdentityStore, PermissionResolver, ResolveError, RoleRecord, UserRecord};
pub use roles::{Role, RoleName, UnknownRoleName};
pub use user::{User, UserPatch};
