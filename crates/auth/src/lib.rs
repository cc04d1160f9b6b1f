//! `goaltrack-auth` - session boundary.
//!
//! Identity is owned by an external account service. This crate defines the
//! contract the rest of the client relies on (who is signed in, give me a
//! bearer token, tell me when that changes) plus an in-process provider.

pub mod claims;
pub mod local;
pub mod session;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use local::LocalSession;
pub use session::{AuthError, SessionEvent, SessionProvider, SessionUser};
