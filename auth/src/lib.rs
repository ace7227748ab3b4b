//! Pluggable identity for the HTTP surface.
//!
//! Two interchangeable strategies implement [`AuthProvider`]: stateless
//! RS256 bearer tokens ([`TokenProvider`]) and server-side cookie sessions
//! ([`SessionProvider`]). [`RoleGate`] sits in front of protected routes and
//! consults whichever provider the server was started with.

pub mod error;
pub mod gate;
pub mod provider;
pub mod session;
pub mod token;
pub mod types;
pub mod verify;

pub use error::{AuthError, Result};
pub use gate::{require_role, Denial, RoleGate, MSG_NOT_LOGGED_IN, MSG_NO_PERMISSION};
pub use provider::{AuthProvider, LoginReply};
pub use session::{SessionProvider, SESSION_USER_KEY};
pub use token::{Claims, TokenProvider, TOKEN_VALIDITY_HOURS};
pub use types::{User, ADMIN, DEFAULT};
pub use verify::secure_compare;
