pub mod cookie;
pub mod middleware;
pub mod password;
pub mod token;

pub use self::cookie::{session_cookie, session_cookie_removal, SESSION_COOKIE};
pub use middleware::{require_session, AuthenticatedUser};
pub use password::{PasswordError, PasswordHasher};
pub use token::{generate_session_token, verify_session_token, SessionClaims, TokenError};
