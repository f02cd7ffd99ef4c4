//! Authentication module: password hashing, session tokens and the
//! request guard that resolves them

pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::{extract_token, session_auth_middleware, AuthContext};
pub use password::PasswordHasher;
pub use token::SessionToken;
