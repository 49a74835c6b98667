//! Member authentication
//!
//! HS256 JWTs for access and refresh, argon2 for stored passwords, and an
//! extractor that turns a bearer token into a [`MemberSession`].

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtService, TokenType};
pub use middleware::{bearer_token, MemberSession};
pub use password::PasswordService;
