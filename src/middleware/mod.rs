pub mod auth;

pub use auth::{authenticate_request, AuthUser, TokenSource, ACCESS_TOKEN_COOKIE};
