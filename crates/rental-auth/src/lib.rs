//! # rental-auth
//!
//! HS256 JWT handling. Tokens are issued by an external identity
//! provider; this crate verifies them and yields the customer identity.
//! The encoder exists for operators and tests that need to mint tokens
//! against the same secret.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
