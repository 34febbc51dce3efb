//! Verification of identity-provider tokens

mod jwt;

pub use jwt::{Claims, JwtService};
