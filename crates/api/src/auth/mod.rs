//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation. The token
//!   subject is the creator's wallet address.

pub mod jwt;
