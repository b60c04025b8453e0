//! # vital-auth
//!
//! Token acquisition for the vendor measurement engine.
//!
//! The engine authenticates with a short-lived token minted by the vendor's
//! token endpoint from the license key and study id. [`TokenClient`] performs
//! that exchange; [`TokenProvider`] is the seam the session bootstrap depends on.

pub mod client;
pub mod error;
mod http;
pub mod token;

pub use client::{TokenClient, TokenProvider};
pub use error::AuthError;
pub use token::SessionToken;
