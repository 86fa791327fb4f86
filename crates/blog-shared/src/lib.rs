//! # Blog Shared
//!
//! Wire types exchanged with clients: HTML form submissions and
//! JSON response bodies.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, HealthResponse};
