//! # Blog Core
//!
//! The domain layer of the blog.
//! Post lifecycle and visibility rules, plus the ports that infrastructure
//! must implement. This crate performs no I/O.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::DomainError;
pub use service::{AccountService, PostStore};
