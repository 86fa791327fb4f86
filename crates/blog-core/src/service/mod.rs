//! Application services composing the ports into use cases.

mod accounts;
mod posts;

pub use accounts::AccountService;
pub use posts::PostStore;
