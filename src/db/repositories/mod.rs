//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the storage operations for one entity.

pub mod sweet;
pub mod user;

pub use sweet::{SqlxSweetRepository, SweetRepository};
pub use user::{SqlxUserRepository, UserRepository};
