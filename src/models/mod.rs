//! Domain models
//!
//! Entities and input types for the sweetshop backend.

pub mod sweet;
pub mod user;

pub use sweet::{Sweet, SweetFilter, SweetInput, SweetUpdate};
pub use user::User;
