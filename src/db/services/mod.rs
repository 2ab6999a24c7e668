//! The `services` module provides a high-level API for interacting with the database.
//! It encapsulates the query logic and data access patterns, allowing the HTTP
//! handlers to work with entity models without building queries themselves.
//!
//! Every lookup of a user-owned row filters on the owner, so a row belonging to
//! someone else is indistinguishable from a missing one.
//! All public items from the sub-modules are re-exported here for convenient access
//! under the `crate::db::services::` path.

pub mod ingredient_service;
pub mod recipe_service;
pub mod tag_service;
pub mod user_service;

pub use ingredient_service::*;
pub use recipe_service::*;
pub use tag_service::*;
pub use user_service::*;
