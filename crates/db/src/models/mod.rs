//! Database row structs.
//!
//! Each submodule contains a `FromRow` struct matching the table row and a
//! `From` conversion into the corresponding `timekeep_core::models` value.
//! Audit columns (`created_at`, `updated_at`) stop at this layer.

pub mod category;
pub mod client;
pub mod project;
pub mod timesheet;
pub mod user;
