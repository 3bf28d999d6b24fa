//! Domain types and pure logic for timekeep.
//!
//! This crate has no database dependency. Store access goes through the
//! [`store::EntityStore`] trait, implemented over PostgreSQL in
//! `timekeep-db` and in memory by [`store::memory::MemoryStore`].

pub mod error;
pub mod models;
pub mod references;
pub mod report;
pub mod store;
pub mod timesheet;
pub mod types;
