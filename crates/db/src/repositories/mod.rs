//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (reads, standalone writes) or an open transaction
//! (writes applied as part of a store commit).

pub mod category_repo;
pub mod client_repo;
pub mod project_repo;
pub mod timesheet_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use client_repo::ClientRepo;
pub use project_repo::ProjectRepo;
pub use timesheet_repo::TimesheetRepo;
pub use user_repo::UserRepo;
