//! Application services for timekeep.
//!
//! Services are stateless apart from the shared [`EventBus`] handle and
//! operate on any [`EntityStore`], passed in per call as the request's
//! unit of work.
//!
//! [`EventBus`]: timekeep_events::EventBus
//! [`EntityStore`]: timekeep_core::store::EntityStore

pub mod accounts;
pub mod config;
pub mod password;
pub mod report;
pub mod timesheet;
pub mod validation;

pub use accounts::{RegisterUser, UserService, UserView};
pub use config::ServiceConfig;
pub use report::ReportService;
pub use timesheet::TimesheetService;
