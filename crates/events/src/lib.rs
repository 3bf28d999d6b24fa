//! timekeep domain events.
//!
//! Services publish a typed [`DomainEvent`] on the shared [`EventBus`] after
//! each successful commit. Subscribers receive it wrapped in an
//! [`Envelope`]; [`EventLogger`] is the built-in subscriber that logs them.

pub mod bus;
pub mod logger;

pub use bus::{DomainEvent, Envelope, EventBus};
pub use logger::EventLogger;
