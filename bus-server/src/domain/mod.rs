//! Domain types for the bus booking service.
//!
//! Incoming records are validated here before they reach the store, so code
//! that receives a draft type can trust its fields.

mod error;
mod id;
mod route;
mod schedule;
mod user;

pub use error::DomainError;
pub use id::RecordId;
pub use route::{NewRoute, Route, RouteDraft, endpoint_choices};
pub use schedule::{
    DATE_FORMAT, NewSchedule, PriceInput, Schedule, ScheduleDraft, TIME_FORMAT, parse_bus_date,
    parse_departure_time, split_stops,
};
pub use user::{InvalidRole, PublicUser, Role, User};
