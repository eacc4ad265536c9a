//! Web layer for the bus booking server.
//!
//! Serves the JSON API under `/api` and the server-rendered pages.

mod dto;
mod pages;
mod routes;
mod state;
pub mod templates;
mod view;

pub use dto::*;
pub use routes::{AppError, ROLE_HEADER, create_router};
pub use state::AppState;
pub use templates::*;
pub use view::{ResultsQuery, ResultsView};
