//! The bus search and seat selection flow.
//!
//! Search by exact (from, to, date), narrow and order the results, pick
//! seats on the fixed layout, and confirm. Only search touches the store;
//! the rest are pure transforms over values passed in.

mod confirm;
mod listing;
mod search;
mod seats;

pub use confirm::{BookingError, Confirmation, confirm, confirm_seat_ids};
pub use listing::{BusTypeFilter, ListingOptions, SortKey, filter_and_sort};
pub use search::{SearchError, SearchQuery, search};
pub use seats::{
    COLUMNS, Cell, ROWS, Seat, SeatLayout, SeatPicker, SeatSelection, SeatStatus, seat_status,
};
