//! Booking confirmation.
//!
//! Confirming only produces a message. Nothing is persisted and no seat is
//! held, so two travellers can confirm the same seats on the same schedule.

use serde::Serialize;
use tracing::info;

use crate::domain::{RecordId, Schedule};

use super::seats::{SeatLayout, SeatSelection};

/// Error from booking confirmation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    /// No seats were selected
    #[error("Select at least one seat")]
    NoSeats,

    /// The seat number is not part of the layout
    #[error("seat {0} does not exist")]
    UnknownSeat(u32),

    /// The seat is sold and cannot be selected
    #[error("seat {0} is already sold")]
    SeatSold(u32),
}

/// A confirmed (but unrecorded) booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub schedule_id: RecordId,
    pub bus_name: String,
    pub seats: Vec<u32>,
    pub message: String,
}

/// Confirm a validated selection on a schedule.
pub fn confirm(schedule: &Schedule, selection: &SeatSelection) -> Result<Confirmation, BookingError> {
    if selection.is_empty() {
        return Err(BookingError::NoSeats);
    }

    let seats = selection.ids();
    let seat_list = seats
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let message = format!(
        "Booking confirmed for Bus: {}\nSeats: {}",
        schedule.display_name(),
        seat_list
    );

    info!(schedule = %schedule.id, seats = %seat_list, "booking confirmed");

    Ok(Confirmation {
        schedule_id: schedule.id.clone(),
        bus_name: schedule.display_name().to_string(),
        seats,
        message,
    })
}

/// Confirm raw seat ids sent by a client.
///
/// Every id must be an available seat of `layout`; duplicates collapse.
pub fn confirm_seat_ids(
    schedule: &Schedule,
    seat_ids: &[u32],
    layout: &SeatLayout,
) -> Result<Confirmation, BookingError> {
    if seat_ids.is_empty() {
        return Err(BookingError::NoSeats);
    }

    for &id in seat_ids {
        let seat = layout.seat(id).ok_or(BookingError::UnknownSeat(id))?;
        if seat.is_sold() {
            return Err(BookingError::SeatSold(id));
        }
    }

    let selection = SeatSelection::from_ids(seat_ids.iter().copied(), layout);
    confirm(schedule, &selection)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(name: &str) -> Schedule {
        Schedule {
            id: RecordId::from("s1"),
            bus_name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn message_names_bus_and_seats() {
        let layout = SeatLayout::generate();
        let selection = SeatSelection::from_ids([12, 3], &layout);

        let confirmation = confirm(&schedule("Green Line"), &selection).unwrap();
        assert_eq!(
            confirmation.message,
            "Booking confirmed for Bus: Green Line\nSeats: 3, 12"
        );
        assert_eq!(confirmation.seats, vec![3, 12]);
        assert_eq!(confirmation.schedule_id, RecordId::from("s1"));
    }

    #[test]
    fn unnamed_bus_is_unknown() {
        let layout = SeatLayout::generate();
        let selection = SeatSelection::from_ids([1], &layout);
        let confirmation = confirm(&schedule(""), &selection).unwrap();
        assert!(confirmation.message.starts_with("Booking confirmed for Bus: Unknown"));
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert_eq!(
            confirm(&schedule("X"), &SeatSelection::new()),
            Err(BookingError::NoSeats)
        );
        assert_eq!(
            confirm_seat_ids(&schedule("X"), &[], &SeatLayout::generate()),
            Err(BookingError::NoSeats)
        );
    }

    #[test]
    fn raw_ids_must_be_available_seats() {
        let layout = SeatLayout::generate();
        assert_eq!(
            confirm_seat_ids(&schedule("X"), &[1, 21], &layout),
            Err(BookingError::SeatSold(21))
        );
        assert_eq!(
            confirm_seat_ids(&schedule("X"), &[50], &layout),
            Err(BookingError::UnknownSeat(50))
        );

        let confirmation = confirm_seat_ids(&schedule("X"), &[4, 4, 2], &layout).unwrap();
        assert_eq!(confirmation.seats, vec![2, 4]);
    }

    #[test]
    fn same_seats_can_be_confirmed_twice() {
        let layout = SeatLayout::generate();
        let first = confirm_seat_ids(&schedule("X"), &[5], &layout).unwrap();
        let second = confirm_seat_ids(&schedule("X"), &[5], &layout).unwrap();
        assert_eq!(first, second);
    }
}
