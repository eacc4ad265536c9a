//! Seat layout and seat selection.
//!
//! The layout is a fixed 5 x 12 grid. Rows 1, 2, 4 and 5 are full; row 3
//! holds a single seat in the last column and gaps elsewhere. Seats are
//! numbered row-major from 1, skipping gaps, which gives 49 seats.
//!
//! Occupancy is a pure function of the seat number (every seventh seat is
//! sold). It is not read from any booking ledger, so the same layout is
//! produced for every schedule and every request.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::RecordId;

/// Rows in the layout.
pub const ROWS: u32 = 5;

/// Columns in every row.
pub const COLUMNS: u32 = 12;

/// The row (1-based) that holds a single seat in its last column.
const SPARSE_ROW: u32 = 3;

/// Every seat whose number is a multiple of this is sold.
const SOLD_EVERY: u32 = 7;

/// Seat status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Sold,
}

impl SeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Available => "available",
            SeatStatus::Sold => "sold",
        }
    }
}

/// The occupancy rule.
pub fn seat_status(seat_id: u32) -> SeatStatus {
    if seat_id % SOLD_EVERY == 0 {
        SeatStatus::Sold
    } else {
        SeatStatus::Available
    }
}

/// A numbered seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Seat {
    pub id: u32,
    pub status: SeatStatus,
}

impl Seat {
    fn numbered(id: u32) -> Self {
        Self {
            id,
            status: seat_status(id),
        }
    }

    pub fn is_sold(&self) -> bool {
        self.status == SeatStatus::Sold
    }
}

/// One grid position: a seat or a gap.
pub type Cell = Option<Seat>;

/// The seat grid, row by row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SeatLayout {
    rows: Vec<Vec<Cell>>,
}

impl SeatLayout {
    /// Build the layout. Always returns the same grid.
    pub fn generate() -> Self {
        let mut next_id = 1;
        let rows = (1..=ROWS)
            .map(|row| {
                (1..=COLUMNS)
                    .map(|col| {
                        if row == SPARSE_ROW && col != COLUMNS {
                            return None;
                        }
                        let seat = Seat::numbered(next_id);
                        next_id += 1;
                        Some(seat)
                    })
                    .collect::<Vec<Cell>>()
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// All seats in numbering order.
    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.rows.iter().flatten().flatten()
    }

    pub fn seat(&self, id: u32) -> Option<Seat> {
        self.seats().find(|s| s.id == id).copied()
    }

    pub fn total_seats(&self) -> usize {
        self.seats().count()
    }

    pub fn sold_seats(&self) -> usize {
        self.seats().filter(|s| s.is_sold()).count()
    }

    /// Total seats minus sold seats.
    pub fn available_seats(&self) -> usize {
        self.total_seats() - self.sold_seats()
    }
}

impl Default for SeatLayout {
    fn default() -> Self {
        Self::generate()
    }
}

/// A set of selected seat ids. Never contains a sold seat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatSelection {
    seats: BTreeSet<u32>,
}

impl SeatSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select an available seat, or deselect it if already selected.
    ///
    /// Sold seats are ignored. Returns whether the selection changed.
    pub fn toggle(&mut self, seat: &Seat) -> bool {
        if seat.is_sold() {
            return false;
        }
        if !self.seats.remove(&seat.id) {
            self.seats.insert(seat.id);
        }
        true
    }

    /// Rebuild a selection from raw ids, dropping any that are not
    /// available seats of `layout`.
    pub fn from_ids(ids: impl IntoIterator<Item = u32>, layout: &SeatLayout) -> Self {
        let seats = ids
            .into_iter()
            .filter(|id| layout.seat(*id).is_some_and(|s| !s.is_sold()))
            .collect();
        Self { seats }
    }

    pub fn contains(&self, seat_id: u32) -> bool {
        self.seats.contains(&seat_id)
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> Vec<u32> {
        self.seats.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.seats.clear();
    }
}

/// Which schedule's seat map is open, and the seats picked on it.
///
/// Transitions consume the picker and return the next state. Opening or
/// closing a schedule always starts from an empty selection, so picks never
/// carry across schedules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatPicker {
    schedule: Option<RecordId>,
    selection: SeatSelection,
}

impl SeatPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a picker from carried state. Without an open schedule the
    /// selection is empty.
    pub fn restore(
        schedule: Option<RecordId>,
        seat_ids: impl IntoIterator<Item = u32>,
        layout: &SeatLayout,
    ) -> Self {
        let selection = match schedule {
            Some(_) => SeatSelection::from_ids(seat_ids, layout),
            None => SeatSelection::new(),
        };
        Self {
            schedule,
            selection,
        }
    }

    /// Open the seat map for `id`, or close it if it is already open.
    pub fn toggle_schedule(self, id: &RecordId) -> Self {
        let schedule = if self.schedule.as_ref() == Some(id) {
            None
        } else {
            Some(id.clone())
        };
        Self {
            schedule,
            selection: SeatSelection::new(),
        }
    }

    /// Toggle a seat on the open schedule. No-op when nothing is open.
    pub fn toggle_seat(mut self, seat: &Seat) -> Self {
        if self.schedule.is_some() {
            self.selection.toggle(seat);
        }
        self
    }

    pub fn schedule(&self) -> Option<&RecordId> {
        self.schedule.as_ref()
    }

    pub fn is_open(&self, id: &RecordId) -> bool {
        self.schedule.as_ref() == Some(id)
    }

    pub fn selection(&self) -> &SeatSelection {
        &self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_has_49_seats_numbered_in_order() {
        let layout = SeatLayout::generate();
        assert_eq!(layout.total_seats(), 49);

        let ids: Vec<u32> = layout.seats().map(|s| s.id).collect();
        assert_eq!(ids, (1..=49).collect::<Vec<_>>());
    }

    #[test]
    fn layout_geometry() {
        let layout = SeatLayout::generate();
        let rows = layout.rows();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.len() == 12));

        // Row 3: gaps then one seat, numbered right after row 2.
        assert!(rows[2][..11].iter().all(Option::is_none));
        assert_eq!(rows[2][11].map(|s| s.id), Some(25));

        assert_eq!(rows[0][0].map(|s| s.id), Some(1));
        assert_eq!(rows[1][11].map(|s| s.id), Some(24));
        assert_eq!(rows[3][0].map(|s| s.id), Some(26));
        assert_eq!(rows[4][11].map(|s| s.id), Some(49));
    }

    #[test]
    fn every_seventh_seat_is_sold() {
        let layout = SeatLayout::generate();
        let sold: Vec<u32> = layout.seats().filter(|s| s.is_sold()).map(|s| s.id).collect();
        assert_eq!(sold, vec![7, 14, 21, 28, 35, 42, 49]);
        assert_eq!(layout.sold_seats(), 7);
        assert_eq!(layout.available_seats(), 42);
    }

    #[test]
    fn generate_is_deterministic() {
        assert_eq!(SeatLayout::generate(), SeatLayout::generate());
    }

    #[test]
    fn layout_serializes_gaps_as_null() {
        let json = serde_json::to_value(SeatLayout::generate()).unwrap();
        assert_eq!(json[0][0]["id"], 1);
        assert_eq!(json[0][6]["status"], "sold");
        assert!(json[2][0].is_null());
        assert_eq!(json[2][11]["id"], 25);
    }

    #[test]
    fn toggling_sold_seat_is_a_no_op() {
        let layout = SeatLayout::generate();
        let sold = layout.seat(14).unwrap();

        let mut selection = SeatSelection::new();
        assert!(!selection.toggle(&sold));
        assert!(selection.is_empty());
    }

    #[test]
    fn toggling_twice_restores_selection() {
        let layout = SeatLayout::generate();
        let mut selection = SeatSelection::new();
        selection.toggle(&layout.seat(3).unwrap());
        let before = selection.clone();

        let seat = layout.seat(10).unwrap();
        selection.toggle(&seat);
        assert!(selection.contains(10));
        selection.toggle(&seat);

        assert_eq!(selection, before);
    }

    #[test]
    fn from_ids_drops_sold_and_unknown_seats() {
        let layout = SeatLayout::generate();
        let selection = SeatSelection::from_ids([5, 7, 50, 0, 5, 12], &layout);
        assert_eq!(selection.ids(), vec![5, 12]);
    }

    #[test]
    fn switching_schedule_resets_selection() {
        let layout = SeatLayout::generate();
        let a = RecordId::from("a");
        let b = RecordId::from("b");

        let picker = SeatPicker::new()
            .toggle_schedule(&a)
            .toggle_seat(&layout.seat(1).unwrap())
            .toggle_seat(&layout.seat(2).unwrap());
        assert_eq!(picker.selection().ids(), vec![1, 2]);

        let picker = picker.toggle_schedule(&b);
        assert!(picker.is_open(&b));
        assert!(picker.selection().is_empty());

        // Closing the open schedule also clears it.
        let picker = picker
            .toggle_seat(&layout.seat(3).unwrap())
            .toggle_schedule(&b);
        assert_eq!(picker.schedule(), None);
        assert!(picker.selection().is_empty());
    }

    #[test]
    fn seats_need_an_open_schedule() {
        let layout = SeatLayout::generate();
        let picker = SeatPicker::new().toggle_seat(&layout.seat(1).unwrap());
        assert!(picker.selection().is_empty());

        let restored = SeatPicker::restore(None, [1, 2], &layout);
        assert!(restored.selection().is_empty());

        let restored = SeatPicker::restore(Some(RecordId::from("a")), [1, 7], &layout);
        assert_eq!(restored.selection().ids(), vec![1]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn selection_never_holds_sold_seats(ids in prop::collection::vec(1u32..=49, 0..40)) {
            let layout = SeatLayout::generate();
            let mut selection = SeatSelection::new();
            for id in ids {
                selection.toggle(&layout.seat(id).unwrap());
            }
            for id in selection.ids() {
                prop_assert_ne!(id % 7, 0);
            }
        }

        #[test]
        fn toggle_sequence_is_order_insensitive(ids in prop::collection::vec(1u32..=49, 0..40)) {
            let layout = SeatLayout::generate();
            let apply = |ids: &[u32]| {
                let mut selection = SeatSelection::new();
                for id in ids {
                    selection.toggle(&layout.seat(*id).unwrap());
                }
                selection
            };

            let mut reversed = ids.clone();
            reversed.reverse();
            prop_assert_eq!(apply(&ids), apply(&reversed));
        }
    }
}
