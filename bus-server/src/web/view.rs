//! Results page state carried in the query string.
//!
//! Each page link is the current view with one transition applied, so the
//! browser's address bar is the only place this state lives.

use serde::Deserialize;
use urlencoding::encode;

use crate::booking::{
    BusTypeFilter, ListingOptions, SearchQuery, Seat, SeatLayout, SeatPicker, SortKey,
};
use crate::domain::RecordId;

/// Raw `/results` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub bus_type: Option<String>,
    pub sort: Option<String>,
    /// Schedule whose seat map is open
    pub bus: Option<String>,
    /// Comma-separated seat ids picked on `bus`
    pub seats: Option<String>,
    /// Schedule whose stops are shown
    pub stops: Option<String>,
}

/// The results page view model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsView {
    pub from: String,
    pub to: String,
    pub date: String,
    pub filter: Option<BusTypeFilter>,
    pub sort: SortKey,
    pub picker: SeatPicker,
    pub stops: Option<RecordId>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Parse `"3,12"` into seat ids, skipping anything that is not a number.
pub fn parse_seat_list(s: &str) -> Vec<u32> {
    s.split(',').filter_map(|p| p.trim().parse().ok()).collect()
}

impl ResultsView {
    /// Rebuild the view from query parameters. Seats that are sold or not
    /// on the layout are dropped.
    pub fn from_query(query: ResultsQuery, layout: &SeatLayout) -> Self {
        let bus = non_empty(query.bus).map(RecordId::from);
        let seat_ids = query.seats.as_deref().map(parse_seat_list).unwrap_or_default();

        Self {
            from: query.from.unwrap_or_default(),
            to: query.to.unwrap_or_default(),
            date: query.date.unwrap_or_default(),
            filter: query.bus_type.as_deref().and_then(BusTypeFilter::from_param),
            sort: query.sort.as_deref().map(SortKey::from_param).unwrap_or_default(),
            picker: SeatPicker::restore(bus, seat_ids, layout),
            stops: non_empty(query.stops).map(RecordId::from),
        }
    }

    /// The search to run, if all three fields are filled in.
    pub fn search_query(&self) -> Option<SearchQuery> {
        let query = SearchQuery::new(&self.from, &self.to, &self.date);
        query.validate().ok().map(|()| query)
    }

    pub fn listing(&self) -> ListingOptions {
        ListingOptions::new(self.filter, Some(self.sort))
    }

    /// Open or close the seat map of `id`. Any picked seats are dropped.
    pub fn toggle_seats(&self, id: &RecordId) -> Self {
        let mut next = self.clone();
        next.picker = std::mem::take(&mut next.picker).toggle_schedule(id);
        next
    }

    /// Pick or unpick a seat on the open seat map.
    pub fn toggle_seat(&self, seat: &Seat) -> Self {
        let mut next = self.clone();
        next.picker = std::mem::take(&mut next.picker).toggle_seat(seat);
        next
    }

    /// Show or hide the stops of `id`.
    pub fn toggle_stops(&self, id: &RecordId) -> Self {
        let mut next = self.clone();
        next.stops = if self.stops.as_ref() == Some(id) {
            None
        } else {
            Some(id.clone())
        };
        next
    }

    /// Encoded query string, without the leading `?`.
    pub fn query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = vec![
            ("from", self.from.clone()),
            ("to", self.to.clone()),
            ("date", self.date.clone()),
        ];
        if let Some(filter) = self.filter {
            pairs.push(("type", filter.as_param().to_string()));
        }
        pairs.push(("sort", self.sort.as_param().to_string()));
        if let Some(bus) = self.picker.schedule() {
            pairs.push(("bus", bus.to_string()));
            let selection = self.picker.selection();
            if !selection.is_empty() {
                let ids: Vec<String> = selection.ids().iter().map(u32::to_string).collect();
                pairs.push(("seats", ids.join(",")));
            }
        }
        if let Some(stops) = &self.stops {
            pairs.push(("stops", stops.to_string()));
        }

        pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Link to this view.
    pub fn href(&self) -> String {
        format!("/results?{}", self.query_string())
    }
}
