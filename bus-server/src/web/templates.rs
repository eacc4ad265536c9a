//! Askama templates for the web frontend.

use askama::Template;

use crate::booking::{BusTypeFilter, Cell, SeatLayout, SortKey};
use crate::domain::{PublicUser, Route, Schedule, parse_bus_date};

use super::view::ResultsView;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Login form.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Signup form.
#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub name: String,
    pub email: String,
    pub error: Option<String>,
}

/// Traveller home page with the search form.
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub search: SearchFormView,
}

/// Search results with filters, bus cards and seat maps.
#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsTemplate {
    pub search: SearchFormView,
    pub filters: Vec<ChoiceView>,
    pub sorts: Vec<ChoiceView>,
    pub error: Option<String>,
    pub buses: Vec<BusCardView>,
}

/// Booking confirmation.
#[derive(Template)]
#[template(path = "confirmation.html")]
pub struct ConfirmationTemplate {
    pub lines: Vec<String>,
    pub back: String,
}

/// Admin console.
#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub tab: AdminTab,
    pub notice: Option<String>,
    pub error: Option<String>,
    pub today: String,
    pub routes: Vec<Route>,
    pub schedules: Vec<ScheduleRowView>,
    pub users: Vec<PublicUser>,
}

impl AdminTemplate {
    /// Tab bar entries, with the open tab selected.
    pub fn tabs(&self) -> Vec<ChoiceView> {
        AdminTab::ALL
            .iter()
            .map(|t| ChoiceView::new(t.as_param(), t.label(), *t == self.tab))
            .collect()
    }

    pub fn is_tab(&self, name: &str) -> bool {
        self.tab.as_param() == name
    }
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// One `<option>` of a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl ChoiceView {
    fn new(value: &str, label: &str, selected: bool) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected,
        }
    }

    /// Options whose value and label are the same text.
    pub fn plain(values: &[String], current: &str) -> Vec<Self> {
        values
            .iter()
            .map(|v| Self::new(v, v, v == current))
            .collect()
    }
}

/// Bus type options, led by "All".
pub fn filter_choices(current: Option<BusTypeFilter>) -> Vec<ChoiceView> {
    std::iter::once(ChoiceView::new("", "All", current.is_none()))
        .chain(
            BusTypeFilter::ALL
                .iter()
                .map(|f| ChoiceView::new(f.as_param(), f.label(), current == Some(*f))),
        )
        .collect()
}

pub fn sort_choices(current: SortKey) -> Vec<ChoiceView> {
    SortKey::ALL
        .iter()
        .map(|k| ChoiceView::new(k.as_param(), k.label(), *k == current))
        .collect()
}

/// The (from, to, date) search form.
#[derive(Debug, Clone)]
pub struct SearchFormView {
    pub from: String,
    pub to: String,
    pub origins: Vec<ChoiceView>,
    pub destinations: Vec<ChoiceView>,
    pub date: String,
    /// Earliest selectable date, `YYYY-MM-DD`
    pub min_date: String,
    /// Hidden fields that keep the current filter and sort
    pub bus_type: String,
    pub sort: String,
}

/// A seat map position.
#[derive(Debug, Clone)]
pub struct SeatCellView {
    pub is_gap: bool,
    pub label: String,
    /// `available`, `sold` or `selected`
    pub class: &'static str,
    /// Toggle link; empty for gaps and sold seats
    pub href: String,
}

impl SeatCellView {
    fn build(cell: &Cell, view: &ResultsView) -> Self {
        let Some(seat) = cell else {
            return Self {
                is_gap: true,
                label: String::new(),
                class: "gap",
                href: String::new(),
            };
        };

        let (class, href) = if seat.is_sold() {
            ("sold", String::new())
        } else if view.picker.selection().contains(seat.id) {
            ("selected", view.toggle_seat(seat).href())
        } else {
            ("available", view.toggle_seat(seat).href())
        };

        Self {
            is_gap: false,
            label: seat.id.to_string(),
            class,
            href,
        }
    }
}

/// One bus card on the results page.
#[derive(Debug, Clone)]
pub struct BusCardView {
    pub id: String,
    pub bus_name: String,
    pub departure_time: String,
    pub start: String,
    pub end: String,
    pub duration: String,
    pub bus_type: String,
    pub price: String,
    pub seats_left: usize,
    pub has_stops: bool,
    pub stops_open: bool,
    pub stops: String,
    pub stops_href: String,
    pub seats_open: bool,
    pub seats_href: String,
    pub seat_rows: Vec<Vec<SeatCellView>>,
    pub selected_count: usize,
    pub selected_seats: String,
    /// Link back to the current view, carried through the booking form
    pub back: String,
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "—".to_string()
    } else {
        s.to_string()
    }
}

impl BusCardView {
    /// Create from a stored schedule and the current view.
    pub fn build(schedule: &Schedule, view: &ResultsView, layout: &SeatLayout) -> Self {
        let seats_open = view.picker.is_open(&schedule.id);
        let stops_open = view.stops.as_ref() == Some(&schedule.id);

        let seat_rows: Vec<Vec<SeatCellView>> = if seats_open {
            layout
                .rows()
                .iter()
                .map(|row| row.iter().map(|cell| SeatCellView::build(cell, view)).collect())
                .collect()
        } else {
            Vec::new()
        };

        let (selected_count, selected_seats) = if seats_open {
            let ids = view.picker.selection().ids();
            let list: Vec<String> = ids.iter().map(u32::to_string).collect();
            (ids.len(), list.join(","))
        } else {
            (0, String::new())
        };

        Self {
            id: schedule.id.to_string(),
            bus_name: schedule.display_name().to_string(),
            departure_time: or_dash(&schedule.departure_time),
            start: schedule.bus_start_location.clone(),
            end: schedule.bus_end_location.clone(),
            duration: or_dash(&schedule.time_duration),
            bus_type: schedule.bus_type.clone(),
            price: format!("₹{}", schedule.bus_price),
            seats_left: layout.available_seats(),
            has_stops: !schedule.stops.is_empty(),
            stops_open,
            stops: schedule.stops.join(" → "),
            stops_href: view.toggle_stops(&schedule.id).href(),
            seats_open,
            seats_href: view.toggle_seats(&schedule.id).href(),
            seat_rows,
            selected_count,
            selected_seats,
            back: view.href(),
        }
    }
}

/// Admin console tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdminTab {
    #[default]
    Dashboard,
    Routes,
    Buses,
    Users,
}

impl AdminTab {
    pub const ALL: [AdminTab; 4] = [
        AdminTab::Dashboard,
        AdminTab::Routes,
        AdminTab::Buses,
        AdminTab::Users,
    ];

    /// Unknown tab names open the dashboard.
    pub fn from_param(s: &str) -> Self {
        match s {
            "routes" => AdminTab::Routes,
            "buses" => AdminTab::Buses,
            "users" => AdminTab::Users,
            _ => AdminTab::Dashboard,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            AdminTab::Dashboard => "dashboard",
            AdminTab::Routes => "routes",
            AdminTab::Buses => "buses",
            AdminTab::Users => "users",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AdminTab::Dashboard => "Dashboard",
            AdminTab::Routes => "Manage Routes",
            AdminTab::Buses => "Bus Scheduling",
            AdminTab::Users => "User Management",
        }
    }
}

/// A schedule row in the admin bus table.
#[derive(Debug, Clone)]
pub struct ScheduleRowView {
    pub id: String,
    pub bus_name: String,
    pub date: String,
    pub departure_time: String,
    pub bus_type: String,
    pub start: String,
    pub end: String,
    pub duration: String,
    pub price: String,
}

impl ScheduleRowView {
    pub fn from_schedule(schedule: &Schedule) -> Self {
        // Day-first for display; unparseable legacy dates are shown as stored
        let date = parse_bus_date(&schedule.bus_date)
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|_| schedule.bus_date.clone());

        Self {
            id: schedule.id.to_string(),
            bus_name: schedule.display_name().to_string(),
            date,
            departure_time: or_dash(&schedule.departure_time),
            bus_type: schedule.bus_type.clone(),
            start: schedule.bus_start_location.clone(),
            end: schedule.bus_end_location.clone(),
            duration: or_dash(&schedule.time_duration),
            price: format!("₹{}", schedule.bus_price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::SeatPicker;
    use crate::domain::RecordId;

    fn schedule() -> Schedule {
        Schedule {
            id: RecordId::from("b1"),
            bus_name: "Green Line".into(),
            departure_time: "06:00".into(),
            bus_date: "2030-01-15".into(),
            bus_start_location: "Pune".into(),
            bus_end_location: "Goa".into(),
            time_duration: "9h".into(),
            bus_type: "AC Sleeper".into(),
            bus_price: 899.5,
            stops: vec!["Satara".into(), "Kolhapur".into()],
        }
    }

    #[test]
    fn closed_card_has_no_seat_rows() {
        let layout = SeatLayout::generate();
        let card = BusCardView::build(&schedule(), &ResultsView::default(), &layout);

        assert!(!card.seats_open);
        assert!(card.seat_rows.is_empty());
        assert_eq!(card.seats_left, 42);
        assert_eq!(card.price, "₹899.5");
        assert_eq!(card.stops, "Satara → Kolhapur");
        assert!(card.seats_href.contains("bus=b1"));
    }

    #[test]
    fn open_card_marks_seat_classes() {
        let layout = SeatLayout::generate();
        let view = ResultsView {
            picker: SeatPicker::restore(Some(RecordId::from("b1")), [3], &layout),
            ..Default::default()
        };
        let card = BusCardView::build(&schedule(), &view, &layout);

        let cells: Vec<&SeatCellView> = card.seat_rows.iter().flatten().collect();
        let class_of = |label: &str| {
            cells
                .iter()
                .find(|c| c.label == label)
                .map(|c| c.class)
                .unwrap()
        };

        assert_eq!(class_of("3"), "selected");
        assert_eq!(class_of("7"), "sold");
        assert_eq!(class_of("8"), "available");
        assert_eq!(cells.iter().filter(|c| c.is_gap).count(), 11);
        assert_eq!(card.selected_count, 1);
        assert_eq!(card.selected_seats, "3");
    }

    #[test]
    fn sold_seats_have_no_link() {
        let layout = SeatLayout::generate();
        let view = ResultsView {
            picker: SeatPicker::restore(Some(RecordId::from("b1")), [], &layout),
            ..Default::default()
        };
        let card = BusCardView::build(&schedule(), &view, &layout);
        let sold = card
            .seat_rows
            .iter()
            .flatten()
            .find(|c| c.label == "14")
            .unwrap();
        assert!(sold.href.is_empty());
    }

    #[test]
    fn missing_fields_show_placeholders() {
        let bare = Schedule {
            id: RecordId::from("x"),
            ..Default::default()
        };
        let row = ScheduleRowView::from_schedule(&bare);
        assert_eq!(row.bus_name, "Unknown");
        assert_eq!(row.departure_time, "—");
        assert_eq!(row.date, "");
    }

    #[test]
    fn admin_row_formats_date_day_first() {
        let row = ScheduleRowView::from_schedule(&schedule());
        assert_eq!(row.date, "15/01/2030");
    }

    #[test]
    fn filter_choices_lead_with_all() {
        let choices = filter_choices(Some(BusTypeFilter::Sleeper));
        assert_eq!(choices[0].label, "All");
        assert!(!choices[0].selected);
        assert_eq!(choices.iter().filter(|c| c.selected).count(), 1);
        assert!(choices.iter().any(|c| c.value == "sleeper" && c.selected));
    }

    #[test]
    fn admin_tab_falls_back_to_dashboard() {
        assert_eq!(AdminTab::from_param("users"), AdminTab::Users);
        assert_eq!(AdminTab::from_param("settings"), AdminTab::Dashboard);
    }
}
