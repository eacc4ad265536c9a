//! Narrowing and ordering of search results.
//!
//! Runs over a result set that is already in memory: filter by bus type,
//! then a stable sort on one key.

use std::cmp::Ordering;

use crate::domain::Schedule;

/// Bus type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusTypeFilter {
    /// Normalized type is exactly "ac"
    Ac,
    /// Normalized type is exactly "non-ac"
    NonAc,
    /// Normalized type contains "sleeper"
    Sleeper,
    /// Normalized type contains "seater"
    Seater,
}

impl BusTypeFilter {
    pub const ALL: [BusTypeFilter; 4] = [
        BusTypeFilter::Ac,
        BusTypeFilter::NonAc,
        BusTypeFilter::Sleeper,
        BusTypeFilter::Seater,
    ];

    /// Parse a filter parameter. Unrecognized values mean "no filter".
    pub fn from_param(s: &str) -> Option<Self> {
        match s {
            "ac" => Some(BusTypeFilter::Ac),
            "non-ac" => Some(BusTypeFilter::NonAc),
            "sleeper" => Some(BusTypeFilter::Sleeper),
            "seater" => Some(BusTypeFilter::Seater),
            _ => None,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            BusTypeFilter::Ac => "ac",
            BusTypeFilter::NonAc => "non-ac",
            BusTypeFilter::Sleeper => "sleeper",
            BusTypeFilter::Seater => "seater",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BusTypeFilter::Ac => "AC",
            BusTypeFilter::NonAc => "Non-AC",
            BusTypeFilter::Sleeper => "Sleeper",
            BusTypeFilter::Seater => "Seater",
        }
    }

    /// Whether a bus type passes this filter.
    pub fn matches(&self, bus_type: &str) -> bool {
        let normalized = normalize_bus_type(bus_type);
        match self {
            BusTypeFilter::Ac => normalized == "ac",
            BusTypeFilter::NonAc => normalized == "non-ac",
            BusTypeFilter::Sleeper => normalized.contains("sleeper"),
            BusTypeFilter::Seater => normalized.contains("seater"),
        }
    }
}

/// Remove all whitespace and lower-case.
fn normalize_bus_type(bus_type: &str) -> String {
    bus_type
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Sort key for results. All orders are ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Departure time, compared as text (HH:MM is fixed-width)
    #[default]
    Time,
    /// Duration, compared as raw text
    Duration,
    /// Price, compared numerically
    Price,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Time, SortKey::Duration, SortKey::Price];

    /// Parse a sort parameter. Unrecognized values fall back to departure
    /// time.
    pub fn from_param(s: &str) -> Self {
        match s {
            "duration" => SortKey::Duration,
            "price" => SortKey::Price,
            _ => SortKey::Time,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            SortKey::Time => "time",
            SortKey::Duration => "duration",
            SortKey::Price => "price",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Time => "Earliest Departure",
            SortKey::Duration => "Shortest Duration",
            SortKey::Price => "Lowest Price",
        }
    }

    /// Compare two schedules on this key.
    ///
    /// A field missing from a stored document loads as the empty string and
    /// therefore sorts first.
    pub fn compare(&self, a: &Schedule, b: &Schedule) -> Ordering {
        match self {
            SortKey::Time => a.departure_time.cmp(&b.departure_time),
            SortKey::Duration => a.time_duration.cmp(&b.time_duration),
            SortKey::Price => a.bus_price.total_cmp(&b.bus_price),
        }
    }
}

/// Filter and sort configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingOptions {
    pub filter: Option<BusTypeFilter>,
    /// `None` keeps the input order.
    pub sort: Option<SortKey>,
}

impl ListingOptions {
    pub fn new(filter: Option<BusTypeFilter>, sort: Option<SortKey>) -> Self {
        Self { filter, sort }
    }

    /// Build options from raw `type` and `sort` parameters.
    pub fn from_params(filter: Option<&str>, sort: Option<&str>) -> Self {
        Self {
            filter: filter.and_then(BusTypeFilter::from_param),
            sort: sort.map(SortKey::from_param),
        }
    }
}

/// Apply the filter, then a stable sort.
///
/// Ties keep their input order.
pub fn filter_and_sort(schedules: &[Schedule], options: &ListingOptions) -> Vec<Schedule> {
    let mut result: Vec<Schedule> = schedules
        .iter()
        .filter(|s| options.filter.is_none_or(|f| f.matches(&s.bus_type)))
        .cloned()
        .collect();

    if let Some(key) = options.sort {
        result.sort_by(|a, b| key.compare(a, b));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordId;

    fn bus(id: &str, bus_type: &str, time: &str, duration: &str, price: f64) -> Schedule {
        Schedule {
            id: RecordId::from(id),
            bus_name: format!("Bus {id}"),
            departure_time: time.into(),
            bus_type: bus_type.into(),
            time_duration: duration.into(),
            bus_price: price,
            ..Default::default()
        }
    }

    fn ids(schedules: &[Schedule]) -> Vec<&str> {
        schedules.iter().map(|s| s.id.as_str()).collect()
    }

    fn sample() -> Vec<Schedule> {
        vec![
            bus("ac", "AC", "18:00", "7h", 900.0),
            bus("nonac", "Non-AC", "06:00", "9h", 450.0),
            bus("sleeper", "Sleeper", "22:30", "8h", 700.0),
            bus("acsleeper", "A/C Sleeper", "21:00", "8h 30m", 1200.0),
            bus("seater", "AC Semi Seater", "07:15", "10h", 500.0),
        ]
    }

    fn filtered(filter: BusTypeFilter) -> Vec<Schedule> {
        filter_and_sort(&sample(), &ListingOptions::new(Some(filter), None))
    }

    #[test]
    fn ac_filter_is_exact_after_normalizing() {
        assert_eq!(ids(&filtered(BusTypeFilter::Ac)), vec!["ac"]);
        assert!(BusTypeFilter::Ac.matches(" a C "));
        assert!(!BusTypeFilter::Ac.matches("AC Sleeper"));
    }

    #[test]
    fn non_ac_filter_is_exact() {
        assert_eq!(ids(&filtered(BusTypeFilter::NonAc)), vec!["nonac"]);
        assert!(BusTypeFilter::NonAc.matches("NON - AC"));
        assert!(!BusTypeFilter::NonAc.matches("Non-AC Sleeper"));
    }

    #[test]
    fn sleeper_and_seater_are_substring_matches() {
        assert_eq!(
            ids(&filtered(BusTypeFilter::Sleeper)),
            vec!["sleeper", "acsleeper"]
        );
        assert_eq!(ids(&filtered(BusTypeFilter::Seater)), vec!["seater"]);
        assert!(BusTypeFilter::Sleeper.matches("SLEEPER"));
    }

    #[test]
    fn no_filter_passes_everything_in_order() {
        let all = filter_and_sort(&sample(), &ListingOptions::default());
        assert_eq!(all, sample());
    }

    #[test]
    fn sort_by_time() {
        let sorted = filter_and_sort(&sample(), &ListingOptions::new(None, Some(SortKey::Time)));
        assert_eq!(
            ids(&sorted),
            vec!["nonac", "seater", "ac", "acsleeper", "sleeper"]
        );
    }

    #[test]
    fn sort_by_duration_is_lexical() {
        // "10h" sorts before "7h": durations are plain text.
        let sorted = filter_and_sort(
            &sample(),
            &ListingOptions::new(None, Some(SortKey::Duration)),
        );
        assert_eq!(
            ids(&sorted),
            vec!["seater", "ac", "sleeper", "acsleeper", "nonac"]
        );
    }

    #[test]
    fn sort_by_price_is_numeric_and_stable() {
        let buses = vec![
            bus("a", "AC", "10:00", "1h", 1000.0),
            bus("b", "AC", "09:00", "1h", 90.0),
            bus("c", "AC", "08:00", "1h", 1000.0),
            bus("d", "AC", "07:00", "1h", 90.0),
        ];
        let sorted = filter_and_sort(&buses, &ListingOptions::new(None, Some(SortKey::Price)));
        assert_eq!(ids(&sorted), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn missing_time_sorts_as_empty_string() {
        let buses = vec![
            bus("late", "AC", "23:00", "1h", 1.0),
            bus("missing", "AC", "", "", 1.0),
        ];
        let sorted = filter_and_sort(&buses, &ListingOptions::new(None, Some(SortKey::Time)));
        assert_eq!(ids(&sorted), vec!["missing", "late"]);
    }

    #[test]
    fn filter_then_sort() {
        let sorted = filter_and_sort(
            &sample(),
            &ListingOptions::new(Some(BusTypeFilter::Sleeper), Some(SortKey::Price)),
        );
        assert_eq!(ids(&sorted), vec!["sleeper", "acsleeper"]);
    }

    #[test]
    fn params_parse_leniently() {
        let options = ListingOptions::from_params(Some("sleeper"), Some("price"));
        assert_eq!(options.filter, Some(BusTypeFilter::Sleeper));
        assert_eq!(options.sort, Some(SortKey::Price));

        let options = ListingOptions::from_params(Some("luxury"), Some("rating"));
        assert_eq!(options.filter, None);
        assert_eq!(options.sort, Some(SortKey::Time));

        assert_eq!(ListingOptions::from_params(None, None), ListingOptions::default());
    }

    #[test]
    fn param_round_trip() {
        for f in BusTypeFilter::ALL {
            assert_eq!(BusTypeFilter::from_param(f.as_param()), Some(f));
        }
        for k in SortKey::ALL {
            assert_eq!(SortKey::from_param(k.as_param()), k);
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::RecordId;
    use proptest::prelude::*;

    fn schedule_strategy() -> impl Strategy<Value = Schedule> {
        (
            0u32..10_000,
            prop::sample::select(vec![
                "AC", "Non-AC", "Sleeper", "AC Sleeper", "Seater", "Semi Seater", "", "Volvo",
            ]),
            0u32..24,
            0u32..60,
            prop::sample::select(vec!["5h", "10h", "7h 30m", "", "12h"]),
            1u32..50,
        )
            .prop_map(|(id, bus_type, h, m, duration, price)| Schedule {
                id: RecordId::from(format!("S{id}")),
                bus_type: bus_type.to_string(),
                departure_time: format!("{h:02}:{m:02}"),
                time_duration: duration.to_string(),
                // Coarse prices so ties are common.
                bus_price: f64::from(price * 100),
                ..Default::default()
            })
    }

    fn filter_strategy() -> impl Strategy<Value = Option<BusTypeFilter>> {
        prop::option::of(prop::sample::select(BusTypeFilter::ALL.to_vec()))
    }

    fn sort_strategy() -> impl Strategy<Value = SortKey> {
        prop::sample::select(SortKey::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn result_is_sorted_on_key(
            schedules in prop::collection::vec(schedule_strategy(), 0..30),
            filter in filter_strategy(),
            key in sort_strategy(),
        ) {
            let result = filter_and_sort(&schedules, &ListingOptions::new(filter, Some(key)));
            for w in result.windows(2) {
                prop_assert_ne!(key.compare(&w[0], &w[1]), Ordering::Greater);
            }
        }

        #[test]
        fn result_is_exactly_the_matching_subset(
            schedules in prop::collection::vec(schedule_strategy(), 0..30),
            filter in filter_strategy(),
            key in sort_strategy(),
        ) {
            let result = filter_and_sort(&schedules, &ListingOptions::new(filter, Some(key)));
            let expected = schedules
                .iter()
                .filter(|s| filter.is_none_or(|f| f.matches(&s.bus_type)))
                .count();

            prop_assert_eq!(result.len(), expected);
            for s in &result {
                prop_assert!(filter.is_none_or(|f| f.matches(&s.bus_type)));
            }
        }

        #[test]
        fn ties_keep_input_order(
            schedules in prop::collection::vec(schedule_strategy(), 0..30),
            key in sort_strategy(),
        ) {
            // Tag each record with its input position, then check equal keys
            // appear in ascending position.
            let tagged: Vec<Schedule> = schedules
                .into_iter()
                .enumerate()
                .map(|(i, mut s)| {
                    s.id = RecordId::from(format!("{i:04}"));
                    s
                })
                .collect();

            let result = filter_and_sort(&tagged, &ListingOptions::new(None, Some(key)));
            for w in result.windows(2) {
                if key.compare(&w[0], &w[1]) == Ordering::Equal {
                    prop_assert!(w[0].id < w[1].id);
                }
            }
        }
    }
}
