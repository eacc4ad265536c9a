//! Exact-match bus search.

use tracing::debug;

use crate::domain::Schedule;
use crate::store::{Store, StoreError};

/// Error from bus search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A query parameter was missing or empty
    #[error("invalid search request: {0} is required")]
    InvalidQuery(&'static str),

    /// The query matched no schedules
    #[error("No buses found for this route")]
    NotFound,

    /// Storage failed while querying
    #[error("Server error while fetching buses: {0}")]
    Store(#[from] StoreError),
}

/// A (from, to, date) query.
///
/// Values are compared byte-for-byte with the stored schedule fields: no
/// trimming, no case folding. The route catalog supplies canonical values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub from: String,
    pub to: String,
    pub date: String,
}

impl SearchQuery {
    pub fn new(from: impl Into<String>, to: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            date: date.into(),
        }
    }

    /// Build a query from optional parameters, requiring all three.
    pub fn from_params(
        from: Option<String>,
        to: Option<String>,
        date: Option<String>,
    ) -> Result<Self, SearchError> {
        let query = Self::new(
            from.unwrap_or_default(),
            to.unwrap_or_default(),
            date.unwrap_or_default(),
        );
        query.validate()?;
        Ok(query)
    }

    /// All three fields must be non-empty.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.from.is_empty() {
            return Err(SearchError::InvalidQuery("from"));
        }
        if self.to.is_empty() {
            return Err(SearchError::InvalidQuery("to"));
        }
        if self.date.is_empty() {
            return Err(SearchError::InvalidQuery("date"));
        }
        Ok(())
    }
}

/// Find all schedules matching the query, in storage order.
///
/// An empty result is reported as [`SearchError::NotFound`].
pub async fn search(store: &Store, query: &SearchQuery) -> Result<Vec<Schedule>, SearchError> {
    query.validate()?;

    let buses = store
        .find_schedules(&query.from, &query.to, &query.date)
        .await;

    debug!(
        from = %query.from,
        to = %query.to,
        date = %query.date,
        matches = buses.len(),
        "bus search"
    );

    if buses.is_empty() {
        return Err(SearchError::NotFound);
    }

    Ok(buses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScheduleDraft;

    fn draft(name: &str, from: &str, to: &str, date: &str) -> ScheduleDraft {
        ScheduleDraft {
            bus_name: name.into(),
            departure_time: "09:00".into(),
            bus_date: date.into(),
            bus_start_location: from.into(),
            bus_end_location: to.into(),
            time_duration: "5h".into(),
            bus_type: "Non-AC".into(),
            bus_price: 400.0,
            stops: vec!["Salem".into()],
        }
    }

    async fn seeded() -> Store {
        let store = Store::memory();
        for d in [
            draft("A", "Kochi", "Chennai", "2030-05-01"),
            draft("B", "Kochi", "Chennai", "2030-05-02"),
            draft("C", "Chennai", "Kochi", "2030-05-01"),
            draft("D", "Kochi", "Chennai", "2030-05-01"),
        ] {
            store.insert_schedule(d).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn returns_exact_matches_in_storage_order() {
        let store = seeded().await;
        let found = search(&store, &SearchQuery::new("Kochi", "Chennai", "2030-05-01"))
            .await
            .unwrap();

        let names: Vec<_> = found.iter().map(|s| s.bus_name.as_str()).collect();
        assert_eq!(names, vec!["A", "D"]);
    }

    #[tokio::test]
    async fn no_match_is_not_found() {
        let store = seeded().await;
        let err = search(&store, &SearchQuery::new("Kochi", "Madurai", "2030-05-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::NotFound));
    }

    #[tokio::test]
    async fn matching_is_case_and_whitespace_sensitive() {
        let store = seeded().await;
        for query in [
            SearchQuery::new("kochi", "Chennai", "2030-05-01"),
            SearchQuery::new("Kochi ", "Chennai", "2030-05-01"),
            SearchQuery::new("Kochi", "Chennai", "2030-5-1"),
        ] {
            assert!(matches!(
                search(&store, &query).await,
                Err(SearchError::NotFound)
            ));
        }
    }

    #[tokio::test]
    async fn empty_parameters_are_invalid() {
        let store = seeded().await;
        let err = search(&store, &SearchQuery::new("Kochi", "", "2030-05-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery("to")));
    }

    #[test]
    fn from_params_requires_all_fields() {
        assert!(
            SearchQuery::from_params(Some("A".into()), Some("B".into()), Some("2030-01-01".into()))
                .is_ok()
        );
        assert!(matches!(
            SearchQuery::from_params(None, Some("B".into()), Some("2030-01-01".into())),
            Err(SearchError::InvalidQuery("from"))
        ));
        assert!(matches!(
            SearchQuery::from_params(Some("A".into()), Some("B".into()), None),
            Err(SearchError::InvalidQuery("date"))
        ));
    }
}
