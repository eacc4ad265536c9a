//! Route catalog entries.

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::RecordId;

/// An allowed (from, to) city pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Route {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub from: String,
    pub to: String,
}

impl Route {
    /// Attach a store-assigned id to a validated draft.
    pub fn from_draft(id: RecordId, draft: RouteDraft) -> Self {
        Self {
            id,
            from: draft.from,
            to: draft.to,
        }
    }
}

/// Unvalidated route creation input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRoute {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// A validated route. Endpoints are stored trimmed, since they become the
/// canonical values search choices are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDraft {
    pub from: String,
    pub to: String,
}

impl NewRoute {
    /// Both endpoints must be non-empty after trimming.
    pub fn validate(self) -> Result<RouteDraft, DomainError> {
        let from = self.from.as_deref().map(str::trim).unwrap_or_default();
        let to = self.to.as_deref().map(str::trim).unwrap_or_default();

        if from.is_empty() || to.is_empty() {
            return Err(DomainError::MissingRouteFields);
        }

        Ok(RouteDraft {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Search-form choices: distinct origins and distinct destinations, each in
/// the order first seen in the catalog.
pub fn endpoint_choices(routes: &[Route]) -> (Vec<String>, Vec<String>) {
    let mut origins: Vec<String> = Vec::new();
    let mut destinations: Vec<String> = Vec::new();

    for route in routes {
        if !origins.contains(&route.from) {
            origins.push(route.from.clone());
        }
        if !destinations.contains(&route.to) {
            destinations.push(route.to.clone());
        }
    }

    (origins, destinations)
}
