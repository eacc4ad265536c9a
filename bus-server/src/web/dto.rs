//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::booking::SeatLayout;
use crate::domain::{PublicUser, Route, Schedule};

/// Query for bus search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,

    /// Optional bus type filter (`ac`, `non-ac`, `sleeper`, `seater`)
    #[serde(rename = "type")]
    pub bus_type: Option<String>,

    /// Optional sort key (`time`, `duration`, `price`)
    pub sort: Option<String>,
}

/// Response carrying only a message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response for schedule creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCreated {
    pub message: String,
    pub new_schedule: Schedule,
}

/// Response for route creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCreated {
    pub message: String,
    pub new_route: Route,
}

/// Response for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: PublicUser,
}

/// Request to delete several users.
#[derive(Debug, Deserialize)]
pub struct DeleteUsersRequest {
    #[serde(rename = "userIds")]
    pub user_ids: Option<Vec<String>>,
}

/// Response for batch user deletion.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUsersResponse {
    pub message: String,
    pub deleted_count: usize,
}

/// The seat grid with its counts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatLayoutResponse {
    /// Rows of seats; `null` marks a gap
    pub layout: SeatLayout,
    pub total_seats: usize,
    pub available_seats: usize,
}

/// Request to confirm a booking.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmBookingRequest {
    pub schedule_id: Option<String>,
    pub seats: Option<Vec<u32>>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub message: String,

    /// Underlying error text, for internal errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
