//! HTTP route handlers for the JSON API.

use std::path::Path;

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::{Local, NaiveDate};
use serde::de::DeserializeOwned;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::accounts::{AccountError, Login, Signup};
use crate::booking::{
    BookingError, Confirmation, ListingOptions, SearchError, SearchQuery, confirm_seat_ids,
    filter_and_sort, search,
};
use crate::domain::{DomainError, NewRoute, NewSchedule, PublicUser, RecordId, Role, Route, Schedule};
use crate::store::StoreError;

use super::dto::*;
use super::pages;
use super::state::AppState;

/// Header carrying the caller's claimed role.
pub const ROLE_HEADER: &str = "x-user-role";

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let api = Router::new()
        .route("/schedules", get(list_schedules))
        .route("/schedules/add", post(add_schedule))
        .route("/schedules/search", get(search_schedules))
        .route("/schedules/:id", delete(delete_schedule))
        .route("/routes", get(list_routes))
        .route("/routes/add", post(add_route))
        .route("/routes/:id", delete(delete_route))
        .route("/routes/delete/:id", delete(delete_route))
        .route("/users", get(list_users))
        .route("/users/signup", post(signup))
        .route("/users/login", post(login))
        .route("/users/delete", post(delete_users))
        .route("/admin/users/all", get(list_plain_users))
        .route("/admin/users/:id", delete(delete_user))
        .route("/admin/routes/:id", delete(delete_route))
        .route("/seats/layout", get(seat_layout))
        .route("/bookings/confirm", post(confirm_booking));

    Router::new()
        .route("/", get(pages::root))
        .route("/health", get(health))
        .route("/login", get(pages::login_page).post(pages::login_submit))
        .route("/signup", get(pages::signup_page).post(pages::signup_submit))
        .route("/home", get(pages::home_page))
        .route("/results", get(pages::results_page))
        .route("/results/book", post(pages::book))
        .route("/admin", get(pages::admin_page))
        .route("/admin/routes", post(pages::admin_add_route))
        .route("/admin/routes/:id/delete", post(pages::admin_delete_route))
        .route("/admin/buses", post(pages::admin_add_bus))
        .route("/admin/buses/:id/delete", post(pages::admin_delete_bus))
        .route("/admin/users/delete", post(pages::admin_delete_users))
        .nest("/api", api)
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> AppError {
    AppError::NotFound {
        message: "Route not found".to_string(),
    }
}

/// Today's date in the server's local time zone.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Reject callers that do not claim the admin role.
fn require_admin(headers: &HeaderMap) -> Result<(), AppError> {
    let is_admin = headers
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|role| role.trim() == Role::Admin.as_str());

    if is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden {
            message: "Admin access required".to_string(),
        })
    }
}

/// Parse a JSON body so malformed input gets our error shape.
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(body), "invalid JSON body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })
}

async fn add_schedule(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ScheduleCreated>), AppError> {
    require_admin(&headers)?;
    let input: NewSchedule = parse_json(&body)?;
    let draft = input.validate(today())?;
    let schedule = state.store.insert_schedule(draft).await?;

    info!(id = %schedule.id, bus = %schedule.bus_name, "bus schedule added");

    Ok((
        StatusCode::CREATED,
        Json(ScheduleCreated {
            message: "Bus schedule added successfully".to_string(),
            new_schedule: schedule,
        }),
    ))
}

async fn list_schedules(State(state): State<AppState>) -> Json<Vec<Schedule>> {
    Json(state.store.schedules().await)
}

/// Exact-match search, optionally narrowed and ordered by `type` and `sort`.
async fn search_schedules(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Schedule>>, AppError> {
    let listing = ListingOptions::from_params(params.bus_type.as_deref(), params.sort.as_deref());
    let query = SearchQuery::from_params(params.from, params.to, params.date)?;
    let buses = search(&state.store, &query).await?;

    if listing.filter.is_none() && listing.sort.is_none() {
        return Ok(Json(buses));
    }
    Ok(Json(filter_and_sort(&buses, &listing)))
}

async fn delete_schedule(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<MessageResponse>, AppError> {
    require_admin(&headers)?;
    let id = RecordId::from(id);
    match state.store.delete_schedule(&id).await? {
        Some(_) => {
            info!(%id, "bus schedule deleted");
            Ok(Json(MessageResponse::new("Bus schedule deleted successfully")))
        }
        None => Err(AppError::NotFound {
            message: "Bus schedule not found".to_string(),
        }),
    }
}

async fn add_route(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<RouteCreated>), AppError> {
    require_admin(&headers)?;
    let input: NewRoute = parse_json(&body)?;
    let route = state.store.insert_route(input.validate()?).await?;

    info!(id = %route.id, from = %route.from, to = %route.to, "route added");

    Ok((
        StatusCode::CREATED,
        Json(RouteCreated {
            message: "Route added successfully".to_string(),
            new_route: route,
        }),
    ))
}

async fn list_routes(State(state): State<AppState>) -> Json<Vec<Route>> {
    Json(state.store.routes().await)
}

async fn delete_route(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<MessageResponse>, AppError> {
    require_admin(&headers)?;
    let id = RecordId::from(id);
    match state.store.delete_route(&id).await? {
        Some(_) => {
            info!(%id, "route deleted");
            Ok(Json(MessageResponse::new("Route deleted successfully")))
        }
        None => Err(AppError::NotFound {
            message: "Route not found".to_string(),
        }),
    }
}

async fn signup(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let input: Signup = parse_json(&body)?;
    state.accounts.signup(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Signup successful!")),
    ))
}

async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LoginResponse>, AppError> {
    let input: Login = parse_json(&body)?;
    let user = state.accounts.login(input).await?;
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user,
    }))
}

/// Every user, without password hashes.
async fn list_users(State(state): State<AppState>) -> Json<Vec<PublicUser>> {
    let users = state.store.users(None).await;
    Json(users.iter().map(PublicUser::from).collect())
}

/// Users with the `user` role only.
async fn list_plain_users(State(state): State<AppState>) -> Json<Vec<PublicUser>> {
    let users = state.store.users(Some(Role::User)).await;
    Json(users.iter().map(PublicUser::from).collect())
}

async fn delete_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DeleteUsersResponse>, AppError> {
    require_admin(&headers)?;
    let input: DeleteUsersRequest = parse_json(&body)?;
    let ids: Vec<RecordId> = input
        .user_ids
        .unwrap_or_default()
        .into_iter()
        .map(RecordId::from)
        .collect();

    if ids.is_empty() {
        return Err(AppError::BadRequest {
            message: "No user IDs provided".to_string(),
        });
    }

    let deleted_count = state.store.delete_users(&ids).await?;
    info!(requested = ids.len(), deleted = deleted_count, "users deleted");

    Ok(Json(DeleteUsersResponse {
        message: format!("{deleted_count} user(s) deleted successfully"),
        deleted_count,
    }))
}

async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<MessageResponse>, AppError> {
    require_admin(&headers)?;
    let id = RecordId::from(id);
    match state.store.delete_user(&id).await? {
        Some(_) => {
            info!(%id, "user deleted");
            Ok(Json(MessageResponse::new("User deleted successfully")))
        }
        None => Err(AppError::NotFound {
            message: "User not found".to_string(),
        }),
    }
}

async fn seat_layout(State(state): State<AppState>) -> Json<SeatLayoutResponse> {
    Json(SeatLayoutResponse {
        layout: (*state.layout).clone(),
        total_seats: state.layout.total_seats(),
        available_seats: state.layout.available_seats(),
    })
}

async fn confirm_booking(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Confirmation>, AppError> {
    let input: ConfirmBookingRequest = parse_json(&body)?;
    let Some(schedule_id) = input.schedule_id.filter(|id| !id.is_empty()) else {
        return Err(AppError::BadRequest {
            message: "scheduleId is required".to_string(),
        });
    };

    let id = RecordId::from(schedule_id);
    let schedule = state
        .store
        .schedule(&id)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: "Bus schedule not found".to_string(),
        })?;

    let seats = input.seats.unwrap_or_default();
    let confirmation = confirm_seat_ids(&schedule, &seats, &state.layout)?;
    Ok(Json(confirmation))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Forbidden { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AppError::BadRequest {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::InvalidQuery(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            SearchError::NotFound => AppError::NotFound {
                message: e.to_string(),
            },
            SearchError::Store(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<AccountError> for AppError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::UnknownEmail => AppError::NotFound {
                message: e.to_string(),
            },
            AccountError::Hash(_) | AccountError::Store(_) => AppError::Internal {
                message: e.to_string(),
            },
            _ => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest { message } => {
                warn!(%message, "bad request");
                (StatusCode::BAD_REQUEST, ErrorResponse { message, error: None })
            }
            AppError::Forbidden { message } => {
                warn!(%message, "forbidden");
                (StatusCode::FORBIDDEN, ErrorResponse { message, error: None })
            }
            AppError::NotFound { message } => {
                warn!(%message, "not found");
                (StatusCode::NOT_FOUND, ErrorResponse { message, error: None })
            }
            AppError::Internal { message } => {
                error!(%message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        message: "Internal Server Error".to_string(),
                        error: Some(message),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
