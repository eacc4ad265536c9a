//! Server-rendered pages: login, search, results, booking and the admin
//! console.

use std::collections::HashMap;

use askama::Template;
use axum::{
    Form,
    extract::{Path as UrlPath, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, warn};
use urlencoding::encode;

use crate::accounts::{AccountError, Login, Signup};
use crate::booking::{SearchError, confirm_seat_ids, filter_and_sort, search};
use crate::domain::{
    DATE_FORMAT, NewRoute, NewSchedule, PriceInput, PublicUser, RecordId, Role, endpoint_choices,
    split_stops,
};

use super::routes::{AppError, today};
use super::state::AppState;
use super::templates::*;
use super::view::{ResultsQuery, ResultsView, parse_seat_list};

/// Prefix of the admin user table's checkbox names.
const USER_CHECKBOX_PREFIX: &str = "user:";

fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    template.render().map(Html).map_err(|e| AppError::Internal {
        message: format!("Template error: {e}"),
    })
}

fn error_page(status: StatusCode, title: &str, message: &str) -> Result<Response, AppError> {
    let page = render(&ErrorTemplate {
        title: title.to_string(),
        message: message.to_string(),
    })?;
    Ok((status, page).into_response())
}

fn min_date() -> String {
    today().format(DATE_FORMAT).to_string()
}

/// `/` sends visitors to the login form.
pub async fn root() -> Redirect {
    Redirect::to("/login")
}

/// Flash messages carried in the query string after a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub notice: Option<String>,
    pub error: Option<String>,
}

pub async fn login_page(Query(flash): Query<FlashQuery>) -> Result<Html<String>, AppError> {
    render(&LoginTemplate {
        email: String::new(),
        error: flash.error,
        notice: flash.notice,
    })
}

/// Log in and send admins to the console, travellers to the search page.
pub async fn login_submit(
    State(state): State<AppState>,
    Form(form): Form<Login>,
) -> Result<Response, AppError> {
    let email = form.email.clone().unwrap_or_default();

    match state.accounts.login(form).await {
        Ok(user) => {
            let target = if user.role == Role::Admin {
                "/admin"
            } else {
                "/home"
            };
            Ok(Redirect::to(target).into_response())
        }
        Err(e @ (AccountError::Hash(_) | AccountError::Store(_))) => Err(e.into()),
        Err(e) => {
            let page = render(&LoginTemplate {
                email,
                error: Some(e.to_string()),
                notice: None,
            })?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
    }
}

/// Signup form fields.
#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

pub async fn signup_page() -> Result<Html<String>, AppError> {
    render(&SignupTemplate {
        name: String::new(),
        email: String::new(),
        error: None,
    })
}

/// Create a traveller account. The form never grants the admin role.
pub async fn signup_submit(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let name = form.name.clone().unwrap_or_default();
    let email = form.email.clone().unwrap_or_default();

    let result = if form.password != form.confirm_password {
        Err(AccountError::PasswordMismatch)
    } else {
        state
            .accounts
            .signup(Signup {
                name: form.name,
                email: form.email,
                password: form.password,
                role: None,
            })
            .await
    };

    match result {
        Ok(_) => {
            let notice = encode("Signup successful! Please log in.");
            Ok(Redirect::to(&format!("/login?notice={notice}")).into_response())
        }
        Err(e @ (AccountError::Hash(_) | AccountError::Store(_))) => Err(e.into()),
        Err(e) => {
            let page = render(&SignupTemplate {
                name,
                email,
                error: Some(e.to_string()),
            })?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
    }
}

/// Choices from the route catalog, plus the current value if the catalog
/// no longer lists it.
fn endpoint_options(values: &[String], current: &str) -> Vec<ChoiceView> {
    let mut options = ChoiceView::plain(values, current);
    if !current.is_empty() && !values.iter().any(|v| v == current) {
        options.extend(ChoiceView::plain(&[current.to_string()], current));
    }
    options
}

async fn search_form(state: &AppState, view: &ResultsView) -> SearchFormView {
    let routes = state.store.routes().await;
    let (origins, destinations) = endpoint_choices(&routes);

    SearchFormView {
        from: view.from.clone(),
        to: view.to.clone(),
        origins: endpoint_options(&origins, &view.from),
        destinations: endpoint_options(&destinations, &view.to),
        date: view.date.clone(),
        min_date: min_date(),
        bus_type: view.filter.map(|f| f.as_param()).unwrap_or_default().to_string(),
        sort: view.sort.as_param().to_string(),
    }
}

pub async fn home_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let search = search_form(&state, &ResultsView::default()).await;
    render(&HomeTemplate { search })
}

/// Search results for the view in the query string.
pub async fn results_page(
    State(state): State<AppState>,
    Query(query): Query<ResultsQuery>,
) -> Result<Html<String>, AppError> {
    let view = ResultsView::from_query(query, &state.layout);
    let search_view = search_form(&state, &view).await;

    let (buses, error) = match view.search_query() {
        None => (Vec::new(), Some("Please select From, To and Date.".to_string())),
        Some(query) => match search(&state.store, &query).await {
            Ok(found) => {
                let listed = filter_and_sort(&found, &view.listing());
                let cards: Vec<BusCardView> = listed
                    .iter()
                    .map(|s| BusCardView::build(s, &view, &state.layout))
                    .collect();
                let error = cards
                    .is_empty()
                    .then(|| "No buses match the selected filters.".to_string());
                (cards, error)
            }
            Err(SearchError::NotFound) => (
                Vec::new(),
                Some("No buses found. Modify your search.".to_string()),
            ),
            Err(e) => return Err(e.into()),
        },
    };

    render(&ResultsTemplate {
        search: search_view,
        filters: filter_choices(view.filter),
        sorts: sort_choices(view.sort),
        error,
        buses,
    })
}

/// Booking form fields.
#[derive(Debug, Default, Deserialize)]
pub struct BookForm {
    pub bus: Option<String>,
    /// Comma-separated seat ids
    pub seats: Option<String>,
    /// Results page to return to
    pub back: Option<String>,
}

/// Only links back into the results page are followed.
fn results_back_link(back: Option<String>) -> String {
    back.filter(|b| b.starts_with("/results?"))
        .unwrap_or_else(|| "/home".to_string())
}

pub async fn book(
    State(state): State<AppState>,
    Form(form): Form<BookForm>,
) -> Result<Response, AppError> {
    let back = results_back_link(form.back);

    let Some(bus) = form.bus.filter(|b| !b.is_empty()) else {
        return error_page(StatusCode::BAD_REQUEST, "Booking failed", "No bus selected");
    };
    let Some(schedule) = state.store.schedule(&RecordId::from(bus)).await else {
        return error_page(StatusCode::NOT_FOUND, "Booking failed", "Bus schedule not found");
    };

    let seat_ids = form.seats.as_deref().map(parse_seat_list).unwrap_or_default();
    match confirm_seat_ids(&schedule, &seat_ids, &state.layout) {
        Ok(confirmation) => {
            let page = render(&ConfirmationTemplate {
                lines: confirmation.message.lines().map(str::to_string).collect(),
                back,
            })?;
            Ok(page.into_response())
        }
        Err(e) => {
            warn!(schedule = %schedule.id, error = %e, "booking rejected");
            error_page(StatusCode::BAD_REQUEST, "Booking failed", &e.to_string())
        }
    }
}

/// `/admin` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
    pub tab: Option<String>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

pub async fn admin_page(
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> Result<Html<String>, AppError> {
    let tab = query.tab.as_deref().map(AdminTab::from_param).unwrap_or_default();
    let schedules = state.store.schedules().await;
    let users = state.store.users(None).await;

    render(&AdminTemplate {
        tab,
        notice: query.notice,
        error: query.error,
        today: min_date(),
        routes: state.store.routes().await,
        schedules: schedules.iter().map(ScheduleRowView::from_schedule).collect(),
        users: users.iter().map(PublicUser::from).collect(),
    })
}

/// Redirect back to an admin tab with a flash message.
fn flash(tab: AdminTab, outcome: Result<String, String>) -> Redirect {
    let (key, message) = match outcome {
        Ok(notice) => ("notice", notice),
        Err(error) => ("error", error),
    };
    Redirect::to(&format!(
        "/admin?tab={}&{key}={}",
        tab.as_param(),
        encode(&message)
    ))
}

pub async fn admin_add_route(
    State(state): State<AppState>,
    Form(form): Form<NewRoute>,
) -> Result<Redirect, AppError> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(e) => return Ok(flash(AdminTab::Routes, Err(e.to_string()))),
    };
    let route = state.store.insert_route(draft).await?;
    info!(id = %route.id, "route added from admin console");
    Ok(flash(AdminTab::Routes, Ok("Route added successfully".to_string())))
}

pub async fn admin_delete_route(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Redirect, AppError> {
    let outcome = match state.store.delete_route(&RecordId::from(id)).await? {
        Some(_) => Ok("Route deleted successfully".to_string()),
        None => Err("Route not found".to_string()),
    };
    Ok(flash(AdminTab::Routes, outcome))
}

/// Bus scheduling form fields, all sent as text.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusForm {
    pub bus_name: Option<String>,
    pub departure_time: Option<String>,
    pub bus_date: Option<String>,
    pub bus_start_location: Option<String>,
    pub bus_end_location: Option<String>,
    pub time_duration: Option<String>,
    pub bus_type: Option<String>,
    pub bus_price: Option<String>,
    /// Comma-separated stop names
    pub stops: Option<String>,
}

impl From<BusForm> for NewSchedule {
    fn from(form: BusForm) -> Self {
        NewSchedule {
            bus_name: form.bus_name,
            departure_time: form.departure_time,
            bus_date: form.bus_date,
            bus_start_location: form.bus_start_location,
            bus_end_location: form.bus_end_location,
            time_duration: form.time_duration,
            bus_type: form.bus_type,
            bus_price: form
                .bus_price
                .filter(|p| !p.trim().is_empty())
                .map(PriceInput::Text),
            stops: Some(split_stops(form.stops.as_deref().unwrap_or_default())),
        }
    }
}

pub async fn admin_add_bus(
    State(state): State<AppState>,
    Form(form): Form<BusForm>,
) -> Result<Redirect, AppError> {
    let draft = match NewSchedule::from(form).validate(today()) {
        Ok(draft) => draft,
        Err(e) => return Ok(flash(AdminTab::Buses, Err(e.to_string()))),
    };
    let schedule = state.store.insert_schedule(draft).await?;
    info!(id = %schedule.id, "bus schedule added from admin console");
    Ok(flash(
        AdminTab::Buses,
        Ok("Bus schedule added successfully".to_string()),
    ))
}

pub async fn admin_delete_bus(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Redirect, AppError> {
    let outcome = match state.store.delete_schedule(&RecordId::from(id)).await? {
        Some(_) => Ok("Bus schedule deleted successfully".to_string()),
        None => Err("Bus schedule not found".to_string()),
    };
    Ok(flash(AdminTab::Buses, outcome))
}

/// Delete every user whose checkbox was ticked.
pub async fn admin_delete_users(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let ids: Vec<RecordId> = form
        .keys()
        .filter_map(|key| key.strip_prefix(USER_CHECKBOX_PREFIX))
        .filter(|id| !id.is_empty())
        .map(RecordId::from)
        .collect();

    if ids.is_empty() {
        return Ok(flash(AdminTab::Users, Err("No users selected".to_string())));
    }

    let deleted = state.store.delete_users(&ids).await?;
    info!(deleted, "users deleted from admin console");
    Ok(flash(
        AdminTab::Users,
        Ok(format!("{deleted} user(s) deleted successfully")),
    ))
}
