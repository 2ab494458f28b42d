#![cfg(feature = "server")]
use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use dioxus::logger::tracing::info;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::backend::auth::{self, dev_xsrf_cookie, CurrentUser};
use crate::backend::calculator::{CalcError, Calculator};
use crate::backend::convert::{parse_iso, parse_reading};
use crate::backend::error::{ApiError, ApiResult};
use crate::backend::spending::{SpendingRange, SpendingRangeRepository};
use crate::backend::AppState;
use crate::shared::types::{EnergyReadingDto, SpendingRangeDto, UserDto};

pub fn build_router(state: AppState) -> Router {
    let readings = Router::new()
        .route("/all", get(all_readings))
        .route("/last", get(last_reading))
        .route("/add", post(add_reading));

    let spending = Router::new()
        .route("/all", get(spending_all))
        .route("/from", get(spending_from))
        .route("/to", get(spending_to))
        .route("/between", get(spending_between))
        .route("/daily/all", get(spending_daily))
        .route("/weekly/all", get(spending_weekly))
        .route("/monthly/all", get(spending_monthly));

    let average = Router::new()
        .route("/all", get(average_all))
        .route("/between", get(average_between))
        .route("/daily/all", get(average_daily_all))
        .route("/daily", get(average_daily))
        .route("/weekly/all", get(average_weekly_all))
        .route("/weekly", get(average_weekly))
        .route("/monthly/all", get(average_monthly_all))
        .route("/monthly", get(average_monthly));

    Router::new()
        .route("/api/user", get(user))
        .route("/api/private", get(auth::login))
        .route("/login/oauth2/code/github", get(auth::callback))
        .route("/logout", post(auth::logout))
        .nest("/api/reading", readings)
        .nest("/api/spending", spending)
        .nest("/api/average", average)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct FromQuery {
    #[serde(rename = "startDate")]
    start_date: String,
}

#[derive(Debug, Deserialize)]
pub struct ToQuery {
    #[serde(rename = "endDate")]
    end_date: String,
}

#[derive(Debug, Deserialize)]
pub struct BetweenQuery {
    #[serde(rename = "startDate")]
    start_date: String,
    #[serde(rename = "endDate")]
    end_date: String,
}

impl BetweenQuery {
    fn bounds(&self) -> ApiResult<(NaiveDateTime, NaiveDateTime)> {
        Ok((parse_iso(&self.start_date)?, parse_iso(&self.end_date)?))
    }
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

fn dtos(ranges: Vec<SpendingRange>) -> Json<Vec<SpendingRangeDto>> {
    Json(ranges.iter().map(SpendingRange::to_dto).collect())
}

async fn repository(state: &AppState, user: &CurrentUser) -> ApiResult<SpendingRangeRepository> {
    let readings = state.db.readings_for_user(user.user.id).await?;
    Ok(SpendingRangeRepository::from_readings(&readings)?)
}

/// Runs a list statistic over the whole of the user's data.
async fn over_all<F>(state: &AppState, user: &CurrentUser, f: F) -> ApiResult<Json<Vec<SpendingRangeDto>>>
where
    F: FnOnce(&Calculator, NaiveDateTime, NaiveDateTime) -> Result<Vec<SpendingRange>, CalcError>,
{
    let repo = repository(state, user).await?;
    Ok(dtos(Calculator::new(&repo).over_all(f)?))
}

async fn bounded<F>(
    state: &AppState,
    user: &CurrentUser,
    query: &BetweenQuery,
    f: F,
) -> ApiResult<Json<Vec<SpendingRangeDto>>>
where
    F: FnOnce(&Calculator, NaiveDateTime, NaiveDateTime) -> Result<Vec<SpendingRange>, CalcError>,
{
    let (start, end) = query.bounds()?;
    let repo = repository(state, user).await?;
    Ok(dtos(f(&Calculator::new(&repo), start, end)?))
}

async fn user(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let current = auth::current_user(&state, &headers)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    let body = Json(UserDto {
        user_name: current.user.user_name,
        full_name: current.user.full_name,
    });
    Ok(match dev_xsrf_cookie(&state.config, &headers) {
        Some(cookie) => (AppendHeaders([(SET_COOKIE, cookie)]), body).into_response(),
        None => body.into_response(),
    })
}

async fn all_readings(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<EnergyReadingDto>>> {
    let readings = state.db.readings_for_user(user.user.id).await?;
    Ok(Json(readings.iter().map(|r| r.to_dto()).collect()))
}

async fn last_reading(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<EnergyReadingDto>> {
    state
        .db
        .last_reading(user.user.id)
        .await?
        .map(|r| Json(r.to_dto()))
        .ok_or_else(|| ApiError::NotFound("no readings".into()))
}

async fn add_reading(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(body): Json<EnergyReadingDto>,
) -> ApiResult<StatusCode> {
    user.verify_csrf(&headers)?;
    let date = parse_iso(&body.date_iso)?;
    let reading = parse_reading(&body.reading)?;
    state.db.insert_reading(user.user.id, date, reading).await?;
    info!("[reading] {} added {reading} at {date}", user.user.user_name);
    Ok(StatusCode::ACCEPTED)
}

async fn spending_all(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<SpendingRangeDto>> {
    let repo = repository(&state, &user).await?;
    Ok(Json(Calculator::new(&repo).all_spending(now())?.to_dto()))
}

async fn spending_from(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<FromQuery>,
) -> ApiResult<Json<SpendingRangeDto>> {
    let start = parse_iso(&q.start_date)?;
    let repo = repository(&state, &user).await?;
    Ok(Json(Calculator::new(&repo).spending_from(start, now())?.to_dto()))
}

async fn spending_to(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<ToQuery>,
) -> ApiResult<Json<SpendingRangeDto>> {
    let end = parse_iso(&q.end_date)?;
    let repo = repository(&state, &user).await?;
    Ok(Json(Calculator::new(&repo).spending_until(end)?.to_dto()))
}

async fn spending_between(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<BetweenQuery>,
) -> ApiResult<Json<SpendingRangeDto>> {
    let (start, end) = q.bounds()?;
    let repo = repository(&state, &user).await?;
    Ok(Json(Calculator::new(&repo).spending_between(start, end)?.to_dto()))
}

async fn spending_daily(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<SpendingRangeDto>>> {
    over_all(&state, &user, |c, s, e| c.total_by_days(s, e, 1)).await
}

async fn spending_weekly(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<SpendingRangeDto>>> {
    over_all(&state, &user, |c, s, e| c.total_by_days(s, e, 7)).await
}

async fn spending_monthly(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<SpendingRangeDto>>> {
    over_all(&state, &user, |c, s, e| c.total_monthly(s, e)).await
}

async fn average_all(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<SpendingRangeDto>>> {
    over_all(&state, &user, |c, s, e| c.average_spending(s, e, 7)).await
}

async fn average_between(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<BetweenQuery>,
) -> ApiResult<Json<Vec<SpendingRangeDto>>> {
    bounded(&state, &user, &q, |c, s, e| c.average_spending(s, e, 7)).await
}

async fn average_daily_all(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<SpendingRangeDto>>> {
    over_all(&state, &user, |c, s, e| c.average_by_days(s, e, 1)).await
}

async fn average_daily(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<BetweenQuery>,
) -> ApiResult<Json<Vec<SpendingRangeDto>>> {
    bounded(&state, &user, &q, |c, s, e| c.average_by_days(s, e, 1)).await
}

async fn average_weekly_all(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<SpendingRangeDto>>> {
    over_all(&state, &user, |c, s, e| c.average_by_days(s, e, 7)).await
}

async fn average_weekly(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<BetweenQuery>,
) -> ApiResult<Json<Vec<SpendingRangeDto>>> {
    bounded(&state, &user, &q, |c, s, e| c.average_by_days(s, e, 7)).await
}

async fn average_monthly_all(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<SpendingRangeDto>>> {
    over_all(&state, &user, |c, s, e| c.average_monthly(s, e)).await
}

async fn average_monthly(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(q): Query<BetweenQuery>,
) -> ApiResult<Json<Vec<SpendingRangeDto>>> {
    bounded(&state, &user, &q, |c, s, e| c.average_monthly(s, e)).await
}
