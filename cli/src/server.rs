use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use portion_core::db::Database;
use portion_core::error::JournalError;
use portion_core::models::{
    AlcoholCorrelation, DailyEntry, MonthlySummary, NewDailyEntry, Streak, WeeklySummary,
    WeightTrends, validate_new_entry,
};
use portion_core::service::JournalService;

const BODY_LIMIT: usize = 1024 * 1024; // 1 MB

/// Window used by trend and correlation queries when `days` is omitted.
pub(crate) const DEFAULT_WINDOW_DAYS: u32 = 30;

#[derive(Clone)]
struct AppState {
    journal: Arc<Mutex<JournalService<Database>>>,
    user: Arc<str>,
    api_key: Option<String>,
}

impl AppState {
    fn journal(&self) -> MutexGuard<'_, JournalService<Database>> {
        self.journal
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct CreateEntryRequest {
    date: String,
    #[serde(default)]
    protein: u32,
    #[serde(default)]
    vegetable: u32,
    #[serde(default)]
    fruit: u32,
    #[serde(default)]
    starch: u32,
    #[serde(default)]
    fat: u32,
    #[serde(default)]
    dairy: u32,
    #[serde(default)]
    water_segments: u32,
    weight: Option<f64>,
    compliant: Option<bool>,
    alcohol: Option<bool>,
}

#[derive(Deserialize)]
struct TodayQuery {
    today: Option<String>,
}

#[derive(Deserialize)]
struct WindowQuery {
    days: Option<u32>,
    today: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                tracing::error!("internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<JournalError> for ApiError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::InvalidArgument(msg) => Self::BadRequest(msg),
            JournalError::Store(err) => Self::Internal(err),
        }
    }
}

fn parse_date_param(s: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date '{s}'. Use YYYY-MM-DD")))
}

fn resolve_today(today: Option<&str>) -> Result<NaiveDate, ApiError> {
    today.map_or_else(|| Ok(Local::now().date_naive()), parse_date_param)
}

// --- Middleware ---

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(ref expected_key) = state.api_key {
        let authorized = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected_key);

        if !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Invalid or missing API key".to_string(),
                }),
            )
                .into_response();
        }
    }
    next.run(request).await
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Entries ---

async fn create_entry(
    State(state): State<AppState>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<DailyEntry>), ApiError> {
    let date = parse_date_param(&req.date)?;
    let entry = NewDailyEntry {
        protein: req.protein,
        vegetable: req.vegetable,
        fruit: req.fruit,
        starch: req.starch,
        fat: req.fat,
        dairy: req.dairy,
        water_segments: req.water_segments,
        weight: req.weight,
        compliant: req.compliant,
        alcohol: req.alcohol,
        ..NewDailyEntry::blank(&state.user, date)
    };

    validate_new_entry(&entry)
        .map_err(|e| ApiError::BadRequest(format!("{e}")))?;

    let saved = state
        .journal()
        .log_entry(&entry)
        .context("failed to save entry")?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn get_entry(
    State(state): State<AppState>,
    Path(date_str): Path<String>,
) -> Result<Json<DailyEntry>, ApiError> {
    let date = parse_date_param(&date_str)?;
    let entry = state
        .journal()
        .get_entry(&state.user, date)
        .context("database error")?
        .ok_or_else(|| ApiError::NotFound(format!("No entry for {date_str}")))?;
    Ok(Json(entry))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(date_str): Path<String>,
) -> Result<StatusCode, ApiError> {
    let date = parse_date_param(&date_str)?;
    if state
        .journal()
        .delete_entry(&state.user, date)
        .context("database error")?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("No entry for {date_str}")))
    }
}

// --- Aggregations ---

async fn get_streak(
    State(state): State<AppState>,
    Query(params): Query<TodayQuery>,
) -> Result<Json<Streak>, ApiError> {
    let today = resolve_today(params.today.as_deref())?;
    let streak = state.journal().get_streak(&state.user, today)?;
    Ok(Json(streak))
}

async fn get_trends(
    State(state): State<AppState>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<WeightTrends>, ApiError> {
    let today = resolve_today(params.today.as_deref())?;
    let days = params.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let trends = state.journal().get_weight_trends(&state.user, days, today)?;
    Ok(Json(trends))
}

async fn get_alcohol_correlation(
    State(state): State<AppState>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<AlcoholCorrelation>, ApiError> {
    let today = resolve_today(params.today.as_deref())?;
    let days = params.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let result = state
        .journal()
        .get_alcohol_correlation(&state.user, days, today)?;
    Ok(Json(result))
}

async fn get_monthly_summary(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<MonthlySummary>, ApiError> {
    let summary = state
        .journal()
        .get_monthly_summary(&state.user, year, month)?;
    Ok(Json(summary))
}

async fn get_weekly_summary(
    State(state): State<AppState>,
    Path(date_str): Path<String>,
) -> Result<Json<WeeklySummary>, ApiError> {
    let date = parse_date_param(&date_str)?;
    let summary = state.journal().get_weekly_summary(&state.user, date)?;
    Ok(Json(summary))
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/entries", post(create_entry))
        .route("/api/entries/{date}", get(get_entry).delete(delete_entry))
        .route("/api/streak", get(get_streak))
        .route("/api/trends", get(get_trends))
        .route("/api/alcohol-correlation", get(get_alcohol_correlation))
        .route(
            "/api/summary/month/{year}/{month}",
            get(get_monthly_summary),
        )
        .route("/api/summary/week/{date}", get(get_weekly_summary))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

/// First and last four characters of a key, or a bare mask when the key is
/// too short to show any of it.
fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    if count < 8 {
        return "****".to_string();
    }
    let head: String = key.chars().take(4).collect();
    let tail: String = key.chars().skip(count - 4).collect();
    format!("{head}...{tail}")
}

pub async fn start_server(
    journal: JournalService<Database>,
    user: &str,
    port: u16,
    bind: &str,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    let state = AppState {
        journal: Arc::new(Mutex::new(journal)),
        user: Arc::from(user),
        api_key: api_key.clone(),
    };

    let app = build_router(state);

    if let Some(ref key) = api_key {
        eprintln!("API key: {} (see api_key file in data directory)", mask_key(key));
    } else {
        eprintln!("Warning: Authentication disabled (--no-auth). API is open to anyone.");
    }

    if bind != "127.0.0.1" && bind != "localhost" && api_key.is_none() {
        eprintln!(
            "Warning: Listening on {bind} with no authentication. Any device on your network can access this API."
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
        .await
        .with_context(|| format!("Failed to bind {bind}:{port}"))?;
    tracing::info!(%bind, port, user, "server listening");
    eprintln!("Listening on http://{bind}:{port} (user: {user})");
    axum::serve(listener, app).await?;

    Ok(())
}
