//! Week view and arbitrary date ranges

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use timetable_core::date_range::MAX_RANGE_DAYS;
use timetable_core::time::parse_date;
use timetable_core::{DateRange, Occurrence, WeekView};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/week", get(week))
        .route("/occurrences", get(occurrences))
}

#[derive(Deserialize)]
pub struct WeekQuery {
    /// Any date of the wanted week (YYYY-MM-DD); current week when omitted
    pub start: Option<String>,
}

/// GET /week?start=YYYY-MM-DD - Seven days starting on Monday
async fn week(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeekView>, AppError> {
    let start = query.start.as_deref().map(parse_date).transpose()?;
    Ok(Json(state.timetable().week(start)?))
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// GET /occurrences?from=&to= - Flat, annotated occurrences of an inclusive range
async fn occurrences(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<Occurrence>>, AppError> {
    let timetable = state.timetable();
    let range = DateRange::from_args(
        query.from.as_deref(),
        query.to.as_deref(),
        timetable.clock().today(),
    )?
    .limited_to(MAX_RANGE_DAYS)?;
    Ok(Json(timetable.occurrences(range)?))
}
