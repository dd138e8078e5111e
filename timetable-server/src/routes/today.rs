//! Today's plan and completion toggling

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use timetable_core::{BlockId, TodayView};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/today", get(today))
        .route("/today/complete", post(complete))
}

/// GET /today - Today's occurrences, bucketed, with progress
async fn today(State(state): State<AppState>) -> Result<Json<TodayView>, AppError> {
    Ok(Json(state.timetable().today()?))
}

/// Request body for toggling completion
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub time_block_id: BlockId,
    /// Defaults to today in the reference timezone
    pub date: Option<NaiveDate>,
    pub done: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResponse {
    pub time_block_id: BlockId,
    pub date: NaiveDate,
    pub done: bool,
}

/// POST /today/complete - Mark one occurrence done or not done
async fn complete(
    State(state): State<AppState>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<CompleteResponse>, AppError> {
    let date = state
        .timetable()
        .toggle_completion(req.time_block_id, req.date, req.done)?;

    Ok(Json(CompleteResponse {
        time_block_id: req.time_block_id,
        date,
        done: req.done,
    }))
}
