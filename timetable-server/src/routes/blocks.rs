//! Time block endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use timetable_core::{BlockDraft, BlockId, TimeBlock};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blocks", get(list_blocks).post(create_block))
        .route(
            "/blocks/{id}",
            get(get_block).put(update_block).delete(delete_block),
        )
}

/// GET /blocks - All weekly and one-off blocks
async fn list_blocks(State(state): State<AppState>) -> Result<Json<Vec<TimeBlock>>, AppError> {
    Ok(Json(state.timetable().list_blocks()?))
}

/// POST /blocks - Create a block
async fn create_block(
    State(state): State<AppState>,
    Json(draft): Json<BlockDraft>,
) -> Result<Json<TimeBlock>, AppError> {
    Ok(Json(state.timetable().create_block(draft)?))
}

async fn get_block(
    State(state): State<AppState>,
    Path(id): Path<BlockId>,
) -> Result<Json<TimeBlock>, AppError> {
    Ok(Json(state.timetable().get_block(id)?))
}

/// PUT /blocks/:id - Replace a block's editable fields
async fn update_block(
    State(state): State<AppState>,
    Path(id): Path<BlockId>,
    Json(draft): Json<BlockDraft>,
) -> Result<Json<TimeBlock>, AppError> {
    Ok(Json(state.timetable().update_block(id, draft)?))
}

/// DELETE /blocks/:id - Delete a block and its completion records
async fn delete_block(
    State(state): State<AppState>,
    Path(id): Path<BlockId>,
) -> Result<StatusCode, AppError> {
    state.timetable().delete_block(id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{app, send};

    #[tokio::test]
    async fn block_lifecycle() {
        let app = app();
        let (status, block) = send(
            &app,
            Method::POST,
            "/blocks",
            Some(json!({"repeat": "WEEKLY", "weekday": "TU", "startTime": "13:00", "endTime": "14:00", "note": "lab"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(block["createdOn"], "2024-01-01");
        let uri = format!("/blocks/{}", block["id"].as_str().unwrap());

        let (status, updated) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({"repeat": "NONE", "date": "2024-01-05", "startTime": "13:00", "endTime": "15:00"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], block["id"]);
        assert_eq!(updated["repeat"], "NONE");
        assert_eq!(updated["weekday"], serde_json::Value::Null);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_block_is_rejected() {
        let app = app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/blocks",
            Some(json!({"repeat": "WEEKLY", "startTime": "13:00", "endTime": "14:00"})),
        )
        .await;
        assert!(status.is_client_error());

        let (status, body) = send(
            &app,
            Method::POST,
            "/blocks",
            Some(json!({
                "repeat": "WEEKLY",
                "weekday": "TU",
                "subjectId": "6f1c1f0e-8d8e-4c43-9e44-7d0f0d0c2b11",
                "startTime": "13:00",
                "endTime": "14:00"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("Subject not found"));
    }
}
