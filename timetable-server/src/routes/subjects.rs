//! Subject endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;

use timetable_core::{Color, Subject, SubjectId};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subjects", get(list_subjects).post(create_subject))
        .route("/subjects/{id}", put(update_subject).delete(delete_subject))
}

/// GET /subjects - All subjects, sorted by name
async fn list_subjects(State(state): State<AppState>) -> Result<Json<Vec<Subject>>, AppError> {
    Ok(Json(state.timetable().list_subjects()?))
}

#[derive(Deserialize)]
pub struct CreateSubjectRequest {
    pub name: String,
    #[serde(default)]
    pub color: Option<Color>,
}

/// POST /subjects - Create a subject
async fn create_subject(
    State(state): State<AppState>,
    Json(req): Json<CreateSubjectRequest>,
) -> Result<Json<Subject>, AppError> {
    let color = req.color.unwrap_or_default();
    Ok(Json(state.timetable().create_subject(&req.name, color)?))
}

#[derive(Deserialize)]
pub struct UpdateSubjectRequest {
    pub name: Option<String>,
    pub color: Option<Color>,
}

/// PUT /subjects/:id - Rename or recolor a subject
async fn update_subject(
    State(state): State<AppState>,
    Path(id): Path<SubjectId>,
    Json(req): Json<UpdateSubjectRequest>,
) -> Result<Json<Subject>, AppError> {
    let subject = state
        .timetable()
        .update_subject(id, req.name.as_deref(), req.color)?;
    Ok(Json(subject))
}

/// DELETE /subjects/:id - Delete a subject; its blocks are kept without one
async fn delete_subject(
    State(state): State<AppState>,
    Path(id): Path<SubjectId>,
) -> Result<StatusCode, AppError> {
    state.timetable().delete_subject(id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{app, send};

    #[tokio::test]
    async fn subject_lifecycle() {
        let app = app();
        let (status, subject) = send(
            &app,
            Method::POST,
            "/subjects",
            Some(json!({"name": " Chemistry ", "color": "#0a0"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(subject["name"], "Chemistry");
        assert_eq!(subject["color"], "#00AA00");

        let uri = format!("/subjects/{}", subject["id"].as_str().unwrap());
        let (status, renamed) = send(&app, Method::PUT, &uri, Some(json!({"name": "Organic Chemistry"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["color"], "#00AA00");

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, list) = send(&app, Method::GET, "/subjects", None).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_name_is_400() {
        let app = app();
        let (status, _) = send(&app, Method::POST, "/subjects", Some(json!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
