use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderName, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{
    dto::{Action, Profile, StudentRepr},
    repo_types::Student,
    services::{validate_new, validate_patch, Mode},
};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/estudiantes/", get(list_students).post(create_student))
        .route("/estudiantes", get(list_students).post(create_student))
}

pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/estudiantes/:id/",
            get(get_student)
                .put(put_student)
                .patch(patch_student)
                .delete(delete_student),
        )
        .route(
            "/estudiantes/:id",
            get(get_student)
                .put(put_student)
                .patch(patch_student)
                .delete(delete_student),
        )
}

fn render(state: &AppState, action: Action, student: Student) -> StudentRepr {
    Profile::for_action(action, state.config.list_profile).render(student)
}

/// Non-numeric ids can never match a row.
fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.parse::<i64>().map_err(|_| ApiError::NotFound)
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    body.map(|Json(v)| v).map_err(|rejection| {
        warn!(error = %rejection, "rejected request body");
        match &rejection {
            JsonRejection::MissingJsonContentType(_) => ApiError::UnsupportedMediaType(
                "Unsupported media type in request, expected \"application/json\".".into(),
            ),
            JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
                ApiError::BadRequest(format!("JSON parse error - {}", rejection.body_text()))
            }
            _ => ApiError::BadRequest(rejection.body_text()),
        }
    })
}

fn location(id: i64) -> [(HeaderName, String); 1] {
    [(header::LOCATION, format!("/estudiantes/{}/", id))]
}

async fn fetch(state: &AppState, id: i64) -> ApiResult<Student> {
    state.store.get(id).await?.ok_or_else(|| {
        debug!(%id, "estudiante not found");
        ApiError::NotFound
    })
}

#[instrument(skip(state))]
pub async fn list_students(State(state): State<AppState>) -> ApiResult<Json<Vec<StudentRepr>>> {
    let rows = state.store.list().await?;
    let items = rows
        .into_iter()
        .map(|s| render(&state, Action::List, s))
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StudentRepr>> {
    let id = parse_id(&id)?;
    let student = fetch(&state, id).await?;
    Ok(Json(render(&state, Action::Retrieve, student)))
}

#[instrument(skip(state, body))]
pub async fn create_student(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, [(HeaderName, String); 1], Json<StudentRepr>)> {
    let body = json_body(body)?;
    let new = validate_new(&body).map_err(|errors| {
        warn!(%errors, "create rejected");
        errors
    })?;

    let student = state.store.create(new).await?;
    info!(id = student.id, controlnum = %student.controlnum, "estudiante created");

    Ok((
        StatusCode::CREATED,
        location(student.id),
        Json(render(&state, Action::Create, student)),
    ))
}

#[instrument(skip(state, body))]
pub async fn put_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<StudentRepr>> {
    update(&state, &id, body, Mode::Full).await
}

#[instrument(skip(state, body))]
pub async fn patch_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<StudentRepr>> {
    update(&state, &id, body, Mode::Partial).await
}

async fn update(
    state: &AppState,
    id: &str,
    body: Result<Json<Value>, JsonRejection>,
    mode: Mode,
) -> ApiResult<Json<StudentRepr>> {
    let id = parse_id(id)?;
    let current = fetch(state, id).await?;
    let body = json_body(body)?;

    let fields = match mode {
        Mode::Full => validate_new(&body),
        Mode::Partial => validate_patch(&body).map(|patch| patch.apply(current)),
    }
    .map_err(|errors| {
        warn!(%id, %errors, "update rejected");
        errors
    })?;

    // The row may have been deleted since `fetch`.
    let student = state
        .store
        .update(id, fields)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(%id, ?mode, "estudiante updated");
    Ok(Json(render(state, Action::Update, student)))
}

#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    if !state.store.delete(id).await? {
        debug!(%id, "estudiante not found");
        return Err(ApiError::NotFound);
    }
    info!(%id, "estudiante deleted");
    Ok(StatusCode::NO_CONTENT)
}
