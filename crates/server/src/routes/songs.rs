use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, Multipart, Path, Query, Request, State,
    },
    http::{header, HeaderMap, StatusCode},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::{song::parse_datetime, Song};
use service::ServiceError;

use crate::{errors::JsonApiError, routes::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateSongForm {
    pub name: String,
    pub lyrics: String,
    #[serde(default)]
    pub last_performed_date: Option<String>,
}

/// Song form accepted as either `application/x-www-form-urlencoded` or
/// `multipart/form-data`, picked by `Content-Type`.
#[derive(Debug)]
pub struct SongForm(pub CreateSongForm);

fn invalid_form(status: StatusCode, detail: String) -> JsonApiError {
    JsonApiError::new(status, "Invalid Form", Some(detail))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}

#[async_trait]
impl<S> FromRequest<S> for SongForm
where
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(req.headers()) {
            let Form(input) = Form::<CreateSongForm>::from_request(req, state)
                .await
                .map_err(|r| invalid_form(r.status(), r.body_text()))?;
            return Ok(Self(input));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|r| invalid_form(r.status(), r.body_text()))?;
        let (mut name, mut lyrics, mut last_performed_date): (Option<String>, Option<String>, Option<String>) = (None, None, None);
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| invalid_form(e.status(), e.body_text()))?
        {
            let key = field.name().unwrap_or_default().to_string();
            let slot = match key.as_str() {
                "name" => &mut name,
                "lyrics" => &mut lyrics,
                "last_performed_date" => &mut last_performed_date,
                _ => continue,
            };
            *slot = Some(field.text().await.map_err(|e| invalid_form(e.status(), e.body_text()))?);
        }

        let missing = |field: &str| invalid_form(StatusCode::UNPROCESSABLE_ENTITY, format!("missing field `{field}`"));
        Ok(Self(CreateSongForm {
            name: name.ok_or_else(|| missing("name"))?,
            lyrics: lyrics.ok_or_else(|| missing("lyrics"))?,
            last_performed_date,
        }))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSongOutput {
    pub song_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageOutput {
    pub message: String,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UpdateSongQuery {
    /// ISO-8601 date-time; takes precedence over the JSON body
    pub last_performed_date: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateSongInput {
    pub last_performed_date: String,
}

#[utoipa::path(
    post, path = "/songs/", tag = "songs",
    request_body(content = crate::openapi::CreateSongFormDoc, content_type = "application/x-www-form-urlencoded", description = "Also accepted as multipart/form-data"),
    responses(
        (status = 200, description = "Created", body = crate::openapi::CreateSongOutputDoc),
        (status = 422, description = "Malformed date or missing field", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Storage unavailable", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    SongForm(input): SongForm,
) -> Result<Json<CreateSongOutput>, JsonApiError> {
    let id = state
        .songs
        .create(&input.name, &input.lyrics, input.last_performed_date.as_deref())
        .await?;
    Ok(Json(CreateSongOutput { song_id: id.to_string() }))
}

#[utoipa::path(
    get, path = "/songs/{song_id}", tag = "songs",
    params(("song_id" = String, Path, description = "Song identifier")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::SongDoc),
        (status = 400, description = "Malformed identifier", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(State(state): State<AppState>, Path(song_id): Path<String>) -> Result<Json<Song>, JsonApiError> {
    let song = state.songs.get(&song_id).await?;
    Ok(Json(song))
}

#[utoipa::path(
    put, path = "/songs/{song_id}", tag = "songs",
    params(("song_id" = String, Path, description = "Song identifier"), UpdateSongQuery),
    request_body(content = crate::openapi::UpdateSongBodyDoc, description = "Alternative to the query parameter", content_type = "application/json"),
    responses(
        (status = 200, description = "Updated", body = crate::openapi::MessageDoc),
        (status = 400, description = "Malformed identifier or query", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc),
        (status = 415, description = "Body is not JSON", body = crate::openapi::ErrorDoc),
        (status = 422, description = "Missing or malformed date-time", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(song_id): Path<String>,
    query: Result<Query<UpdateSongQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Json<UpdateSongInput>, JsonRejection>,
) -> Result<Json<MessageOutput>, JsonApiError> {
    let Query(query) = query.map_err(|r| JsonApiError::new(r.status(), "Invalid Query", Some(r.body_text())))?;
    let raw = match (query.last_performed_date, body) {
        (Some(raw), _) => raw,
        (None, Ok(Json(input))) => input.last_performed_date,
        (None, Err(_)) if !has_body(&headers) => {
            return Err(JsonApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation Error",
                Some("last_performed_date is required".into()),
            ))
        }
        (None, Err(r)) => return Err(JsonApiError::new(r.status(), "Invalid Body", Some(r.body_text()))),
    };
    let when = parse_datetime(&raw).map_err(ServiceError::from)?;

    state.songs.update_last_performed(&song_id, when).await?;
    Ok(Json(MessageOutput { message: "Song updated successfully".into() }))
}

fn has_body(headers: &HeaderMap) -> bool {
    if headers.contains_key(header::CONTENT_TYPE) || headers.contains_key(header::TRANSFER_ENCODING) {
        return true;
    }
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|len| len.trim() != "0")
}

#[utoipa::path(
    get, path = "/songs/", tag = "songs",
    responses(
        (status = 200, description = "All songs", body = [crate::openapi::SongDoc]),
        (status = 500, description = "Storage unavailable", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Song>>, JsonApiError> {
    let songs = state.songs.list().await?;
    info!(count = songs.len(), "list songs");
    Ok(Json(songs))
}
