use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct CreateSongFormDoc {
    pub name: String,
    pub lyrics: String,
    /// `DD-MM-YYYY`
    #[schema(example = "01-06-2024")]
    pub last_performed_date: Option<String>,
}

#[derive(ToSchema)]
pub struct CreateSongOutputDoc { pub song_id: String }

#[derive(ToSchema)]
pub struct UpdateSongBodyDoc {
    #[schema(example = "2024-06-01T20:00:00Z")]
    pub last_performed_date: String,
}

#[derive(ToSchema)]
pub struct MessageDoc { pub message: String }

#[derive(Serialize, ToSchema)]
pub struct SongDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub lyrics: String,
    pub last_performed_date: Option<DateTime<Utc>>,
    pub performances: Vec<DateTime<Utc>>,
}

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub error: String,
    pub detail: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Song Service", description = "CRUD API for song records"),
    paths(
        crate::routes::health,
        crate::routes::songs::create,
        crate::routes::songs::get,
        crate::routes::songs::update,
        crate::routes::songs::list,
    ),
    components(
        schemas(
            HealthResponse,
            CreateSongFormDoc,
            CreateSongOutputDoc,
            UpdateSongBodyDoc,
            MessageDoc,
            SongDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "songs")
    )
)]
pub struct ApiDoc;
