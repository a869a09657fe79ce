use std::sync::Arc;

use chrono::{DateTime, Utc};
use models::{NewSong, Song, SongId};
use tracing::{debug, info, instrument};

use crate::errors::ServiceError;
use crate::song::repository::SongRepository;

/// Song record operations independent of the web framework.
/// Each call maps to exactly one repository operation.
pub struct SongService {
    repo: Arc<dyn SongRepository>,
}

impl SongService {
    pub fn new(repo: Arc<dyn SongRepository>) -> Self { Self { repo } }

    /// Create a song from raw form values. `last_performed_date` is
    /// `DD-MM-YYYY`; an empty string is treated as absent.
    #[instrument(skip(self, lyrics), fields(lyrics_len = lyrics.len()))]
    pub async fn create(&self, name: &str, lyrics: &str, last_performed_date: Option<&str>) -> Result<SongId, ServiceError> {
        let song = NewSong::from_form(name, lyrics, last_performed_date)?;
        let id = self.repo.insert(song).await?;
        info!(song_id = %id, "song_created");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Song, ServiceError> {
        let id: SongId = id.parse()?;
        self.repo
            .find(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Song"))
    }

    /// Overwrite `last_performed_date`; `performances` is left untouched.
    #[instrument(skip(self, when), fields(when = %when))]
    pub async fn update_last_performed(&self, id: &str, when: DateTime<Utc>) -> Result<(), ServiceError> {
        let id: SongId = id.parse()?;
        if !self.repo.set_last_performed(&id, when).await? {
            debug!(song_id = %id, "update matched no song");
            return Err(ServiceError::not_found("Song"));
        }
        info!(song_id = %id, "song_updated");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Song>, ServiceError> {
        let songs = self.repo.list().await?;
        debug!(count = songs.len(), "list songs");
        Ok(songs)
    }
}
