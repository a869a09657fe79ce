use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{bson::doc, Collection};
use models::{NewSong, Song, SongDocument, SongId};

use crate::errors::ServiceError;

/// Persistence operations the song service needs from a document store.
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Insert a song; the store assigns and returns its identifier.
    async fn insert(&self, song: NewSong) -> Result<SongId, ServiceError>;
    async fn find(&self, id: &SongId) -> Result<Option<Song>, ServiceError>;
    /// Overwrite `last_performed_date`. Returns `false` when no song matched.
    async fn set_last_performed(&self, id: &SongId, when: DateTime<Utc>) -> Result<bool, ServiceError>;
    async fn list(&self) -> Result<Vec<Song>, ServiceError>;
}

/// MongoDB-backed repository over the `songs` collection.
#[derive(Clone)]
pub struct MongoSongRepository {
    collection: Collection<SongDocument>,
}

impl MongoSongRepository {
    pub fn new(collection: Collection<SongDocument>) -> Self { Self { collection } }
}

#[async_trait]
impl SongRepository for MongoSongRepository {
    async fn insert(&self, song: NewSong) -> Result<SongId, ServiceError> {
        let document = SongDocument::new(None, song);
        let result = self.collection.insert_one(&document).await?;
        result
            .inserted_id
            .as_object_id()
            .map(SongId::from)
            .ok_or_else(|| ServiceError::StorageUnavailable(format!("unexpected inserted id {}", result.inserted_id)))
    }

    async fn find(&self, id: &SongId) -> Result<Option<Song>, ServiceError> {
        let found = self.collection.find_one(doc! { "_id": id.as_object_id() }).await?;
        found.map(SongDocument::into_song).transpose().map_err(ServiceError::from)
    }

    async fn set_last_performed(&self, id: &SongId, when: DateTime<Utc>) -> Result<bool, ServiceError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id.as_object_id() },
                doc! { "$set": { "last_performed_date": bson::DateTime::from_chrono(when) } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn list(&self) -> Result<Vec<Song>, ServiceError> {
        let cursor = self.collection.find(doc! {}).await?;
        let documents: Vec<SongDocument> = cursor.try_collect().await?;
        documents
            .into_iter()
            .map(|d| d.into_song().map_err(ServiceError::from))
            .collect()
    }
}

/// In-memory repository for tests and for running the server without MongoDB.
/// Keeps insertion order and stores date-times at the same millisecond
/// precision MongoDB does.
pub mod memory {
    use super::*;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct InMemorySongRepository {
        songs: RwLock<Vec<SongDocument>>,
    }

    impl InMemorySongRepository {
        pub fn new() -> Self { Self::default() }

        pub async fn len(&self) -> usize { self.songs.read().await.len() }
    }

    #[async_trait]
    impl SongRepository for InMemorySongRepository {
        async fn insert(&self, song: NewSong) -> Result<SongId, ServiceError> {
            let id = SongId::generate();
            self.songs.write().await.push(SongDocument::new(Some(id), song));
            Ok(id)
        }

        async fn find(&self, id: &SongId) -> Result<Option<Song>, ServiceError> {
            let songs = self.songs.read().await;
            songs
                .iter()
                .find(|d| d.id == Some(id.as_object_id()))
                .cloned()
                .map(SongDocument::into_song)
                .transpose()
                .map_err(ServiceError::from)
        }

        async fn set_last_performed(&self, id: &SongId, when: DateTime<Utc>) -> Result<bool, ServiceError> {
            let mut songs = self.songs.write().await;
            match songs.iter_mut().find(|d| d.id == Some(id.as_object_id())) {
                Some(d) => {
                    d.last_performed_date = Some(bson::DateTime::from_chrono(when));
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn list(&self) -> Result<Vec<Song>, ServiceError> {
            let songs = self.songs.read().await;
            songs
                .iter()
                .cloned()
                .map(|d| d.into_song().map_err(ServiceError::from))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::InMemorySongRepository;
    use super::*;
    use chrono::TimeZone;

    fn new_song(name: &str) -> NewSong {
        NewSong { name: name.into(), lyrics: format!("lyrics of {name}"), last_performed_date: None }
    }

    #[tokio::test]
    async fn memory_repo_crud() -> Result<(), anyhow::Error> {
        let repo = InMemorySongRepository::new();
        let a = repo.insert(new_song("a")).await?;
        let b = repo.insert(new_song("b")).await?;
        assert_ne!(a, b);
        assert_eq!(repo.len().await, 2);

        let found = repo.find(&a).await?.unwrap();
        assert_eq!(found.name, "a");

        let when = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert!(repo.set_last_performed(&b, when).await?);
        assert_eq!(repo.find(&b).await?.unwrap().last_performed_date, Some(when));

        let missing = SongId::generate();
        assert!(repo.find(&missing).await?.is_none());
        assert!(!repo.set_last_performed(&missing, when).await?);

        let names: Vec<_> = repo.list().await?.into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        Ok(())
    }

    #[tokio::test]
    async fn memory_repo_truncates_to_millis() -> Result<(), anyhow::Error> {
        let repo = InMemorySongRepository::new();
        let id = repo.insert(new_song("precise")).await?;
        let when = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap() + chrono::Duration::microseconds(1_500);
        repo.set_last_performed(&id, when).await?;
        let stored = repo.find(&id).await?.unwrap().last_performed_date.unwrap();
        assert_eq!(stored, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap() + chrono::Duration::milliseconds(1));
        Ok(())
    }

    #[tokio::test]
    async fn mongo_repo_crud() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("MONGODB_URL").is_err() {
            eprintln!("MONGODB_URL missing; skip mongo repository test");
            return Ok(());
        }
        let mut cfg = configs::DatabaseConfig::default();
        cfg.normalize_from_env();
        cfg.validate()?;
        let db = models::db::connect(&cfg).await?;
        let collection = models::db::songs_collection(&db, &format!("songs_test_{}", SongId::generate()));
        let repo = MongoSongRepository::new(collection.clone());

        let id = repo.insert(new_song("mongo")).await?;
        let found = repo.find(&id).await?.unwrap();
        assert_eq!(found.id, id.to_string());
        assert_eq!(found.last_performed_date, None);
        assert!(found.performances.is_empty());

        let when = Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap();
        assert!(repo.set_last_performed(&id, when).await?);
        assert_eq!(repo.find(&id).await?.unwrap().last_performed_date, Some(when));
        assert!(!repo.set_last_performed(&SongId::generate(), when).await?);

        assert!(repo.list().await?.iter().any(|s| s.id == id.to_string()));

        collection.drop().await?;
        Ok(())
    }
}
