//! Song document model, identifier handling and MongoDB connection setup.

pub mod errors;
pub mod db;
pub mod song;

pub use errors::ModelError;
pub use song::{NewSong, Song, SongDocument, SongId};
