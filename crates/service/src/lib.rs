//! Service layer for song records.
//! - `SongRepository` abstracts the document store (MongoDB or in-memory).
//! - `SongService` turns raw request values into repository calls.
//! - `ServiceError` is the error taxonomy the HTTP layer maps to status codes.

pub mod errors;
pub mod song;

pub use errors::ServiceError;
pub use song::{repository::SongRepository, service::SongService};
