use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Format accepted for `last_performed_date` on song creation.
pub const PERFORMED_DATE_FORMAT: &str = "%d-%m-%Y";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Identifier assigned by storage when a song is inserted.
///
/// Opaque at the HTTP boundary: it is parsed from and rendered to a
/// 24-character hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SongId(ObjectId);

impl SongId {
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for SongId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for SongId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| ModelError::InvalidIdentifier(s.to_string()))
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

/// Song as returned to clients, identifier rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub lyrics: String,
    pub last_performed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub performances: Vec<DateTime<Utc>>,
}

/// Input for inserting a song. `performances` always starts empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSong {
    pub name: String,
    pub lyrics: String,
    pub last_performed_date: Option<DateTime<Utc>>,
}

impl NewSong {
    /// Build from raw form values, parsing the optional `DD-MM-YYYY` date.
    /// An empty date string counts as absent.
    pub fn from_form(name: &str, lyrics: &str, last_performed_date: Option<&str>) -> Result<Self, ModelError> {
        if name.is_empty() {
            return Err(ModelError::Validation("name must not be empty".into()));
        }
        let last_performed_date = match last_performed_date {
            Some(raw) if !raw.is_empty() => Some(parse_performed_date(raw)?),
            _ => None,
        };
        Ok(Self { name: name.to_string(), lyrics: lyrics.to_string(), last_performed_date })
    }
}

/// Song as stored in the `songs` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub lyrics: String,
    #[serde(default)]
    pub last_performed_date: Option<bson::DateTime>,
    #[serde(default)]
    pub performances: Vec<bson::DateTime>,
}

impl SongDocument {
    pub fn new(id: Option<SongId>, song: NewSong) -> Self {
        Self {
            id: id.map(|i| i.as_object_id()),
            name: song.name,
            lyrics: song.lyrics,
            last_performed_date: song.last_performed_date.map(bson::DateTime::from_chrono),
            performances: Vec::new(),
        }
    }

    pub fn into_song(self) -> Result<Song, ModelError> {
        let id = self.id.ok_or(ModelError::MissingIdentifier)?;
        Ok(Song {
            id: id.to_hex(),
            name: self.name,
            lyrics: self.lyrics,
            last_performed_date: self.last_performed_date.map(|d| d.to_chrono()),
            performances: self.performances.into_iter().map(|d| d.to_chrono()).collect(),
        })
    }
}

/// Parse a creation-time `DD-MM-YYYY` date into midnight UTC.
///
/// Day and month take one or two digits, the year exactly four; no sign or
/// surrounding whitespace.
pub fn parse_performed_date(raw: &str) -> Result<DateTime<Utc>, ModelError> {
    if !has_performed_date_shape(raw) {
        return Err(ModelError::InvalidDateFormat(raw.to_string()));
    }
    let date = NaiveDate::parse_from_str(raw, PERFORMED_DATE_FORMAT)
        .map_err(|_| ModelError::InvalidDateFormat(raw.to_string()))?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

// chrono's %Y takes any width and a sign
fn has_performed_date_shape(raw: &str) -> bool {
    let digits = |part: &str, min: usize, max: usize| {
        (min..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
    };
    let mut parts = raw.split('-');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(day), Some(month), Some(year), None) => digits(day, 1, 2) && digits(month, 1, 2) && digits(year, 4, 4),
        _ => false,
    }
}

/// Parse an ISO-8601 date-time. Values without an offset are taken as UTC.
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, ModelError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ModelError::InvalidDateTime(raw.to_string()))
}
