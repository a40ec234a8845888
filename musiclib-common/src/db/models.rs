//! Catalog records: artists, songs and song details

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::schema::{ColumnDefinition, Entity, SqlValue};

/// A performer. Owns zero or more songs; deleting an artist deletes its songs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub is_group: bool,
}

impl Artist {
    /// Unsaved artist; the store assigns the id
    pub fn new(name: impl Into<String>, is_group: bool) -> Self {
        Self {
            id: 0,
            name: name.into(),
            is_group,
        }
    }
}

impl Entity for Artist {
    const TABLE: &'static str = "artists";
    const NAME: &'static str = "artist";

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "BIGSERIAL").primary_key(),
            ColumnDefinition::new("name", "TEXT").not_null().unique(),
            ColumnDefinition::new("is_group", "BOOLEAN")
                .not_null()
                .default("FALSE"),
        ]
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", SqlValue::Text(self.name.clone())),
            ("is_group", SqlValue::Bool(self.is_group)),
        ]
    }
}

/// A song by one artist, with at most one [`SongDetail`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Song {
    pub id: i64,
    pub name: String,
    pub artist_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Song {
    /// Unsaved song; id and timestamps are replaced by the store on insert
    pub fn new(name: impl Into<String>, artist_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.into(),
            artist_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Song {
    const TABLE: &'static str = "songs";
    const NAME: &'static str = "song";

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "BIGSERIAL").primary_key(),
            ColumnDefinition::new("name", "TEXT").not_null(),
            ColumnDefinition::new("artist_id", "BIGINT")
                .not_null()
                .indexed()
                .references_cascade("artists"),
            ColumnDefinition::timestamp("created_at"),
            ColumnDefinition::timestamp("updated_at"),
        ]
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", SqlValue::Text(self.name.clone())),
            ("artist_id", SqlValue::BigInt(self.artist_id)),
        ]
    }
}

/// Lyrics and release information; one-to-one with [`Song`] via `song_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SongDetail {
    pub id: i64,
    pub song_id: i64,
    pub text: String,
    pub release_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SongDetail {
    /// Unsaved detail for `song_id`
    pub fn new(
        song_id: i64,
        text: impl Into<String>,
        release_date: NaiveDate,
        link: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            song_id,
            text: text.into(),
            release_date,
            link,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for SongDetail {
    const TABLE: &'static str = "song_details";
    const NAME: &'static str = "song_detail";

    fn columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "BIGSERIAL").primary_key(),
            ColumnDefinition::new("song_id", "BIGINT")
                .not_null()
                .unique()
                .indexed()
                .references_cascade("songs"),
            ColumnDefinition::new("text", "TEXT").not_null(),
            ColumnDefinition::new("release_date", "DATE").not_null(),
            ColumnDefinition::new("link", "VARCHAR(255)"),
            ColumnDefinition::timestamp("created_at"),
            ColumnDefinition::timestamp("updated_at"),
        ]
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("song_id", SqlValue::BigInt(self.song_id)),
            ("text", SqlValue::Text(self.text.clone())),
            ("release_date", SqlValue::Date(self.release_date)),
            ("link", SqlValue::NullableText(self.link.clone())),
        ]
    }
}

/// Column layout of every catalog table, parents before children
pub fn catalog_tables() -> Vec<(&'static str, Vec<ColumnDefinition>)> {
    vec![
        (Artist::TABLE, Artist::columns()),
        (Song::TABLE, Song::columns()),
        (SongDetail::TABLE, SongDetail::columns()),
    ]
}
