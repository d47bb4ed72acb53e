//! Twitch Helix records (`/helix/users`, `/helix/games`, `/helix/streams`).

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::entity::{TwitchGame, TwitchStream, TwitchUser};

use super::{parse_timestamp, SourceError, SourceRecord};

#[derive(Debug, Deserialize)]
pub struct RawTwitchUser {
    pub id: String,
    pub login: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub user_type: String,
    #[serde(default)]
    pub broadcaster_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub offline_image_url: String,
    pub created_at: String,
}

impl SourceRecord for TwitchUser {
    const PARAM: &'static str = "login";
    type Raw = RawTwitchUser;

    fn from_raw(
        raw: RawTwitchUser,
        _key: &str,
        parsed_at: DateTime<Utc>,
    ) -> Result<Self, SourceError> {
        Ok(TwitchUser {
            user_id: raw.id,
            login: raw.login,
            display_name: raw.display_name,
            user_type: raw.user_type,
            broadcaster_type: raw.broadcaster_type,
            description: raw.description,
            profile_image_url: raw.profile_image_url,
            offline_image_url: raw.offline_image_url,
            created_at: parse_timestamp(&raw.created_at)?,
            parsed_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawTwitchGame {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub box_art_url: String,
    #[serde(default)]
    pub igdb_id: String,
}

impl SourceRecord for TwitchGame {
    const PARAM: &'static str = "name";
    type Raw = RawTwitchGame;

    fn from_raw(
        raw: RawTwitchGame,
        _key: &str,
        parsed_at: DateTime<Utc>,
    ) -> Result<Self, SourceError> {
        Ok(TwitchGame {
            game_id: raw.id,
            name: raw.name,
            igdb_id: raw.igdb_id,
            box_art_url: raw.box_art_url,
            parsed_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawTwitchStream {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(rename = "type", default)]
    pub stream_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub viewer_count: u64,
    pub started_at: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_mature: bool,
}

impl SourceRecord for TwitchStream {
    const PARAM: &'static str = "user_login";
    type Raw = RawTwitchStream;

    fn from_raw(
        raw: RawTwitchStream,
        _key: &str,
        parsed_at: DateTime<Utc>,
    ) -> Result<Self, SourceError> {
        Ok(TwitchStream {
            stream_id: raw.id,
            user_id: raw.user_id,
            user_login: raw.user_login,
            user_name: raw.user_name,
            game_id: raw.game_id,
            game_name: raw.game_name,
            stream_type: raw.stream_type,
            title: raw.title,
            viewer_count: raw.viewer_count,
            started_at: parse_timestamp(&raw.started_at)?,
            language: raw.language,
            thumbnail_url: raw.thumbnail_url,
            tags: raw.tags.unwrap_or_default(),
            is_mature: raw.is_mature,
            parsed_at,
        })
    }
}
