use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Tracked;

/// A Twitch channel owner, keyed by login.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tracked)]
#[tracked(kind = "twitch_user", collection = "twitch_users")]
pub struct TwitchUser {
    /// Twitch's own user id (not the store id)
    pub user_id: String,
    #[tracked(key)]
    pub login: String,
    pub display_name: String,
    pub user_type: String,
    pub broadcaster_type: String,
    pub description: String,
    pub profile_image_url: String,
    pub offline_image_url: String,
    pub created_at: DateTime<Utc>,
    #[tracked(parsed_at)]
    pub parsed_at: DateTime<Utc>,
}

/// A Twitch game (category), keyed by name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tracked)]
#[tracked(kind = "twitch_game", collection = "twitch_games")]
pub struct TwitchGame {
    pub game_id: String,
    #[tracked(key)]
    pub name: String,
    pub igdb_id: String,
    pub box_art_url: String,
    #[tracked(parsed_at)]
    pub parsed_at: DateTime<Utc>,
}

/// The live stream of a channel, keyed by the broadcaster's login.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tracked)]
#[tracked(kind = "twitch_stream", collection = "twitch_streams")]
pub struct TwitchStream {
    pub stream_id: String,
    pub user_id: String,
    #[tracked(key)]
    pub user_login: String,
    pub user_name: String,
    pub game_id: String,
    pub game_name: String,
    pub stream_type: String,
    pub title: String,
    pub viewer_count: u64,
    pub started_at: DateTime<Utc>,
    pub language: String,
    pub thumbnail_url: String,
    pub tags: Vec<String>,
    pub is_mature: bool,
    #[tracked(parsed_at)]
    pub parsed_at: DateTime<Utc>,
}
