//! Fixtures shared by the pipeline tests.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use tlparser::{
    InMemoryBroker, InMemoryDocumentStore, KeyedRepository, LamodaProduct, ParseService,
    StaticSource, Tracked, TwitchGame, TwitchUser,
};

pub const POLL: Duration = Duration::from_millis(5);

pub fn ninja() -> TwitchUser {
    TwitchUser {
        user_id: "19571641".into(),
        login: "ninja".into(),
        display_name: "Ninja".into(),
        user_type: String::new(),
        broadcaster_type: "partner".into(),
        description: "Professional Battle Royale player.".into(),
        profile_image_url: "https://static-cdn.jtvnw.net/jtv_user_pictures/ninja.png".into(),
        offline_image_url: String::new(),
        created_at: Utc.with_ymd_and_hms(2011, 11, 20, 6, 34, 27).unwrap(),
        parsed_at: Utc::now(),
    }
}

pub fn fortnite() -> TwitchGame {
    TwitchGame {
        game_id: "33214".into(),
        name: "Fortnite".into(),
        igdb_id: "1905".into(),
        box_art_url: "https://static-cdn.jtvnw.net/ttv-boxart/33214-{width}x{height}.jpg".into(),
        parsed_at: Utc::now(),
    }
}

pub fn product(category: &str, sku: &str, price: f64) -> LamodaProduct {
    LamodaProduct {
        category: category.into(),
        sku: sku.into(),
        url: format!("https://www.lamoda.ru/p/{}/", sku.to_lowercase()),
        description: format!("{sku} from {category}"),
        price,
        price_currency: "RUB".into(),
        price_valid_until: None,
        parsed_at: Utc::now(),
    }
}

/// A service over its own fresh store.
pub fn service<E: Tracked>(
    source: StaticSource<E>,
    broker: &InMemoryBroker,
) -> (ParseService<E>, InMemoryDocumentStore) {
    let store = InMemoryDocumentStore::new();
    let service = ParseService::new(
        Arc::new(KeyedRepository::<E>::new(store.clone())),
        Arc::new(source),
        Arc::new(broker.clone()),
    );
    (service, store)
}

/// Poll `condition` until it holds or two seconds pass.
pub fn eventually(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}
