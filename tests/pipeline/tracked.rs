//! `#[derive(Tracked)]` on entity kinds defined outside the crate.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tlparser::repository::{CreateOrUpdate, GetByKey};
use tlparser::{InMemoryDocumentStore, KeyedRepository, Tracked};

// Derived impls below must not reach for the caller's `format!`
#[allow(unused_macros)]
macro_rules! format {
    ($($tokens:tt)*) => {
        compile_error!("derived code used an unqualified format!")
    };
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tracked)]
struct ClipView {
    #[tracked(key, identity)]
    channel: String,
    #[tracked(identity)]
    clip_id: String,
    views: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tracked)]
#[tracked(kind = "tag", collection = "tag_index")]
struct Tag {
    key: String,
    label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tracked)]
struct Follow {
    #[tracked(key, identity)]
    from_login: String,
    #[tracked(identity)]
    to_login: String,
    #[tracked(parsed_at)]
    seen_at: DateTime<Utc>,
}

fn clip(clip_id: &str, views: u64) -> ClipView {
    ClipView {
        channel: "ninja".into(),
        clip_id: clip_id.into(),
        views,
    }
}

#[test]
fn defaults_follow_struct_name() {
    assert_eq!(ClipView::KIND, "clip_view");
    assert_eq!(ClipView::COLLECTION, "clip_views");
    assert_eq!(clip("abc", 1).identity(), "ninja:abc");
    assert_eq!(clip("abc", 1).key(), "ninja");
}

#[test]
fn explicit_names_and_key_field() {
    let tag = Tag {
        key: "fps".into(),
        label: "First person".into(),
    };
    assert_eq!(Tag::KIND, "tag");
    assert_eq!(Tag::COLLECTION, "tag_index");
    assert_eq!(tag.key(), "fps");
    assert_eq!(tag.identity(), "fps");
}

#[test]
fn derived_kinds_work_with_the_generic_repository() {
    let store = InMemoryDocumentStore::new();
    let clips = KeyedRepository::<ClipView>::new(store.clone());

    clips.create_or_update(clip("abc", 1)).unwrap();
    clips.create_or_update(clip("def", 5)).unwrap();
    clips.create_or_update(clip("abc", 9)).unwrap();

    let stored = clips.find_by_key("ninja").unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].entity.views, 9);
    assert_eq!(store.count("clip_views"), 2);
}

#[test]
fn parsed_at_field_is_stamped() {
    let mut follow = Follow {
        from_login: "ninja".into(),
        to_login: "shroud".into(),
        seen_at: Utc::now() - Duration::days(1),
    };
    let at = Utc::now();
    follow.stamp_parsed_at(at);
    assert_eq!(follow.seen_at, at);

    // Kinds without the attribute ignore the stamp
    let mut tagged = clip("abc", 1);
    tagged.stamp_parsed_at(at);
    assert_eq!(tagged, clip("abc", 1));
}

#[test]
fn identity_parts_containing_the_separator_stay_distinct() {
    let store = InMemoryDocumentStore::new();
    let clips = KeyedRepository::<ClipView>::new(store.clone());
    let left = ClipView {
        channel: "a:b".into(),
        clip_id: "c".into(),
        views: 1,
    };
    let right = ClipView {
        channel: "a".into(),
        clip_id: "b:c".into(),
        views: 2,
    };

    clips.create_or_update(left).unwrap();
    clips.create_or_update(right).unwrap();

    assert_eq!(store.count("clip_views"), 2);
}
