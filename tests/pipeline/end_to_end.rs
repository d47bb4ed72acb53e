//! Trigger to projection across two stores.
//!
//! Pipeline A owns the request topic and fetches; pipeline B follows A's
//! result topic and projects into its own store.

use std::time::Duration;

use tlparser::{
    Envelope, EventType, InMemoryBroker, LamodaProduct, Pipeline, StaticSource, Topics,
    TwitchUser,
};

use crate::support::{eventually, ninja, product, service, POLL};

#[test]
fn ninja_reaches_the_projection() {
    let broker = InMemoryBroker::new();
    let (fetching, _) = service(StaticSource::new().with(ninja()), &broker);
    let (projection, projection_store) = service(StaticSource::<TwitchUser>::new(), &broker);
    let projection = projection.with_topics(Topics::new("projection", "projection.results"));

    let results = fetching.topics().results.clone();
    let a = Pipeline::start(fetching.clone(), broker.clone(), POLL);
    let mut b = Pipeline::start(projection.clone(), broker.clone(), POLL);
    b.follow(&results);
    assert!(a.wait_until_consuming(Duration::from_secs(1)));
    assert!(b.wait_until_consuming(Duration::from_secs(1)));

    fetching.parse("ninja").unwrap();

    assert!(eventually(|| projection_store.count("twitch_users") == 1));
    let projected = projection.list_all().unwrap();
    assert_eq!(projected.len(), 1);
    assert_eq!(projected[0].entity.login, "ninja");
    assert_eq!(projected[0], fetching.get_by_key("ninja").unwrap());

    let request = &broker.messages("twitch_user")[0];
    let result = &broker.messages("twitch_user.results")[0];
    assert_eq!(request.event_type, EventType::ParseRequested.tag::<TwitchUser>());
    assert_eq!(result.metadata_value("causation_id"), Some(request.id.as_str()));
    let Some(Envelope::CreatedOrUpdated(event)) =
        Envelope::<TwitchUser>::from_message(result).unwrap()
    else {
        panic!("expected created_or_updated on the result topic");
    };
    assert_eq!(event.entity.login, "ninja");

    a.shutdown();
    b.shutdown();
}

#[test]
fn failed_fetch_yields_no_result_event() {
    let broker = InMemoryBroker::new();
    let (fetching, store) = service(StaticSource::<TwitchUser>::new(), &broker);
    let pipeline = Pipeline::start(fetching.clone(), broker.clone(), POLL);

    fetching.parse("ghost").unwrap();
    assert!(eventually(|| broker.acknowledged().len() == 1));

    assert_eq!(store.count("twitch_users"), 0);
    assert!(broker.is_empty("twitch_user.results"));
    assert!(fetching.get_by_key("ghost").unwrap_err().is_not_found());

    let stats = pipeline.shutdown();
    assert_eq!(stats[0].1.failed, 1);
}

#[test]
fn category_parse_and_removal_are_projected() {
    let broker = InMemoryBroker::new();
    let source = StaticSource::new().with_all(
        "shoes",
        vec![product("shoes", "A1", 10.0), product("shoes", "B2", 20.0)],
    );
    let (fetching, _) = service(source, &broker);
    let (projection, projection_store) = service(StaticSource::<LamodaProduct>::new(), &broker);
    let projection = projection.with_topics(Topics::new("projection", "projection.results"));

    let results = fetching.topics().results.clone();
    let a = Pipeline::start(fetching.clone(), broker.clone(), POLL);
    let mut b = Pipeline::start(projection.clone(), broker.clone(), POLL);
    b.follow(&results);

    fetching.parse("shoes").unwrap();
    assert!(eventually(|| projection_store.count("lamoda_products") == 2));

    fetching.remove("shoes").unwrap();
    assert!(eventually(|| projection_store.count("lamoda_products") == 0));
    assert!(fetching.find_by_key("shoes").unwrap().is_empty());

    a.shutdown();
    let stats = b.shutdown();
    let (topic, followed) = &stats[1];
    assert_eq!(topic, "lamoda_product.results");
    assert_eq!(followed.handled, 3);
}
