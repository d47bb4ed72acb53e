//! Dispatcher routing against a real service.

use tlparser::bus::Message;
use tlparser::event::{CreatedOrUpdated, DeletedByKey, Envelope, ParseRequested};
use tlparser::{
    DispatchOutcome, Dispatcher, DispatcherState, EventType, InMemoryBroker, Publisher,
    StaticSource, Stored, TwitchGame,
};

use crate::support::{eventually, fortnite, service, POLL};

fn to_message(envelope: Envelope<TwitchGame>) -> Message {
    envelope.to_message().unwrap()
}

#[test]
fn parse_requested_fetches_and_stores() {
    let broker = InMemoryBroker::new();
    let source = StaticSource::new().with(fortnite());
    let (service, _) = service(source.clone(), &broker);
    let dispatcher = Dispatcher::<TwitchGame, _>::new("twitch_game", service.clone());

    let outcome = dispatcher.dispatch(&to_message(ParseRequested::new("Fortnite").into()));

    assert_eq!(outcome, DispatchOutcome::Handled(EventType::ParseRequested));
    assert_eq!(source.calls(), vec!["Fortnite"]);
    assert_eq!(service.get_by_key("Fortnite").unwrap().entity.game_id, "33214");
}

#[test]
fn created_or_updated_is_applied_verbatim_without_fetching() {
    let broker = InMemoryBroker::new();
    let source = StaticSource::<TwitchGame>::new();
    let (service, _) = service(source.clone(), &broker);
    let dispatcher = Dispatcher::<TwitchGame, _>::new("twitch_game.results", service.clone());

    let stored = Stored::new("remote-id", fortnite());
    let outcome = dispatcher.dispatch(&to_message(CreatedOrUpdated::from_stored(&stored).into()));

    assert_eq!(outcome, DispatchOutcome::Handled(EventType::CreatedOrUpdated));
    assert!(source.calls().is_empty());
    assert_eq!(service.get_by_key("Fortnite").unwrap(), stored);
}

#[test]
fn deleted_by_key_removes_the_record() {
    let broker = InMemoryBroker::new();
    let (service, _) = service(StaticSource::<TwitchGame>::new(), &broker);
    service.create(Stored::new("id-1", fortnite())).unwrap();
    let dispatcher = Dispatcher::<TwitchGame, _>::new("twitch_game.results", service.clone());

    let outcome = dispatcher.dispatch(&to_message(DeletedByKey::new("Fortnite").into()));

    assert_eq!(outcome, DispatchOutcome::Handled(EventType::DeletedByKey));
    assert!(service.list_all().unwrap().is_empty());
}

#[test]
fn source_failure_is_contained_and_persists_nothing() {
    let broker = InMemoryBroker::new();
    let (service, _) = service(StaticSource::<TwitchGame>::new(), &broker);
    let dispatcher = Dispatcher::<TwitchGame, _>::new("twitch_game", service.clone());

    let outcome = dispatcher.dispatch(&to_message(ParseRequested::new("Unknown").into()));

    assert_eq!(outcome, DispatchOutcome::Failed(EventType::ParseRequested));
    assert!(service.list_all().unwrap().is_empty());
    assert!(broker.is_empty("twitch_game.results"));
}

#[test]
fn running_loop_survives_bad_messages() {
    let broker = InMemoryBroker::new();
    let (service, _) = service(StaticSource::new().with(fortnite()), &broker);

    let handle = Dispatcher::<TwitchGame, _>::new("twitch_game", service.clone())
        .start(broker.clone(), POLL);
    assert!(handle.wait_until_consuming(std::time::Duration::from_secs(1)));

    broker
        .publish("twitch_game", Message::new("m-1", "twitch_game.parse_requested", Vec::new()))
        .unwrap();
    broker
        .publish("twitch_game", Message::with_string_payload("m-2", "twitch_game.renamed", ""))
        .unwrap();
    broker
        .publish("twitch_game", to_message(ParseRequested::new("Missing").into()))
        .unwrap();
    broker
        .publish("twitch_game", to_message(ParseRequested::new("Fortnite").into()))
        .unwrap();

    assert!(eventually(|| service.find_by_key("Fortnite").unwrap().len() == 1));
    assert_eq!(handle.state(), DispatcherState::Consuming);

    let stats = handle.stop();
    assert_eq!(stats.malformed, 1);
    assert_eq!(stats.unroutable, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.handled, 1);
    assert_eq!(broker.acknowledged().len(), 4);
}
