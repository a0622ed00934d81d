use httpmock::prelude::*;
use httpmock::Method::PATCH;
use mailbox_view::{Client, Dispatcher, Event, MailboxState, MessageState, Settings, Signal};
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

fn client(server: &MockServer) -> Client {
    Client::builder()
        .api_url(server.url("/api/v1"))
        .build()
        .unwrap()
}

fn fast_settings() -> Settings {
    Settings::default()
        .mark_seen_delay(Duration::from_millis(50))
        .seen_probe_interval(Duration::from_millis(10))
}

async fn mock_list(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/mailbox/swaks");
            then.status(200).json_body(json!([
                {"id": "a", "subject": "Hi", "from": "bob",
                 "date": "2024-03-01T08:00:00Z", "seen": false},
                {"id": "b", "subject": "Yo", "from": "eve",
                 "date": "2024-03-01T09:00:00Z", "seen": false}
            ]));
        })
        .await;
}

#[tokio::test]
async fn dwelling_on_a_message_marks_it_seen() {
    let server = MockServer::start_async().await;
    mock_list(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/message/swaks/a");
            then.status(200).json_body(json!({
                "mailbox": "swaks", "id": "a", "from": "bob", "to": ["swaks"],
                "subject": "Hi", "date": "2024-03-01T08:00:00Z", "seen": false,
                "text": "hello", "html": "", "attachments": []
            }));
        })
        .await;
    let patch = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/v1/message/swaks/a")
                .json_body(json!({"seen": true}));
            then.status(200);
        })
        .await;

    let mut handle = Dispatcher::spawn(client(&server), "swaks", None, fast_settings());
    let mut state = handle.state.clone();

    timeout(WAIT, state.wait_for(|m| m.list().is_some()))
        .await
        .expect("list never loaded")
        .unwrap();
    assert_eq!(
        handle.signals.recv().await,
        Some(Signal::RecordVisited("swaks".into()))
    );

    handle.events.send(Event::ClickMessage("a".into())).unwrap();
    assert_eq!(handle.signals.recv().await, Some(Signal::DisableRouting));
    assert_eq!(
        handle.signals.recv().await,
        Some(Signal::Navigate("/m/swaks/a".into()))
    );

    timeout(
        WAIT,
        state.wait_for(|m| m.list().is_some_and(|l| l.headers.iter().any(|h| h.id == "a" && h.seen))),
    )
    .await
    .expect("message never marked seen")
    .unwrap();
    patch.assert_hits_async(1).await;

    drop(handle.events);
    let mailbox = timeout(WAIT, handle.task).await.unwrap().unwrap();
    let visible = mailbox.message_state().and_then(|s| s.visible()).unwrap();
    assert!(visible.message.seen);
    assert_eq!(visible.mark_seen_at, None);
}

#[tokio::test]
async fn list_failure_leaves_screen_loading() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/mailbox/swaks");
            then.status(503);
        })
        .await;

    let mut handle = Dispatcher::spawn(client(&server), "swaks", None, Settings::default());

    let signal = timeout(WAIT, handle.signals.recv()).await.unwrap();
    match signal {
        Some(Signal::Error(text)) => assert!(text.starts_with("Failed to load mailbox"), "{text}"),
        other => panic!("unexpected signal {other:?}"),
    }

    drop(handle.events);
    let mailbox = timeout(WAIT, handle.task).await.unwrap().unwrap();
    assert_eq!(mailbox.state, MailboxState::LoadingList(None));
}

#[tokio::test]
async fn purge_clears_list_even_when_request_fails() {
    let server = MockServer::start_async().await;
    mock_list(&server).await;
    let purge = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/v1/mailbox/swaks");
            then.status(500);
        })
        .await;

    let mut handle = Dispatcher::spawn(client(&server), "swaks", None, Settings::default());
    let mut state = handle.state.clone();
    timeout(WAIT, state.wait_for(|m| m.list().is_some()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        handle.signals.recv().await,
        Some(Signal::RecordVisited("swaks".into()))
    );

    handle.events.send(Event::Purge).unwrap();
    let signal = timeout(WAIT, handle.signals.recv()).await.unwrap();
    assert!(matches!(signal, Some(Signal::Error(_))), "{signal:?}");
    purge.assert_async().await;

    drop(handle.events);
    let mailbox = timeout(WAIT, handle.task).await.unwrap().unwrap();
    let list = mailbox.list().unwrap();
    assert!(list.headers.is_empty());
    assert_eq!(mailbox.message_state(), Some(&MessageState::NoMessage));
}

#[tokio::test]
async fn deep_link_opens_message_after_list_loads() {
    let server = MockServer::start_async().await;
    mock_list(&server).await;
    let fetch = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/message/swaks/b");
            then.status(200).json_body(json!({
                "mailbox": "swaks", "id": "b", "from": "eve", "to": ["swaks"],
                "subject": "Yo", "date": "2024-03-01T09:00:00Z", "seen": true,
                "text": "hey", "html": "<b>hey</b>", "attachments": []
            }));
        })
        .await;

    let handle = Dispatcher::spawn(client(&server), "swaks", Some("b".into()), Settings::default());
    let mut state = handle.state.clone();

    timeout(
        WAIT,
        state.wait_for(|m| matches!(m.message_state(), Some(MessageState::ShowingMessage(_)))),
    )
    .await
    .unwrap()
    .unwrap();
    fetch.assert_async().await;
    assert!(!state.borrow().wants_seen_probe());
    assert_eq!(
        state.borrow().list().and_then(|l| l.selected.clone()).as_deref(),
        Some("b")
    );
}

#[tokio::test]
async fn zero_intervals_from_setters_do_not_stop_the_loop() {
    let server = MockServer::start_async().await;
    mock_list(&server).await;

    let settings = Settings::default()
        .seen_probe_interval(Duration::ZERO)
        .clock_interval(Duration::ZERO);
    let handle = Dispatcher::spawn(client(&server), "swaks", None, settings);
    let mut state = handle.state.clone();

    timeout(WAIT, state.wait_for(|m| m.list().is_some()))
        .await
        .expect("list never loaded")
        .unwrap();

    drop(handle.events);
    let mailbox = timeout(WAIT, handle.task).await.unwrap().unwrap();
    assert_eq!(mailbox.list().unwrap().headers.len(), 2);
}
