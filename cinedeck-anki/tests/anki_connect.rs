//! Client and store against a canned AnkiConnect server on localhost.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

use serde_json::{json, Value};

use cinedeck_anki::{AnkiClient, AnkiError, AnkiStore};
use cinedeck_core::types::NoteId;
use cinedeck_sync::{NewNote, NotePayload, RemoteError, RemoteStore};

/// Answer one connection per canned body, in order; returns the request bodies.
fn serve(responses: Vec<Value>) -> (String, JoinHandle<Vec<Value>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}", listener.local_addr().expect("addr"));
    let handle = std::thread::spawn(move || {
        let mut received = Vec::new();
        for response in responses {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("read header");
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().expect("length");
                    }
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).expect("read body");
            received.push(serde_json::from_slice(&body).expect("json body"));

            let payload = response.to_string();
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                payload.len(),
                payload
            )
            .expect("write response");
            stream.flush().expect("flush");
        }
        received
    });
    (url, handle)
}

fn ok(result: Value) -> Value {
    json!({"result": result, "error": null})
}

#[test]
fn bootstrap_pings_then_creates_deck() {
    let (url, server) = serve(vec![ok(json!(6)), ok(json!(1519323742721_i64))]);
    AnkiClient::new(url).bootstrap("Cine2Nerdle").expect("bootstrap");

    let requests = server.join().expect("server");
    assert_eq!(requests[0], json!({"action": "version", "version": 6}));
    assert_eq!(
        requests[1],
        json!({"action": "createDeck", "version": 6, "params": {"deck": "Cine2Nerdle"}})
    );
}

#[test]
fn old_api_version_is_rejected() {
    let (url, server) = serve(vec![ok(json!(5))]);
    let err = AnkiClient::new(url).bootstrap("Cine2Nerdle").unwrap_err();
    assert!(matches!(err, AnkiError::UnsupportedVersion { found: 5, .. }));
    server.join().expect("server");
}

#[test]
fn check_version_does_not_touch_decks() {
    let (url, server) = serve(vec![ok(json!(6))]);
    assert_eq!(AnkiClient::new(url).check_version().expect("version"), 6);

    let requests = server.join().expect("server");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["action"], "version");
}

#[test]
fn query_finds_then_fetches_note_info() {
    let (url, server) = serve(vec![
        ok(json!([42])),
        ok(json!([{
            "noteId": 42,
            "modelName": "Movie",
            "tags": ["tmdb:949", "director:Michael_Mann:cloze"],
            "fields": {"Movie Title": {"value": "Heat", "order": 0}}
        }])),
    ]);
    let notes = AnkiClient::new(url)
        .query("note:Movie deck:Cine2Nerdle tag:tmdb:949")
        .expect("query");

    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, NoteId(42));
    assert_eq!(notes[0].fields["Movie Title"], "Heat");

    let requests = server.join().expect("server");
    assert_eq!(requests[0]["action"], "findNotes");
    assert_eq!(requests[1]["params"], json!({"notes": [42]}));
}

#[test]
fn empty_search_skips_note_info() {
    let (url, server) = serve(vec![ok(json!([]))]);
    let notes = AnkiClient::new(url).query("deck:Empty").expect("query");
    assert!(notes.is_empty());
    assert_eq!(server.join().expect("server").len(), 1);
}

#[tokio::test]
async fn duplicate_error_maps_to_duplicate_title() {
    let (url, server) = serve(vec![json!({
        "result": null,
        "error": "cannot create note because it is a duplicate"
    })]);
    let store = AnkiStore::new(AnkiClient::new(url));
    let note = NewNote {
        deck: "Cine2Nerdle".into(),
        model: "Movie".into(),
        payload: NotePayload::default(),
    };

    let err = store.create(&note).await.unwrap_err();
    assert_eq!(err, RemoteError::DuplicateTitle);
    let requests = server.join().expect("server");
    assert_eq!(requests[0]["action"], "addNote");
    assert_eq!(requests[0]["params"]["note"]["options"]["allowDuplicate"], false);
}

#[tokio::test]
async fn update_and_delete_round_trip_through_store() {
    let (url, server) = serve(vec![ok(Value::Null), ok(Value::Null)]);
    let store = AnkiStore::new(AnkiClient::new(url));

    let id = store
        .update(NoteId(7), &NotePayload::default())
        .await
        .expect("update");
    assert_eq!(id, NoteId(7));
    store.delete(&[NoteId(7), NoteId(8)]).await.expect("delete");

    let requests = server.join().expect("server");
    assert_eq!(requests[0]["action"], "updateNote");
    assert_eq!(requests[0]["params"]["note"]["id"], 7);
    assert_eq!(
        requests[1],
        json!({"action": "deleteNotes", "version": 6, "params": {"notes": [7, 8]}})
    );
}

#[tokio::test]
async fn unreachable_server_is_a_communication_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let store = AnkiStore::new(AnkiClient::new(format!("http://127.0.0.1:{port}")));
    let err = store.find_ids("deck:Any").await.unwrap_err();
    assert!(matches!(err, RemoteError::Communication(_)), "got: {err:?}");
}
