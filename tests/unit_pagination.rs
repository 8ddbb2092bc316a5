// Tests for the pagination walker over both cursor conventions.

mod common;

use std::sync::Arc;

use groupwatch::fetch::{FetchError, Fetcher, HalCollection, LinkHeader, Paginator, RequestQueue};
use serde_json::{json, Value};

use common::ScriptedTransport;

fn paginator(transport: Arc<ScriptedTransport>, max_pages: usize) -> Paginator {
    let fetcher = Fetcher::new(RequestQueue::new(transport, 4), Vec::new());
    Paginator::new(fetcher, max_pages)
}

#[tokio::test]
async fn follows_next_links_in_page_order() {
    let transport = ScriptedTransport::new().into_arc();
    transport.json_with_next("https://api.test/items?page=1", json!([1, 2]), "https://api.test/items?page=2");
    transport.json_with_next("https://api.test/items?page=2", json!([3, 4]), "https://api.test/items?page=3");
    transport.json("https://api.test/items?page=3", json!([5, 6]));

    let items: Vec<u32> = paginator(transport.clone(), 50)
        .walk("https://api.test/items?page=1", &LinkHeader)
        .await
        .unwrap();

    assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(transport.total_calls(), 3);
}

#[tokio::test]
async fn single_page_without_next_link() {
    let transport = ScriptedTransport::new().into_arc();
    transport.json("https://api.test/items", json!([{"id": 1}, {"id": 2}]));

    let items: Vec<Value> = paginator(transport.clone(), 50)
        .walk("https://api.test/items", &LinkHeader)
        .await
        .unwrap();

    assert_eq!(items, vec![json!({"id": 1}), json!({"id": 2})]);
    assert_eq!(transport.total_calls(), 1);
}

#[tokio::test]
async fn malformed_link_header_ends_the_walk() {
    let transport = ScriptedTransport::new().into_arc();
    transport.respond(
        "https://api.test/items",
        200,
        &[("Link", "this is not a link header")],
        b"[1]",
    );

    let items: Vec<u32> = paginator(transport.clone(), 50)
        .walk("https://api.test/items", &LinkHeader)
        .await
        .unwrap();

    assert_eq!(items, vec![1]);
    assert_eq!(transport.total_calls(), 1);
}

#[tokio::test]
async fn endless_next_links_stop_at_the_page_cap() {
    let transport = ScriptedTransport::new().into_arc();
    for page in 1..=10 {
        transport.json_with_next(
            &format!("https://api.test/items?page={page}"),
            json!([page]),
            &format!("https://api.test/items?page={}", page + 1),
        );
    }

    let items: Vec<u32> = paginator(transport.clone(), 4)
        .walk("https://api.test/items?page=1", &LinkHeader)
        .await
        .unwrap();

    assert_eq!(items, vec![1, 2, 3, 4]);
    assert_eq!(transport.total_calls(), 4);
}

#[tokio::test]
async fn a_failing_page_fails_the_walk() {
    let transport = ScriptedTransport::new().into_arc();
    transport.json_with_next("https://api.test/items?page=1", json!([1]), "https://api.test/items?page=2");
    transport.status("https://api.test/items?page=2", 502);

    let err = paginator(transport, 50)
        .walk::<u32>("https://api.test/items?page=1", &LinkHeader)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 502, .. }));
}

#[tokio::test]
async fn non_array_body_is_a_decode_error() {
    let transport = ScriptedTransport::new().into_arc();
    transport.json("https://api.test/items", json!({"message": "Not Found"}));

    let err = paginator(transport, 50)
        .walk::<Value>("https://api.test/items", &LinkHeader)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn hal_collections_follow_body_links() {
    let transport = ScriptedTransport::new().into_arc();
    transport.json(
        "https://dir.test/groups?page=1",
        json!({
            "_embedded": {"groups": [{"id": 1}, {"id": 2}]},
            "_links": {"next": {"href": "https://dir.test/groups?page=2"}}
        }),
    );
    transport.json(
        "https://dir.test/groups?page=2",
        json!({
            "_embedded": {"groups": [{"id": 3}]},
            "_links": {"self": {"href": "https://dir.test/groups?page=2"}}
        }),
    );

    let items: Vec<Value> = paginator(transport.clone(), 50)
        .walk("https://dir.test/groups?page=1", &HalCollection::new("groups"))
        .await
        .unwrap();

    let ids: Vec<u64> = items.iter().filter_map(|g| g["id"].as_u64()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn hal_page_without_embedded_items_is_empty() {
    let transport = ScriptedTransport::new().into_arc();
    transport.json("https://dir.test/groups/1/chairs", json!({"_links": {}}));

    let items: Vec<Value> = paginator(transport, 50)
        .walk("https://dir.test/groups/1/chairs", &HalCollection::new("chairs"))
        .await
        .unwrap();

    assert!(items.is_empty());
}
