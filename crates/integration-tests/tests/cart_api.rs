//! End-to-end tests for the cart API.
//!
//! Each test builds its own in-process app (see `TestClient`), so tests do
//! not share sessions or catalog state.

use axum::http::{Method, StatusCode};
use serde_json::json;

use sessioncart_integration_tests::TestClient;

#[tokio::test]
async fn test_new_session_has_empty_cart() {
    let mut client = TestClient::new();

    let (status, body) = client.list().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_add_item_and_list() {
    let mut client = TestClient::new();

    let (status, body) = client.add(1, Some(2)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({ "detail": "Successfully added item to the cart." })
    );
    assert!(client.session_cookie().is_some());

    let (status, body) = client.list().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "id": 1,
            "product": { "title": "A", "price": "5.00" },
            "count": 2,
            "total_price": "10.00"
        }])
    );
}

#[tokio::test]
async fn test_walkthrough() {
    let mut client = TestClient::new();

    client.add(1, None).await;
    client.add(1, None).await;
    let (_, body) = client.list().await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["count"], 2);

    client.add(2, None).await;
    let (_, body) = client.list().await;
    assert_eq!(body[1]["id"], 2);
    assert_eq!(body[1]["product"]["title"], "B");

    let (status, body) = client.decrease(1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "detail": "Item count decreased." }));
    client.decrease(1).await;

    let (_, body) = client.list().await;
    assert_eq!(
        body,
        json!([{
            "id": 2,
            "product": { "title": "B", "price": "10.00" },
            "count": 1,
            "total_price": "10.00"
        }])
    );
}

#[tokio::test]
async fn test_duplicate_add_increments_by_one() {
    let mut client = TestClient::new();

    client.add(3, Some(1)).await;
    let (status, _) = client.add(3, Some(5)).await;

    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = client.list().await;
    assert_eq!(body[0]["count"], 2);
}

#[tokio::test]
async fn test_id_not_reused_after_removal() {
    let mut client = TestClient::new();
    client.add(1, None).await;
    client.add(2, None).await;
    client.remove(1).await;

    client.add(3, None).await;

    let (_, body) = client.list().await;
    let ids: Vec<_> = body
        .as_array()
        .into_iter()
        .flatten()
        .map(|item| item["id"].clone())
        .collect();
    assert_eq!(ids, vec![json!(2), json!(3)]);
}

#[tokio::test]
async fn test_increase() {
    let mut client = TestClient::new();
    client.add(1, None).await;

    let (status, body) = client.increase(1).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "detail": "Item count increased." }));
    let (_, body) = client.list().await;
    assert_eq!(body[0]["count"], 2);
    assert_eq!(body[0]["total_price"], "10.00");
}

#[tokio::test]
async fn test_quantity_change_on_missing_item() {
    let mut client = TestClient::new();

    for (status, body) in [client.increase(1).await, client.decrease(1).await] {
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "detail": "Cart item not found" }));
    }

    client.add(1, None).await;
    let (status, _) = client.increase(9).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let mut client = TestClient::new();
    client.add(1, None).await;
    client.add(2, None).await;

    let (first, body) = client.remove(1).await;
    assert_eq!(first, StatusCode::NO_CONTENT);
    assert!(body.is_null());
    let (_, after_first) = client.list().await;

    let (second, _) = client.remove(1).await;
    assert_eq!(second, StatusCode::NO_CONTENT);
    let (_, after_second) = client.list().await;

    assert_eq!(after_first, after_second);
    assert_eq!(after_second.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_remove_on_new_session() {
    let mut client = TestClient::new();

    let (status, _) = client.remove(42).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_add_without_product_is_rejected() {
    let mut client = TestClient::new();

    let (status, body) = client
        .send(Method::POST, "/cart/add", Some(r#"{"count": 2}"#))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "detail": { "product": ["This field is required."] } })
    );
}

#[tokio::test]
async fn test_add_with_invalid_count_is_rejected() {
    let mut client = TestClient::new();

    let (status, body) = client.add(1, Some(0)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "detail": { "count": ["Ensure this value is greater than or equal to 1."] } })
    );
    let (_, body) = client.list().await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_add_unknown_product() {
    let mut client = TestClient::new();

    let (status, body) = client.add(99, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Product not found." }));
}

#[tokio::test]
async fn test_add_with_malformed_body() {
    let mut client = TestClient::new();

    let (status, body) = client
        .send(Method::POST, "/cart/add", Some("{not json"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_failed_add_keeps_existing_cart() {
    let mut client = TestClient::new();
    client.add(1, None).await;
    let (_, before) = client.list().await;

    client.add(99, None).await;
    client.add(2, Some(-3)).await;

    let (_, after) = client.list().await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_pagination() {
    let mut client = TestClient::new();
    for product in 1..=7 {
        client.add(product, None).await;
    }

    let (status, body) = client.list_page("1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(5));

    let (status, body) = client.list_page("2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    assert_eq!(body[0]["id"], 6);

    for page in ["0", "3", "abc"] {
        let (status, body) = client.list_page(page).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "page {page}");
        assert_eq!(body, json!({ "detail": "Invalid page." }));
    }

    let (_, body) = client.list().await;
    assert_eq!(body.as_array().map(Vec::len), Some(7));
}

#[tokio::test]
async fn test_first_page_of_empty_cart() {
    let mut client = TestClient::new();

    let (status, body) = client.list_page("1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let mut alice = TestClient::new();
    let mut bob = alice.stranger();

    alice.add(1, None).await;
    bob.add(2, None).await;

    let (_, alice_cart) = alice.list().await;
    let (_, bob_cart) = bob.list().await;
    assert_eq!(alice_cart[0]["product"]["title"], "A");
    assert_eq!(bob_cart[0]["product"]["title"], "B");
    assert_eq!(alice_cart[0]["id"], 1);
    assert_eq!(bob_cart[0]["id"], 1);
}

#[tokio::test]
async fn test_health_checks() {
    let mut client = TestClient::new();

    let (status, _) = client.send(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_adds_on_one_session_are_all_kept() {
    let mut client = TestClient::new();
    client.add(1, None).await;
    assert!(client.session_cookie().is_some());

    let handles: Vec<_> = (2..=7)
        .map(|product| {
            let mut tab = client.same_session();
            tokio::spawn(async move { tab.add(product, None).await })
        })
        .collect();

    for handle in handles {
        let (status, _) = handle.await.expect("add task should not panic");
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = client.list().await;
    let mut ids: Vec<i64> = body
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| item["id"].as_i64())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=7).collect::<Vec<_>>());
}
