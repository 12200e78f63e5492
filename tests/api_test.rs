//! HTTP surface, exercised over a real socket.

use cafe_orders::bus::{LiveEvent, Room};
use cafe_orders::config::Config;
use cafe_orders::lifecycle::OrderSystem;
use cafe_orders::notify::PushDispatcher;
use cafe_orders::server::{router, AppState};
use futures::{SinkExt, StreamExt};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;

struct TestApp {
    base: String,
    http: reqwest::Client,
    system: OrderSystem,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

async fn spawn_app() -> TestApp {
    let system = OrderSystem::new(&Config::default(), PushDispatcher::disabled());
    let app = router(AppState::new(&system, "BTestPublicKey"));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base: format!("http://{addr}"),
        http: reqwest::Client::new(),
        system,
    }
}

fn order_body(identity: Option<&str>) -> Value {
    json!({
        "kind": "dine-in",
        "lineItems": [
            { "itemId": "latte", "name": "Latte", "unitPrice": 120, "quantity": 2 }
        ],
        "totalAmount": 240,
        "customerIdentity": identity,
        "customerName": "Ana"
    })
}

async fn place(app: &TestApp, identity: Option<&str>) -> Value {
    let res = app
        .http
        .post(app.url("/api/orders"))
        .json(&order_body(identity))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn set_status(app: &TestApp, id: &str, status: &str) -> reqwest::Response {
    app.http
        .put(app.url(&format!("/api/orders/{id}/status")))
        .json(&json!({ "status": status }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_list_and_history() {
    let app = spawn_app().await;
    let (admin, mut admin_rx) = app.system.bus.connect();
    app.system.bus.join(admin, Room::Admin).unwrap();

    let created = place(&app, Some("A@X.com")).await;
    assert_eq!(created["status"], "pending");
    assert_eq!(created["customerIdentity"], "a@x.com");
    assert!(created["id"].as_str().is_some());
    assert_eq!(admin_rx.recv().await.unwrap().name(), "newOrder");

    place(&app, None).await;

    let all: Vec<Value> = app
        .http
        .get(app.url("/api/orders"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let history: Vec<Value> = app
        .http
        .get(app.url("/api/orders/history/a@x.com"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_invalid_order_is_400() {
    let app = spawn_app().await;
    let mut body = order_body(None);
    body["totalAmount"] = json!(999);

    let res = app
        .http
        .post(app.url("/api/orders"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert!(err["message"].as_str().unwrap().starts_with("Invalid order data"));
}

#[tokio::test]
async fn test_status_updates_and_their_errors() {
    let app = spawn_app().await;
    let order = place(&app, Some("a@x.com")).await;
    let id = order["id"].as_str().unwrap();

    let (user, mut user_rx) = app.system.bus.connect();
    app.system
        .bus
        .join(user, Room::User("a@x.com".into()))
        .unwrap();

    let res = set_status(&app, id, "accepted").await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["status"], "accepted");
    match &*user_rx.recv().await.unwrap() {
        LiveEvent::OrderStatusUpdated(o) => assert_eq!(o.id.0, id),
        other => panic!("unexpected event {other:?}"),
    }

    assert_eq!(
        set_status(&app, id, "teleported").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        set_status(&app, id, "pending").await.status(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        set_status(&app, "no-such-order", "accepted").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_delete_order() {
    let app = spawn_app().await;
    let order = place(&app, None).await;
    let id = order["id"].as_str().unwrap();

    let res = app
        .http
        .delete(app.url(&format!("/api/orders/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Order deleted successfully");

    let again = app
        .http
        .delete(app.url(&format!("/api/orders/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_subscription_endpoints() {
    let app = spawn_app().await;

    let key: Value = app
        .http
        .get(app.url("/api/subscriptions/vapidPublicKey"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(key, json!({ "publicKey": "BTestPublicKey" }));

    let body = json!({
        "subscription": {
            "endpoint": "https://push.example.com/ana",
            "keys": { "p256dh": "BPub", "auth": "secret" }
        },
        "email": "Ana@X.com"
    });
    let subscribe = || {
        app.http
            .post(app.url("/api/subscriptions/subscribe"))
            .json(&body)
            .send()
    };

    let first: Value = subscribe().await.unwrap().json().await.unwrap();
    assert_eq!(first["message"], "Subscription saved successfully");
    let second = subscribe().await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let second: Value = second.json().await.unwrap();
    assert_eq!(second["message"], "Subscription already exists");

    let missing = app
        .http
        .post(app.url("/api/subscriptions/subscribe"))
        .json(&json!({ "email": "ana@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let bad_endpoint = app
        .http
        .post(app.url("/api/subscriptions/subscribe"))
        .json(&json!({
            "subscription": { "endpoint": "not a url", "keys": { "p256dh": "a", "auth": "b" } },
            "email": "ana@x.com"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_endpoint.status(), StatusCode::BAD_REQUEST);

    let res = app
        .http
        .delete(app.url("/api/subscriptions/unsubscribe"))
        .json(&json!({ "endpoint": "https://push.example.com/ana", "email": "ana@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res: Value = res.json().await.unwrap();
    assert_eq!(res["message"], "Unsubscribed successfully");
    assert!(app
        .system
        .subscriptions
        .find_by_identity("ana@x.com")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_live_socket_receives_status_updates_after_joining() {
    let app = spawn_app().await;
    let order = place(&app, Some("a@x.com")).await;
    let id = order["id"].as_str().unwrap().to_string();

    let ws_url = format!("{}/ws", app.base.replacen("http", "ws", 1));
    let (mut socket, _) = tokio_tungstenite::connect_async(ws_url.as_str())
        .await
        .unwrap();
    socket
        .send(Message::text(r#"{"type":"joinUser","identity":"A@x.com"}"#))
        .await
        .unwrap();

    // joins are not acknowledged; wait for the membership to appear
    let room = Room::User("a@x.com".into());
    tokio::time::timeout(Duration::from_secs(5), async {
        while app.system.bus.members(&room).is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("join registered");

    assert_eq!(set_status(&app, &id, "accepted").await.status(), StatusCode::OK);

    let frame = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => break text,
                Some(Ok(_)) => continue,
                other => panic!("socket ended: {other:?}"),
            }
        }
    })
    .await
    .expect("live event");

    let event: Value = serde_json::from_str(frame.as_str()).unwrap();
    assert_eq!(event["event"], "orderStatusUpdated");
    assert_eq!(event["data"]["id"], id.as_str());
    assert_eq!(event["data"]["status"], "accepted");

    socket.close(None).await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), async {
        while app.system.bus.connection_count() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("session cleaned up");
}
