//! Web push delivery against a local stand-in push service.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use cafe_orders::config::{Config, VapidCredentials};
use cafe_orders::lifecycle::OrderSystem;
use cafe_orders::model::{
    EndpointRegistration, LineItem, OrderCreate, OrderKind, OrderStatus, PushSubscription,
    SubscriptionId, SubscriptionKeys,
};
use cafe_orders::notify::webpush::{VapidSigner, WebPushTransport, HEADER_LEN};
use cafe_orders::notify::{DeliveryOutcome, PushDispatcher, PushTransport};
use chrono::Utc;
use ring::agreement::{self, EphemeralPrivateKey};
use ring::rand::SystemRandom;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const PUBLIC: &str =
    "BLhfkHvMwLU1VR2xt2QbapafF0HZL1U_EABDIa8GocmgFNZqvKrR0ZinBw_bbXXvp1tZIDoT8KptqEj3qt86wj0";
const PRIVATE: &str = "Hy49TFtqeYgXJjVEU2JxgKm4x9bl9AMSITBPXm18i5o";

#[derive(Debug, Clone)]
struct Received {
    status: u16,
    headers: HeaderMap,
    body_len: usize,
}

type Inbox = Arc<Mutex<Vec<Received>>>;

async fn accept(
    State(inbox): State<Inbox>,
    Path(status): Path<u16>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    inbox.lock().unwrap().push(Received {
        status,
        headers,
        body_len: body.len(),
    });
    StatusCode::from_u16(status).unwrap()
}

/// Starts a push service that answers `/push/{status}` with that status.
async fn push_service() -> (String, Inbox) {
    let inbox = Inbox::default();
    let app = Router::new()
        .route("/push/{status}", post(accept))
        .with_state(inbox.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), inbox)
}

fn browser_keys() -> SubscriptionKeys {
    let rng = SystemRandom::new();
    let key = EphemeralPrivateKey::generate(&agreement::ECDH_P256, &rng).unwrap();
    let public = key.compute_public_key().unwrap();
    SubscriptionKeys {
        p256dh: URL_SAFE_NO_PAD.encode(public.as_ref()),
        auth: URL_SAFE_NO_PAD.encode([7u8; 16]),
    }
}

fn transport_with_timeout(timeout: Duration) -> WebPushTransport {
    let signer = VapidSigner::new(PUBLIC, PRIVATE, "mailto:ops@auracafe.test").unwrap();
    WebPushTransport::new(signer, timeout, 3600).unwrap()
}

fn transport() -> WebPushTransport {
    transport_with_timeout(Duration::from_secs(5))
}

fn subscription(endpoint: String) -> PushSubscription {
    PushSubscription {
        id: SubscriptionId("s-1".into()),
        user_identity: "a@x.com".into(),
        endpoint,
        keys: browser_keys(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_delivery_sends_encrypted_vapid_request() {
    let (base, inbox) = push_service().await;
    let payload = br#"{"title":"AuraCafe Order Update"}"#;

    let outcome = transport()
        .deliver(&subscription(format!("{base}/push/201")), payload)
        .await;
    assert_eq!(outcome, DeliveryOutcome::Delivered);

    let received = inbox.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    let headers = &received[0].headers;
    assert_eq!(headers["content-encoding"], "aes128gcm");
    assert_eq!(headers["ttl"], "3600");
    let authorization = headers["authorization"].to_str().unwrap();
    assert!(authorization.starts_with("vapid t="));
    assert!(authorization.ends_with(&format!("k={PUBLIC}")));
    // header, payload, delimiter, tag
    assert_eq!(received[0].body_len, HEADER_LEN + payload.len() + 1 + 16);
}

#[tokio::test]
async fn test_push_service_statuses_map_to_outcomes() {
    let (base, inbox) = push_service().await;
    let transport = transport();

    for (status, expected) in [
        (410, DeliveryOutcome::Expired),
        (404, DeliveryOutcome::Expired),
        (429, DeliveryOutcome::Failed),
        (500, DeliveryOutcome::Failed),
    ] {
        let outcome = transport
            .deliver(&subscription(format!("{base}/push/{status}")), b"{}")
            .await;
        assert_eq!(outcome, expected, "status {status}");
    }
    assert_eq!(
        inbox.lock().unwrap().iter().map(|r| r.status).collect::<Vec<_>>(),
        vec![410, 404, 429, 500]
    );
}

#[tokio::test]
async fn test_unreachable_or_malformed_subscription_fails() {
    let transport = transport();

    let mut broken = subscription("http://127.0.0.1:9/push/201".into());
    broken.keys.p256dh = "not-a-key".into();
    assert_eq!(transport.deliver(&broken, b"{}").await, DeliveryOutcome::Failed);

    // nothing listens on the discard port
    let unreachable = subscription("http://127.0.0.1:9/push/201".into());
    assert_eq!(
        transport.deliver(&unreachable, b"{}").await,
        DeliveryOutcome::Failed
    );
}

#[tokio::test]
async fn test_slow_push_service_times_out_as_failed() {
    let app = Router::new().route(
        "/push/slow",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            StatusCode::CREATED
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let transport = transport_with_timeout(Duration::from_millis(100));
    let started = std::time::Instant::now();
    let outcome = transport
        .deliver(&subscription(format!("http://{addr}/push/slow")), b"{}")
        .await;

    assert_eq!(outcome, DeliveryOutcome::Failed);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_gone_endpoint_is_pruned_end_to_end() {
    let (base, inbox) = push_service().await;
    let config = Config {
        vapid: Some(VapidCredentials {
            public_key: PUBLIC.into(),
            private_key: PRIVATE.into(),
            subject: "mailto:ops@auracafe.test".into(),
        }),
        ..Config::default()
    };
    let system = OrderSystem::new(&config, PushDispatcher::from_config(&config).unwrap());

    for status in [201, 410] {
        system
            .subscriptions
            .subscribe(
                "a@x.com",
                EndpointRegistration {
                    endpoint: format!("{base}/push/{status}"),
                    keys: browser_keys(),
                },
            )
            .await
            .unwrap();
    }

    let order = system
        .lifecycle
        .create_order(OrderCreate {
            kind: OrderKind::DineIn,
            line_items: vec![LineItem {
                item_id: "tea".into(),
                name: "Masala Tea".into(),
                unit_price: Decimal::from(40),
                quantity: 1,
            }],
            total_amount: Decimal::from(40),
            customer_identity: Some("a@x.com".into()),
            customer_name: "Ana".into(),
            phone_number: None,
            address: None,
        })
        .await
        .unwrap();

    system
        .lifecycle
        .set_status(order.id, OrderStatus::Accepted)
        .await
        .unwrap();
    system.lifecycle.flush_notifications().await;

    assert_eq!(inbox.lock().unwrap().len(), 2);
    let left = system.subscriptions.find_by_identity("a@x.com").await.unwrap();
    assert_eq!(left.len(), 1);
    assert!(left[0].endpoint.ends_with("/push/201"));

    system.shutdown().await.unwrap();
}
