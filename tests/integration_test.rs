use actor_framework::ActorClient;
use async_trait::async_trait;
use cafe_orders::bus::{EventReceiver, LiveEvent, Room};
use cafe_orders::clients::OrderClient;
use cafe_orders::config::Config;
use cafe_orders::lifecycle::OrderSystem;
use cafe_orders::model::{
    EndpointRegistration, LineItem, OrderCreate, OrderId, OrderKind, OrderStatus, PushSubscription,
    SubscriptionKeys,
};
use cafe_orders::notify::recording::RecordingTransport;
use cafe_orders::notify::{DeliveryOutcome, PushDispatcher, PushTransport};
use cafe_orders::order_actor::OrderError;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, OnceLock};

const ADMIN: &str = "boss@auracafe.test";

fn config() -> Config {
    Config {
        admin_identity: Some(ADMIN.to_string()),
        ..Config::default()
    }
}

fn start() -> (OrderSystem, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::new());
    let system = OrderSystem::new(&config(), PushDispatcher::new(transport.clone()));
    (system, transport)
}

fn dine_in(identity: Option<&str>) -> OrderCreate {
    OrderCreate {
        kind: OrderKind::DineIn,
        line_items: vec![
            LineItem {
                item_id: "latte".into(),
                name: "Latte".into(),
                unit_price: Decimal::new(5000, 2),
                quantity: 2,
            },
            LineItem {
                item_id: "muffin".into(),
                name: "Muffin".into(),
                unit_price: Decimal::new(5000, 2),
                quantity: 1,
            },
        ],
        total_amount: Decimal::new(15000, 2),
        customer_identity: identity.map(str::to_string),
        customer_name: "Ana".into(),
        phone_number: None,
        address: None,
    }
}

async fn subscribe(system: &OrderSystem, identity: &str, endpoint: &str) {
    system
        .subscriptions
        .subscribe(
            identity,
            EndpointRegistration {
                endpoint: endpoint.into(),
                keys: SubscriptionKeys {
                    p256dh: "BPub".into(),
                    auth: "secret".into(),
                },
            },
        )
        .await
        .expect("subscribe");
}

fn drain(rx: &mut EventReceiver) -> Vec<Arc<LiveEvent>> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Scenario A: guest dine-in order.
#[tokio::test]
async fn test_guest_order_alerts_only_the_admin_room() {
    let (system, transport) = start();
    subscribe(&system, ADMIN, "https://push.example.com/boss").await;

    let (admin, mut admin_rx) = system.bus.connect();
    system.bus.join(admin, Room::Admin).unwrap();
    let (user, mut user_rx) = system.bus.connect();
    system.bus.join(user, Room::User("a@x.com".into())).unwrap();

    let order = system
        .lifecycle
        .create_order(dine_in(None))
        .await
        .expect("create");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, Decimal::from(150));

    let admin_events = drain(&mut admin_rx);
    assert_eq!(admin_events.len(), 1);
    assert_eq!(*admin_events[0], LiveEvent::NewOrder(order.clone()));
    assert!(drain(&mut user_rx).is_empty());

    system.lifecycle.flush_notifications().await;
    let pushes = transport.attempts_for(ADMIN);
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].payload.body, format!("New order #{} - ₹150", order.id));

    system.shutdown().await.unwrap();
}

/// Scenario B: customer order accepted.
#[tokio::test]
async fn test_status_change_reaches_customer_room_and_everyone() {
    let (system, transport) = start();
    subscribe(&system, "a@x.com", "https://push.example.com/ana").await;

    let order = system
        .lifecycle
        .create_order(dine_in(Some("A@x.com")))
        .await
        .unwrap();

    let (customer, mut customer_rx) = system.bus.connect();
    system.bus.join(customer, Room::User("a@x.com".into())).unwrap();
    let (admin, mut admin_rx) = system.bus.connect();
    system.bus.join(admin, Room::Admin).unwrap();

    let accepted = system
        .lifecycle
        .set_status(order.id.clone(), OrderStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(accepted.status, OrderStatus::Accepted);
    assert!(accepted.updated_at >= order.updated_at);

    // room broadcast + broadcast to all
    let customer_events = drain(&mut customer_rx);
    assert_eq!(customer_events.len(), 2);
    for event in &customer_events {
        assert_eq!(**event, LiveEvent::OrderStatusUpdated(accepted.clone()));
    }
    assert_eq!(drain(&mut admin_rx).len(), 1);

    system.lifecycle.flush_notifications().await;
    let pushes = transport.attempts_for("a@x.com");
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].payload.body, "Your order has been accepted!");
    assert_eq!(pushes[0].payload.data.status, "accepted");

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_guest_status_change_only_broadcasts_to_all() {
    let (system, transport) = start();
    let order = system.lifecycle.create_order(dine_in(None)).await.unwrap();

    let (user, mut user_rx) = system.bus.connect();
    system.bus.join(user, Room::User("a@x.com".into())).unwrap();
    let (_idle, mut idle_rx) = system.bus.connect();

    system
        .lifecycle
        .set_status(order.id, OrderStatus::Declined)
        .await
        .unwrap();

    assert_eq!(drain(&mut user_rx).len(), 1);
    assert_eq!(drain(&mut idle_rx).len(), 1);

    system.lifecycle.flush_notifications().await;
    assert!(transport.attempts_for("a@x.com").is_empty());

    system.shutdown().await.unwrap();
}

/// Scenario C: unknown order.
#[tokio::test]
async fn test_unknown_order_has_no_side_effects() {
    let (system, transport) = start();
    subscribe(&system, ADMIN, "https://push.example.com/boss").await;
    let (_conn, mut rx) = system.bus.connect();

    let err = system
        .lifecycle
        .set_status(OrderId::from("missing"), OrderStatus::Accepted)
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::NotFound("missing".into()));

    let err = system
        .lifecycle
        .delete_order(OrderId::from("missing"))
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::NotFound("missing".into()));

    system.lifecycle.flush_notifications().await;
    assert!(drain(&mut rx).is_empty());
    assert!(transport.attempts().is_empty());

    system.shutdown().await.unwrap();
}

/// Scenario D: one of two devices expired.
#[tokio::test]
async fn test_expired_device_is_pruned_while_the_other_still_receives() {
    let (system, transport) = start();
    subscribe(&system, "a@x.com", "https://push.example.com/old-phone").await;
    subscribe(&system, "a@x.com", "https://push.example.com/laptop").await;
    transport.script("https://push.example.com/old-phone", DeliveryOutcome::Expired);

    let order = system
        .lifecycle
        .create_order(dine_in(Some("a@x.com")))
        .await
        .unwrap();
    let result = system
        .lifecycle
        .set_status(order.id, OrderStatus::Accepted)
        .await;
    assert!(result.is_ok());

    system.lifecycle.flush_notifications().await;
    let pushes = transport.attempts_for("a@x.com");
    assert_eq!(pushes.len(), 2);
    assert!(pushes
        .iter()
        .any(|a| a.endpoint.ends_with("laptop") && a.outcome == DeliveryOutcome::Delivered));

    let left = system.subscriptions.find_by_identity("a@x.com").await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].endpoint, "https://push.example.com/laptop");

    system.shutdown().await.unwrap();
}

/// Records whether the order still existed when the push went out.
struct WitnessTransport {
    orders: OnceLock<OrderClient>,
    order_id: OnceLock<OrderId>,
    seen: Mutex<Vec<(String, bool)>>,
}

#[async_trait]
impl PushTransport for WitnessTransport {
    async fn deliver(&self, _subscription: &PushSubscription, payload: &[u8]) -> DeliveryOutcome {
        let status = serde_json::from_slice::<serde_json::Value>(payload).unwrap()["data"]["status"]
            .as_str()
            .unwrap()
            .to_string();
        let exists = match (self.orders.get(), self.order_id.get()) {
            (Some(orders), Some(id)) => orders.get_order(id.clone()).await.is_ok(),
            _ => false,
        };
        self.seen.lock().unwrap().push((status, exists));
        DeliveryOutcome::Delivered
    }
}

/// Scenario E: delete notifies the customer before removing the record.
#[tokio::test]
async fn test_delete_sends_cancelled_before_removal() {
    let witness = Arc::new(WitnessTransport {
        orders: OnceLock::new(),
        order_id: OnceLock::new(),
        seen: Mutex::new(Vec::new()),
    });
    let system = OrderSystem::new(&Config::default(), PushDispatcher::new(witness.clone()));
    witness.orders.set(system.orders.clone()).ok().unwrap();
    subscribe(&system, "a@x.com", "https://push.example.com/ana").await;

    let (admin, mut admin_rx) = system.bus.connect();
    system.bus.join(admin, Room::Admin).unwrap();

    let order = system
        .lifecycle
        .create_order(dine_in(Some("a@x.com")))
        .await
        .unwrap();
    witness.order_id.set(order.id.clone()).unwrap();
    drain(&mut admin_rx);

    system.lifecycle.delete_order(order.id.clone()).await.unwrap();

    assert_eq!(
        *witness.seen.lock().unwrap(),
        vec![("cancelled".to_string(), true)]
    );
    assert!(system.orders.get(order.id.clone()).await.unwrap().is_none());
    assert_eq!(
        drain(&mut admin_rx)
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>(),
        vec!["orderDeleted"]
    );

    // the witness holds an OrderClient clone, which would keep the order actor alive
    drop(witness);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_order_is_rejected_without_side_effects() {
    let (system, transport) = start();
    subscribe(&system, ADMIN, "https://push.example.com/boss").await;
    let (admin, mut admin_rx) = system.bus.connect();
    system.bus.join(admin, Room::Admin).unwrap();

    let mut parcel = dine_in(Some("a@x.com"));
    parcel.kind = OrderKind::Parcel;
    parcel.phone_number = Some("555-0101".into());
    let err = system.lifecycle.create_order(parcel).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidOrderData(_)));

    system.lifecycle.flush_notifications().await;
    assert!(drain(&mut admin_rx).is_empty());
    assert!(transport.attempts().is_empty());
    assert!(system.lifecycle.list_all().await.unwrap().is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_transitions_are_enforced_and_linearized() {
    let (system, _transport) = start();
    let order = system.lifecycle.create_order(dine_in(None)).await.unwrap();

    // accept and decline race on the same order: exactly one wins
    let (a, b) = tokio::join!(
        system.lifecycle.set_status(order.id.clone(), OrderStatus::Accepted),
        system.lifecycle.set_status(order.id.clone(), OrderStatus::Declined),
    );
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(OrderError::InvalidTransition { .. })));

    let err = system
        .lifecycle
        .set_status(order.id.clone(), OrderStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition { to: OrderStatus::Pending, .. }));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_history_is_per_customer_and_newest_first() {
    let (system, _transport) = start();
    let first = system
        .lifecycle
        .create_order(dine_in(Some("a@x.com")))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = system
        .lifecycle
        .create_order(dine_in(Some("A@X.COM")))
        .await
        .unwrap();
    system
        .lifecycle
        .create_order(dine_in(Some("b@x.com")))
        .await
        .unwrap();

    let history = system.lifecycle.list_by_customer("a@x.com").await.unwrap();
    let ids: Vec<_> = history.iter().map(|o| o.id.clone()).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(system.lifecycle.list_all().await.unwrap().len(), 3);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_disabled_push_still_completes_transitions() {
    let system = OrderSystem::new(&config(), PushDispatcher::disabled());
    let order = system
        .lifecycle
        .create_order(dine_in(Some("a@x.com")))
        .await
        .unwrap();
    system
        .lifecycle
        .set_status(order.id.clone(), OrderStatus::Accepted)
        .await
        .unwrap();
    system.lifecycle.delete_order(order.id).await.unwrap();
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_overflowing_order_is_rejected_and_store_keeps_serving() {
    let (system, _transport) = start();

    let mut huge = dine_in(None);
    huge.line_items = vec![LineItem {
        item_id: "gold".into(),
        name: "Gold Latte".into(),
        unit_price: Decimal::MAX,
        quantity: 2,
    }];
    huge.total_amount = Decimal::MAX;
    let err = system.lifecycle.create_order(huge).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidOrderData(_)));

    let order = system.lifecycle.create_order(dine_in(None)).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(system.lifecycle.list_all().await.unwrap().len(), 1);

    system.shutdown().await.unwrap();
}
