mod support;

use std::time::Duration;

use async_graphql::Request;
use chrono::Utc;
use common_auth::{JwtVerifier, Role};
use common_money::Money;
use eats_service::build_schema;
use eats_service::graphql::Viewer;
use eats_service::orders::model::{Order, OrderStatus};
use eats_service::pubsub::{OrderEvent, Topic};
use futures_util::StreamExt;
use serde_json::json;
use uuid::Uuid;

fn viewer(role: Role) -> (Uuid, Viewer) {
    let (id, token) = support::token(role);
    let verifier = JwtVerifier::from_secret(support::jwt_config(), support::SECRET).unwrap();
    (id, Viewer(Some(verifier.verify(&token).unwrap())))
}

fn order(status: OrderStatus) -> Order {
    let now = Utc::now();
    Order {
        id: Uuid::new_v4(),
        customer_id: Some(Uuid::new_v4()),
        driver_id: None,
        restaurant_id: Some(Uuid::new_v4()),
        total: Money::from_cents(1_850),
        status,
        created_at: now,
        updated_at: now,
    }
}

fn first_error(resp: &async_graphql::Response) -> &str {
    resp.errors.first().map(|err| err.message.as_str()).unwrap_or_default()
}

#[tokio::test]
async fn anonymous_me_is_forbidden() {
    let (ctx, _) = support::context(support::lazy_pool());
    let schema = build_schema(ctx);
    let resp = schema.execute(Request::new("{ me { id } }").data(Viewer::anonymous())).await;
    assert_eq!(first_error(&resp), "Forbidden");
}

#[tokio::test]
async fn client_cannot_create_restaurant() {
    let (ctx, _) = support::context(support::lazy_pool());
    let schema = build_schema(ctx);
    let (_, client) = viewer(Role::Client);
    let mutation = r#"mutation {
        createRestaurant(input: { name: "Pho 24", coverImg: "x.png", address: "1 Main St", categoryName: "Vietnamese" }) { ok error }
    }"#;
    let resp = schema.execute(Request::new(mutation).data(client)).await;
    assert_eq!(first_error(&resp), "Forbidden");
    let code = resp.errors[0]
        .extensions
        .as_ref()
        .and_then(|ext| ext.get("code"))
        .cloned();
    assert_eq!(code, Some(async_graphql::Value::from("FORBIDDEN")));
}

#[tokio::test]
async fn only_drivers_take_orders() {
    let (ctx, _) = support::context(support::lazy_pool());
    let schema = build_schema(ctx);
    let (_, owner) = viewer(Role::Owner);
    let mutation = format!(r#"mutation {{ takeOrder(input: {{ id: "{}" }}) {{ ok }} }}"#, Uuid::new_v4());
    let resp = schema.execute(Request::new(mutation).data(owner)).await;
    assert_eq!(first_error(&resp), "Forbidden");
}

#[tokio::test]
async fn clients_cannot_subscribe_to_cooked_orders() {
    let (ctx, _) = support::context(support::lazy_pool());
    let schema = build_schema(ctx);
    let (_, client) = viewer(Role::Client);
    let mut stream = schema.execute_stream(Request::new("subscription { cookedOrders { id } }").data(client));
    let resp = stream.next().await.expect("one response");
    assert_eq!(first_error(&resp), "Forbidden");
}

#[tokio::test]
async fn drivers_receive_cooked_orders() {
    let (ctx, _) = support::context(support::lazy_pool());
    let pubsub = ctx.pubsub.clone();
    let schema = build_schema(ctx);
    let (_, driver) = viewer(Role::Delivery);
    let mut stream = schema.execute_stream(Request::new("subscription { cookedOrders { id status } }").data(driver));
    let next = tokio::spawn(async move { stream.next().await });

    while pubsub.subscriber_count(Topic::CookedOrders) == 0 {
        tokio::task::yield_now().await;
    }
    let cooked = order(OrderStatus::WaitingForPickUp);
    pubsub.publish(Topic::CookedOrders, OrderEvent { order: cooked.clone(), owner_id: None });

    let resp = tokio::time::timeout(Duration::from_secs(5), next)
        .await
        .expect("event delivered")
        .unwrap()
        .expect("stream item");
    assert!(resp.errors.is_empty(), "{:?}", resp.errors);
    assert_eq!(
        resp.data.into_json().unwrap(),
        json!({ "cookedOrders": { "id": cooked.id.to_string(), "status": "WaitingForPickUp" } })
    );
}

#[tokio::test]
async fn pending_orders_only_reach_the_restaurant_owner() {
    let (ctx, _) = support::context(support::lazy_pool());
    let pubsub = ctx.pubsub.clone();
    let schema = build_schema(ctx);
    let (owner_id, owner) = viewer(Role::Owner);
    let mut stream = schema.execute_stream(Request::new("subscription { pendingOrders { id } }").data(owner));
    let next = tokio::spawn(async move { stream.next().await });

    while pubsub.subscriber_count(Topic::PendingOrders) == 0 {
        tokio::task::yield_now().await;
    }
    let elsewhere = order(OrderStatus::Pending);
    let mine = order(OrderStatus::Pending);
    pubsub.publish(Topic::PendingOrders, OrderEvent { order: elsewhere, owner_id: Some(Uuid::new_v4()) });
    pubsub.publish(Topic::PendingOrders, OrderEvent { order: mine.clone(), owner_id: Some(owner_id) });

    let resp = tokio::time::timeout(Duration::from_secs(5), next)
        .await
        .expect("event delivered")
        .unwrap()
        .expect("stream item");
    assert_eq!(
        resp.data.into_json().unwrap(),
        json!({ "pendingOrders": { "id": mine.id.to_string() } })
    );
}
