use common_auth::Role;
use common_money::Money;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::orders::model::{Order, OrderItem, OrderItemOption, OrderStatus};

const ORDER_COLUMNS: &str = "o.id, o.customer_id, o.driver_id, o.restaurant_id, o.total, o.status, o.created_at, o.updated_at";

pub async fn insert_order<'e>(
    db: impl PgExecutor<'e>,
    customer_id: Uuid,
    restaurant_id: Uuid,
    total: &Money,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        r#"INSERT INTO orders (id, customer_id, restaurant_id, total, status)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING id, customer_id, driver_id, restaurant_id, total, status, created_at, updated_at"#,
    )
    .bind(Uuid::new_v4())
    .bind(customer_id)
    .bind(restaurant_id)
    .bind(total)
    .bind(OrderStatus::Pending.as_str())
    .fetch_one(db)
    .await
}

pub async fn insert_item<'e>(
    db: impl PgExecutor<'e>,
    order_id: Uuid,
    dish_id: Uuid,
    options: &[OrderItemOption],
) -> Result<OrderItem, sqlx::Error> {
    sqlx::query_as::<_, OrderItem>(
        r#"INSERT INTO order_items (id, order_id, dish_id, options)
           VALUES ($1, $2, $3, $4)
           RETURNING id, order_id, dish_id, options, created_at"#,
    )
    .bind(Uuid::new_v4())
    .bind(order_id)
    .bind(dish_id)
    .bind(Json(options))
    .fetch_one(db)
    .await
}

/// Order plus the owner of its restaurant (if the restaurant still exists).
pub async fn find_order_with_owner(db: &PgPool, id: Uuid) -> Result<Option<(Order, Option<Uuid>)>, sqlx::Error> {
    let Some(order) = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?
    else {
        return Ok(None);
    };
    let owner = restaurant_owner(db, order.restaurant_id).await?;
    Ok(Some((order, owner)))
}

pub async fn restaurant_owner(db: &PgPool, restaurant_id: Option<Uuid>) -> Result<Option<Uuid>, sqlx::Error> {
    let Some(restaurant_id) = restaurant_id else {
        return Ok(None);
    };
    sqlx::query_scalar::<_, Uuid>("SELECT owner_id FROM restaurants WHERE id = $1")
        .bind(restaurant_id)
        .fetch_optional(db)
        .await
}

/// Orders visible to `caller_id` acting as `role`, newest first.
pub async fn list_visible(
    db: &PgPool,
    caller_id: Uuid,
    role: Role,
    status: Option<OrderStatus>,
) -> Result<Vec<Order>, sqlx::Error> {
    let scope = match role {
        Role::Client => "o.customer_id = $1",
        Role::Delivery => "o.driver_id = $1",
        Role::Owner => "o.restaurant_id IN (SELECT id FROM restaurants WHERE owner_id = $1)",
    };
    sqlx::query_as::<_, Order>(&format!(
        r#"SELECT {ORDER_COLUMNS} FROM orders o
           WHERE {scope} AND ($2::text IS NULL OR o.status = $2)
           ORDER BY o.created_at DESC, o.id"#
    ))
    .bind(caller_id)
    .bind(status.map(|status| status.as_str()))
    .fetch_all(db)
    .await
}

pub async fn list_for_restaurant(db: &PgPool, restaurant_id: Uuid) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.restaurant_id = $1 ORDER BY o.created_at DESC, o.id"
    ))
    .bind(restaurant_id)
    .fetch_all(db)
    .await
}

pub async fn update_status(db: &PgPool, id: Uuid, status: OrderStatus) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        r#"UPDATE orders SET status = $2, updated_at = now()
           WHERE id = $1
           RETURNING id, customer_id, driver_id, restaurant_id, total, status, created_at, updated_at"#,
    )
    .bind(id)
    .bind(status.as_str())
    .fetch_optional(db)
    .await
}

/// Assigns the driver only while the order has none; `None` means someone else won.
pub async fn assign_driver(db: &PgPool, id: Uuid, driver_id: Uuid) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        r#"UPDATE orders SET driver_id = $2, updated_at = now()
           WHERE id = $1 AND driver_id IS NULL
           RETURNING id, customer_id, driver_id, restaurant_id, total, status, created_at, updated_at"#,
    )
    .bind(id)
    .bind(driver_id)
    .fetch_optional(db)
    .await
}

pub async fn list_items(db: &PgPool, order_id: Uuid) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, dish_id, options, created_at FROM order_items WHERE order_id = $1 ORDER BY created_at, id",
    )
    .bind(order_id)
    .fetch_all(db)
    .await
}
