use std::collections::HashMap;

use common_auth::Role;
use common_money::Money;
use tracing::info;
use uuid::Uuid;

use crate::context::{AppContext, Caller};
use crate::error::{ServiceError, ServiceResult};
use crate::orders::model::{Order, OrderItemOption, OrderStatus};
use crate::orders::policy::{can_set_status, can_view};
use crate::orders::pricing::item_price;
use crate::orders::repo;
use crate::pubsub::{OrderEvent, Topic};
use crate::restaurants::repo as restaurant_repo;
use crate::restaurants::service::FAILED_TO_FIND_RESTAURANT;

const ORDER_NOT_FOUND: &str = "Failed to find order.";
const ACCESS_DENIED: &str = "Access denied.";
const DISH_NOT_FOUND: &str = "Failed to find the menu item.";
const ALREADY_TAKEN: &str = "Order is already assigned to a driver";

pub struct OrderLine {
    pub dish_id: Uuid,
    pub options: Vec<OrderItemOption>,
}

/// Places an order for `customer_id`, pricing every line from the stored menu.
pub async fn create_order(
    ctx: &AppContext,
    customer_id: Uuid,
    restaurant_id: Uuid,
    lines: &[OrderLine],
) -> ServiceResult<Order> {
    let restaurant = restaurant_repo::find_restaurant(&ctx.db, restaurant_id)
        .await?
        .ok_or(ServiceError::NotFound(FAILED_TO_FIND_RESTAURANT))?;
    if lines.is_empty() {
        return Err(ServiceError::Invalid("An order needs at least one item.".to_string()));
    }

    let ids: Vec<Uuid> = lines.iter().map(|line| line.dish_id).collect();
    let dishes: HashMap<Uuid, _> = restaurant_repo::find_dishes(&ctx.db, &ids)
        .await?
        .into_iter()
        .map(|dish| (dish.id, dish))
        .collect();

    let mut total = Money::zero();
    for line in lines {
        let dish = dishes
            .get(&line.dish_id)
            .filter(|dish| dish.restaurant_id == restaurant.id)
            .ok_or(ServiceError::NotFound(DISH_NOT_FOUND))?;
        total += &item_price(&dish.price, &dish.options.0, &line.options);
    }

    let mut tx = ctx.db.begin().await?;
    let order = repo::insert_order(&mut *tx, customer_id, restaurant.id, &total).await?;
    for line in lines {
        repo::insert_item(&mut *tx, order.id, line.dish_id, &line.options).await?;
    }
    tx.commit().await?;

    ctx.metrics.order_created();
    info!(order_id = %order.id, %customer_id, restaurant_id = %restaurant.id, total = %order.total, "order created");
    ctx.pubsub.publish(
        Topic::PendingOrders,
        OrderEvent {
            order: order.clone(),
            owner_id: Some(restaurant.owner_id),
        },
    );
    Ok(order)
}

pub async fn get_orders(ctx: &AppContext, caller: Caller, status: Option<OrderStatus>) -> ServiceResult<Vec<Order>> {
    Ok(repo::list_visible(&ctx.db, caller.id, caller.role, status).await?)
}

pub async fn get_order(ctx: &AppContext, caller: Caller, order_id: Uuid) -> ServiceResult<Order> {
    let (order, owner) = repo::find_order_with_owner(&ctx.db, order_id)
        .await?
        .ok_or(ServiceError::NotFound(ORDER_NOT_FOUND))?;
    if !can_view(&order, owner, &caller) {
        return Err(ServiceError::Forbidden(ACCESS_DENIED));
    }
    Ok(order)
}

/// Moves an order to `status` when the caller's role may set it.
pub async fn edit_order(ctx: &AppContext, caller: Caller, order_id: Uuid, status: OrderStatus) -> ServiceResult<Order> {
    let (order, owner) = repo::find_order_with_owner(&ctx.db, order_id)
        .await?
        .ok_or(ServiceError::NotFound(ORDER_NOT_FOUND))?;
    if !can_view(&order, owner, &caller) || !can_set_status(caller.role, status) {
        return Err(ServiceError::Forbidden(ACCESS_DENIED));
    }

    let updated = repo::update_status(&ctx.db, order.id, status)
        .await?
        .ok_or(ServiceError::NotFound(ORDER_NOT_FOUND))?;
    ctx.metrics.order_status_changed(status.as_str());
    info!(%order_id, from = order.status.as_str(), to = status.as_str(), role = %caller.role, "order status changed");

    if caller.role == Role::Owner && status == OrderStatus::WaitingForPickUp {
        ctx.pubsub.publish(
            Topic::CookedOrders,
            OrderEvent {
                order: updated.clone(),
                owner_id: owner,
            },
        );
    }
    ctx.pubsub.publish(
        Topic::OrderUpdates,
        OrderEvent {
            order: updated.clone(),
            owner_id: owner,
        },
    );
    Ok(updated)
}

/// Claims an unassigned order for the calling driver.
pub async fn take_order(ctx: &AppContext, driver_id: Uuid, order_id: Uuid) -> ServiceResult<Order> {
    let (order, owner) = repo::find_order_with_owner(&ctx.db, order_id)
        .await?
        .ok_or(ServiceError::NotFound(ORDER_NOT_FOUND))?;
    if order.driver_id.is_some() {
        return Err(ServiceError::Conflict(ALREADY_TAKEN));
    }
    let assigned = repo::assign_driver(&ctx.db, order.id, driver_id)
        .await?
        .ok_or(ServiceError::Conflict(ALREADY_TAKEN))?;
    info!(%order_id, %driver_id, "order taken");
    ctx.pubsub.publish(
        Topic::OrderUpdates,
        OrderEvent {
            order: assigned.clone(),
            owner_id: owner,
        },
    );
    Ok(assigned)
}
