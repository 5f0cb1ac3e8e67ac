use async_graphql::{ComplexObject, Context, InputObject, Object, Result, Subscription};
use common_auth::Role;
use futures_util::future;
use futures_util::{Stream, StreamExt};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::graphql::guard::{app_context, caller, RoleGuard};
use crate::orders::model::{Order, OrderItem, OrderItemOption, OrderStatus};
use crate::orders::policy::can_view;
use crate::orders::repo;
use crate::orders::service::{self, OrderLine};
use crate::output::{fold, CoreOutput};
use crate::pubsub::Topic;
use crate::restaurants::model::{Dish, Restaurant};
use crate::restaurants::repo as restaurant_repo;
use crate::users::model::User;
use crate::users::repo as user_repo;

#[derive(InputObject)]
pub struct CreateOrderItemInput {
    pub dish_id: Uuid,
    pub options: Option<Vec<OrderItemOption>>,
}

#[derive(InputObject)]
pub struct CreateOrderInput {
    pub restaurant_id: Uuid,
    pub items: Vec<CreateOrderItemInput>,
}

#[derive(InputObject)]
pub struct GetOrdersInput {
    pub status: Option<OrderStatus>,
}

#[derive(InputObject)]
pub struct GetOrderInput {
    pub id: Uuid,
}

#[derive(InputObject)]
pub struct EditOrderInput {
    pub id: Uuid,
    pub status: OrderStatus,
}

#[derive(InputObject)]
pub struct TakeOrderInput {
    pub id: Uuid,
}

#[derive(InputObject)]
pub struct OrderUpdatesInput {
    pub id: Uuid,
}

crate::output!(CreateOrderOutput { order_id: Uuid });
crate::output!(GetOrdersOutput { orders: Vec<Order> });
crate::output!(GetOrderOutput { order: Order });

fn load_error(err: sqlx::Error, fallback: &str) -> async_graphql::Error {
    ServiceError::from(err).public_message(fallback).into()
}

#[derive(Default)]
pub struct OrdersQuery;

#[Object]
impl OrdersQuery {
    #[graphql(guard = "RoleGuard::any()")]
    async fn get_orders(&self, ctx: &Context<'_>, input: GetOrdersInput) -> Result<GetOrdersOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        Ok(fold(
            service::get_orders(app, caller, input.status).await,
            "Failed to get orders.",
            |orders| GetOrdersOutput { orders: Some(orders), ..GetOrdersOutput::success() },
        ))
    }

    #[graphql(guard = "RoleGuard::any()")]
    async fn get_order(&self, ctx: &Context<'_>, input: GetOrderInput) -> Result<GetOrderOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        Ok(fold(
            service::get_order(app, caller, input.id).await,
            "Failed to get order.",
            |order| GetOrderOutput { order: Some(order), ..GetOrderOutput::success() },
        ))
    }
}

#[derive(Default)]
pub struct OrdersMutation;

#[Object]
impl OrdersMutation {
    #[graphql(guard = "RoleGuard::new(&[Role::Client])")]
    async fn create_order(&self, ctx: &Context<'_>, input: CreateOrderInput) -> Result<CreateOrderOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        let lines: Vec<OrderLine> = input
            .items
            .into_iter()
            .map(|item| OrderLine {
                dish_id: item.dish_id,
                options: item.options.unwrap_or_default(),
            })
            .collect();
        Ok(fold(
            service::create_order(app, caller.id, input.restaurant_id, &lines).await,
            "Failed to create order.",
            |order| CreateOrderOutput { order_id: Some(order.id), ..CreateOrderOutput::success() },
        ))
    }

    #[graphql(guard = "RoleGuard::any()")]
    async fn edit_order(&self, ctx: &Context<'_>, input: EditOrderInput) -> Result<CoreOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        Ok(fold(
            service::edit_order(app, caller, input.id, input.status).await,
            "Failed to edit order.",
            |_| CoreOutput::success(),
        ))
    }

    #[graphql(guard = "RoleGuard::new(&[Role::Delivery])")]
    async fn take_order(&self, ctx: &Context<'_>, input: TakeOrderInput) -> Result<CoreOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        Ok(fold(
            service::take_order(app, caller.id, input.id).await,
            "Failed to assign order due to unknown error.",
            |_| CoreOutput::success(),
        ))
    }
}

#[derive(Default)]
pub struct OrdersSubscription;

#[Subscription]
impl OrdersSubscription {
    /// New orders placed at restaurants the caller owns.
    #[graphql(guard = "RoleGuard::new(&[Role::Owner])")]
    async fn pending_orders(&self, ctx: &Context<'_>) -> Result<impl Stream<Item = Order>> {
        let app = app_context(ctx)?;
        let owner = caller(ctx)?;
        Ok(app
            .pubsub
            .subscribe(Topic::PendingOrders)
            .filter(move |event| future::ready(event.owner_id == Some(owner.id)))
            .map(|event| event.order))
    }

    /// Orders ready for pickup, broadcast to every driver.
    #[graphql(guard = "RoleGuard::new(&[Role::Delivery])")]
    async fn cooked_orders(&self, ctx: &Context<'_>) -> Result<impl Stream<Item = Order>> {
        let app = app_context(ctx)?;
        Ok(app.pubsub.subscribe(Topic::CookedOrders).map(|event| event.order))
    }

    /// Changes to one order, delivered to the parties allowed to see it.
    #[graphql(guard = "RoleGuard::any()")]
    async fn order_updates(&self, ctx: &Context<'_>, input: OrderUpdatesInput) -> Result<impl Stream<Item = Order>> {
        let app = app_context(ctx)?;
        let viewer = caller(ctx)?;
        let order_id = input.id;
        Ok(app
            .pubsub
            .subscribe(Topic::OrderUpdates)
            .filter(move |event| {
                future::ready(event.order.id == order_id && can_view(&event.order, event.owner_id, &viewer))
            })
            .map(|event| event.order))
    }
}

#[ComplexObject]
impl Order {
    async fn customer(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(id) = self.customer_id else {
            return Ok(None);
        };
        let app = app_context(ctx)?;
        user_repo::find_user(&app.db, id)
            .await
            .map_err(|err| load_error(err, "Failed to load customer."))
    }

    async fn driver(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(id) = self.driver_id else {
            return Ok(None);
        };
        let app = app_context(ctx)?;
        user_repo::find_user(&app.db, id)
            .await
            .map_err(|err| load_error(err, "Failed to load driver."))
    }

    async fn restaurant(&self, ctx: &Context<'_>) -> Result<Option<Restaurant>> {
        let Some(id) = self.restaurant_id else {
            return Ok(None);
        };
        let app = app_context(ctx)?;
        restaurant_repo::find_restaurant(&app.db, id)
            .await
            .map_err(|err| load_error(err, "Failed to load restaurant."))
    }

    async fn items(&self, ctx: &Context<'_>) -> Result<Vec<OrderItem>> {
        let app = app_context(ctx)?;
        repo::list_items(&app.db, self.id)
            .await
            .map_err(|err| load_error(err, "Failed to load order items."))
    }
}

#[ComplexObject]
impl OrderItem {
    async fn dish(&self, ctx: &Context<'_>) -> Result<Option<Dish>> {
        let app = app_context(ctx)?;
        restaurant_repo::find_dish(&app.db, self.dish_id)
            .await
            .map_err(|err| load_error(err, "Failed to load dish."))
    }

    async fn options(&self) -> Vec<OrderItemOption> {
        self.options.0.clone()
    }
}
