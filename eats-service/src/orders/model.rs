use async_graphql::{Enum, InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use common_money::Money;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, Row};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[graphql(rename_items = "PascalCase")]
pub enum OrderStatus {
    Pending,
    InProgress,
    WaitingForPickUp,
    PickedUp,
    Delivered,
}

#[derive(Debug, Clone, Error)]
#[error("unknown order status '{0}'")]
pub struct ParseStatusError(String);

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::InProgress => "InProgress",
            OrderStatus::WaitingForPickUp => "WaitingForPickUp",
            OrderStatus::PickedUp => "PickedUp",
            OrderStatus::Delivered => "Delivered",
        }
    }

    pub fn parse(s: &str) -> Result<OrderStatus, ParseStatusError> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "InProgress" => Ok(OrderStatus::InProgress),
            "WaitingForPickUp" => Ok(OrderStatus::WaitingForPickUp),
            "PickedUp" => Ok(OrderStatus::PickedUp),
            "Delivered" => Ok(OrderStatus::Delivered),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Order {
    pub id: Uuid,
    #[graphql(skip)]
    pub customer_id: Option<Uuid>,
    #[graphql(skip)]
    pub driver_id: Option<Uuid>,
    #[graphql(skip)]
    pub restaurant_id: Option<Uuid>,
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = OrderStatus::parse(&status).map_err(|err| sqlx::Error::ColumnDecode {
            index: "status".into(),
            source: Box::new(err),
        })?;
        Ok(Self {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            driver_id: row.try_get("driver_id")?,
            restaurant_id: row.try_get("restaurant_id")?,
            total: row.try_get("total")?,
            status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Option picked for an ordered dish, e.g. `{ name: "Size", choice: "L" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject, InputObject)]
#[graphql(input_name = "OrderItemOptionInput")]
pub struct OrderItemOption {
    pub name: String,
    pub choice: Option<String>,
}

#[derive(Debug, Clone, SimpleObject, FromRow)]
#[graphql(complex)]
pub struct OrderItem {
    pub id: Uuid,
    #[graphql(skip)]
    pub order_id: Uuid,
    #[graphql(skip)]
    pub dish_id: Uuid,
    #[graphql(skip)]
    pub options: Json<Vec<OrderItemOption>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::InProgress,
            OrderStatus::WaitingForPickUp,
            OrderStatus::PickedUp,
            OrderStatus::Delivered,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(OrderStatus::parse("Cooking").is_err());
    }
}
