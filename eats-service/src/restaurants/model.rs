use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use common_money::Money;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, SimpleObject, FromRow)]
#[graphql(complex)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub cover_img: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, SimpleObject, FromRow)]
#[graphql(complex)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub cover_img: String,
    pub address: String,
    #[graphql(skip)]
    pub owner_id: Uuid,
    #[graphql(skip)]
    pub category_id: Option<Uuid>,
    pub is_promoted: bool,
    pub promoted_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject, InputObject)]
#[graphql(input_name = "DishChoiceInput")]
pub struct DishChoice {
    pub name: String,
    pub extra: Option<Money>,
}

/// Customization offered on a dish. A flat `extra` applies when the option is
/// picked; otherwise the picked choice may carry its own surcharge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject, InputObject)]
#[graphql(input_name = "DishOptionInput")]
pub struct DishOption {
    pub name: String,
    pub choices: Option<Vec<DishChoice>>,
    pub extra: Option<Money>,
}

#[derive(Debug, Clone, SimpleObject, FromRow)]
#[graphql(complex)]
pub struct Dish {
    pub id: Uuid,
    pub name: String,
    pub price: Money,
    pub photo: Option<String>,
    pub description: String,
    #[graphql(skip)]
    pub restaurant_id: Uuid,
    #[graphql(skip)]
    pub options: Json<Vec<DishOption>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
