use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Promotion payment made by a restaurant owner.
#[derive(Debug, Clone, SimpleObject, FromRow)]
#[graphql(complex)]
pub struct Payment {
    pub id: Uuid,
    pub transaction_id: String,
    #[graphql(skip)]
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
