use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::payments::model::Payment;

pub async fn insert_payment<'e>(
    db: impl PgExecutor<'e>,
    transaction_id: &str,
    user_id: Uuid,
    restaurant_id: Uuid,
) -> Result<Payment, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        r#"INSERT INTO payments (id, transaction_id, user_id, restaurant_id)
           VALUES ($1, $2, $3, $4)
           RETURNING id, transaction_id, user_id, restaurant_id, created_at, updated_at"#,
    )
    .bind(Uuid::new_v4())
    .bind(transaction_id)
    .bind(user_id)
    .bind(restaurant_id)
    .fetch_one(db)
    .await
}

pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        r#"SELECT id, transaction_id, user_id, restaurant_id, created_at, updated_at
           FROM payments
           WHERE user_id = $1
           ORDER BY created_at DESC, id"#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}
