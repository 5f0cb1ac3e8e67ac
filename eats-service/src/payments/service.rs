use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::context::AppContext;
use crate::error::{ServiceError, ServiceResult};
use crate::payments::model::Payment;
use crate::payments::repo;
use crate::restaurants::repo as restaurant_repo;
use crate::restaurants::service::FAILED_TO_FIND_RESTAURANT;

pub const PROMOTION_DAYS: i64 = 7;

/// Records the payment and promotes the restaurant for [`PROMOTION_DAYS`].
pub async fn create_payment(
    ctx: &AppContext,
    owner_id: Uuid,
    restaurant_id: Uuid,
    transaction_id: &str,
) -> ServiceResult<Payment> {
    let restaurant = restaurant_repo::find_restaurant(&ctx.db, restaurant_id)
        .await?
        .ok_or(ServiceError::NotFound(FAILED_TO_FIND_RESTAURANT))?;
    if restaurant.owner_id != owner_id {
        return Err(ServiceError::Forbidden("Access denied."));
    }
    let transaction_id = transaction_id.trim();
    if transaction_id.is_empty() {
        return Err(ServiceError::Invalid("Transaction id must not be empty.".to_string()));
    }

    let promoted_until = Utc::now() + Duration::days(PROMOTION_DAYS);
    let mut tx = ctx.db.begin().await?;
    let payment = repo::insert_payment(&mut *tx, transaction_id, owner_id, restaurant.id).await?;
    restaurant_repo::promote_restaurant(&mut *tx, restaurant.id, promoted_until).await?;
    tx.commit().await?;

    info!(payment_id = %payment.id, restaurant_id = %restaurant.id, %promoted_until, "restaurant promoted");
    Ok(payment)
}

pub async fn get_payments(ctx: &AppContext, owner_id: Uuid) -> ServiceResult<Vec<Payment>> {
    Ok(repo::list_for_user(&ctx.db, owner_id).await?)
}
