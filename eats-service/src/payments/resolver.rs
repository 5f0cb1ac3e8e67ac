use async_graphql::{ComplexObject, Context, InputObject, Object, Result};
use common_auth::Role;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::graphql::guard::{app_context, caller, RoleGuard};
use crate::output::fold;
use crate::payments::model::Payment;
use crate::payments::service;
use crate::restaurants::model::Restaurant;
use crate::restaurants::repo as restaurant_repo;

#[derive(InputObject)]
pub struct CreatePaymentInput {
    pub transaction_id: String,
    pub restaurant_id: Uuid,
}

crate::output!(CreatePaymentOutput { payment_id: Uuid });
crate::output!(GetPaymentsOutput { payments: Vec<Payment> });

#[derive(Default)]
pub struct PaymentsQuery;

#[Object]
impl PaymentsQuery {
    #[graphql(guard = "RoleGuard::new(&[Role::Owner])")]
    async fn get_payments(&self, ctx: &Context<'_>) -> Result<GetPaymentsOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        Ok(fold(
            service::get_payments(app, caller.id).await,
            "Failed to create payment due to unknown error.",
            |payments| GetPaymentsOutput { payments: Some(payments), ..GetPaymentsOutput::success() },
        ))
    }
}

#[derive(Default)]
pub struct PaymentsMutation;

#[Object]
impl PaymentsMutation {
    #[graphql(guard = "RoleGuard::new(&[Role::Owner])")]
    async fn create_payment(&self, ctx: &Context<'_>, input: CreatePaymentInput) -> Result<CreatePaymentOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        Ok(fold(
            service::create_payment(app, caller.id, input.restaurant_id, &input.transaction_id).await,
            "Failed to create payment due to unknown error.",
            |payment| CreatePaymentOutput { payment_id: Some(payment.id), ..CreatePaymentOutput::success() },
        ))
    }
}

#[ComplexObject]
impl Payment {
    async fn restaurant(&self, ctx: &Context<'_>) -> Result<Option<Restaurant>> {
        let app = app_context(ctx)?;
        restaurant_repo::find_restaurant(&app.db, self.restaurant_id)
            .await
            .map_err(|err| ServiceError::from(err).public_message("Failed to load restaurant.").into())
    }
}
