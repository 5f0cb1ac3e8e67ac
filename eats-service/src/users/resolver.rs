use async_graphql::{Context, InputObject, Object, Result};
use common_auth::Role;
use uuid::Uuid;

use crate::graphql::guard::{app_context, caller, RoleGuard};
use crate::output::{fold, CoreOutput};
use crate::users::model::User;
use crate::users::service::{self, NewAccount, ProfileChanges};

#[derive(InputObject)]
pub struct CreateAccountInput {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(InputObject)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(InputObject)]
pub struct EditProfileInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(InputObject)]
pub struct VerifyEmailInput {
    pub code: String,
}

crate::output!(LoginOutput { token: String });
crate::output!(UserProfileOutput { user: User });

#[derive(Default)]
pub struct UsersQuery;

#[Object]
impl UsersQuery {
    /// The authenticated caller.
    #[graphql(guard = "RoleGuard::any()")]
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        service::find_user(app, caller.id)
            .await
            .map_err(|err| err.public_message("Failed to load user.").into())
    }

    #[graphql(guard = "RoleGuard::any()")]
    async fn user_profile(&self, ctx: &Context<'_>, user_id: Uuid) -> Result<UserProfileOutput> {
        let app = app_context(ctx)?;
        Ok(fold(
            service::find_user(app, user_id).await,
            service::USER_NOT_FOUND,
            |user| UserProfileOutput { user: Some(user), ..UserProfileOutput::success() },
        ))
    }
}

#[derive(Default)]
pub struct UsersMutation;

#[Object]
impl UsersMutation {
    async fn create_account(&self, ctx: &Context<'_>, input: CreateAccountInput) -> Result<CoreOutput> {
        let app = app_context(ctx)?;
        let account = NewAccount {
            email: &input.email,
            password: &input.password,
            role: input.role,
        };
        Ok(fold(
            service::create_account(app, account).await,
            "Failed to create account.",
            |_| CoreOutput::success(),
        ))
    }

    async fn login(&self, ctx: &Context<'_>, input: LoginInput) -> Result<LoginOutput> {
        let app = app_context(ctx)?;
        Ok(fold(
            service::login(app, &input.email, &input.password).await,
            "Failed to log in.",
            |token| LoginOutput { token: Some(token), ..LoginOutput::success() },
        ))
    }

    #[graphql(guard = "RoleGuard::any()")]
    async fn edit_profile(&self, ctx: &Context<'_>, input: EditProfileInput) -> Result<CoreOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        let changes = ProfileChanges {
            email: input.email.as_deref(),
            password: input.password.as_deref(),
        };
        Ok(fold(
            service::edit_profile(app, caller.id, changes).await,
            "Failed to update user profile.",
            |_| CoreOutput::success(),
        ))
    }

    async fn verify_email(&self, ctx: &Context<'_>, input: VerifyEmailInput) -> Result<CoreOutput> {
        let app = app_context(ctx)?;
        Ok(fold(
            service::verify_email(app, &input.code).await,
            "Could not verify email.",
            |_| CoreOutput::success(),
        ))
    }
}
