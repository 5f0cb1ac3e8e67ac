use std::sync::Arc;

use common_auth::Role;
use tracing::{info, warn};
use uuid::Uuid;

use crate::context::AppContext;
use crate::email::{send_verification_email, EmailSender};
use crate::error::{ServiceError, ServiceResult};
use crate::metrics::ServiceMetrics;
use crate::users::model::User;
use crate::users::password::{hash_password, verify_password};
use crate::users::repo;

pub const USER_NOT_FOUND: &str = "User not found.";

pub struct NewAccount<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
}

pub async fn create_account(ctx: &AppContext, account: NewAccount<'_>) -> ServiceResult<User> {
    let email = account.email.trim();
    if email.is_empty() {
        return Err(ServiceError::Invalid("Email must not be empty.".to_string()));
    }
    if repo::email_taken(&ctx.db, email).await? {
        return Err(ServiceError::Conflict("User already exists with the email."));
    }
    let password_hash = hash_password(account.password)?;
    let code = Uuid::new_v4().to_string();

    let mut tx = ctx.db.begin().await?;
    let user = repo::insert_user(&mut *tx, email, &password_hash, account.role).await?;
    repo::upsert_verification(&mut *tx, user.id, &code).await?;
    tx.commit().await?;

    info!(user_id = %user.id, role = %user.role, "account created");
    dispatch_verification(ctx.mailer.clone(), ctx.metrics.clone(), user.email.clone(), code);
    Ok(user)
}

/// Returns a signed token for valid credentials.
pub async fn login(ctx: &AppContext, email: &str, password: &str) -> ServiceResult<String> {
    let user = repo::find_user_by_email(&ctx.db, email.trim())
        .await?
        .ok_or(ServiceError::NotFound(USER_NOT_FOUND))?;
    if !verify_password(password, &user.password_hash) {
        warn!(user_id = %user.id, "login rejected: password mismatch");
        return Err(ServiceError::Forbidden("Password does not match."));
    }
    let token = ctx.signer.sign(user.id, user.role)?;
    Ok(token)
}

pub async fn find_user(ctx: &AppContext, id: Uuid) -> ServiceResult<User> {
    repo::find_user(&ctx.db, id)
        .await?
        .ok_or(ServiceError::NotFound(USER_NOT_FOUND))
}

pub struct ProfileChanges<'a> {
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
}

pub async fn edit_profile(ctx: &AppContext, user_id: Uuid, changes: ProfileChanges<'_>) -> ServiceResult<User> {
    let current = find_user(ctx, user_id).await?;

    let new_email = changes
        .email
        .map(str::trim)
        .filter(|email| !email.is_empty() && *email != current.email);
    if let Some(email) = new_email {
        if repo::email_taken(&ctx.db, email).await? {
            return Err(ServiceError::Conflict("Email is already in use."));
        }
    }
    let password_hash = match changes.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let mut tx = ctx.db.begin().await?;
    let user = repo::update_profile(&mut *tx, user_id, new_email, password_hash.as_deref())
        .await?
        .ok_or(ServiceError::NotFound(USER_NOT_FOUND))?;
    let code = match new_email {
        Some(_) => {
            let code = Uuid::new_v4().to_string();
            repo::upsert_verification(&mut *tx, user.id, &code).await?;
            Some(code)
        }
        None => None,
    };
    tx.commit().await?;

    if let Some(code) = code {
        info!(user_id = %user.id, "email changed; verification reissued");
        dispatch_verification(ctx.mailer.clone(), ctx.metrics.clone(), user.email.clone(), code);
    }
    Ok(user)
}

pub async fn verify_email(ctx: &AppContext, code: &str) -> ServiceResult<()> {
    let mut tx = ctx.db.begin().await?;
    let verification = repo::find_verification(&mut *tx, code.trim())
        .await?
        .ok_or(ServiceError::NotFound("Verification not found."))?;
    repo::mark_verified(&mut *tx, verification.user_id).await?;
    repo::delete_verification(&mut *tx, verification.id).await?;
    tx.commit().await?;

    info!(user_id = %verification.user_id, "email verified");
    Ok(())
}

/// Sends the verification email in the background; failures are only logged.
fn dispatch_verification(mailer: Arc<dyn EmailSender>, metrics: ServiceMetrics, email: String, code: String) {
    tokio::spawn(async move {
        match send_verification_email(mailer.as_ref(), &email, &code).await {
            Ok(()) => metrics.email_sent("sent"),
            Err(err) => {
                metrics.email_sent("failed");
                warn!(error = %err, to = %email, "failed to send verification email");
            }
        }
    });
}
