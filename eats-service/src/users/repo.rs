use common_auth::Role;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::users::model::{User, Verification};

const USER_COLUMNS: &str = "id, email, password_hash, role, verified, created_at, updated_at";

pub async fn find_user(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_user_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(db)
        .await
}

pub async fn email_taken(db: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(db)
        .await
}

pub async fn insert_user<'e>(
    db: impl PgExecutor<'e>,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"INSERT INTO users (id, email, password_hash, role)
           VALUES ($1, $2, $3, $4)
           RETURNING {USER_COLUMNS}"#
    ))
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(db)
    .await
}

/// Applies a profile change. A new email resets `verified`.
pub async fn update_profile<'e>(
    db: impl PgExecutor<'e>,
    id: Uuid,
    email: Option<&str>,
    password_hash: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"UPDATE users
           SET email = COALESCE($2, email),
               verified = CASE WHEN $2::text IS NULL THEN verified ELSE FALSE END,
               password_hash = COALESCE($3, password_hash),
               updated_at = now()
           WHERE id = $1
           RETURNING {USER_COLUMNS}"#
    ))
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .fetch_optional(db)
    .await
}

pub async fn mark_verified<'e>(db: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET verified = TRUE, updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Replaces any existing code for the user.
pub async fn upsert_verification<'e>(
    db: impl PgExecutor<'e>,
    user_id: Uuid,
    code: &str,
) -> Result<Verification, sqlx::Error> {
    sqlx::query_as::<_, Verification>(
        r#"INSERT INTO verifications (id, code, user_id)
           VALUES ($1, $2, $3)
           ON CONFLICT (user_id) DO UPDATE SET code = EXCLUDED.code, updated_at = now()
           RETURNING id, code, user_id, created_at"#,
    )
    .bind(Uuid::new_v4())
    .bind(code)
    .bind(user_id)
    .fetch_one(db)
    .await
}

pub async fn find_verification<'e>(
    db: impl PgExecutor<'e>,
    code: &str,
) -> Result<Option<Verification>, sqlx::Error> {
    sqlx::query_as::<_, Verification>(
        "SELECT id, code, user_id, created_at FROM verifications WHERE code = $1",
    )
    .bind(code)
    .fetch_optional(db)
    .await
}

pub async fn delete_verification<'e>(db: impl PgExecutor<'e>, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM verifications WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
