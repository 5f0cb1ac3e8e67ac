use chrono::{DateTime, Utc};
use common_money::Money;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::pagination::PageRequest;
use crate::restaurants::model::{Category, Dish, DishOption, Restaurant};
use crate::restaurants::slug::CategoryKey;

const RESTAURANT_COLUMNS: &str = "id, name, cover_img, address, owner_id, category_id, is_promoted, promoted_until, created_at, updated_at";
const DISH_COLUMNS: &str = "id, name, price, photo, description, restaurant_id, options, created_at, updated_at";

/// Escapes LIKE wildcards so user input only ever matches literally.
pub fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

// --- categories ---

/// Returns the category for `key.slug`, creating it on first use.
pub async fn get_or_create_category<'e>(
    db: impl PgExecutor<'e>,
    key: &CategoryKey,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"INSERT INTO categories (id, name, slug)
           VALUES ($1, $2, $3)
           ON CONFLICT (slug) DO UPDATE SET slug = EXCLUDED.slug
           RETURNING id, name, slug, cover_img, created_at, updated_at"#,
    )
    .bind(Uuid::new_v4())
    .bind(&key.name)
    .bind(&key.slug)
    .fetch_one(db)
    .await
}

pub async fn list_categories(db: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT id, name, slug, cover_img, created_at, updated_at FROM categories ORDER BY name",
    )
    .fetch_all(db)
    .await
}

pub async fn find_category(db: &PgPool, id: Uuid) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT id, name, slug, cover_img, created_at, updated_at FROM categories WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find_category_by_slug(db: &PgPool, slug: &str) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "SELECT id, name, slug, cover_img, created_at, updated_at FROM categories WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(db)
    .await
}

pub async fn count_restaurants_in_category(db: &PgPool, category_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM restaurants WHERE category_id = $1")
        .bind(category_id)
        .fetch_one(db)
        .await
}

// --- restaurants ---

pub struct NewRestaurant<'a> {
    pub name: &'a str,
    pub cover_img: &'a str,
    pub address: &'a str,
    pub owner_id: Uuid,
    pub category_id: Uuid,
}

pub async fn insert_restaurant<'e>(
    db: impl PgExecutor<'e>,
    new: NewRestaurant<'_>,
) -> Result<Restaurant, sqlx::Error> {
    sqlx::query_as::<_, Restaurant>(&format!(
        r#"INSERT INTO restaurants (id, name, cover_img, address, owner_id, category_id)
           VALUES ($1, $2, $3, $4, $5, $6)
           RETURNING {RESTAURANT_COLUMNS}"#
    ))
    .bind(Uuid::new_v4())
    .bind(new.name)
    .bind(new.cover_img)
    .bind(new.address)
    .bind(new.owner_id)
    .bind(new.category_id)
    .fetch_one(db)
    .await
}

#[derive(Default)]
pub struct RestaurantChanges<'a> {
    pub name: Option<&'a str>,
    pub cover_img: Option<&'a str>,
    pub address: Option<&'a str>,
    pub category_id: Option<Uuid>,
}

pub async fn update_restaurant<'e>(
    db: impl PgExecutor<'e>,
    id: Uuid,
    changes: RestaurantChanges<'_>,
) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as::<_, Restaurant>(&format!(
        r#"UPDATE restaurants
           SET name = COALESCE($2, name),
               cover_img = COALESCE($3, cover_img),
               address = COALESCE($4, address),
               category_id = COALESCE($5, category_id),
               updated_at = now()
           WHERE id = $1
           RETURNING {RESTAURANT_COLUMNS}"#
    ))
    .bind(id)
    .bind(changes.name)
    .bind(changes.cover_img)
    .bind(changes.address)
    .bind(changes.category_id)
    .fetch_optional(db)
    .await
}

pub async fn delete_restaurant(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find_restaurant<'e>(
    db: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as::<_, Restaurant>(&format!(
        "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find_owned_restaurant(
    db: &PgPool,
    id: Uuid,
    owner_id: Uuid,
) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as::<_, Restaurant>(&format!(
        "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1 AND owner_id = $2"
    ))
    .bind(id)
    .bind(owner_id)
    .fetch_optional(db)
    .await
}

pub async fn list_owned_restaurants(db: &PgPool, owner_id: Uuid) -> Result<Vec<Restaurant>, sqlx::Error> {
    sqlx::query_as::<_, Restaurant>(&format!(
        "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE owner_id = $1 ORDER BY created_at DESC"
    ))
    .bind(owner_id)
    .fetch_all(db)
    .await
}

/// Page of restaurants, promoted first, optionally limited to one category.
pub async fn page_restaurants(
    db: &PgPool,
    category_id: Option<Uuid>,
    page: PageRequest,
) -> Result<(Vec<Restaurant>, i64), sqlx::Error> {
    let items = sqlx::query_as::<_, Restaurant>(&format!(
        r#"SELECT {RESTAURANT_COLUMNS} FROM restaurants
           WHERE ($1::uuid IS NULL OR category_id = $1)
           ORDER BY is_promoted DESC, created_at DESC, id
           LIMIT $2 OFFSET $3"#
    ))
    .bind(category_id)
    .bind(page.size)
    .bind(page.offset())
    .fetch_all(db)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM restaurants WHERE ($1::uuid IS NULL OR category_id = $1)",
    )
    .bind(category_id)
    .fetch_one(db)
    .await?;

    Ok((items, total))
}

pub async fn search_restaurants(
    db: &PgPool,
    query: &str,
    page: PageRequest,
) -> Result<(Vec<Restaurant>, i64), sqlx::Error> {
    let pattern = like_pattern(query);
    let items = sqlx::query_as::<_, Restaurant>(&format!(
        r#"SELECT {RESTAURANT_COLUMNS} FROM restaurants
           WHERE name ILIKE $1 ESCAPE '\'
           ORDER BY is_promoted DESC, name, id
           LIMIT $2 OFFSET $3"#
    ))
    .bind(&pattern)
    .bind(page.size)
    .bind(page.offset())
    .fetch_all(db)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM restaurants WHERE name ILIKE $1 ESCAPE '\'"#,
    )
    .bind(&pattern)
    .fetch_one(db)
    .await?;

    Ok((items, total))
}

pub async fn promote_restaurant<'e>(
    db: impl PgExecutor<'e>,
    id: Uuid,
    until: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE restaurants SET is_promoted = TRUE, promoted_until = $2, updated_at = now() WHERE id = $1",
    )
    .bind(id)
    .bind(until)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Clears promotions that ended before `now`; returns how many were cleared.
pub async fn expire_promotions(db: &PgPool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"UPDATE restaurants
           SET is_promoted = FALSE, promoted_until = NULL, updated_at = now()
           WHERE is_promoted AND promoted_until IS NOT NULL AND promoted_until < $1"#,
    )
    .bind(now)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

// --- dishes ---

pub struct NewDish<'a> {
    pub restaurant_id: Uuid,
    pub name: &'a str,
    pub price: &'a Money,
    pub photo: Option<&'a str>,
    pub description: &'a str,
    pub options: &'a [DishOption],
}

pub async fn insert_dish(db: &PgPool, new: NewDish<'_>) -> Result<Dish, sqlx::Error> {
    sqlx::query_as::<_, Dish>(&format!(
        r#"INSERT INTO dishes (id, name, price, photo, description, restaurant_id, options)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           RETURNING {DISH_COLUMNS}"#
    ))
    .bind(Uuid::new_v4())
    .bind(new.name)
    .bind(new.price)
    .bind(new.photo)
    .bind(new.description)
    .bind(new.restaurant_id)
    .bind(Json(new.options))
    .fetch_one(db)
    .await
}

#[derive(Default)]
pub struct DishChanges<'a> {
    pub name: Option<&'a str>,
    pub price: Option<&'a Money>,
    pub photo: Option<&'a str>,
    pub description: Option<&'a str>,
    pub options: Option<&'a [DishOption]>,
}

pub async fn update_dish(db: &PgPool, id: Uuid, changes: DishChanges<'_>) -> Result<Option<Dish>, sqlx::Error> {
    sqlx::query_as::<_, Dish>(&format!(
        r#"UPDATE dishes
           SET name = COALESCE($2, name),
               price = COALESCE($3, price),
               photo = COALESCE($4, photo),
               description = COALESCE($5, description),
               options = COALESCE($6, options),
               updated_at = now()
           WHERE id = $1
           RETURNING {DISH_COLUMNS}"#
    ))
    .bind(id)
    .bind(changes.name)
    .bind(changes.price)
    .bind(changes.photo)
    .bind(changes.description)
    .bind(changes.options.map(Json))
    .fetch_optional(db)
    .await
}

pub async fn delete_dish(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM dishes WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn find_dish<'e>(db: impl PgExecutor<'e>, id: Uuid) -> Result<Option<Dish>, sqlx::Error> {
    sqlx::query_as::<_, Dish>(&format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Dish joined with the owner of its restaurant.
pub async fn find_dish_with_owner(db: &PgPool, id: Uuid) -> Result<Option<(Dish, Uuid)>, sqlx::Error> {
    let Some(dish) = find_dish(db, id).await? else {
        return Ok(None);
    };
    let owner = sqlx::query_scalar::<_, Uuid>("SELECT owner_id FROM restaurants WHERE id = $1")
        .bind(dish.restaurant_id)
        .fetch_optional(db)
        .await?;
    Ok(owner.map(|owner_id| (dish, owner_id)))
}

pub async fn list_menu(db: &PgPool, restaurant_id: Uuid) -> Result<Vec<Dish>, sqlx::Error> {
    sqlx::query_as::<_, Dish>(&format!(
        "SELECT {DISH_COLUMNS} FROM dishes WHERE restaurant_id = $1 ORDER BY created_at, id"
    ))
    .bind(restaurant_id)
    .fetch_all(db)
    .await
}

pub async fn find_dishes<'e>(db: impl PgExecutor<'e>, ids: &[Uuid]) -> Result<Vec<Dish>, sqlx::Error> {
    sqlx::query_as::<_, Dish>(&format!(
        "SELECT {DISH_COLUMNS} FROM dishes WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("taco"), "%taco%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c\\d"), "%c\\\\d%");
    }
}
