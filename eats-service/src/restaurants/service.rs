use common_money::Money;
use tracing::info;
use uuid::Uuid;

use crate::context::AppContext;
use crate::error::{ServiceError, ServiceResult};
use crate::pagination::{Page, PageRequest, RESTAURANT_PAGE_SIZE, SEARCH_PAGE_SIZE};
use crate::restaurants::model::{Category, Dish, DishOption, Restaurant};
use crate::restaurants::repo::{self, DishChanges, NewDish, NewRestaurant, RestaurantChanges};
use crate::restaurants::slug::CategoryKey;

pub const RESTAURANT_NOT_FOUND: &str = "Restaurant not found.";
pub const FAILED_TO_FIND_RESTAURANT: &str = "Failed to find restaurant.";
const DISH_NOT_FOUND: &str = "Failed to find dish.";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

pub struct NewRestaurantInput<'a> {
    pub name: &'a str,
    pub cover_img: &'a str,
    pub address: &'a str,
    pub category_name: &'a str,
}

pub async fn create_restaurant(ctx: &AppContext, owner_id: Uuid, input: NewRestaurantInput<'_>) -> ServiceResult<Restaurant> {
    let key = CategoryKey::from_name(input.category_name);
    if key.slug.is_empty() {
        return Err(ServiceError::Invalid("Category name must not be empty.".to_string()));
    }

    let mut tx = ctx.db.begin().await?;
    let category = repo::get_or_create_category(&mut *tx, &key).await?;
    let restaurant = repo::insert_restaurant(
        &mut *tx,
        NewRestaurant {
            name: input.name.trim(),
            cover_img: input.cover_img,
            address: input.address,
            owner_id,
            category_id: category.id,
        },
    )
    .await?;
    tx.commit().await?;

    info!(restaurant_id = %restaurant.id, %owner_id, category = %category.slug, "restaurant created");
    Ok(restaurant)
}

pub struct RestaurantEdit<'a> {
    pub name: Option<&'a str>,
    pub cover_img: Option<&'a str>,
    pub address: Option<&'a str>,
    pub category_name: Option<&'a str>,
}

pub async fn edit_restaurant(ctx: &AppContext, owner_id: Uuid, restaurant_id: Uuid, edit: RestaurantEdit<'_>) -> ServiceResult<Restaurant> {
    let restaurant = repo::find_restaurant(&ctx.db, restaurant_id)
        .await?
        .ok_or(ServiceError::NotFound(RESTAURANT_NOT_FOUND))?;
    if restaurant.owner_id != owner_id {
        return Err(ServiceError::Forbidden("Must be an owner to edit restaurant."));
    }

    let mut tx = ctx.db.begin().await?;
    let category_id = match non_blank(edit.category_name) {
        Some(name) => Some(repo::get_or_create_category(&mut *tx, &CategoryKey::from_name(name)).await?.id),
        None => None,
    };
    let changes = RestaurantChanges {
        name: non_blank(edit.name),
        cover_img: non_blank(edit.cover_img),
        address: non_blank(edit.address),
        category_id,
    };
    let updated = repo::update_restaurant(&mut *tx, restaurant_id, changes)
        .await?
        .ok_or(ServiceError::NotFound(RESTAURANT_NOT_FOUND))?;
    tx.commit().await?;
    Ok(updated)
}

pub async fn delete_restaurant(ctx: &AppContext, owner_id: Uuid, restaurant_id: Uuid) -> ServiceResult<()> {
    let restaurant = repo::find_restaurant(&ctx.db, restaurant_id)
        .await?
        .ok_or(ServiceError::NotFound(RESTAURANT_NOT_FOUND))?;
    if restaurant.owner_id != owner_id {
        return Err(ServiceError::Forbidden("Must be an owner to delete restaurant."));
    }
    repo::delete_restaurant(&ctx.db, restaurant_id).await?;
    info!(%restaurant_id, %owner_id, "restaurant deleted");
    Ok(())
}

pub async fn my_restaurants(ctx: &AppContext, owner_id: Uuid) -> ServiceResult<Vec<Restaurant>> {
    Ok(repo::list_owned_restaurants(&ctx.db, owner_id).await?)
}

pub async fn my_restaurant(ctx: &AppContext, owner_id: Uuid, restaurant_id: Uuid) -> ServiceResult<Restaurant> {
    repo::find_owned_restaurant(&ctx.db, restaurant_id, owner_id)
        .await?
        .ok_or(ServiceError::NotFound(RESTAURANT_NOT_FOUND))
}

pub async fn all_categories(ctx: &AppContext) -> ServiceResult<Vec<Category>> {
    Ok(repo::list_categories(&ctx.db).await?)
}

pub async fn count_restaurants(ctx: &AppContext, category_id: Uuid) -> ServiceResult<i64> {
    Ok(repo::count_restaurants_in_category(&ctx.db, category_id).await?)
}

pub async fn category_by_slug(ctx: &AppContext, slug: &str, page: i32) -> ServiceResult<(Category, Page<Restaurant>)> {
    let category = repo::find_category_by_slug(&ctx.db, slug.trim())
        .await?
        .ok_or(ServiceError::NotFound("Category not found"))?;
    let request = PageRequest::new(page, RESTAURANT_PAGE_SIZE);
    let (items, total) = repo::page_restaurants(&ctx.db, Some(category.id), request).await?;
    Ok((
        category,
        Page {
            items,
            total_results: total,
            total_pages: request.total_pages(total),
        },
    ))
}

pub async fn all_restaurants(ctx: &AppContext, page: i32) -> ServiceResult<Page<Restaurant>> {
    let request = PageRequest::new(page, RESTAURANT_PAGE_SIZE);
    let (items, total) = repo::page_restaurants(&ctx.db, None, request).await?;
    Ok(Page {
        items,
        total_results: total,
        total_pages: request.total_pages(total),
    })
}

pub async fn find_restaurant(ctx: &AppContext, restaurant_id: Uuid) -> ServiceResult<Restaurant> {
    repo::find_restaurant(&ctx.db, restaurant_id)
        .await?
        .ok_or(ServiceError::NotFound(FAILED_TO_FIND_RESTAURANT))
}

pub async fn search_restaurants(ctx: &AppContext, query: &str, page: i32) -> ServiceResult<Page<Restaurant>> {
    let request = PageRequest::new(page, SEARCH_PAGE_SIZE);
    let (items, total) = repo::search_restaurants(&ctx.db, query.trim(), request).await?;
    Ok(Page {
        items,
        total_results: total,
        total_pages: request.total_pages(total),
    })
}

pub struct NewDishInput<'a> {
    pub restaurant_id: Uuid,
    pub name: &'a str,
    pub price: &'a Money,
    pub photo: Option<&'a str>,
    pub description: &'a str,
    pub options: &'a [DishOption],
}

pub async fn create_dish(ctx: &AppContext, owner_id: Uuid, input: NewDishInput<'_>) -> ServiceResult<Dish> {
    let restaurant = repo::find_restaurant(&ctx.db, input.restaurant_id)
        .await?
        .ok_or(ServiceError::NotFound(FAILED_TO_FIND_RESTAURANT))?;
    if restaurant.owner_id != owner_id {
        return Err(ServiceError::Forbidden("Must be an owner to add items to restaurant."));
    }
    let dish = repo::insert_dish(
        &ctx.db,
        NewDish {
            restaurant_id: restaurant.id,
            name: input.name.trim(),
            price: input.price,
            photo: non_blank(input.photo),
            description: input.description,
            options: input.options,
        },
    )
    .await?;
    info!(dish_id = %dish.id, restaurant_id = %restaurant.id, "dish created");
    Ok(dish)
}

pub struct DishEdit<'a> {
    pub name: Option<&'a str>,
    pub price: Option<&'a Money>,
    pub photo: Option<&'a str>,
    pub description: Option<&'a str>,
    pub options: Option<&'a [DishOption]>,
}

pub async fn edit_dish(ctx: &AppContext, owner_id: Uuid, dish_id: Uuid, edit: DishEdit<'_>) -> ServiceResult<Dish> {
    let (_, dish_owner) = repo::find_dish_with_owner(&ctx.db, dish_id)
        .await?
        .ok_or(ServiceError::NotFound(DISH_NOT_FOUND))?;
    if dish_owner != owner_id {
        return Err(ServiceError::Forbidden("Only owners of the restaurant can edit dishes."));
    }
    let changes = DishChanges {
        name: non_blank(edit.name),
        price: edit.price,
        photo: non_blank(edit.photo),
        description: non_blank(edit.description),
        options: edit.options,
    };
    repo::update_dish(&ctx.db, dish_id, changes)
        .await?
        .ok_or(ServiceError::NotFound(DISH_NOT_FOUND))
}

pub async fn delete_dish(ctx: &AppContext, owner_id: Uuid, dish_id: Uuid) -> ServiceResult<()> {
    let (_, dish_owner) = repo::find_dish_with_owner(&ctx.db, dish_id)
        .await?
        .ok_or(ServiceError::NotFound(DISH_NOT_FOUND))?;
    if dish_owner != owner_id {
        return Err(ServiceError::Forbidden("Only owners of the restaurant can delete dishes."));
    }
    repo::delete_dish(&ctx.db, dish_id).await?;
    Ok(())
}

pub async fn menu(ctx: &AppContext, restaurant_id: Uuid) -> ServiceResult<Vec<Dish>> {
    Ok(repo::list_menu(&ctx.db, restaurant_id).await?)
}

pub async fn find_category(ctx: &AppContext, category_id: Uuid) -> ServiceResult<Option<Category>> {
    Ok(repo::find_category(&ctx.db, category_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_drops_empty_edits() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" Pho ")), Some("Pho"));
        assert_eq!(non_blank(None), None);
    }
}
