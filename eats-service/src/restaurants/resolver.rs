use async_graphql::{ComplexObject, Context, InputObject, Object, Result};
use common_auth::Role;
use common_money::Money;
use uuid::Uuid;

use crate::graphql::guard::{app_context, caller, RoleGuard, Viewer};
use crate::orders::model::Order;
use crate::orders::repo as order_repo;
use crate::output::{fold, CoreOutput};
use crate::restaurants::model::{Category, Dish, DishOption, Restaurant};
use crate::restaurants::service::{
    self, DishEdit, NewDishInput, NewRestaurantInput, RestaurantEdit,
};

#[derive(InputObject)]
pub struct CreateRestaurantInput {
    pub name: String,
    pub cover_img: String,
    pub address: String,
    pub category_name: String,
}

#[derive(InputObject)]
pub struct EditRestaurantInput {
    pub restaurant_id: Uuid,
    pub name: Option<String>,
    pub cover_img: Option<String>,
    pub address: Option<String>,
    pub category_name: Option<String>,
}

#[derive(InputObject)]
pub struct DeleteRestaurantInput {
    pub restaurant_id: Uuid,
}

#[derive(InputObject)]
pub struct MyRestaurantInput {
    pub id: Uuid,
}

#[derive(InputObject)]
pub struct CategoryInput {
    pub slug: String,
    #[graphql(default = 1)]
    pub page: i32,
}

#[derive(InputObject)]
pub struct RestaurantsInput {
    #[graphql(default = 1)]
    pub page: i32,
}

#[derive(InputObject)]
pub struct RestaurantInput {
    pub restaurant_id: Uuid,
}

#[derive(InputObject)]
pub struct SearchRestaurantInput {
    pub query: String,
    #[graphql(default = 1)]
    pub page: i32,
}

#[derive(InputObject)]
pub struct CreateDishInput {
    pub restaurant_id: Uuid,
    pub name: String,
    pub price: Money,
    pub photo: Option<String>,
    pub description: String,
    pub options: Option<Vec<DishOption>>,
}

#[derive(InputObject)]
pub struct EditDishInput {
    pub dish_id: Uuid,
    pub name: Option<String>,
    pub price: Option<Money>,
    pub photo: Option<String>,
    pub description: Option<String>,
    pub options: Option<Vec<DishOption>>,
}

#[derive(InputObject)]
pub struct DeleteDishInput {
    pub dish_id: Uuid,
}

crate::output!(CreateRestaurantOutput { restaurant_id: Uuid });
crate::output!(MyRestaurantsOutput { restaurants: Vec<Restaurant> });
crate::output!(MyRestaurantOutput { restaurant: Restaurant });
crate::output!(AllCategoriesOutput { categories: Vec<Category> });
crate::output!(CategoryOutput {
    category: Category,
    restaurants: Vec<Restaurant>,
    total_pages: i64,
    total_results: i64,
});
crate::output!(RestaurantsOutput {
    results: Vec<Restaurant>,
    total_pages: i64,
    total_results: i64,
});
crate::output!(RestaurantOutput { restaurant: Restaurant });
crate::output!(SearchRestaurantOutput {
    restaurants: Vec<Restaurant>,
    total_pages: i64,
    total_results: i64,
});

#[derive(Default)]
pub struct RestaurantsQuery;

#[Object]
impl RestaurantsQuery {
    #[graphql(guard = "RoleGuard::new(&[Role::Owner])")]
    async fn my_restaurants(&self, ctx: &Context<'_>) -> Result<MyRestaurantsOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        Ok(fold(
            service::my_restaurants(app, caller.id).await,
            "Failed to find my restaurants.",
            |restaurants| MyRestaurantsOutput { restaurants: Some(restaurants), ..MyRestaurantsOutput::success() },
        ))
    }

    #[graphql(guard = "RoleGuard::new(&[Role::Owner])")]
    async fn my_restaurant(&self, ctx: &Context<'_>, input: MyRestaurantInput) -> Result<MyRestaurantOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        Ok(fold(
            service::my_restaurant(app, caller.id, input.id).await,
            "Failed to find restaurant.",
            |restaurant| MyRestaurantOutput { restaurant: Some(restaurant), ..MyRestaurantOutput::success() },
        ))
    }

    async fn all_categories(&self, ctx: &Context<'_>) -> Result<AllCategoriesOutput> {
        let app = app_context(ctx)?;
        Ok(fold(
            service::all_categories(app).await,
            "Failed to load categories.",
            |categories| AllCategoriesOutput { categories: Some(categories), ..AllCategoriesOutput::success() },
        ))
    }

    async fn category(&self, ctx: &Context<'_>, input: CategoryInput) -> Result<CategoryOutput> {
        let app = app_context(ctx)?;
        Ok(fold(
            service::category_by_slug(app, &input.slug, input.page).await,
            "Failed to load category.",
            |(category, page)| CategoryOutput {
                category: Some(category),
                restaurants: Some(page.items),
                total_pages: Some(page.total_pages),
                total_results: Some(page.total_results),
                ..CategoryOutput::success()
            },
        ))
    }

    async fn restaurants(&self, ctx: &Context<'_>, input: RestaurantsInput) -> Result<RestaurantsOutput> {
        let app = app_context(ctx)?;
        Ok(fold(
            service::all_restaurants(app, input.page).await,
            "Failed to load restaurants.",
            |page| RestaurantsOutput {
                results: Some(page.items),
                total_pages: Some(page.total_pages),
                total_results: Some(page.total_results),
                ..RestaurantsOutput::success()
            },
        ))
    }

    async fn restaurant(&self, ctx: &Context<'_>, input: RestaurantInput) -> Result<RestaurantOutput> {
        let app = app_context(ctx)?;
        Ok(fold(
            service::find_restaurant(app, input.restaurant_id).await,
            "Search failed due to an unknown error.",
            |restaurant| RestaurantOutput { restaurant: Some(restaurant), ..RestaurantOutput::success() },
        ))
    }

    async fn search_restaurant(&self, ctx: &Context<'_>, input: SearchRestaurantInput) -> Result<SearchRestaurantOutput> {
        let app = app_context(ctx)?;
        Ok(fold(
            service::search_restaurants(app, &input.query, input.page).await,
            "Search failed due to an unknown error.",
            |page| SearchRestaurantOutput {
                restaurants: Some(page.items),
                total_pages: Some(page.total_pages),
                total_results: Some(page.total_results),
                ..SearchRestaurantOutput::success()
            },
        ))
    }
}

#[derive(Default)]
pub struct RestaurantsMutation;

#[Object]
impl RestaurantsMutation {
    #[graphql(guard = "RoleGuard::new(&[Role::Owner])")]
    async fn create_restaurant(&self, ctx: &Context<'_>, input: CreateRestaurantInput) -> Result<CreateRestaurantOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        let new = NewRestaurantInput {
            name: &input.name,
            cover_img: &input.cover_img,
            address: &input.address,
            category_name: &input.category_name,
        };
        Ok(fold(
            service::create_restaurant(app, caller.id, new).await,
            "Could not create restaurant.",
            |restaurant| CreateRestaurantOutput { restaurant_id: Some(restaurant.id), ..CreateRestaurantOutput::success() },
        ))
    }

    #[graphql(guard = "RoleGuard::new(&[Role::Owner])")]
    async fn edit_restaurant(&self, ctx: &Context<'_>, input: EditRestaurantInput) -> Result<CoreOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        let edit = RestaurantEdit {
            name: input.name.as_deref(),
            cover_img: input.cover_img.as_deref(),
            address: input.address.as_deref(),
            category_name: input.category_name.as_deref(),
        };
        Ok(fold(
            service::edit_restaurant(app, caller.id, input.restaurant_id, edit).await,
            "Failed to edit restaurant.",
            |_| CoreOutput::success(),
        ))
    }

    #[graphql(guard = "RoleGuard::new(&[Role::Owner])")]
    async fn delete_restaurant(&self, ctx: &Context<'_>, input: DeleteRestaurantInput) -> Result<CoreOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        Ok(fold(
            service::delete_restaurant(app, caller.id, input.restaurant_id).await,
            "Failed to delete restaurant",
            |_| CoreOutput::success(),
        ))
    }

    #[graphql(guard = "RoleGuard::new(&[Role::Owner])")]
    async fn create_dish(&self, ctx: &Context<'_>, input: CreateDishInput) -> Result<CoreOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        let options = input.options.unwrap_or_default();
        let new = NewDishInput {
            restaurant_id: input.restaurant_id,
            name: &input.name,
            price: &input.price,
            photo: input.photo.as_deref(),
            description: &input.description,
            options: &options,
        };
        Ok(fold(
            service::create_dish(app, caller.id, new).await,
            "Failed to create dish.",
            |_| CoreOutput::success(),
        ))
    }

    #[graphql(guard = "RoleGuard::new(&[Role::Owner])")]
    async fn edit_dish(&self, ctx: &Context<'_>, input: EditDishInput) -> Result<CoreOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        let edit = DishEdit {
            name: input.name.as_deref(),
            price: input.price.as_ref(),
            photo: input.photo.as_deref(),
            description: input.description.as_deref(),
            options: input.options.as_deref(),
        };
        Ok(fold(
            service::edit_dish(app, caller.id, input.dish_id, edit).await,
            "Failed to find dish due to unknown error.",
            |_| CoreOutput::success(),
        ))
    }

    #[graphql(guard = "RoleGuard::new(&[Role::Owner])")]
    async fn delete_dish(&self, ctx: &Context<'_>, input: DeleteDishInput) -> Result<CoreOutput> {
        let app = app_context(ctx)?;
        let caller = caller(ctx)?;
        Ok(fold(
            service::delete_dish(app, caller.id, input.dish_id).await,
            "Failed to find dish due to unknown error.",
            |_| CoreOutput::success(),
        ))
    }
}

#[ComplexObject]
impl Category {
    async fn restaurant_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let app = app_context(ctx)?;
        service::count_restaurants(app, self.id)
            .await
            .map_err(|err| err.public_message("Failed to count restaurants.").into())
    }
}

#[ComplexObject]
impl Restaurant {
    async fn category(&self, ctx: &Context<'_>) -> Result<Option<Category>> {
        let Some(category_id) = self.category_id else {
            return Ok(None);
        };
        let app = app_context(ctx)?;
        service::find_category(app, category_id)
            .await
            .map_err(|err| err.public_message("Failed to load category.").into())
    }

    async fn menu(&self, ctx: &Context<'_>) -> Result<Vec<Dish>> {
        let app = app_context(ctx)?;
        service::menu(app, self.id)
            .await
            .map_err(|err| err.public_message("Failed to load menu.").into())
    }

    /// Orders placed at this restaurant; empty unless the caller owns it.
    async fn orders(&self, ctx: &Context<'_>) -> Result<Vec<Order>> {
        let owns = ctx
            .data_opt::<Viewer>()
            .and_then(Viewer::caller)
            .is_some_and(|caller| caller.role == Role::Owner && caller.id == self.owner_id);
        if !owns {
            return Ok(Vec::new());
        }
        let app = app_context(ctx)?;
        order_repo::list_for_restaurant(&app.db, self.id)
            .await
            .map_err(|err| crate::error::ServiceError::from(err).public_message("Failed to load orders.").into())
    }
}

#[ComplexObject]
impl Dish {
    async fn options(&self) -> Vec<DishOption> {
        self.options.0.clone()
    }
}
