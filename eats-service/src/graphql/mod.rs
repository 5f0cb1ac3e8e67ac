pub mod guard;

use async_graphql::{MergedObject, Schema};

use crate::context::AppContext;
use crate::orders::resolver::{OrdersMutation, OrdersQuery, OrdersSubscription};
use crate::payments::resolver::{PaymentsMutation, PaymentsQuery};
use crate::restaurants::resolver::{RestaurantsMutation, RestaurantsQuery};
use crate::users::resolver::{UsersMutation, UsersQuery};

pub use guard::{RoleGuard, Viewer};

#[derive(MergedObject, Default)]
pub struct Query(UsersQuery, RestaurantsQuery, OrdersQuery, PaymentsQuery);

#[derive(MergedObject, Default)]
pub struct Mutation(UsersMutation, RestaurantsMutation, OrdersMutation, PaymentsMutation);

pub type EatsSchema = Schema<Query, Mutation, OrdersSubscription>;

pub fn build_schema(ctx: AppContext) -> EatsSchema {
    Schema::build(Query::default(), Mutation::default(), OrdersSubscription)
        .data(ctx)
        .finish()
}

/// Operation type of a GraphQL document, used as a metrics label.
pub fn operation_kind(document: &str) -> &'static str {
    let first = document
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .find(|line| !line.is_empty())
        .unwrap_or_default();
    if first.starts_with("mutation") {
        "mutation"
    } else if first.starts_with("subscription") {
        "subscription"
    } else {
        "query"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_operations() {
        assert_eq!(operation_kind("{ me { id } }"), "query");
        assert_eq!(operation_kind("query Me { me { id } }"), "query");
        assert_eq!(operation_kind("  # place it\n mutation { createOrder(input: {}) { ok } }"), "mutation");
        assert_eq!(operation_kind("subscription { cookedOrders { id } }"), "subscription");
    }

    #[test]
    fn schema_exposes_every_root_field() {
        let sdl = Schema::build(Query::default(), Mutation::default(), OrdersSubscription)
            .finish()
            .sdl();
        for field in [
            "me", "userProfile", "myRestaurants", "myRestaurant", "allCategories", "category",
            "restaurants", "restaurant", "searchRestaurant", "getOrders", "getOrder", "getPayments",
            "createAccount", "login", "editProfile", "verifyEmail", "createRestaurant",
            "editRestaurant", "deleteRestaurant", "createDish", "editDish", "deleteDish",
            "createOrder", "editOrder", "takeOrder", "createPayment", "pendingOrders",
            "cookedOrders", "orderUpdates",
        ] {
            assert!(sdl.contains(&format!("{field}(")) || sdl.contains(&format!("{field}:")), "missing {field}");
        }
        assert!(sdl.contains("WaitingForPickUp"));
        assert!(sdl.contains("enum UserRole"));
    }
}
