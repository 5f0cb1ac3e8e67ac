use common_auth::Role;
use uuid::Uuid;

use crate::context::Caller;
use crate::orders::model::{Order, OrderStatus};

/// Customers see their own orders, drivers the ones assigned to them and
/// owners the ones placed at their restaurants.
pub fn can_view(order: &Order, restaurant_owner: Option<Uuid>, caller: &Caller) -> bool {
    match caller.role {
        Role::Client => order.customer_id == Some(caller.id),
        Role::Delivery => order.driver_id == Some(caller.id),
        Role::Owner => restaurant_owner == Some(caller.id),
    }
}

pub fn can_set_status(role: Role, status: OrderStatus) -> bool {
    match role {
        Role::Client => false,
        Role::Owner => matches!(status, OrderStatus::InProgress | OrderStatus::WaitingForPickUp),
        Role::Delivery => matches!(status, OrderStatus::PickedUp | OrderStatus::Delivered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common_money::Money;

    struct Parties {
        customer: Uuid,
        driver: Uuid,
        owner: Uuid,
        order: Order,
    }

    fn parties() -> Parties {
        let customer = Uuid::new_v4();
        let driver = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let now = Utc::now();
        Parties {
            customer,
            driver,
            owner,
            order: Order {
                id: Uuid::new_v4(),
                customer_id: Some(customer),
                driver_id: Some(driver),
                restaurant_id: Some(Uuid::new_v4()),
                total: Money::from_cents(2_000),
                status: OrderStatus::Pending,
                created_at: now,
                updated_at: now,
            },
        }
    }

    #[test]
    fn each_party_sees_the_order() {
        let p = parties();
        assert!(can_view(&p.order, Some(p.owner), &Caller::new(p.customer, Role::Client)));
        assert!(can_view(&p.order, Some(p.owner), &Caller::new(p.driver, Role::Delivery)));
        assert!(can_view(&p.order, Some(p.owner), &Caller::new(p.owner, Role::Owner)));
    }

    #[test]
    fn strangers_and_role_mismatches_are_denied() {
        let p = parties();
        let stranger = Uuid::new_v4();
        assert!(!can_view(&p.order, Some(p.owner), &Caller::new(stranger, Role::Client)));
        assert!(!can_view(&p.order, Some(p.owner), &Caller::new(stranger, Role::Owner)));
        // The customer id presented with a driver token does not match the driver slot.
        assert!(!can_view(&p.order, Some(p.owner), &Caller::new(p.customer, Role::Delivery)));
        assert!(!can_view(&p.order, None, &Caller::new(p.owner, Role::Owner)));
    }

    #[test]
    fn unassigned_order_is_hidden_from_drivers() {
        let mut p = parties();
        p.order.driver_id = None;
        assert!(!can_view(&p.order, Some(p.owner), &Caller::new(p.driver, Role::Delivery)));
    }

    #[test]
    fn status_permissions_per_role() {
        use OrderStatus::*;
        for status in [Pending, InProgress, WaitingForPickUp, PickedUp, Delivered] {
            assert!(!can_set_status(Role::Client, status));
        }
        assert!(can_set_status(Role::Owner, InProgress));
        assert!(can_set_status(Role::Owner, WaitingForPickUp));
        assert!(!can_set_status(Role::Owner, PickedUp));
        assert!(!can_set_status(Role::Owner, Pending));
        assert!(can_set_status(Role::Delivery, PickedUp));
        assert!(can_set_status(Role::Delivery, Delivered));
        assert!(!can_set_status(Role::Delivery, InProgress));
    }
}
