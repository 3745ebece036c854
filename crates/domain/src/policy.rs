//! Owner/admin access policy.

use crate::order::Order;
use crate::user::User;

/// True iff the user is an admin or owns the order.
///
/// Checked before every state-changing and item-listing operation.
pub fn can_view_or_modify(user: &User, order: &Order) -> bool {
    user.admin || user.id == order.owner_id
}

/// True iff the user may list every user's orders.
pub fn can_list_all(user: &User) -> bool {
    user.admin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn user(admin: bool) -> User {
        User::new("user", "user@test.com", "hash", true, admin)
    }

    #[test]
    fn owner_can_view_or_modify() {
        let owner = user(false);
        let order = Order::create(owner.id, Money::from_cents(100)).unwrap();
        assert!(can_view_or_modify(&owner, &order));
    }

    #[test]
    fn admin_can_view_or_modify_any_order() {
        let owner = user(false);
        let admin = user(true);
        let order = Order::create(owner.id, Money::from_cents(100)).unwrap();
        assert!(can_view_or_modify(&admin, &order));
    }

    #[test]
    fn stranger_cannot_view_or_modify() {
        let owner = user(false);
        let other = user(false);
        let order = Order::create(owner.id, Money::from_cents(100)).unwrap();
        assert!(!can_view_or_modify(&other, &order));
    }

    #[test]
    fn only_admin_lists_all() {
        assert!(can_list_all(&user(true)));
        assert!(!can_list_all(&user(false)));
    }
}
