//! Member management: registration, credit top-ups and deletion.
//!
//! Credential/account handling is out of scope; deletion takes an explicit
//! acting identity instead of an ambient authenticated context.

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{Clock, OrderStore};
use crate::domain::user::{capitalize, User};

/// Acting identity supplied explicitly by the caller.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub first_name: String,
    pub last_name: String,
    pub nick_name: Option<String>,
    pub section: String,
    /// `None` keeps the current membership flag.
    pub is_membership: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub first_name: String,
    pub last_name: String,
    pub nick_name: Option<String>,
    pub section: String,
    /// Initial credit in minor units, must be strictly positive.
    pub credit: i64,
    pub is_membership: bool,
}

pub struct UserService<'a, S, C> {
    store: &'a mut S,
    clock: &'a C,
}

/// Members get 10% on top of every credited amount.
fn membership_bonus(amount: i64) -> i64 {
    amount * 10 / 100
}

impl<'a, S: OrderStore, C: Clock> UserService<'a, S, C> {
    pub fn new(store: &'a mut S, clock: &'a C) -> Self {
        Self { store, clock }
    }

    pub fn register_user(&mut self, cmd: RegisterUser) -> Result<User, DomainError> {
        log::debug!(
            "register user {} {} in section {}",
            cmd.first_name,
            cmd.last_name,
            cmd.section
        );

        if cmd.credit <= 0 {
            return Err(DomainError::InvalidCredit(cmd.credit));
        }

        let first_name = capitalize(&cmd.first_name);
        let last_name = capitalize(&cmd.last_name);
        let nick_name = cmd.nick_name.as_deref().map(capitalize);

        if self.store.user_exists(&first_name, &last_name, &cmd.section)? {
            return Err(DomainError::DuplicateUser {
                first_name,
                last_name,
                section: cmd.section,
            });
        }

        let credit = if cmd.is_membership {
            cmd.credit + membership_bonus(cmd.credit)
        } else {
            cmd.credit
        };

        let now = self.clock.now();
        let user = User {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            nick_name,
            section: cmd.section,
            credit,
            is_membership: cmd.is_membership,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_user(&user)?;
        log::info!("user {} registered with credit {}", user.id, user.credit);
        Ok(user)
    }

    /// Rewrite a user's profile. Names go through the usual normalization;
    /// credit is untouched, use [`Self::credit_user`] for that.
    pub fn update_user(&mut self, user_id: Uuid, cmd: UpdateUser) -> Result<User, DomainError> {
        log::debug!("update user {user_id}");

        let user = self
            .store
            .find_user(user_id)?
            .ok_or(DomainError::UserNotFound(user_id))?;

        let updated = User {
            first_name: capitalize(&cmd.first_name),
            last_name: capitalize(&cmd.last_name),
            nick_name: cmd.nick_name.as_deref().map(capitalize),
            section: cmd.section,
            is_membership: cmd.is_membership.unwrap_or(user.is_membership),
            updated_at: self.clock.now(),
            ..user
        };
        self.store.update_user(&updated)?;
        log::info!("user {user_id} profile updated");
        Ok(updated)
    }

    /// Top up a user's balance. Members get the bonus on the topped-up amount.
    pub fn credit_user(&mut self, user_id: Uuid, amount: i64) -> Result<User, DomainError> {
        log::debug!("credit user {user_id} with {amount}");

        if amount <= 0 {
            return Err(DomainError::InvalidCredit(amount));
        }

        let user = self
            .store
            .find_user(user_id)?
            .ok_or(DomainError::UserNotFound(user_id))?;

        let credited = if user.is_membership {
            user.credit + amount + membership_bonus(amount)
        } else {
            user.credit + amount
        };

        let updated = user.with_credit(credited, self.clock.now());
        self.store.update_user(&updated)?;
        log::info!("user {user_id} credited, new credit {}", updated.credit);
        Ok(updated)
    }

    /// Delete a user and cascade through their orders: items first, then
    /// orders, then the user. Admin only.
    pub fn delete_user(&mut self, actor: Actor, user_id: Uuid) -> Result<(), DomainError> {
        if !actor.is_admin {
            return Err(DomainError::Forbidden);
        }
        log::info!("actor {} deletes user {user_id}", actor.id);

        let user = self
            .store
            .find_user(user_id)?
            .ok_or(DomainError::UserNotFound(user_id))?;

        for order in self.store.orders_by_user(user.id)? {
            self.store.delete_items_by_order(order.id)?;
        }
        self.store.delete_orders_by_user(user.id)?;
        self.store.delete_user(user.id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::application::order_service::{CreateOrder, OrderService};
    use crate::domain::order::{Category, Ingredient, Product};
    use crate::infrastructure::memory::MemoryStore;
    use crate::testsupport::FixedClock;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 5, 12, 18, 30, 0).unwrap())
    }

    fn registration(membership: bool) -> RegisterUser {
        RegisterUser {
            first_name: "JEAN".to_string(),
            last_name: "dupont".to_string(),
            nick_name: Some("jojo".to_string()),
            section: "INFO".to_string(),
            credit: 1000,
            is_membership: membership,
        }
    }

    #[test]
    fn registration_normalizes_names() {
        let mut store = MemoryStore::default();
        let clock = clock();
        let user = UserService::new(&mut store, &clock)
            .register_user(registration(false))
            .unwrap();
        assert_eq!(user.first_name, "Jean");
        assert_eq!(user.last_name, "Dupont");
        assert_eq!(user.nick_name.as_deref(), Some("Jojo"));
        assert_eq!(user.credit, 1000);
    }

    #[test]
    fn members_get_a_ten_percent_registration_bonus() {
        let mut store = MemoryStore::default();
        let clock = clock();
        let user = UserService::new(&mut store, &clock)
            .register_user(registration(true))
            .unwrap();
        assert_eq!(user.credit, 1100);
    }

    #[test]
    fn non_positive_registration_credit_is_rejected() {
        let mut store = MemoryStore::default();
        let clock = clock();
        let mut cmd = registration(false);
        cmd.credit = 0;
        let result = UserService::new(&mut store, &clock).register_user(cmd);
        assert_eq!(result.unwrap_err(), DomainError::InvalidCredit(0));
    }

    #[test]
    fn duplicate_name_and_section_conflicts() {
        let mut store = MemoryStore::default();
        let clock = clock();
        UserService::new(&mut store, &clock)
            .register_user(registration(false))
            .unwrap();
        let result = UserService::new(&mut store, &clock).register_user(registration(false));
        assert!(matches!(
            result.unwrap_err(),
            DomainError::DuplicateUser { .. }
        ));
    }

    #[test]
    fn profile_update_normalizes_names_and_keeps_credit() {
        let mut store = MemoryStore::default();
        let clock = clock();
        let user = UserService::new(&mut store, &clock)
            .register_user(registration(true))
            .unwrap();

        let updated = UserService::new(&mut store, &clock)
            .update_user(
                user.id,
                UpdateUser {
                    first_name: "  jEAN-pierre ".to_string(),
                    last_name: "DURAND".to_string(),
                    nick_name: None,
                    section: "MECA".to_string(),
                    is_membership: None,
                },
            )
            .unwrap();

        assert_eq!(updated.first_name, "Jean-pierre");
        assert_eq!(updated.last_name, "Durand");
        assert_eq!(updated.nick_name, None);
        assert_eq!(updated.section, "MECA");
        // Membership untouched when the request leaves it out.
        assert!(updated.is_membership);
        assert_eq!(updated.credit, 1100);
        assert_eq!(store.find_user(user.id).unwrap().unwrap(), updated);
    }

    #[test]
    fn profile_update_can_revoke_membership() {
        let mut store = MemoryStore::default();
        let clock = clock();
        let user = UserService::new(&mut store, &clock)
            .register_user(registration(true))
            .unwrap();

        let updated = UserService::new(&mut store, &clock)
            .update_user(
                user.id,
                UpdateUser {
                    first_name: user.first_name.clone(),
                    last_name: user.last_name.clone(),
                    nick_name: user.nick_name.clone(),
                    section: user.section.clone(),
                    is_membership: Some(false),
                },
            )
            .unwrap();
        assert!(!updated.is_membership);

        // No more bonus on the next top-up.
        let credited = UserService::new(&mut store, &clock)
            .credit_user(user.id, 500)
            .unwrap();
        assert_eq!(credited.credit, 1600);
    }

    #[test]
    fn profile_update_of_unknown_user_fails() {
        let mut store = MemoryStore::default();
        let clock = clock();
        let ghost = Uuid::new_v4();
        let result = UserService::new(&mut store, &clock).update_user(
            ghost,
            UpdateUser {
                first_name: "a".to_string(),
                last_name: "b".to_string(),
                nick_name: None,
                section: "INFO".to_string(),
                is_membership: None,
            },
        );
        assert_eq!(result.unwrap_err(), DomainError::UserNotFound(ghost));
    }

    #[test]
    fn top_up_applies_membership_bonus() {
        let mut store = MemoryStore::default();
        let clock = clock();
        let user = UserService::new(&mut store, &clock)
            .register_user(registration(true))
            .unwrap();

        let updated = UserService::new(&mut store, &clock)
            .credit_user(user.id, 500)
            .unwrap();
        // 1100 registered + 500 + 50 bonus.
        assert_eq!(updated.credit, 1650);
    }

    #[test]
    fn top_up_rejects_non_positive_amounts() {
        let mut store = MemoryStore::default();
        let clock = clock();
        let user = UserService::new(&mut store, &clock)
            .register_user(registration(false))
            .unwrap();
        let result = UserService::new(&mut store, &clock).credit_user(user.id, -5);
        assert_eq!(result.unwrap_err(), DomainError::InvalidCredit(-5));
    }

    #[test]
    fn delete_requires_an_admin_actor() {
        let mut store = MemoryStore::default();
        let clock = clock();
        let user = UserService::new(&mut store, &clock)
            .register_user(registration(false))
            .unwrap();

        let actor = Actor {
            id: Uuid::new_v4(),
            is_admin: false,
        };
        let result = UserService::new(&mut store, &clock).delete_user(actor, user.id);
        assert_eq!(result.unwrap_err(), DomainError::Forbidden);
        assert!(store.find_user(user.id).unwrap().is_some());
    }

    #[test]
    fn delete_cascades_items_then_orders_then_user() {
        let mut store = MemoryStore::default();
        let clock = clock();
        let user = UserService::new(&mut store, &clock)
            .register_user(registration(false))
            .unwrap();

        let product_id = Uuid::new_v4();
        store
            .insert_product(&Product {
                id: product_id,
                name: "dish".to_string(),
                price: 300,
                category: Category::Food,
                ingredients: vec![Ingredient {
                    id: Uuid::new_v4(),
                    product_id,
                    name: "base".to_string(),
                    quantity: 5,
                }],
            })
            .unwrap();

        let details = OrderService::new(&mut store, &clock)
            .create_order(CreateOrder {
                client_name: None,
                user_id: Some(user.id),
                items: vec![product_id],
            })
            .unwrap();

        let actor = Actor {
            id: Uuid::new_v4(),
            is_admin: true,
        };
        UserService::new(&mut store, &clock)
            .delete_user(actor, user.id)
            .unwrap();

        assert!(store.find_user(user.id).unwrap().is_none());
        assert!(store.find_order(details.order.id).unwrap().is_none());
        assert!(store
            .find_order_item(details.items[0].id)
            .unwrap()
            .is_none());
    }
}
