//! Demo data and staff account provisioning.
//!
//! # Invariants
//! - Seeding is idempotent: existing users, stores and items are left alone.
//! - All rows of one run are written in a single transaction.

use crate::model::item::NewItem;
use crate::model::money::MAX_CENTS_EXCLUSIVE;
use crate::model::store::{NewStore, StoreType};
use crate::model::user::{NewUser, User};
use crate::password::hash_password;
use crate::repo::item_repo::{ItemRepository, SqliteItemRepository};
use crate::repo::store_repo::{SqliteStoreRepository, StoreRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::{RepoError, RepoResult};
use log::info;
use rusqlite::Connection;

pub const BASE_STORE_NAME: &str = "Base Test Store";

struct DemoUser {
    username: &'static str,
    email: &'static str,
    password: &'static str,
    first_name: &'static str,
    last_name: &'static str,
}

const DEMO_USERS: [DemoUser; 2] = [
    DemoUser {
        username: "basetestuser1",
        email: "testuser@gmail.com",
        password: "testuser",
        first_name: "Test",
        last_name: "User",
    },
    DemoUser {
        username: "basetestuser2",
        email: "testuser2@gmail.com",
        password: "testuser2",
        first_name: "Tester",
        last_name: "User",
    },
];

/// How much bulk catalogue data `populate` adds next to the base store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulateOptions {
    pub stores: u32,
    pub items_per_store: u32,
}

impl Default for PopulateOptions {
    fn default() -> Self {
        Self {
            stores: 100,
            items_per_store: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateReport {
    pub users_created: u32,
    pub stores_created: u32,
    pub items_created: u32,
}

/// Seeds the two demo users, the base store and the bulk catalogue.
///
/// Bulk stores alternate between the two users; every item belongs to the
/// first user.
pub fn populate(conn: &mut Connection, options: PopulateOptions) -> RepoResult<PopulateReport> {
    let tx = conn.transaction()?;
    let mut report = PopulateReport::default();

    let users = SqliteUserRepository::new(&tx);
    let stores = SqliteStoreRepository::new(&tx);
    let items = SqliteItemRepository::new(&tx);

    let mut owners = Vec::with_capacity(DEMO_USERS.len());
    for demo in &DEMO_USERS {
        let (user, created) = ensure_user(&users, demo)?;
        report.users_created += u32::from(created);
        owners.push(user);
    }
    let [first, second] = owners.as_slice() else {
        return Err(RepoError::InvalidData("demo users were not seeded".to_string()));
    };

    if !stores.name_exists(BASE_STORE_NAME)? {
        stores.create_store(&NewStore {
            name: BASE_STORE_NAME.to_string(),
            store_type: StoreType::Both,
            description: "This is a test store.".to_string(),
            user_id: first.id,
        })?;
        report.stores_created += 1;
    }

    for index in 1..=options.stores {
        let name = format!("{BASE_STORE_NAME} - {index}");
        let owner = if index % 2 == 1 { first } else { second };
        let store = match stores.find_store_by_name(&name)? {
            Some(store) => store,
            None => {
                report.stores_created += 1;
                stores.create_store(&NewStore {
                    name: name.clone(),
                    store_type: StoreType::Both,
                    description: format!("This is a test store. {index}"),
                    user_id: owner.id,
                })?
            }
        };

        for item_index in 1..=options.items_per_store {
            let item_name = format!("Item {item_index}");
            if items.item_exists(&item_name, store.id, None)? {
                continue;
            }
            items.create_item(&NewItem {
                name: item_name,
                description: format!("Description {item_index} - Store {}", store.name),
                price_cents: demo_price_cents(item_index),
                store_id: store.id,
                user_id: first.id,
            })?;
            report.items_created += 1;
        }
    }

    tx.commit()?;
    info!(
        "event=seed_populate module=seed status=ok users={} stores={} items={}",
        report.users_created, report.stores_created, report.items_created
    );
    Ok(report)
}

/// Item `n` costs `n * 100.00`, wrapping inside the storable price range.
fn demo_price_cents(item_index: u32) -> i64 {
    (i64::from(item_index) * 10_000) % MAX_CENTS_EXCLUSIVE
}

/// Creates a staff account that can use the admin endpoints.
pub fn create_staff(
    conn: &Connection,
    username: &str,
    email: &str,
    password: &str,
) -> RepoResult<User> {
    let user = SqliteUserRepository::new(conn).create_user(&NewUser {
        username: username.to_string(),
        email: email.to_string(),
        first_name: String::new(),
        last_name: String::new(),
        password_hash: hash_password(password),
        is_staff: true,
    })?;
    info!("event=seed_create_staff module=seed status=ok user_id={}", user.id);
    Ok(user)
}

fn ensure_user(users: &SqliteUserRepository<'_>, demo: &DemoUser) -> RepoResult<(User, bool)> {
    if let Some((user, _)) = users.find_credentials(demo.username)? {
        return Ok((user, false));
    }
    let user = users.create_user(&NewUser {
        username: demo.username.to_string(),
        email: demo.email.to_string(),
        first_name: demo.first_name.to_string(),
        last_name: demo.last_name.to_string(),
        password_hash: hash_password(demo.password),
        is_staff: false,
    })?;
    Ok((user, true))
}

#[cfg(test)]
mod tests {
    use super::demo_price_cents;

    #[test]
    fn demo_prices_stay_storable_for_large_catalogues() {
        assert_eq!(demo_price_cents(1), 10_000);
        assert_eq!(demo_price_cents(999_999), 9_999_990_000);
        assert_eq!(demo_price_cents(1_000_000), 0);
        assert_eq!(demo_price_cents(1_000_001), 10_000);
        assert!(demo_price_cents(u32::MAX) < 10_000_000_000);
    }
}
