use shopping_core::db::open_db_in_memory;
use shopping_core::password::verify_password;
use shopping_core::repo::item_repo::{ItemFilter, ItemRepository, SqliteItemRepository};
use shopping_core::repo::store_repo::{SqliteStoreRepository, StoreRepository};
use shopping_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use shopping_core::seed::{create_staff, populate, PopulateOptions, BASE_STORE_NAME};
use shopping_core::{PageRequest, StoreType};

const SMALL: PopulateOptions = PopulateOptions {
    stores: 3,
    items_per_store: 2,
};

#[test]
fn populate_seeds_demo_users_and_catalogue() {
    let mut conn = open_db_in_memory().unwrap();

    let report = populate(&mut conn, SMALL).unwrap();
    assert_eq!(report.users_created, 2);
    assert_eq!(report.stores_created, 4);
    assert_eq!(report.items_created, 6);

    let users = SqliteUserRepository::new(&conn);
    let (first, first_hash) = users.find_credentials("basetestuser1").unwrap().unwrap();
    let (second, second_hash) = users.find_credentials("basetestuser2").unwrap().unwrap();
    assert!(verify_password("testuser", &first_hash));
    assert!(verify_password("testuser2", &second_hash));

    let stores = SqliteStoreRepository::new(&conn);
    let base = stores.find_store_by_name(BASE_STORE_NAME).unwrap().unwrap();
    assert_eq!(base.store_type, StoreType::Both);
    assert_eq!(base.user_id, first.id);
    let second_bulk = stores
        .find_store_by_name(&format!("{BASE_STORE_NAME} - 2"))
        .unwrap()
        .unwrap();
    assert_eq!(second_bulk.user_id, second.id);

    let (window, items) = SqliteItemRepository::new(&conn)
        .filter_items(
            &ItemFilter {
                store_id: Some(second_bulk.id),
                ..ItemFilter::default()
            },
            PageRequest::default(),
        )
        .unwrap();
    assert_eq!(window.total, 2);
    assert!(items.iter().all(|item| item.user_id == first.id));
    let mut prices: Vec<i64> = items.iter().map(|item| item.price_cents).collect();
    prices.sort_unstable();
    assert_eq!(prices, [10_000, 20_000]);
}

#[test]
fn populate_twice_adds_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    populate(&mut conn, SMALL).unwrap();

    let again = populate(&mut conn, SMALL).unwrap();
    assert_eq!(again.users_created, 0);
    assert_eq!(again.stores_created, 0);
    assert_eq!(again.items_created, 0);
    assert_eq!(
        SqliteStoreRepository::new(&conn)
            .count_stores(None)
            .unwrap()
            .total,
        4
    );
}

#[test]
fn create_staff_marks_the_account_as_staff() {
    let conn = open_db_in_memory().unwrap();

    let staff = create_staff(&conn, "admin", "admin@example.com", "s3cret").unwrap();
    assert!(staff.is_staff);
    assert!(staff.is_active);

    let (_, hash) = SqliteUserRepository::new(&conn)
        .find_credentials("admin")
        .unwrap()
        .unwrap();
    assert!(verify_password("s3cret", &hash));
    assert!(create_staff(&conn, "admin", "other@example.com", "x").is_err());
}
