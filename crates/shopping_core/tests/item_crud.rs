use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use shopping_core::db::open_db_in_memory;
use shopping_core::model::clock::day_start_ms;
use shopping_core::model::item::{ItemPatch, NewItem};
use shopping_core::model::money::MAX_CENTS_EXCLUSIVE;
use shopping_core::model::shopping_list::NewShoppingList;
use shopping_core::model::store::{NewStore, Store, StoreType};
use shopping_core::model::user::{NewUser, User};
use shopping_core::model::validation::ValidationError;
use shopping_core::repo::item_repo::{ItemRepository, SqliteItemRepository};
use shopping_core::repo::RepoError;
use shopping_core::repo::list_repo::{ShoppingListRepository, SqliteShoppingListRepository};
use shopping_core::repo::store_repo::{SqliteStoreRepository, StoreRepository};
use shopping_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use shopping_core::schema::input::{ItemSearch, NewItemInput, UpdateItem};
use shopping_core::service::item_service::{ItemService, ItemServiceError};
use shopping_core::PageRequest;

type SqliteItemService<'conn> = ItemService<
    SqliteItemRepository<'conn>,
    SqliteStoreRepository<'conn>,
    SqliteShoppingListRepository<'conn>,
>;

fn item_service(conn: &Connection) -> SqliteItemService<'_> {
    ItemService::new(
        SqliteItemRepository::new(conn),
        SqliteStoreRepository::new(conn),
        SqliteShoppingListRepository::new(conn),
    )
}

fn user(conn: &Connection, username: &str) -> User {
    SqliteUserRepository::new(conn)
        .create_user(&NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: "unused".to_string(),
            is_staff: false,
        })
        .unwrap()
}

fn store(conn: &Connection, name: &str, owner: &User) -> Store {
    SqliteStoreRepository::new(conn)
        .create_store(&NewStore {
            name: name.to_string(),
            store_type: StoreType::Both,
            description: String::new(),
            user_id: owner.id,
        })
        .unwrap()
}

fn price(text: &str) -> Decimal {
    text.parse().unwrap()
}

fn new_item(store: &Store, name: &str, amount: &str) -> NewItemInput {
    NewItemInput {
        store_id: store.id,
        name: name.to_string(),
        price: price(amount),
        description: format!("{name} description"),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn create_item_and_read_detail_with_list_count() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let shop = store(&conn, "Corner Shop", &owner);
    let service = item_service(&conn);

    let created = service
        .create_item(&owner, &new_item(&shop, "Milk", "1.99"))
        .unwrap();
    assert_eq!(created.price, price("1.99"));
    assert_eq!(created.store.as_ref().unwrap().name, "Corner Shop");
    assert_eq!(created.user.as_ref().unwrap().username, "owner");
    assert_eq!(created.list_count, None);

    let lists = SqliteShoppingListRepository::new(&conn);
    for name in ["Weekly", "Party"] {
        let list = lists
            .create_list(&NewShoppingList {
                name: name.to_string(),
                description: String::new(),
                start_date: date(2024, 1, 1),
                end_date: date(2024, 1, 7),
                user_id: owner.id,
            })
            .unwrap();
        lists.set_item_quantity(list.id, created.id, 2).unwrap();
    }

    let detail = service.get_item_detail(created.id).unwrap();
    assert_eq!(detail.list_count, Some(2));

    let err = service.get_item_detail(404).unwrap_err();
    assert_eq!(err.to_string(), "Item with id '404' does not exist.");
}

#[test]
fn create_item_rejects_duplicates_missing_stores_and_bad_prices() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let shop = store(&conn, "Corner Shop", &owner);
    let other_shop = store(&conn, "Other Shop", &owner);
    let service = item_service(&conn);
    service
        .create_item(&owner, &new_item(&shop, "Milk", "1.99"))
        .unwrap();

    let err = service
        .create_item(&owner, &new_item(&shop, "Milk", "2.49"))
        .unwrap_err();
    assert_eq!(err.to_string(), "Item ('Milk') already exists @ 'Corner Shop'.");

    // The same name is fine in another store.
    service
        .create_item(&owner, &new_item(&other_shop, "Milk", "2.49"))
        .unwrap();

    let mut missing_store = new_item(&shop, "Bread", "3.00");
    missing_store.store_id = 777;
    let err = service.create_item(&owner, &missing_store).unwrap_err();
    assert!(matches!(err, ItemServiceError::StoreNotFound(777)));

    let err = service
        .create_item(&owner, &new_item(&shop, "Bread", "-1.00"))
        .unwrap_err();
    assert!(matches!(err, ItemServiceError::Validation(_)));

    let err = service
        .create_item(&owner, &new_item(&shop, "Bread", "1.999"))
        .unwrap_err();
    assert!(matches!(err, ItemServiceError::Validation(_)));
}

#[test]
fn repository_writes_cap_raw_cent_prices() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let shop = store(&conn, "Corner Shop", &owner);
    let items = SqliteItemRepository::new(&conn);
    let new_item = |price_cents| NewItem {
        name: "Gold".to_string(),
        description: String::new(),
        price_cents,
        store_id: shop.id,
        user_id: owner.id,
    };

    let err = items.create_item(&new_item(MAX_CENTS_EXCLUSIVE)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::AmountTooLarge { field: "price" })
    ));

    let gold = items.create_item(&new_item(MAX_CENTS_EXCLUSIVE - 1)).unwrap();
    assert_eq!(gold.price_cents, 9_999_999_999);

    let err = items
        .update_item(
            gold.id,
            owner.id,
            &ItemPatch {
                price_cents: Some(i64::MAX),
                ..ItemPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::AmountTooLarge { field: "price" })
    ));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM items;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn update_item_ignores_blank_text_and_checks_clashes() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let stranger = user(&conn, "stranger");
    let shop = store(&conn, "Corner Shop", &owner);
    let other_shop = store(&conn, "Other Shop", &owner);
    let service = item_service(&conn);
    let milk = service
        .create_item(&owner, &new_item(&shop, "Milk", "1.99"))
        .unwrap();
    service
        .create_item(&owner, &new_item(&other_shop, "Milk", "2.10"))
        .unwrap();

    let updated = service
        .update_item(
            milk.id,
            &owner,
            &UpdateItem {
                name: Some(String::new()),
                description: Some(String::new()),
                price: Some(price("0")),
                store_id: None,
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Milk");
    assert_eq!(updated.description, "Milk description");
    assert_eq!(updated.price, Decimal::ZERO);

    let err = service
        .update_item(
            milk.id,
            &owner,
            &UpdateItem {
                store_id: Some(other_shop.id),
                ..UpdateItem::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ItemServiceError::ItemExists { .. }));

    let moved = service
        .update_item(
            milk.id,
            &owner,
            &UpdateItem {
                store_id: Some(other_shop.id),
                name: Some("Oat Milk".to_string()),
                ..UpdateItem::default()
            },
        )
        .unwrap();
    assert_eq!(moved.name, "Oat Milk");
    assert_eq!(moved.store.as_ref().unwrap().id, other_shop.id);

    let err = service
        .update_item(
            milk.id,
            &owner,
            &UpdateItem {
                store_id: Some(999),
                ..UpdateItem::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ItemServiceError::StoreNotFound(999)));

    let err = service
        .update_item(
            milk.id,
            &stranger,
            &UpdateItem {
                name: Some("Stolen".to_string()),
                ..UpdateItem::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ItemServiceError::ItemNotFound(id) if id == milk.id));
}

#[test]
fn delete_item_is_owner_scoped() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let stranger = user(&conn, "stranger");
    let shop = store(&conn, "Corner Shop", &owner);
    let service = item_service(&conn);
    let milk = service
        .create_item(&owner, &new_item(&shop, "Milk", "1.99"))
        .unwrap();

    assert!(matches!(
        service.delete_item(milk.id, &stranger),
        Err(ItemServiceError::ItemNotFound(_))
    ));

    let message = service.delete_item(milk.id, &owner).unwrap();
    assert_eq!(message.message, "Deleted Item.");
    assert_eq!(message.detail, format!("Item with ID #{} was deleted.", milk.id));
    assert!(matches!(
        service.get_item_detail(milk.id),
        Err(ItemServiceError::ItemNotFound(_))
    ));
}

#[test]
fn aggregate_reports_price_statistics() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let other = user(&conn, "other");
    let shop = store(&conn, "Corner Shop", &owner);
    let service = item_service(&conn);

    let empty = service.aggregate(Some(owner.id)).unwrap();
    assert_eq!(empty.total_items, Some(0));
    assert_eq!(empty.total_price, None);
    assert_eq!(empty.average_price, None);

    for (name, amount) in [("A", "1.00"), ("B", "2.00"), ("C", "4.00")] {
        service
            .create_item(&owner, &new_item(&shop, name, amount))
            .unwrap();
    }
    service
        .create_item(&other, &new_item(&shop, "D", "100.00"))
        .unwrap();

    let mine = service.aggregate(Some(owner.id)).unwrap();
    assert_eq!(mine.total_items, Some(3));
    assert_eq!(mine.total_price, Some(7.0));
    assert_eq!(mine.average_price, Some(2.33));
    assert_eq!(mine.max_price, Some(4.0));
    assert_eq!(mine.min_price, Some(1.0));

    let all = service.aggregate(None).unwrap();
    assert_eq!(all.total_items, Some(4));
}

#[test]
fn search_items_combines_price_and_strict_date_filters() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let shop = store(&conn, "Corner Shop", &owner);
    let other_shop = store(&conn, "Other Shop", &owner);
    let service = item_service(&conn);
    let cheap = service
        .create_item(&owner, &new_item(&shop, "Cheap Apple", "0.50"))
        .unwrap();
    let mid = service
        .create_item(&owner, &new_item(&shop, "Apple Pie", "5.00"))
        .unwrap();
    let pricey = service
        .create_item(&owner, &new_item(&other_shop, "Apple Juice", "9.99"))
        .unwrap();
    for (id, day) in [
        (cheap.id, date(2024, 5, 1)),
        (mid.id, date(2024, 5, 2)),
        (pricey.id, date(2024, 5, 3)),
    ] {
        conn.execute(
            "UPDATE items SET created_at = ?2, updated_at = ?2 WHERE id = ?1;",
            params![id, day_start_ms(day) + 3_600_000],
        )
        .unwrap();
    }

    let in_shop = service
        .search_items(
            None,
            PageRequest::default(),
            Some("apple"),
            Some(shop.id),
            &ItemSearch::default(),
        )
        .unwrap();
    assert_eq!(in_shop.pagination.total, 2);

    let band = service
        .search_items(
            Some(owner.id),
            PageRequest::default(),
            None,
            None,
            &ItemSearch {
                price_is_gt: Some(price("0.50")),
                price_is_lt: Some(price("9.99")),
                ..ItemSearch::default()
            },
        )
        .unwrap();
    let ids: Vec<i64> = band.items.iter().map(|item| item.id).collect();
    assert_eq!(ids, [mid.id]);

    let exact = service
        .search_items(
            None,
            PageRequest::default(),
            None,
            None,
            &ItemSearch {
                price: Some(price("9.99")),
                ..ItemSearch::default()
            },
        )
        .unwrap();
    assert_eq!(exact.items.len(), 1);
    assert_eq!(exact.items[0].id, pricey.id);

    // Strict bounds: neither boundary day is included.
    let between = service
        .search_items(
            None,
            PageRequest::default(),
            None,
            None,
            &ItemSearch {
                created_after: Some(date(2024, 5, 1)),
                created_before: Some(date(2024, 5, 3)),
                ..ItemSearch::default()
            },
        )
        .unwrap();
    let ids: Vec<i64> = between.items.iter().map(|item| item.id).collect();
    assert_eq!(ids, [mid.id]);

    let on_day = service
        .search_items(
            None,
            PageRequest::default(),
            None,
            None,
            &ItemSearch {
                updated_on: Some(date(2024, 5, 3)),
                description: Some("juice".to_string()),
                ..ItemSearch::default()
            },
        )
        .unwrap();
    assert_eq!(on_day.items.len(), 1);

    let err = service
        .search_items(
            None,
            PageRequest::default(),
            None,
            Some(4242),
            &ItemSearch::default(),
        )
        .unwrap_err();
    assert!(matches!(err, ItemServiceError::StoreNotFound(4242)));
}

#[test]
fn items_page_is_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let shop = store(&conn, "Corner Shop", &owner);
    let service = item_service(&conn);
    for index in 1..=3 {
        service
            .create_item(&owner, &new_item(&shop, &format!("Item {index}"), "1.00"))
            .unwrap();
    }
    conn.execute("UPDATE items SET updated_at = 5;", []).unwrap();

    let page = service
        .get_items(PageRequest::new(1, 10), Some(owner.id))
        .unwrap();
    let names: Vec<&str> = page.items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, ["Item 3", "Item 2", "Item 1"]);
}
