use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use shopping_core::db::open_db_in_memory;
use shopping_core::model::item::{Item, NewItem};
use shopping_core::model::store::{NewStore, StoreType};
use shopping_core::model::user::{NewUser, User};
use shopping_core::model::validation::ValidationError;
use shopping_core::repo::budget_repo::SqliteBudgetRepository;
use shopping_core::repo::item_repo::{ItemRepository, SqliteItemRepository};
use shopping_core::repo::list_repo::SqliteShoppingListRepository;
use shopping_core::repo::store_repo::{SqliteStoreRepository, StoreRepository};
use shopping_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use shopping_core::schema::input::{BudgetInput, ItemQuantityInput, NewShoppingListInput};
use shopping_core::service::list_service::{ListServiceError, ShoppingListService};
use shopping_core::PageRequest;

type SqliteListService<'conn> = ShoppingListService<
    SqliteShoppingListRepository<'conn>,
    SqliteBudgetRepository<'conn>,
    SqliteItemRepository<'conn>,
>;

fn list_service(conn: &Connection) -> SqliteListService<'_> {
    ShoppingListService::new(
        SqliteShoppingListRepository::new(conn),
        SqliteBudgetRepository::new(conn),
        SqliteItemRepository::new(conn),
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

/// Creates a store with one item per `(name, cents)` pair.
fn catalogue(conn: &Connection, owner: &User, prices: &[(&str, i64)]) -> Vec<Item> {
    let store = SqliteStoreRepository::new(conn)
        .create_store(&NewStore {
            name: "Corner Shop".to_string(),
            store_type: StoreType::InStore,
            description: String::new(),
            user_id: owner.id,
        })
        .unwrap();
    let items = SqliteItemRepository::new(conn);
    prices
        .iter()
        .map(|(name, cents)| {
            items
                .create_item(&NewItem {
                    name: (*name).to_string(),
                    description: String::new(),
                    price_cents: *cents,
                    store_id: store.id,
                    user_id: owner.id,
                })
                .unwrap()
        })
        .collect()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn week_list(name: &str) -> NewShoppingListInput {
    NewShoppingListInput {
        name: name.to_string(),
        description: "groceries".to_string(),
        start_date: date(2024, 6, 3),
        end_date: date(2024, 6, 9),
    }
}

fn decimal(text: &str) -> Decimal {
    text.parse().unwrap()
}

#[test]
fn create_list_validates_dates_and_reports_current() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let service = list_service(&conn);

    let created = service
        .create_list(&owner, &week_list("Weekly"), date(2024, 6, 9))
        .unwrap();
    assert!(created.is_current);
    assert_eq!(created.start_date, date(2024, 6, 3));

    let later = service
        .get_list_detail(created.id, &owner, date(2024, 6, 10))
        .unwrap();
    assert!(!later.list.is_current);
    assert_eq!(later.total_items, 0);
    assert_eq!(later.budget, Decimal::ZERO);

    let mut reversed = week_list("Backwards");
    reversed.end_date = date(2024, 6, 1);
    let err = service
        .create_list(&owner, &reversed, date(2024, 6, 3))
        .unwrap_err();
    assert!(matches!(err, ListServiceError::Validation(_)));
}

#[test]
fn quantities_and_budget_drive_the_detail_totals() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let items = catalogue(&conn, &owner, &[("Milk", 199), ("Bread", 350)]);
    let service = list_service(&conn);
    let today = date(2024, 6, 5);
    let list = service
        .create_list(&owner, &week_list("Weekly"), today)
        .unwrap();

    service
        .set_item_quantity(
            list.id,
            &owner,
            &ItemQuantityInput {
                item_id: items[0].id,
                quantity: 1,
            },
            today,
        )
        .unwrap();
    // Setting again replaces the quantity instead of adding a second line.
    service
        .set_item_quantity(
            list.id,
            &owner,
            &ItemQuantityInput {
                item_id: items[0].id,
                quantity: 3,
            },
            today,
        )
        .unwrap();
    let detail = service
        .set_item_quantity(
            list.id,
            &owner,
            &ItemQuantityInput {
                item_id: items[1].id,
                quantity: 2,
            },
            today,
        )
        .unwrap();

    assert_eq!(detail.entries.len(), 2);
    assert_eq!(detail.entries[0].quantity, 3);
    assert_eq!(detail.entries[0].line_total, decimal("5.97"));
    assert_eq!(detail.total_items, 5);
    assert_eq!(detail.total_price, decimal("12.97"));
    assert_eq!(detail.budget_remaining, Decimal::ZERO);

    let budgeted = service
        .set_budget(
            list.id,
            &owner,
            &BudgetInput {
                amount: decimal("20.00"),
            },
            today,
        )
        .unwrap();
    assert_eq!(budgeted.budget, decimal("20.00"));
    assert_eq!(budgeted.budget_remaining, decimal("7.03"));

    let rebudgeted = service
        .set_budget(
            list.id,
            &owner,
            &BudgetInput {
                amount: decimal("10.00"),
            },
            today,
        )
        .unwrap();
    assert_eq!(rebudgeted.budget, decimal("10.00"));
    assert_eq!(rebudgeted.budget_remaining, Decimal::ZERO);

    let removed = service
        .remove_item(list.id, &owner, items[0].id, today)
        .unwrap();
    assert_eq!(removed.entries.len(), 1);
    assert_eq!(removed.total_price, decimal("7.00"));
    assert_eq!(removed.budget_remaining, decimal("3.00"));
}

#[test]
fn invalid_quantities_budgets_and_items_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let items = catalogue(&conn, &owner, &[("Milk", 199)]);
    let service = list_service(&conn);
    let today = date(2024, 6, 5);
    let list = service
        .create_list(&owner, &week_list("Weekly"), today)
        .unwrap();

    let err = service
        .set_item_quantity(
            list.id,
            &owner,
            &ItemQuantityInput {
                item_id: items[0].id,
                quantity: 0,
            },
            today,
        )
        .unwrap_err();
    assert!(matches!(err, ListServiceError::Validation(_)));

    let err = service
        .set_item_quantity(
            list.id,
            &owner,
            &ItemQuantityInput {
                item_id: 999,
                quantity: 1,
            },
            today,
        )
        .unwrap_err();
    assert!(matches!(err, ListServiceError::ItemNotFound(999)));

    let err = service
        .set_budget(
            list.id,
            &owner,
            &BudgetInput {
                amount: decimal("-5"),
            },
            today,
        )
        .unwrap_err();
    assert!(matches!(err, ListServiceError::Validation(_)));

    let err = service
        .remove_item(list.id, &owner, items[0].id, today)
        .unwrap_err();
    assert!(matches!(err, ListServiceError::ItemNotOnList { .. }));
}

#[test]
fn oversized_quantities_are_rejected_before_anything_is_written() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let items = catalogue(&conn, &owner, &[("Gold", 9_999_999_999), ("Milk", 199)]);
    let service = list_service(&conn);
    let today = date(2024, 6, 5);
    let list = service
        .create_list(&owner, &week_list("Weekly"), today)
        .unwrap();
    let set = |item_id: i64, quantity: i64| {
        service.set_item_quantity(list.id, &owner, &ItemQuantityInput { item_id, quantity }, today)
    };

    let err = set(items[0].id, 1_000_000_000_000).unwrap_err();
    assert!(matches!(
        err,
        ListServiceError::Validation(ValidationError::InvalidQuantity(1_000_000_000_000))
    ));

    set(items[1].id, 2).unwrap();
    let err = set(items[0].id, 1_000_000_000).unwrap_err();
    assert!(matches!(err, ListServiceError::Validation(ValidationError::TotalTooLarge)));

    let detail = service.get_list_detail(list.id, &owner, today).unwrap();
    assert_eq!(detail.entries.len(), 1);
    assert_eq!(detail.total_items, 2);
    assert_eq!(detail.total_price, decimal("3.98"));

    let detail = set(items[0].id, 900_000_000).unwrap();
    assert_eq!(detail.total_items, 900_000_002);
    assert_eq!(detail.total_price, decimal("89999999991000003.98"));
}

#[test]
fn lists_are_private_to_their_owner() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let stranger = user(&conn, "stranger");
    let service = list_service(&conn);
    let today = date(2024, 6, 5);
    let list = service
        .create_list(&owner, &week_list("Weekly"), today)
        .unwrap();

    let err = service
        .get_list_detail(list.id, &stranger, today)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("Shopping list with id '{}' does not exist.", list.id)
    );
    assert!(matches!(
        service.delete_list(list.id, &stranger),
        Err(ListServiceError::ListNotFound(_))
    ));
    let others = service
        .get_lists(&stranger, PageRequest::default(), today)
        .unwrap();
    assert_eq!(others.pagination.total, 0);

    let message = service.delete_list(list.id, &owner).unwrap();
    assert_eq!(message.message, "Deleted Shopping List.");
    assert_eq!(
        message.detail,
        format!("Shopping list with ID #{} was deleted.", list.id)
    );
    assert!(matches!(
        service.get_list_detail(list.id, &owner, today),
        Err(ListServiceError::ListNotFound(_))
    ));
}

#[test]
fn get_lists_pages_the_users_lists() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let service = list_service(&conn);
    let today = date(2024, 6, 5);
    for index in 1..=3 {
        service
            .create_list(&owner, &week_list(&format!("List {index}")), today)
            .unwrap();
    }

    let page = service
        .get_lists(&owner, PageRequest::new(2, 2), today)
        .unwrap();
    assert_eq!(page.pagination.total, 3);
    assert_eq!(page.pagination.page_number, 2);
    assert_eq!(page.lists.len(), 1);
    assert!(page.lists.iter().all(|list| list.is_current));
}
