use chrono::NaiveDate;
use rusqlite::{params, Connection};
use shopping_core::db::open_db_in_memory;
use shopping_core::model::clock::day_start_ms;
use shopping_core::model::item::{Item, NewItem};
use shopping_core::model::shopping_list::{NewShoppingList, ShoppingList};
use shopping_core::model::store::{NewStore, Store, StoreType};
use shopping_core::model::user::{NewUser, User};
use shopping_core::repo::budget_repo::{BudgetRepository, SqliteBudgetRepository};
use shopping_core::repo::item_repo::{ItemRepository, SqliteItemRepository};
use shopping_core::repo::list_repo::{ShoppingListRepository, SqliteShoppingListRepository};
use shopping_core::repo::store_repo::{SqliteStoreRepository, StoreRepository};
use shopping_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use shopping_core::service::dashboard_service::DashboardService;

type SqliteDashboard<'conn> = DashboardService<
    SqliteShoppingListRepository<'conn>,
    SqliteBudgetRepository<'conn>,
    SqliteItemRepository<'conn>,
>;

fn dashboard(conn: &Connection) -> SqliteDashboard<'_> {
    DashboardService::new(
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

fn store(conn: &Connection, owner: &User) -> Store {
    SqliteStoreRepository::new(conn)
        .create_store(&NewStore {
            name: format!("{} Shop", owner.username),
            store_type: StoreType::Both,
            description: String::new(),
            user_id: owner.id,
        })
        .unwrap()
}

fn item(conn: &Connection, owner: &User, store: &Store, name: &str, cents: i64) -> Item {
    SqliteItemRepository::new(conn)
        .create_item(&NewItem {
            name: name.to_string(),
            description: String::new(),
            price_cents: cents,
            store_id: store.id,
            user_id: owner.id,
        })
        .unwrap()
}

/// Creates a list and backdates its creation to `created`.
fn list(
    conn: &Connection,
    owner: &User,
    start: NaiveDate,
    end: NaiveDate,
    created: NaiveDate,
) -> ShoppingList {
    let list = SqliteShoppingListRepository::new(conn)
        .create_list(&NewShoppingList {
            name: format!("List ending {end}"),
            description: String::new(),
            start_date: start,
            end_date: end,
            user_id: owner.id,
        })
        .unwrap();
    conn.execute(
        "UPDATE shopping_lists SET created_at = ?2, updated_at = ?2 WHERE id = ?1;",
        params![list.id, day_start_ms(created)],
    )
    .unwrap();
    list
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn overview_without_current_list_is_all_null() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    list(
        &conn,
        &owner,
        date(2024, 1, 1),
        date(2024, 1, 7),
        date(2024, 1, 1),
    );

    let overview = dashboard(&conn)
        .overview(owner.id, date(2024, 2, 1))
        .unwrap();
    assert_eq!(overview.total, None);
    assert_eq!(overview.total_price, None);
    assert_eq!(overview.budget_remaining, None);
    assert_eq!(overview.average_item_price, None);
}

#[test]
fn overview_summarises_the_first_current_list() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let shop = store(&conn, &owner);
    let milk = item(&conn, &owner, &shop, "Milk", 199);
    let bread = item(&conn, &owner, &shop, "Bread", 350);
    let today = date(2024, 6, 5);
    let lists = SqliteShoppingListRepository::new(&conn);

    let first = list(&conn, &owner, date(2024, 6, 1), date(2024, 6, 30), today);
    let second = list(&conn, &owner, date(2024, 6, 4), date(2024, 6, 6), today);
    lists.set_item_quantity(first.id, milk.id, 2).unwrap();
    lists.set_item_quantity(first.id, bread.id, 1).unwrap();
    lists.set_item_quantity(second.id, bread.id, 10).unwrap();
    SqliteBudgetRepository::new(&conn)
        .set_budget(first.id, owner.id, 1_000)
        .unwrap();

    let overview = dashboard(&conn).overview(owner.id, today).unwrap();
    assert_eq!(overview.total, Some(3));
    assert_eq!(overview.total_price, Some(7.48));
    assert_eq!(overview.budget_remaining, Some(2.52));
    assert_eq!(overview.average_item_price, Some(2.49));
}

#[test]
fn overview_of_an_empty_current_list_reports_zeroes() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let today = date(2024, 6, 5);
    list(&conn, &owner, today, today, today);

    let overview = dashboard(&conn).overview(owner.id, today).unwrap();
    assert_eq!(overview.total, Some(0));
    assert_eq!(overview.total_price, Some(0.0));
    assert_eq!(overview.budget_remaining, Some(0.0));
    assert_eq!(overview.average_item_price, Some(0.0));
}

#[test]
fn recent_items_are_the_users_five_latest() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let other = user(&conn, "other");
    let shop = store(&conn, &owner);
    for index in 1..=7 {
        item(&conn, &owner, &shop, &format!("Item {index}"), 100);
    }
    item(&conn, &other, &shop, "Foreign", 100);
    conn.execute("UPDATE items SET updated_at = id;", []).unwrap();

    let recent = dashboard(&conn).recent_items(owner.id).unwrap();
    let names: Vec<&str> = recent
        .recent_items
        .iter()
        .map(|item| item.name.as_str())
        .collect();
    assert_eq!(names, ["Item 7", "Item 6", "Item 5", "Item 4", "Item 3"]);
}

#[test]
fn history_buckets_spend_and_budget_by_end_month() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner");
    let shop = store(&conn, &owner);
    let milk = item(&conn, &owner, &shop, "Milk", 250);
    let lists = SqliteShoppingListRepository::new(&conn);
    let budgets = SqliteBudgetRepository::new(&conn);
    let today = date(2024, 3, 15);

    let january = list(&conn, &owner, date(2024, 1, 2), date(2024, 1, 9), date(2024, 1, 2));
    let march = list(&conn, &owner, date(2024, 3, 1), date(2024, 3, 31), date(2024, 2, 20));
    let future = list(&conn, &owner, date(2024, 4, 1), date(2024, 4, 30), date(2024, 3, 1));
    let last_year = list(&conn, &owner, date(2024, 1, 1), date(2024, 1, 31), date(2023, 12, 30));
    for (list_id, quantity, budget_cents) in [
        (january.id, 2, 1_000),
        (march.id, 4, 2_000),
        (future.id, 1, 9_900),
        (last_year.id, 8, 9_900),
    ] {
        lists.set_item_quantity(list_id, milk.id, quantity).unwrap();
        budgets.set_budget(list_id, owner.id, budget_cents).unwrap();
    }

    let history = dashboard(&conn).history(owner.id, today).unwrap();
    assert_eq!(history.labels, ["January", "February", "March"]);
    assert_eq!(history.datasets.len(), 2);
    assert_eq!(history.datasets[0].label, "Price");
    assert_eq!(history.datasets[0].data, [5.0, 0.0, 10.0]);
    assert_eq!(history.datasets[1].label, "Budget");
    assert_eq!(history.datasets[1].data, [10.0, 0.0, 20.0]);
}
