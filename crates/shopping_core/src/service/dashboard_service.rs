//! Dashboard read models: current list overview, recent items and the
//! monthly spend history.

use crate::model::money::{cents_to_f64, round2};
use crate::model::shopping_list::budget_remaining_cents;
use crate::model::user::UserId;
use crate::repo::budget_repo::BudgetRepository;
use crate::repo::item_repo::ItemRepository;
use crate::repo::list_repo::ShoppingListRepository;
use crate::repo::RepoResult;
use crate::schema::output::{
    BarChartDataset, DashboardCurrentSchema, DashboardHistorySchema, DashboardRecentSchema,
    ItemSchema,
};
use chrono::{Datelike, NaiveDate};

pub const RECENT_ITEMS_LIMIT: u32 = 5;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub struct DashboardService<L, B, I>
where
    L: ShoppingListRepository,
    B: BudgetRepository,
    I: ItemRepository,
{
    lists: L,
    budgets: B,
    items: I,
}

impl<L, B, I> DashboardService<L, B, I>
where
    L: ShoppingListRepository,
    B: BudgetRepository,
    I: ItemRepository,
{
    pub fn new(lists: L, budgets: B, items: I) -> Self {
        Self {
            lists,
            budgets,
            items,
        }
    }

    /// Totals for the user's current list; every field is `None` without one.
    pub fn overview(&self, user_id: UserId, today: NaiveDate) -> RepoResult<DashboardCurrentSchema> {
        let Some(list) = self.lists.get_current(user_id, today)? else {
            return Ok(DashboardCurrentSchema::default());
        };

        let total = self.lists.number_of_items(list.id)?;
        let total_cents = self.lists.total_price_cents(list.id)?;
        let budget_cents = self.budgets.total_budget_cents(list.id)?;
        let average_item_price = if total == 0 {
            0.0
        } else {
            round2(cents_to_f64(total_cents) / total as f64)
        };

        Ok(DashboardCurrentSchema {
            total: Some(total),
            total_price: Some(cents_to_f64(total_cents)),
            budget_remaining: Some(cents_to_f64(budget_remaining_cents(
                budget_cents,
                total_cents,
            ))),
            average_item_price: Some(average_item_price),
        })
    }

    pub fn recent_items(&self, user_id: UserId) -> RepoResult<DashboardRecentSchema> {
        let items = self.items.recent_items(user_id, RECENT_ITEMS_LIMIT)?;
        Ok(DashboardRecentSchema {
            recent_items: items.iter().map(ItemSchema::from).collect(),
        })
    }

    /// Spend and budget per month, January through the month of `today`.
    ///
    /// Lists count toward the month of their end date, and only when they
    /// were created this year and end no later than the current month.
    pub fn history(&self, user_id: UserId, today: NaiveDate) -> RepoResult<DashboardHistorySchema> {
        let months = today.month0() as usize + 1;
        let mut price_cents = vec![0_i64; months];
        let mut budget_cents = vec![0_i64; months];

        let mut counted = Vec::new();
        for list in self.lists.lists_created_in_year(user_id, today.year())? {
            let Some(slot) = month_slot(list.end_date, today) else {
                continue;
            };
            price_cents[slot] = price_cents[slot].saturating_add(self.lists.total_price_cents(list.id)?);
            counted.push(list.id);
        }
        for (budget, end_date) in self.budgets.budgets_for_lists(&counted)? {
            if let Some(slot) = month_slot(end_date, today) {
                budget_cents[slot] = budget_cents[slot].saturating_add(budget.amount_cents);
            }
        }

        Ok(DashboardHistorySchema {
            labels: MONTH_NAMES[..months]
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            datasets: vec![
                BarChartDataset {
                    label: "Price".to_string(),
                    data: price_cents.into_iter().map(cents_to_f64).collect(),
                },
                BarChartDataset {
                    label: "Budget".to_string(),
                    data: budget_cents.into_iter().map(cents_to_f64).collect(),
                },
            ],
        })
    }
}

/// Zero-based month index of `date` when it lies in the year of `today`
/// no later than its month.
fn month_slot(date: NaiveDate, today: NaiveDate) -> Option<usize> {
    (date.year() == today.year() && date.month() <= today.month()).then(|| date.month0() as usize)
}

#[cfg(test)]
mod tests {
    use super::month_slot;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_slot_skips_future_and_other_years() {
        let today = date(2024, 4, 15);
        assert_eq!(month_slot(date(2024, 1, 31), today), Some(0));
        assert_eq!(month_slot(date(2024, 4, 30), today), Some(3));
        assert_eq!(month_slot(date(2024, 5, 1), today), None);
        assert_eq!(month_slot(date(2025, 1, 1), today), None);
        assert_eq!(month_slot(date(2023, 12, 31), today), None);
    }
}
