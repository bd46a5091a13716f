//! Shopping list use-cases: lists, their item quantities and budgets.
//!
//! # Invariants
//! - Lists are private: every operation is scoped to the owning user and a
//!   foreign list reads as missing.
//! - Detail responses are always recomputed after a mutation.

use crate::model::item::ItemId;
use crate::model::money::{cents_to_decimal, decimal_to_cents};
use crate::model::page::PageRequest;
use crate::model::shopping_list::{budget_remaining_cents, ListId, NewShoppingList, ShoppingList};
use crate::model::user::User;
use crate::model::validation::ValidationError;
use crate::repo::budget_repo::BudgetRepository;
use crate::repo::item_repo::ItemRepository;
use crate::repo::list_repo::ShoppingListRepository;
use crate::repo::RepoError;
use crate::schema::input::{BudgetInput, ItemQuantityInput, NewShoppingListInput};
use crate::schema::output::{
    ListEntrySchema, MessageSchema, ShoppingListDetail, ShoppingListPage, ShoppingListSchema,
};
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ListServiceError {
    ListNotFound(ListId),
    ItemNotFound(ItemId),
    ItemNotOnList { list_id: ListId, item_id: ItemId },
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for ListServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ListNotFound(id) => write!(f, "Shopping list with id '{id}' does not exist."),
            Self::ItemNotFound(id) => write!(f, "Item with id '{id}' does not exist."),
            Self::ItemNotOnList { list_id, item_id } => write!(
                f,
                "Item with id '{item_id}' is not on shopping list '{list_id}'."
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ListServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ListServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound {
                entity: "shopping list",
                id,
            } => Self::ListNotFound(id),
            RepoError::NotFound { entity: "item", id } => Self::ItemNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ListServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

pub struct ShoppingListService<L, B, I>
where
    L: ShoppingListRepository,
    B: BudgetRepository,
    I: ItemRepository,
{
    lists: L,
    budgets: B,
    items: I,
}

impl<L, B, I> ShoppingListService<L, B, I>
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

    pub fn create_list(
        &self,
        user: &User,
        input: &NewShoppingListInput,
        today: NaiveDate,
    ) -> Result<ShoppingListSchema, ListServiceError> {
        let list = self.lists.create_list(&NewShoppingList {
            name: input.name.clone(),
            description: input.description.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
            user_id: user.id,
        })?;
        info!(
            "event=list_create module=lists status=ok list_id={} user_id={}",
            list.id, user.id
        );
        Ok(ShoppingListSchema::from_list(&list, today))
    }

    pub fn get_list_detail(
        &self,
        id: ListId,
        user: &User,
        today: NaiveDate,
    ) -> Result<ShoppingListDetail, ListServiceError> {
        let list = self.owned_list(id, user)?;
        self.detail(&list, today)
    }

    pub fn get_lists(
        &self,
        user: &User,
        page: PageRequest,
        today: NaiveDate,
    ) -> Result<ShoppingListPage, ListServiceError> {
        let (window, lists) = self.lists.lists_for_user(user.id, page)?;
        Ok(ShoppingListPage {
            pagination: window.into(),
            lists: lists
                .iter()
                .map(|list| ShoppingListSchema::from_list(list, today))
                .collect(),
        })
    }

    pub fn delete_list(&self, id: ListId, user: &User) -> Result<MessageSchema, ListServiceError> {
        self.lists.delete_list(id, user.id)?;
        info!("event=list_delete module=lists status=ok list_id={id} user_id={}", user.id);
        Ok(MessageSchema::new(
            "Deleted Shopping List.",
            format!("Shopping list with ID #{id} was deleted."),
        ))
    }

    /// Puts `input.item_id` on the list with the given quantity, replacing any
    /// earlier quantity.
    pub fn set_item_quantity(
        &self,
        id: ListId,
        user: &User,
        input: &ItemQuantityInput,
        today: NaiveDate,
    ) -> Result<ShoppingListDetail, ListServiceError> {
        let list = self.owned_list(id, user)?;
        if self.items.get_item(input.item_id)?.is_none() {
            return Err(ListServiceError::ItemNotFound(input.item_id));
        }

        self.lists
            .set_item_quantity(list.id, input.item_id, input.quantity)?;
        info!(
            "event=list_item_set module=lists status=ok list_id={} item_id={} quantity={}",
            list.id, input.item_id, input.quantity
        );
        self.refreshed_detail(list.id, today)
    }

    pub fn remove_item(
        &self,
        id: ListId,
        user: &User,
        item_id: ItemId,
        today: NaiveDate,
    ) -> Result<ShoppingListDetail, ListServiceError> {
        let list = self.owned_list(id, user)?;
        if !self.lists.remove_item(list.id, item_id)? {
            return Err(ListServiceError::ItemNotOnList {
                list_id: list.id,
                item_id,
            });
        }
        info!(
            "event=list_item_remove module=lists status=ok list_id={} item_id={item_id}",
            list.id
        );
        self.refreshed_detail(list.id, today)
    }

    pub fn set_budget(
        &self,
        id: ListId,
        user: &User,
        input: &BudgetInput,
        today: NaiveDate,
    ) -> Result<ShoppingListDetail, ListServiceError> {
        let list = self.owned_list(id, user)?;
        let amount_cents = decimal_to_cents("amount", input.amount)?;
        self.budgets.set_budget(list.id, user.id, amount_cents)?;
        info!("event=list_budget_set module=lists status=ok list_id={}", list.id);
        self.detail(&list, today)
    }

    fn owned_list(&self, id: ListId, user: &User) -> Result<ShoppingList, ListServiceError> {
        self.lists
            .get_list_for_user(id, user.id)?
            .ok_or(ListServiceError::ListNotFound(id))
    }

    fn refreshed_detail(
        &self,
        id: ListId,
        today: NaiveDate,
    ) -> Result<ShoppingListDetail, ListServiceError> {
        let list = self
            .lists
            .get_list(id)?
            .ok_or(ListServiceError::ListNotFound(id))?;
        self.detail(&list, today)
    }

    fn detail(
        &self,
        list: &ShoppingList,
        today: NaiveDate,
    ) -> Result<ShoppingListDetail, ListServiceError> {
        let entries = self.lists.entries(list.id)?;
        let total_items = self.lists.number_of_items(list.id)?;
        let total_cents = self.lists.total_price_cents(list.id)?;
        let budget_cents = self.budgets.total_budget_cents(list.id)?;

        Ok(ShoppingListDetail {
            list: ShoppingListSchema::from_list(list, today),
            entries: entries.iter().map(ListEntrySchema::from).collect(),
            total_items,
            total_price: cents_to_decimal(total_cents),
            budget: cents_to_decimal(budget_cents),
            budget_remaining: cents_to_decimal(budget_remaining_cents(budget_cents, total_cents)),
        })
    }
}
