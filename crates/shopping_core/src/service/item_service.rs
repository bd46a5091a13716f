//! Shopping item use-cases.
//!
//! # Responsibility
//! - Validate prices and store references before writes.
//! - Keep `(name, store)` unique across create and update.
//! - Shape items, pages and price aggregates into output schemas.
//!
//! # Invariants
//! - Only the owner may update or delete an item; a foreign item reads as missing.
//! - Search price filters compare exact cents.

use crate::model::item::{ItemId, ItemPatch, NewItem};
use crate::model::money::decimal_to_cents;
use crate::model::page::PageRequest;
use crate::model::store::StoreId;
use crate::model::user::{User, UserId};
use crate::model::validation::ValidationError;
use crate::repo::item_repo::{ItemFilter, ItemRepository};
use crate::repo::list_repo::ShoppingListRepository;
use crate::repo::store_repo::StoreRepository;
use crate::repo::RepoError;
use crate::schema::input::{ItemSearch, NewItemInput, UpdateItem};
use crate::schema::output::{ItemAggregation, ItemPage, ItemSchema, MessageSchema};
use log::{info, warn};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ItemServiceError {
    ItemExists { name: String, store: String },
    ItemNotFound(ItemId),
    StoreNotFound(StoreId),
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for ItemServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemExists { name, store } => {
                write!(f, "Item ('{name}') already exists @ '{store}'.")
            }
            Self::ItemNotFound(id) => write!(f, "Item with id '{id}' does not exist."),
            Self::StoreNotFound(id) => write!(f, "Store with id '{id}' does not exist."),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ItemServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ItemServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound { entity: "item", id } => Self::ItemNotFound(id),
            RepoError::NotFound {
                entity: "store",
                id,
            } => Self::StoreNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ItemServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

fn to_price_cents(value: Decimal) -> Result<i64, ItemServiceError> {
    Ok(decimal_to_cents("price", value)?)
}

pub struct ItemService<I, S, L>
where
    I: ItemRepository,
    S: StoreRepository,
    L: ShoppingListRepository,
{
    items: I,
    stores: S,
    lists: L,
}

impl<I, S, L> ItemService<I, S, L>
where
    I: ItemRepository,
    S: StoreRepository,
    L: ShoppingListRepository,
{
    pub fn new(items: I, stores: S, lists: L) -> Self {
        Self {
            items,
            stores,
            lists,
        }
    }

    pub fn create_item(
        &self,
        user: &User,
        input: &NewItemInput,
    ) -> Result<ItemSchema, ItemServiceError> {
        let price_cents = to_price_cents(input.price)?;
        let store = self
            .stores
            .get_store(input.store_id)?
            .ok_or(ItemServiceError::StoreNotFound(input.store_id))?;
        if self.items.item_exists(&input.name, store.id, None)? {
            warn!(
                "event=item_create module=items status=error reason=duplicate store_id={}",
                store.id
            );
            return Err(ItemServiceError::ItemExists {
                name: input.name.clone(),
                store: store.name,
            });
        }

        let item = self.items.create_item(&NewItem {
            name: input.name.clone(),
            description: input.description.clone(),
            price_cents,
            store_id: store.id,
            user_id: user.id,
        })?;
        info!(
            "event=item_create module=items status=ok item_id={} user_id={}",
            item.id, user.id
        );
        Ok(ItemSchema::from(&item))
    }

    pub fn get_items(
        &self,
        page: PageRequest,
        user_id: Option<UserId>,
    ) -> Result<ItemPage, ItemServiceError> {
        let filter = ItemFilter {
            user_id,
            ..ItemFilter::default()
        };
        self.page(&filter, page)
    }

    pub fn aggregate(&self, user_id: Option<UserId>) -> Result<ItemAggregation, ItemServiceError> {
        Ok(self.items.price_stats(user_id)?.into())
    }

    /// The item with its store, owner and the number of lists it is on.
    pub fn get_item_detail(&self, id: ItemId) -> Result<ItemSchema, ItemServiceError> {
        let item = self
            .items
            .get_item(id)?
            .ok_or(ItemServiceError::ItemNotFound(id))?;
        let mut schema = ItemSchema::from(&item);
        schema.list_count = Some(self.lists.count_lists_linked_to_item(id)?);
        Ok(schema)
    }

    pub fn update_item(
        &self,
        id: ItemId,
        user: &User,
        update: &UpdateItem,
    ) -> Result<ItemSchema, ItemServiceError> {
        let current = self
            .items
            .get_item_for_user(id, user.id)?
            .ok_or(ItemServiceError::ItemNotFound(id))?;

        let patch = ItemPatch {
            name: update.name.clone().filter(|name| !name.is_empty()),
            description: update
                .description
                .clone()
                .filter(|description| !description.is_empty()),
            price_cents: update.price.map(to_price_cents).transpose()?,
            store_id: update.store_id,
        };
        if patch.is_empty() {
            return Ok(ItemSchema::from(&current));
        }

        let target_store = match patch.store_id {
            Some(store_id) => self
                .stores
                .get_store(store_id)?
                .ok_or(ItemServiceError::StoreNotFound(store_id))?,
            None => current.store.clone(),
        };
        let target_name = patch.name.as_deref().unwrap_or(&current.name);
        if self.items.item_exists(target_name, target_store.id, Some(id))? {
            return Err(ItemServiceError::ItemExists {
                name: target_name.to_string(),
                store: target_store.name,
            });
        }

        let item = self.items.update_item(id, user.id, &patch)?;
        info!(
            "event=item_update module=items status=ok item_id={} user_id={}",
            item.id, user.id
        );
        Ok(ItemSchema::from(&item))
    }

    pub fn delete_item(&self, id: ItemId, user: &User) -> Result<MessageSchema, ItemServiceError> {
        self.items.delete_item(id, user.id)?;
        info!("event=item_delete module=items status=ok item_id={id} user_id={}", user.id);
        Ok(deleted_item_message(id))
    }

    /// Deletes any user's item; staff moderation only.
    pub fn force_delete_item(&self, id: ItemId) -> Result<MessageSchema, ItemServiceError> {
        self.items.force_delete_item(id)?;
        info!("event=item_delete module=admin status=ok item_id={id}");
        Ok(deleted_item_message(id))
    }

    pub fn search_items(
        &self,
        user_id: Option<UserId>,
        page: PageRequest,
        name: Option<&str>,
        store_id: Option<StoreId>,
        search: &ItemSearch,
    ) -> Result<ItemPage, ItemServiceError> {
        if let Some(store_id) = store_id {
            if self.stores.get_store(store_id)?.is_none() {
                return Err(ItemServiceError::StoreNotFound(store_id));
            }
        }

        let filter = ItemFilter {
            name: name.map(str::to_string),
            store_id,
            user_id,
            description: search.description.clone(),
            price_cents: search.price.map(search_cents),
            price_gt_cents: search.price_is_gt.map(search_cents),
            price_lt_cents: search.price_is_lt.map(search_cents),
            created_on: search.created_on,
            created_after: search.created_after,
            created_before: search.created_before,
            updated_on: search.updated_on,
            updated_after: search.updated_after,
            updated_before: search.updated_before,
            ids: search.ids.clone().unwrap_or_default(),
        };
        self.page(&filter, page)
    }

    fn page(&self, filter: &ItemFilter, page: PageRequest) -> Result<ItemPage, ItemServiceError> {
        let (window, items) = self.items.filter_items(filter, page)?;
        Ok(ItemPage {
            pagination: window.into(),
            items: items.iter().map(ItemSchema::from).collect(),
        })
    }
}

/// Search bounds in cents. Sub-cent digits are rounded away and values
/// beyond the `i64` range saturate.
fn search_cents(value: Decimal) -> i64 {
    let saturated = if value.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    };
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.round().to_i64())
        .unwrap_or(saturated)
}

fn deleted_item_message(id: ItemId) -> MessageSchema {
    MessageSchema::new("Deleted Item.", format!("Item with ID #{id} was deleted."))
}
