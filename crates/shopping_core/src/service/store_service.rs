//! Shopping store use-cases.
//!
//! # Responsibility
//! - Convert client store-type input (value or label) into [`StoreType`].
//! - Guard store name uniqueness before writes.
//! - Shape stores, pages and aggregates into output schemas.
//!
//! # Invariants
//! - Only the owner may update or delete a store; a foreign store reads as missing.
//! - Blank update values leave the stored column unchanged.

use crate::model::page::PageRequest;
use crate::model::store::{NewStore, StoreId, StorePatch, StoreType};
use crate::model::user::{User, UserId};
use crate::model::validation::ValidationError;
use crate::repo::item_repo::{ItemFilter, ItemRepository};
use crate::repo::store_repo::{StoreFilter, StoreRepository};
use crate::repo::RepoError;
use crate::schema::input::{NewStoreInput, StoreSearch, StoreTypeInput};
use crate::schema::output::{
    ItemPage, ItemSchema, MessageSchema, StoreAggregation, StoreDetailWithItems, StorePage,
    StoreSchema,
};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum StoreServiceError {
    /// A numeric store type with no label.
    UnknownStoreTypeValue(i64),
    /// A label that names no store type.
    UnknownStoreTypeLabel(String),
    StoreExists(String),
    StoreNotFound(StoreId),
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for StoreServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownStoreTypeValue(_) => write!(
                f,
                "Internal Conversion Error: Store Type Could Not Be Converted To String."
            ),
            Self::UnknownStoreTypeLabel(label) => write!(f, "Store type '{label}' is invalid."),
            Self::StoreExists(name) => write!(f, "Store '{name}' already exists."),
            Self::StoreNotFound(id) => write!(f, "Store with id '{id}' does not exist."),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound {
                entity: "store",
                id,
            } => Self::StoreNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Resolves client input to a store type.
///
/// Numbers go through the value-to-label table first, so an unknown number
/// reports a conversion error rather than an invalid label.
pub fn resolve_store_type(input: &StoreTypeInput) -> Result<StoreType, StoreServiceError> {
    let label = match input {
        StoreTypeInput::Value(value) => StoreType::from_value(*value)
            .map(StoreType::label)
            .ok_or(StoreServiceError::UnknownStoreTypeValue(*value))?,
        StoreTypeInput::Label(label) => label.as_str(),
    };
    StoreType::from_label(label)
        .ok_or_else(|| StoreServiceError::UnknownStoreTypeLabel(label.to_string()))
}

pub struct StoreService<S: StoreRepository, I: ItemRepository> {
    stores: S,
    items: I,
}

impl<S: StoreRepository, I: ItemRepository> StoreService<S, I> {
    pub fn new(stores: S, items: I) -> Self {
        Self { stores, items }
    }

    pub fn create(
        &self,
        input: &NewStoreInput,
        user: &User,
    ) -> Result<StoreSchema, StoreServiceError> {
        let store_type = resolve_store_type(&input.store_type)?;
        if self.stores.name_exists(&input.name)? {
            warn!("event=store_create module=stores status=error reason=duplicate_name");
            return Err(StoreServiceError::StoreExists(input.name.clone()));
        }

        let store = self.stores.create_store(&NewStore {
            name: input.name.clone(),
            store_type,
            description: input.description.clone(),
            user_id: user.id,
        })?;
        info!(
            "event=store_create module=stores status=ok store_id={} user_id={}",
            store.id, user.id
        );
        Ok(StoreSchema::from(&store))
    }

    pub fn get_store_detail(&self, id: StoreId) -> Result<StoreSchema, StoreServiceError> {
        let store = self
            .stores
            .get_store(id)?
            .ok_or(StoreServiceError::StoreNotFound(id))?;
        Ok(StoreSchema::from(&store))
    }

    /// The store plus one page of the items it stocks.
    pub fn get_store_detail_with_items(
        &self,
        id: StoreId,
        page: PageRequest,
    ) -> Result<StoreDetailWithItems, StoreServiceError> {
        let store = self.get_store_detail(id)?;
        let filter = ItemFilter {
            store_id: Some(id),
            ..ItemFilter::default()
        };
        let (window, items) = self.items.filter_items(&filter, page)?;
        Ok(StoreDetailWithItems {
            store,
            items: ItemPage {
                pagination: window.into(),
                items: items.iter().map(ItemSchema::from).collect(),
            },
        })
    }

    pub fn aggregate(&self, user_id: Option<UserId>) -> Result<StoreAggregation, StoreServiceError> {
        Ok(self.stores.count_stores(user_id)?.into())
    }

    pub fn get_stores(
        &self,
        page: PageRequest,
        user_id: Option<UserId>,
    ) -> Result<StorePage, StoreServiceError> {
        let filter = StoreFilter {
            user_id,
            ..StoreFilter::default()
        };
        self.page(&filter, page)
    }

    /// Applies the non-blank values to a store owned by `user`.
    pub fn update_store(
        &self,
        id: StoreId,
        user: &User,
        name: Option<&str>,
        store_type: Option<&StoreTypeInput>,
        description: Option<&str>,
    ) -> Result<StoreSchema, StoreServiceError> {
        let name = name.filter(|name| !name.is_empty());
        if let Some(name) = name {
            if self.stores.name_exists(name)? {
                warn!("event=store_update module=stores status=error reason=duplicate_name store_id={id}");
                return Err(StoreServiceError::StoreExists(name.to_string()));
            }
        }
        let store_type = store_type
            .filter(|input| !matches!(input, StoreTypeInput::Label(label) if label.is_empty()))
            .map(resolve_store_type)
            .transpose()?;

        let patch = StorePatch {
            name: name.map(str::to_string),
            store_type,
            description: description
                .filter(|description| !description.is_empty())
                .map(str::to_string),
        };
        let store = self.stores.update_store(id, user.id, &patch)?;
        info!(
            "event=store_update module=stores status=ok store_id={} user_id={}",
            store.id, user.id
        );
        Ok(StoreSchema::from(&store))
    }

    pub fn delete_store(&self, id: StoreId, user: &User) -> Result<MessageSchema, StoreServiceError> {
        self.stores.delete_store(id, user.id)?;
        info!("event=store_delete module=stores status=ok store_id={id} user_id={}", user.id);
        Ok(deleted_store_message(id))
    }

    /// Deletes any user's store; staff moderation only.
    pub fn force_delete_store(&self, id: StoreId) -> Result<MessageSchema, StoreServiceError> {
        self.stores.force_delete_store(id)?;
        info!("event=store_delete module=admin status=ok store_id={id}");
        Ok(deleted_store_message(id))
    }

    pub fn search_stores(
        &self,
        page: PageRequest,
        name: Option<&str>,
        user_id: Option<UserId>,
        search: &StoreSearch,
    ) -> Result<StorePage, StoreServiceError> {
        let filter = StoreFilter {
            name: name.map(str::to_string),
            ids: search.ids.clone().unwrap_or_default(),
            store_types: search.store_types.clone().unwrap_or_default(),
            created_on: search.created_on,
            created_before: search.created_before,
            created_after: search.created_after,
            updated_on: search.updated_on,
            updated_before: search.updated_before,
            updated_after: search.updated_after,
            user_id,
        };
        self.page(&filter, page)
    }

    fn page(&self, filter: &StoreFilter, page: PageRequest) -> Result<StorePage, StoreServiceError> {
        let (window, stores) = self.stores.filter_stores(filter, page)?;
        Ok(StorePage {
            pagination: window.into(),
            stores: stores.iter().map(StoreSchema::from).collect(),
        })
    }
}

fn deleted_store_message(id: StoreId) -> MessageSchema {
    MessageSchema::new("Deleted Store.", format!("Store with ID #{id} was deleted."))
}

#[cfg(test)]
mod tests {
    use super::{resolve_store_type, StoreServiceError};
    use crate::model::store::StoreType;
    use crate::schema::input::StoreTypeInput;

    #[test]
    fn resolves_values_and_labels() {
        assert_eq!(
            resolve_store_type(&StoreTypeInput::Value(1)).unwrap(),
            StoreType::Online
        );
        assert_eq!(
            resolve_store_type(&StoreTypeInput::Label("In-Store".to_string())).unwrap(),
            StoreType::InStore
        );
    }

    #[test]
    fn unknown_types_carry_distinct_messages() {
        let by_value = resolve_store_type(&StoreTypeInput::Value(9)).unwrap_err();
        assert!(matches!(by_value, StoreServiceError::UnknownStoreTypeValue(9)));
        assert_eq!(
            by_value.to_string(),
            "Internal Conversion Error: Store Type Could Not Be Converted To String."
        );

        let by_label = resolve_store_type(&StoreTypeInput::Label("Market".to_string())).unwrap_err();
        assert_eq!(by_label.to_string(), "Store type 'Market' is invalid.");
    }
}
