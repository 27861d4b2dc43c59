//! Persistence boundary for saved recipes.

pub mod hash;
pub mod local;

pub use hash::owner_key;
pub use local::LocalRecordStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::mapping::{NewRecipeRecord, RecipeRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("recipe {0} not found")]
    NotFound(Uuid),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt recipe record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Recipe rows keyed by id and owned by a user. Rows are never updated in
/// place; the only mutations are insert and delete.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn insert(&self, record: NewRecipeRecord) -> Result<RecipeRecord, StoreError>;

    /// All rows owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<RecipeRecord>, StoreError>;

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<(), StoreError>;
}
