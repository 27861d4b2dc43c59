use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    mapping::{NewRecipeRecord, RecipeRecord},
    store::{RecipeStore, StoreError, owner_key},
};

const RECIPE_DIR: &str = "recipes";

/// Stores each recipe row as a JSON file under
/// `<base_dir>/recipes/<sha256(user_id)>/<id>.json`.
#[derive(Clone, Debug)]
pub struct LocalRecordStore {
    base_dir: PathBuf,
}

impl LocalRecordStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_dir.clone())
    }

    fn user_dir(&self, user_id: &str) -> PathBuf {
        self.resolve_path(&format!("{RECIPE_DIR}/{}", owner_key(user_id)))
    }

    fn record_path(&self, user_id: &str, id: Uuid) -> PathBuf {
        self.user_dir(user_id).join(format!("{id}.json"))
    }

    pub fn resolve_path(&self, key: &str) -> PathBuf {
        let normalized = key.trim_start_matches('/');
        self.base_dir.join(Path::new(normalized))
    }

    async fn put(&self, path: &Path, data: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, data).await?;
        Ok(())
    }
}

#[async_trait]
impl RecipeStore for LocalRecordStore {
    async fn insert(&self, record: NewRecipeRecord) -> Result<RecipeRecord, StoreError> {
        let record = record.into_record(Uuid::new_v4(), Utc::now());
        let path = self.record_path(&record.user_id, record.id);
        let payload = serde_json::to_vec_pretty(&record)?;
        self.put(&path, &payload).await?;
        debug!(id = %record.id, "saved recipe");
        Ok(record)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<RecipeRecord>, StoreError> {
        let dir_path = self.user_dir(user_id);
        let mut dir = match fs::read_dir(&dir_path).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).await?;
            match serde_json::from_slice::<RecipeRecord>(&bytes) {
                Ok(record) if record.user_id == user_id => records.push(record),
                Ok(_) => {}
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable recipe record"),
            }
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<(), StoreError> {
        match fs::remove_file(self.record_path(user_id, id)).await {
            Ok(()) => {
                debug!(%id, "deleted recipe");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound(id)),
            Err(err) => Err(err.into()),
        }
    }
}
