//! Durable language preferences
//!
//! Two string keys persisted across restarts in a redb database.
//! Last-writer-wins per key; each key is owned by exactly one setting.

use redb::{Database, TableDefinition};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use directories::ProjectDirs;

use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{DEFAULT_SOURCE_LANGUAGE_CODE, DEFAULT_TARGET_LANGUAGE_CODE};

/// Redb table definition for user preferences
/// Key: preference name, Value: preference value
const PREFS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("preferences");

pub const SOURCE_LANGUAGE_KEY: &str = "source_language";
pub const TARGET_LANGUAGE_KEY: &str = "target_language";

#[derive(Clone)]
pub struct PrefsStore {
    db: Arc<Mutex<Database>>,
}

impl PrefsStore {
    /// Open (or create) the preference database at the default location
    /// under the platform data directory.
    pub fn open_default() -> AppResult<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("Failed to create data directory: {}", e)))?;
        }

        let db = Database::create(path.as_ref())
            .map_err(|e| AppError::Storage(format!("Failed to open preference database: {}", e)))?;

        // Initialize table
        {
            let write_txn = db.begin_write()
                .map_err(|e| AppError::Storage(format!("Failed to begin write: {}", e)))?;
            {
                let _table = write_txn.open_table(PREFS_TABLE)
                    .map_err(|e| AppError::Storage(format!("Failed to open table: {}", e)))?;
            }
            write_txn.commit()
                .map_err(|e| AppError::Storage(format!("Failed to commit: {}", e)))?;
        }

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    fn default_path() -> AppResult<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "antigravity", "content-copilot")
            .ok_or_else(|| AppError::Storage("Failed to get project directories".to_string()))?;
        Ok(proj_dirs.data_dir().join("preferences.redb"))
    }

    pub fn get(&self, key: &str) -> AppResult<Option<String>> {
        let db = self.db.lock()
            .map_err(|e| AppError::Storage(format!("Mutex poisoned: {}", e)))?;

        let read_txn = db.begin_read()
            .map_err(|e| AppError::Storage(format!("Failed to begin read: {}", e)))?;

        let table = read_txn.open_table(PREFS_TABLE)
            .map_err(|e| AppError::Storage(format!("Failed to open table: {}", e)))?;

        let value = table.get(key)
            .map_err(|e| AppError::Storage(format!("Failed to read key '{}': {}", key, e)))?
            .map(|v| v.value().to_string());

        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let db = self.db.lock()
            .map_err(|e| AppError::Storage(format!("Mutex poisoned: {}", e)))?;

        let write_txn = db.begin_write()
            .map_err(|e| AppError::Storage(format!("Failed to begin write: {}", e)))?;

        {
            let mut table = write_txn.open_table(PREFS_TABLE)
                .map_err(|e| AppError::Storage(format!("Failed to open table: {}", e)))?;

            table.insert(key, value)
                .map_err(|e| AppError::Storage(format!("Failed to insert key '{}': {}", key, e)))?;
        }

        write_txn.commit()
            .map_err(|e| AppError::Storage(format!("Failed to commit: {}", e)))?;

        Ok(())
    }

    /// Source language code, defaulting to auto-detect when unset.
    pub fn source_language(&self) -> AppResult<String> {
        Ok(self
            .get(SOURCE_LANGUAGE_KEY)?
            .unwrap_or_else(|| DEFAULT_SOURCE_LANGUAGE_CODE.to_string()))
    }

    /// Target language code, defaulting to English when unset.
    pub fn target_language(&self) -> AppResult<String> {
        Ok(self
            .get(TARGET_LANGUAGE_KEY)?
            .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE_CODE.to_string()))
    }

    pub fn set_source_language(&self, code: &str) -> AppResult<()> {
        self.set(SOURCE_LANGUAGE_KEY, code)
    }

    pub fn set_target_language(&self, code: &str) -> AppResult<()> {
        self.set(TARGET_LANGUAGE_KEY, code)
    }
}
