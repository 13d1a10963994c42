//! Block/item catalog backed by minecraft-data JSON files.
//!
//! Layout: `<data_dir>/<version>/blocks.json` and `<data_dir>/<version>/items.json`,
//! each an array of objects with at least `id` and `name`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;

use crate::infrastructure::ports::{CatalogError, CatalogPort};

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: u32,
    name: String,
}

#[derive(Debug, Default)]
struct CatalogTables {
    blocks: HashMap<String, u32>,
    items: HashMap<String, u32>,
}

/// Version-aware name → id lookup.
///
/// Tables are loaded once per version and cached; `select_version` switches
/// which version lookups resolve against. Before the first selection every
/// lookup misses.
pub struct MinecraftDataCatalog {
    data_dir: PathBuf,
    tables: DashMap<String, Arc<CatalogTables>>,
    active: RwLock<Option<Arc<CatalogTables>>>,
}

impl MinecraftDataCatalog {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            tables: DashMap::new(),
            active: RwLock::new(None),
        }
    }

    async fn load(&self, version: &str) -> Result<CatalogTables, CatalogError> {
        if version.is_empty()
            || version
                .chars()
                .any(|c| !(c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'))
            || version.contains("..")
        {
            return Err(CatalogError::InvalidVersion(version.to_string()));
        }

        let dir = self.data_dir.join(version);
        Ok(CatalogTables {
            blocks: read_table(&dir.join("blocks.json")).await?,
            items: read_table(&dir.join("items.json")).await?,
        })
    }

    fn active(&self) -> Option<Arc<CatalogTables>> {
        match self.active.read() {
            Ok(active) => active.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

async fn read_table(path: &Path) -> Result<HashMap<String, u32>, CatalogError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<CatalogEntry> =
        serde_json::from_slice(&bytes).map_err(|e| CatalogError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(entries.into_iter().map(|e| (e.name, e.id)).collect())
}

#[async_trait]
impl CatalogPort for MinecraftDataCatalog {
    async fn select_version(&self, version: &str) -> Result<(), CatalogError> {
        let cached = self.tables.get(version).map(|entry| entry.value().clone());
        let tables = match cached {
            Some(cached) => cached,
            None => {
                let loaded = Arc::new(self.load(version).await?);
                self.tables.insert(version.to_string(), loaded.clone());
                loaded
            }
        };

        tracing::info!(
            version = %version,
            blocks = tables.blocks.len(),
            items = tables.items.len(),
            "Catalog version selected"
        );

        match self.active.write() {
            Ok(mut active) => *active = Some(tables),
            Err(poisoned) => *poisoned.into_inner() = Some(tables),
        }
        Ok(())
    }

    fn block_id(&self, name: &str) -> Option<u32> {
        self.active()?.blocks.get(name).copied()
    }

    fn item_id(&self, name: &str) -> Option<u32> {
        self.active()?.items.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_version(root: &Path, version: &str, blocks: &str, items: &str) {
        let dir = root.join(version);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("blocks.json"), blocks).unwrap();
        std::fs::write(dir.join("items.json"), items).unwrap();
    }

    #[tokio::test]
    async fn lookups_miss_before_version_selected() {
        let root = tempfile::tempdir().unwrap();
        let catalog = MinecraftDataCatalog::new(root.path());

        assert_eq!(catalog.block_id("stone"), None);
        assert_eq!(catalog.item_id("diamond"), None);
    }

    #[tokio::test]
    async fn selected_version_resolves_names() {
        let root = tempfile::tempdir().unwrap();
        write_version(
            root.path(),
            "1.20.4",
            r#"[{"id": 1, "name": "stone", "hardness": 1.5}, {"id": 15, "name": "iron_ore"}]"#,
            r#"[{"id": 802, "name": "diamond", "stackSize": 64}]"#,
        );
        let catalog = MinecraftDataCatalog::new(root.path());

        catalog.select_version("1.20.4").await.unwrap();

        assert_eq!(catalog.block_id("iron_ore"), Some(15));
        assert_eq!(catalog.block_id("obsidian"), None);
        assert_eq!(catalog.item_id("diamond"), Some(802));
    }

    #[tokio::test]
    async fn switching_versions_changes_ids() {
        let root = tempfile::tempdir().unwrap();
        write_version(root.path(), "1.8.9", r#"[{"id": 1, "name": "stone"}]"#, "[]");
        write_version(root.path(), "1.20.4", r#"[{"id": 2, "name": "stone"}]"#, "[]");
        let catalog = MinecraftDataCatalog::new(root.path());

        catalog.select_version("1.8.9").await.unwrap();
        assert_eq!(catalog.block_id("stone"), Some(1));

        catalog.select_version("1.20.4").await.unwrap();
        assert_eq!(catalog.block_id("stone"), Some(2));
    }

    #[tokio::test]
    async fn missing_files_and_bad_versions_are_errors() {
        let root = tempfile::tempdir().unwrap();
        let catalog = MinecraftDataCatalog::new(root.path());

        assert!(matches!(
            catalog.select_version("1.20.4").await,
            Err(CatalogError::Io { .. })
        ));
        assert!(matches!(
            catalog.select_version("../etc").await,
            Err(CatalogError::InvalidVersion(_))
        ));
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let root = tempfile::tempdir().unwrap();
        write_version(root.path(), "1.20.4", "{not json", "[]");
        let catalog = MinecraftDataCatalog::new(root.path());

        assert!(matches!(
            catalog.select_version("1.20.4").await,
            Err(CatalogError::Parse { .. })
        ));
    }
}
