//! File-backed Sources
//!
//! Adapters implementing the collaborator ports on top of local files.
//! A source path may name a single file, used for every host, or a
//! directory holding one `<host>.json` / `<host>.yaml` file per host.

use super::inventory::{InventoryConfig, InventoryReducer};
use crate::domain::ports::{
    DeviceRecord, DriveGroupSource, HostFacts, HostFactsSource, InventorySource,
};
use crate::error::{Error, Result};
use crate::hardware::allocation::DriveGroupSpec;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve the file to read for `host`
async fn resolve(path: &Path, host: &str, extensions: &[&str]) -> Result<PathBuf> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_dir() {
        return Ok(path.to_path_buf());
    }

    for extension in extensions {
        let candidate = path.join(format!("{}.{}", host, extension));
        if tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
    }

    Err(Error::Configuration(format!(
        "no file for host {} in {}",
        host,
        path.display()
    )))
}

// =============================================================================
// Inventory
// =============================================================================

/// Reads ceph-volume inventory JSON from disk
pub struct FileInventorySource {
    path: PathBuf,
    reducer: InventoryReducer,
}

impl FileInventorySource {
    pub fn new(path: impl Into<PathBuf>, config: InventoryConfig) -> Self {
        Self {
            path: path.into(),
            reducer: InventoryReducer::new(config),
        }
    }
}

#[async_trait]
impl InventorySource for FileInventorySource {
    async fn inventory(&self, host: &str) -> Result<Vec<DeviceRecord>> {
        let path = resolve(&self.path, host, &["json"]).await?;
        debug!("Retrieving inventory for {} from {}", host, path.display());

        let raw = tokio::fs::read_to_string(&path).await?;
        self.reducer.reduce(&raw)
    }
}

// =============================================================================
// Drive Group
// =============================================================================

/// Reads a drive group spec (YAML or JSON) from disk
pub struct FileDriveGroupSource {
    path: PathBuf,
}

impl FileDriveGroupSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DriveGroupSource for FileDriveGroupSource {
    async fn drive_group(&self, host: &str) -> Result<DriveGroupSpec> {
        let path = resolve(&self.path, host, &["yaml", "yml", "json"]).await?;
        debug!("Retrieving drive group for {} from {}", host, path.display());

        let raw = tokio::fs::read_to_string(&path).await?;
        DriveGroupSpec::from_yaml(&raw)
    }
}

// =============================================================================
// Host Facts
// =============================================================================

/// Reads a `{host: {"virtual": ...}}` JSON map from disk
pub struct FileHostFactsSource {
    path: PathBuf,
}

impl FileHostFactsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl HostFactsSource for FileHostFactsSource {
    async fn facts(&self) -> Result<BTreeMap<String, HostFacts>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Fixed facts, for callers that already know the virtualization state
pub struct StaticHostFacts {
    facts: BTreeMap<String, HostFacts>,
}

impl StaticHostFacts {
    pub fn new(facts: BTreeMap<String, HostFacts>) -> Self {
        Self { facts }
    }

    /// Facts for a single host
    pub fn for_host(host: &str, facts: HostFacts) -> Self {
        Self::new(BTreeMap::from([(host.to_string(), facts)]))
    }
}

#[async_trait]
impl HostFactsSource for StaticHostFacts {
    async fn facts(&self) -> Result<BTreeMap<String, HostFacts>> {
        Ok(self.facts.clone())
    }
}
