//! File-backed mapping store.

use crate::error::ResolverResult;
use crate::store::MappingStore;
use ldpsync_protocol::ResourceLocation;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A mapping store persisted as a JSON document.
///
/// The whole document is loaded at open and rewritten on every new mapping.
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so a crash leaves either the old or the new document.
///
/// # Example
///
/// ```no_run
/// use ldpsync_protocol::ResourceLocation;
/// use ldpsync_resolver::{FileMappingStore, MappingStore};
/// use std::path::Path;
///
/// let store = FileMappingStore::open(Path::new("mappings.json")).unwrap();
/// store
///     .put_if_absent("id", ResourceLocation::new("http://repo/rest", "ab/cd"))
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct FileMappingStore {
    path: PathBuf,
    mappings: RwLock<BTreeMap<String, ResourceLocation>>,
}

impl FileMappingStore {
    /// Opens the store, creating an empty one if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: &Path) -> ResolverResult<Self> {
        let mappings = match fs::read(path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), count = mappings.len(), "opened mapping store");
        Ok(Self {
            path: path.to_path_buf(),
            mappings: RwLock::new(mappings),
        })
    }

    /// Opens the store, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the file cannot be read.
    pub fn open_with_create_dirs(path: &Path) -> ResolverResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, mappings: &BTreeMap<String, ResourceLocation>) -> ResolverResult<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let bytes = serde_json::to_vec_pretty(mappings)?;
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl MappingStore for FileMappingStore {
    fn get(&self, identifier: &str) -> ResolverResult<Option<ResourceLocation>> {
        Ok(self.mappings.read().get(identifier).cloned())
    }

    fn put_if_absent(
        &self,
        identifier: &str,
        location: ResourceLocation,
    ) -> ResolverResult<ResourceLocation> {
        let mut mappings = self.mappings.write();
        if let Some(existing) = mappings.get(identifier) {
            return Ok(existing.clone());
        }

        mappings.insert(identifier.to_string(), location.clone());
        if let Err(e) = self.persist(&mappings) {
            mappings.remove(identifier);
            return Err(e);
        }
        Ok(location)
    }

    fn len(&self) -> ResolverResult<usize> {
        Ok(self.mappings.read().len())
    }
}
