// 💾 Catalog Store - the one live catalog plus its JSON mirrors
//
// Every mutation runs lock → mutate → persist under one mutex, so concurrent
// callers see each read-modify-write as a unit. Persistence is best effort:
// a failed write is logged and counted, the in-memory state stays
// authoritative. Loading is forgiving the same way: a missing or corrupt
// document starts empty.

use crate::admins::AdminList;
use crate::catalog::{CatalogSources, CatalogTree, Item, ItemRef, ItemSource, ListedItem, Location, Price};
use crate::classifier::{Classification, Classifier};
use crate::config::{Config, DataPaths};
use crate::curation;
use crate::error::CatalogError;
use crate::search::{self, SearchHit};
use crate::spreadsheet;
use crate::sync::{self, ImportReport};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

// ============================================================================
// FILE HELPERS
// ============================================================================

/// Read a JSON document; anything unreadable counts as absent
fn load_document<T: DeserializeOwned + Default>(path: &Path) -> T {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "cannot read document, starting empty");
            return T::default();
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "corrupt document, starting empty");
            T::default()
        }
    }
}

/// Write through a temp file so a crash never leaves half a document
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// STORE
// ============================================================================

pub struct CatalogStore {
    config: Config,
    paths: DataPaths,
    classifier: Classifier,
    sources: Mutex<CatalogSources>,
    admins: Mutex<AdminList>,
    persist_failures: AtomicUsize,
}

impl CatalogStore {
    /// Load whatever is on disk under `config.data_dir`
    pub fn open(config: Config) -> Self {
        let paths = config.paths();
        let sources = CatalogSources {
            auto: load_document(&paths.catalog),
            moved: load_document(&paths.moved),
            manual: load_document(&paths.manual),
        };
        let mut admins: AdminList = load_document(&paths.admins);
        admins.seed(&config.seed_admins);

        tracing::info!(
            data_dir = %config.data_dir.display(),
            items = sources.total_items(),
            admins = admins.ids().len(),
            "catalog loaded"
        );

        CatalogStore {
            config,
            paths,
            classifier: Classifier::new(),
            sources: Mutex::new(sources),
            admins: Mutex::new(admins),
            persist_failures: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Writes that failed since start-up
    pub fn persist_failures(&self) -> usize {
        self.persist_failures.load(Ordering::Relaxed)
    }

    fn persist_bytes(&self, path: &Path, bytes: &[u8]) {
        if let Err(err) = write_atomically(path, bytes) {
            self.persist_failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(path = %path.display(), error = %format!("{err:#}"), "persist failed, keeping in-memory state");
        }
    }

    fn persist<T: Serialize>(&self, path: &Path, value: &T) {
        match serde_json::to_vec_pretty(value) {
            Ok(bytes) => self.persist_bytes(path, &bytes),
            Err(err) => {
                self.persist_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(path = %path.display(), error = %err, "cannot serialize document");
            }
        }
    }

    fn persist_sources(&self, sources: &CatalogSources, which: &[ItemSource]) {
        for source in which {
            let path = match source {
                ItemSource::Auto => &self.paths.catalog,
                ItemSource::Moved => &self.paths.moved,
                ItemSource::Manual => &self.paths.manual,
            };
            self.persist(path, sources.get(*source));
        }
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Copy of the three sources
    pub fn snapshot(&self) -> CatalogSources {
        lock(&self.sources).clone()
    }

    /// Merged view used by browsing, search and export
    pub fn merged(&self) -> CatalogTree {
        lock(&self.sources).merged()
    }

    pub fn bucket_listing(&self, location: &Location) -> Vec<ListedItem> {
        lock(&self.sources).bucket_listing(location)
    }

    pub fn classify(&self, description: &str) -> Classification {
        self.classifier.explain(description)
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        search::search(query, &self.merged())
    }

    pub fn export_csv(&self) -> Result<Vec<u8>> {
        spreadsheet::write_export(&self.merged())
    }

    /// The last imported spreadsheet, as uploaded
    pub fn latest_spreadsheet(&self) -> Option<Vec<u8>> {
        fs::read(&self.paths.latest_spreadsheet).ok()
    }

    // ========================================================================
    // IMPORT
    // ========================================================================

    /// Replace the auto-catalog from a spreadsheet. A malformed file is
    /// rejected before anything changes.
    pub fn import_spreadsheet(&self, bytes: &[u8]) -> Result<ImportReport> {
        let rows = spreadsheet::read_rows(bytes)?;
        let fresh = sync::build_auto_catalog(&rows, &self.classifier);

        let mut sources = lock(&self.sources);
        let outcome = sync::reconcile(&mut sources, fresh, &rows, self.config.sync_manual_prices);

        let mut changed = vec![ItemSource::Auto];
        if outcome.moved_changed() {
            changed.push(ItemSource::Moved);
        }
        if outcome.manual_changed() {
            changed.push(ItemSource::Manual);
        }
        self.persist_sources(&sources, &changed);
        self.persist_bytes(&self.paths.latest_spreadsheet, bytes);

        let report = ImportReport::new(bytes, rows.len(), sources.auto.item_count(), outcome);
        tracing::info!(sha256 = %report.sha256, "{}", report.summary());
        Ok(report)
    }

    // ========================================================================
    // CURATION
    // ========================================================================

    pub fn move_items(&self, from: &Location, to: &Location, refs: &[ItemRef]) -> usize {
        let mut sources = lock(&self.sources);
        let moved = curation::move_items(&mut sources, from, to, refs);
        if moved > 0 {
            self.persist_sources(&sources, &ItemSource::ALL);
        }
        moved
    }

    /// Move items picked by number ("1,3", "2-5") from a bucket listing
    pub fn move_selection(&self, from: &Location, to: &Location, selection: &str) -> Result<usize, CatalogError> {
        let mut sources = lock(&self.sources);
        let listing = sources.bucket_listing(from);
        let numbers = curation::parse_selection(selection, listing.len())?;
        let refs = curation::select(&listing, &numbers);

        let moved = curation::move_items(&mut sources, from, to, &refs);
        if moved > 0 {
            self.persist_sources(&sources, &ItemSource::ALL);
        }
        Ok(moved)
    }

    pub fn delete_items(&self, location: &Location, refs: &[ItemRef]) -> usize {
        let mut sources = lock(&self.sources);
        let deleted = curation::delete_items(&mut sources, location, refs);
        if deleted > 0 {
            self.persist_sources(&sources, &ItemSource::ALL);
        }
        deleted
    }

    /// Delete items picked by number from a bucket listing
    pub fn delete_selection(&self, location: &Location, selection: &str) -> Result<usize, CatalogError> {
        let mut sources = lock(&self.sources);
        let listing = sources.bucket_listing(location);
        let numbers = curation::parse_selection(selection, listing.len())?;
        let refs = curation::select(&listing, &numbers);

        let deleted = curation::delete_items(&mut sources, location, &refs);
        if deleted > 0 {
            self.persist_sources(&sources, &ItemSource::ALL);
        }
        Ok(deleted)
    }

    pub fn set_price(&self, location: &Location, item_ref: &ItemRef, price: Price) -> bool {
        let mut sources = lock(&self.sources);
        let updated = curation::set_price(&mut sources, location, item_ref, price);
        if updated {
            self.persist_sources(&sources, &ItemSource::ALL);
        }
        updated
    }

    pub fn add_manual_item(&self, location: &Location, description: &str, price: Price) -> Result<Item, CatalogError> {
        let mut sources = lock(&self.sources);
        let item = curation::add_manual_item(&mut sources, location, description, price)?;
        self.persist_sources(&sources, &[ItemSource::Manual]);
        Ok(item)
    }

    pub fn delete_manual_bucket(&self, location: &Location) -> Result<usize, CatalogError> {
        let mut sources = lock(&self.sources);
        let restored = curation::delete_manual_bucket(&mut sources, &self.classifier, location)?;
        self.persist_sources(&sources, &ItemSource::ALL);
        Ok(restored)
    }

    pub fn delete_manual_category(&self, category: &str) -> Result<usize, CatalogError> {
        let mut sources = lock(&self.sources);
        let restored = curation::delete_manual_category(&mut sources, &self.classifier, category)?;
        self.persist_sources(&sources, &ItemSource::ALL);
        Ok(restored)
    }

    // ========================================================================
    // ADMINS
    // ========================================================================

    pub fn admins(&self) -> Vec<i64> {
        lock(&self.admins).ids().to_vec()
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        lock(&self.admins).is_admin(user_id)
    }

    pub fn authorize(&self, user_id: i64) -> Result<(), CatalogError> {
        lock(&self.admins).authorize(user_id)
    }

    pub fn add_admin(&self, user_id: i64) -> bool {
        let mut admins = lock(&self.admins);
        let added = admins.add(user_id);
        if added {
            self.persist(&self.paths.admins, &*admins);
        }
        added
    }

    pub fn remove_admin(&self, user_id: i64) -> bool {
        let mut admins = lock(&self.admins);
        let removed = admins.remove(user_id);
        if removed {
            self.persist(&self.paths.admins, &*admins);
        }
        removed
    }
}
