// 🔄 Catalog Synchronizer - spreadsheet import against curated overrides
//
// A fresh import rebuilds the auto-catalog from scratch. Before it is kept,
// the curated sources are reconciled with it:
//   1. moved items that a manual item also holds are dropped; manual wins
//   2. moved items still in the spreadsheet get the new price (unless locked),
//      the rest are dropped
//   3. unlocked manual items optionally pick up the new price
//   4. anything curated is removed from the fresh auto-catalog
//
// After a sync every normalized description lives in at most one source.

use crate::catalog::{normalize_description, CatalogSources, CatalogTree, Item, Location, Price};
use crate::classifier::Classifier;
use crate::spreadsheet::SpreadsheetRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

// ============================================================================
// BUILD
// ============================================================================

/// Classify every row into a brand-new auto-catalog, keeping row order
pub fn build_auto_catalog(rows: &[SpreadsheetRow], classifier: &Classifier) -> CatalogTree {
    let mut tree = CatalogTree::new();
    for row in rows {
        let (category, subcategory) = classifier.classify(&row.description);
        tree.push(
            &Location::new(category, subcategory),
            Item::new(row.description.clone(), row.price.clone()),
        );
    }
    tree
}

/// normalized description → price; the last occurrence wins
pub fn price_lookup(rows: &[SpreadsheetRow]) -> HashMap<String, Price> {
    rows.iter()
        .map(|row| (normalize_description(&row.description), row.price.clone()))
        .collect()
}

// ============================================================================
// RECONCILE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Moved items whose price changed
    pub prices_updated: usize,
    /// Moved items no longer in the spreadsheet
    pub moved_dropped: usize,
    /// Moved items dropped because a manual item has the same description
    #[serde(default)]
    pub moved_shadowed: usize,
    /// Manual items whose price changed
    pub manual_prices_updated: usize,
    /// Fresh auto items skipped because a curated copy exists
    pub duplicates_suppressed: usize,
}

impl SyncOutcome {
    /// moved-overrides must be written back
    pub fn moved_changed(&self) -> bool {
        self.prices_updated > 0 || self.moved_dropped > 0 || self.moved_shadowed > 0
    }

    /// manual-categories must be written back
    pub fn manual_changed(&self) -> bool {
        self.manual_prices_updated > 0
    }
}

/// Install `fresh_auto` as the new auto-catalog after reconciling the
/// curated sources against `rows`.
pub fn reconcile(
    sources: &mut CatalogSources,
    fresh_auto: CatalogTree,
    rows: &[SpreadsheetRow],
    sync_manual_prices: bool,
) -> SyncOutcome {
    let lookup = price_lookup(rows);
    let mut outcome = SyncOutcome::default();

    // Step 1: a manual copy shadows a moved one
    let manual = sources.manual.normalized_descriptions();
    sources.moved.retain(|_, _, item| {
        if manual.contains(&item.normalized_description()) {
            tracing::debug!(description = %item.description, "dropping moved item shadowed by a manual item");
            outcome.moved_shadowed += 1;
            false
        } else {
            true
        }
    });

    // Step 2: moved-overrides follow the spreadsheet
    sources.moved.retain(|_, _, item| match lookup.get(&item.normalized_description()) {
        Some(price) => {
            if !item.locked && &item.price != price {
                item.price = price.clone();
                outcome.prices_updated += 1;
            }
            true
        }
        None => {
            tracing::debug!(description = %item.description, "dropping moved item missing from spreadsheet");
            outcome.moved_dropped += 1;
            false
        }
    });

    // Step 3: manual items are never dropped, only re-priced
    if sync_manual_prices {
        sources.manual.retain(|_, _, item| {
            if let Some(price) = lookup.get(&item.normalized_description()) {
                if !item.locked && &item.price != price {
                    item.price = price.clone();
                    outcome.manual_prices_updated += 1;
                }
            }
            true
        });
    }

    // Step 4: one representation per description
    let mut curated: HashSet<String> = sources.moved.normalized_descriptions();
    curated.extend(sources.manual.normalized_descriptions());

    let mut auto = fresh_auto;
    auto.retain(|_, _, item| {
        if curated.contains(&item.normalized_description()) {
            outcome.duplicates_suppressed += 1;
            false
        } else {
            true
        }
    });
    sources.auto = auto;

    outcome
}

// ============================================================================
// IMPORT REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Usable spreadsheet rows
    pub rows: usize,
    /// Items in the new auto-catalog after reconciliation
    pub auto_items: usize,
    pub sync: SyncOutcome,
    pub imported_at: DateTime<Utc>,
    /// SHA-256 of the imported bytes, hex encoded
    pub sha256: String,
}

impl ImportReport {
    pub fn new(bytes: &[u8], rows: usize, auto_items: usize, sync: SyncOutcome) -> Self {
        ImportReport {
            rows,
            auto_items,
            sync,
            imported_at: Utc::now(),
            sha256: digest(bytes),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Imported {} rows: {} auto items, {} moved prices updated, {} moved dropped, {} duplicates suppressed",
            self.rows,
            self.auto_items,
            self.sync.prices_updated,
            self.sync.moved_dropped + self.sync.moved_shadowed,
            self.sync.duplicates_suppressed
        )
    }
}

pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
