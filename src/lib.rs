// Catalog Classifier - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod catalog;     // Category → brand → items tree, merge of the three sources
pub mod classifier;  // Ordered rule cascade: description → (category, brand)
pub mod spreadsheet; // CSV import with header aliases, three-column export
pub mod sync;        // Import reconciliation against moved/manual overrides
pub mod curation;    // Relocation, pinning, manual buckets, selections
pub mod search;      // Brand / category / description search
pub mod store;       // Mutex-guarded live catalog with JSON mirrors
pub mod admins;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use catalog::{
    merge, sort_categories, normalize_description,
    CatalogSources, CatalogTree, Item, ItemRef, ItemSource, ListedItem, Location, Origin, Price,
    GENERAL_SUBCATEGORY, OTHER_CATEGORY,
};
pub use classifier::{classify, Classification, Classifier};
pub use spreadsheet::{read_rows, write_export, ExportRow, SpreadsheetRow};
pub use sync::{build_auto_catalog, reconcile, ImportReport, SyncOutcome};
pub use curation::{
    add_manual_item, delete_items, delete_manual_bucket, delete_manual_category,
    move_items, parse_selection, set_price,
};
pub use search::{normalize_query, search, SearchHit};
pub use store::CatalogStore;
pub use admins::{parse_user_id, AdminList};
pub use config::Config;
pub use error::CatalogError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
