// End-to-end catalog lifecycle through the public store API:
// import, relocate, re-import, curate, delete a manual bucket, reopen.

use catalog_classifier::{CatalogError, CatalogStore, Config, ItemSource, Location, Price};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const FIRST_IMPORT: &str = "description,price\n\
    iPhone 15 Pro 256GB Black,129990\n\
    Samsung Galaxy S24 Ultra 12/256,109990\n\
    Xiaomi Mi Robot Vacuum,24990\n\
    JBL Flip 6 Black,9990\n";

const SECOND_IMPORT: &str = "Наименование;Цена\n\
    iPhone 15 Pro 256GB Black;119990\n\
    Samsung Galaxy S24 Ultra 12/256;99990\n\
    JBL Flip 6 Black;8990\n";

fn open(dir: &TempDir) -> CatalogStore {
    CatalogStore::open(Config::new(dir.path()))
}

fn descriptions(store: &CatalogStore, location: &Location) -> Vec<String> {
    store
        .bucket_listing(location)
        .into_iter()
        .map(|listed| listed.item.description)
        .collect()
}

#[test]
fn test_relocation_survives_reimport_and_bucket_deletion() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    let apple = Location::new("Phones", "Apple");
    let deals = Location::new("Deals", "Apple");

    let report = store.import_spreadsheet(FIRST_IMPORT.as_bytes()).unwrap();
    assert_eq!(report.rows, 4);
    assert_eq!(descriptions(&store, &apple), vec!["iPhone 15 Pro 256GB Black"]);

    // Relocate the iPhone into a curated bucket
    assert_eq!(store.move_selection(&apple, &deals, "1"), Ok(1));
    assert!(store.bucket_listing(&apple).is_empty());
    let listing = store.bucket_listing(&deals);
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].source, ItemSource::Moved);

    // Re-import: the moved copy follows the new price and is not duplicated
    let report = store.import_spreadsheet(SECOND_IMPORT.as_bytes()).unwrap();
    assert_eq!(report.rows, 3);
    assert_eq!(report.sync.prices_updated, 1);
    assert_eq!(report.sync.moved_dropped, 0);
    assert_eq!(report.sync.duplicates_suppressed, 1);
    assert!(store.bucket_listing(&apple).is_empty());
    assert_eq!(store.bucket_listing(&deals)[0].item.price, Price::from(119990));

    // The vacuum left the spreadsheet, so it left the catalog
    assert!(store.search("vacuum").is_empty());

    // A hand-entered item shares the curated bucket
    store
        .add_manual_item(&deals, "Gift card 5000", Price::Missing)
        .unwrap();
    assert_eq!(
        descriptions(&store, &deals),
        vec!["iPhone 15 Pro 256GB Black", "Gift card 5000"]
    );

    // Deleting the bucket sends the iPhone home and discards the manual item
    assert_eq!(store.delete_manual_bucket(&deals), Ok(1));
    assert!(!store.merged().has_category("Deals"));
    let home = store.bucket_listing(&apple);
    assert_eq!(home.len(), 1);
    assert_eq!(home[0].source, ItemSource::Auto);
    assert_eq!(home[0].item.price, Price::from(119990));

    assert_eq!(
        store.delete_manual_bucket(&deals),
        Err(CatalogError::UnknownBucket {
            category: "Deals".to_string(),
            subcategory: "Apple".to_string(),
        })
    );

    // Everything above is on disk
    let reopened = open(&dir);
    assert_eq!(reopened.snapshot(), store.snapshot());
    assert_eq!(reopened.persist_failures(), 0);
}

#[test]
fn test_pinned_price_ignores_reimport() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.import_spreadsheet(FIRST_IMPORT.as_bytes()).unwrap();

    let samsung = Location::new("Phones", "Samsung");
    let listed = store.bucket_listing(&samsung).remove(0);
    assert!(store.set_price(&samsung, &listed.item_ref(), Price::from(99000)));

    let report = store.import_spreadsheet(SECOND_IMPORT.as_bytes()).unwrap();
    assert_eq!(report.sync.prices_updated, 0);

    let listing = store.bucket_listing(&samsung);
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].source, ItemSource::Moved);
    assert_eq!(listing[0].item.price, Price::from(99000));
}

#[test]
fn test_moved_item_dropped_when_missing_from_spreadsheet() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.import_spreadsheet(FIRST_IMPORT.as_bytes()).unwrap();

    let vacuums = Location::new("Vacuum cleaners", "Xiaomi");
    let robots = Location::new("Robots", "Xiaomi");
    assert_eq!(store.move_selection(&vacuums, &robots, "1"), Ok(1));

    let report = store.import_spreadsheet(SECOND_IMPORT.as_bytes()).unwrap();
    assert_eq!(report.sync.moved_dropped, 1);
    assert!(!store.merged().has_category("Robots"));
}

#[test]
fn test_export_and_search_see_the_merged_view() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.import_spreadsheet(FIRST_IMPORT.as_bytes()).unwrap();
    store
        .add_manual_item(&Location::new("Services", "General"), "Screen protector fitting", Price::from(990))
        .unwrap();

    let hits = store.search("jbl");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].category, "Speakers");

    let csv = String::from_utf8(store.export_csv().unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "category/brand,description,price");
    assert_eq!(lines[1], "Phones/Apple,iPhone 15 Pro 256GB Black,129990");
    assert!(lines.contains(&"Services/General,Screen protector fitting,990"));
    assert_eq!(lines.len(), 6);
}
