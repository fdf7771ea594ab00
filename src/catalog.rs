// 🗂️ Catalog Tree - category → brand → ordered item list
//
// Three independently persisted trees feed one merged view:
//   auto   - rebuilt from the classifier on every spreadsheet import
//   moved  - auto items an admin re-filed elsewhere (remembers where they came from)
//   manual - hand-entered categories, brands and items
//
// Browsing, search and export always read the merged view, so each source
// stays editable on its own.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Catch-all category, always listed last
pub const OTHER_CATEGORY: &str = "Other";

/// Subcategory used when no brand could be resolved
pub const GENERAL_SUBCATEGORY: &str = "General";

/// Categories shown first, in this order
pub const PREFERRED_CATEGORY_ORDER: [&str; 3] = ["Phones", "Tablets", "Laptops"];

// ============================================================================
// PRICE
// ============================================================================

/// Price as it came from the spreadsheet or an admin.
///
/// Spreadsheets carry both numeric cells and free text ("от 12 990"),
/// so both are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(serde_json::Number),
    Text(String),
    #[default]
    Missing,
}

impl Price {
    /// Read a raw cell: numbers stay numbers, empty cells become `Missing`
    pub fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() {
            return Price::Missing;
        }
        if let Ok(n) = cell.parse::<i64>() {
            return Price::Number(n.into());
        }
        // "129990.0" is a spreadsheet float; anything with a real fraction stays as written
        if let Ok(f) = cell.parse::<f64>() {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                return Price::Number((f as i64).into());
            }
        }
        Price::Text(cell.to_string())
    }

    /// Integer form used by export: every non-digit character of the
    /// written form is dropped, for numbers and text alike.
    /// Empty or digit-free prices have no integer form.
    pub fn digits(&self) -> Option<i64> {
        let written = match self {
            Price::Number(n) => n.to_string(),
            Price::Text(s) => s.clone(),
            Price::Missing => return None,
        };
        let digits: String = written.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Price::Missing => true,
            Price::Text(s) => s.trim().is_empty(),
            Price::Number(_) => false,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Number(n) => write!(f, "{}", n),
            Price::Text(s) => write!(f, "{}", s.trim()),
            Price::Missing => Ok(()),
        }
    }
}

impl From<i64> for Price {
    fn from(value: i64) -> Self {
        Price::Number(value.into())
    }
}

impl From<&str> for Price {
    fn from(value: &str) -> Self {
        Price::parse(value)
    }
}

// ============================================================================
// ITEM
// ============================================================================

/// How an item first entered the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Auto,
    Manual,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One catalog line: description plus price, with relocation metadata
/// when the item was moved away from its classified home.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "desc", alias = "description")]
    pub description: String,

    #[serde(default)]
    pub price: Price,

    /// Price was fixed by hand; imports must not overwrite it
    #[serde(rename = "price_locked", alias = "locked", default, skip_serializing_if = "is_false")]
    pub locked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,

    #[serde(rename = "orig_cat", default, skip_serializing_if = "Option::is_none")]
    pub orig_category: Option<String>,

    #[serde(rename = "orig_sub", default, skip_serializing_if = "Option::is_none")]
    pub orig_subcategory: Option<String>,
}

impl Item {
    /// Plain auto-classified item
    pub fn new(description: impl Into<String>, price: Price) -> Self {
        Item {
            description: description.into(),
            price,
            locked: false,
            origin: None,
            orig_category: None,
            orig_subcategory: None,
        }
    }

    /// Hand-entered item. A given price is locked; a blank one stays open
    /// so the next import can fill it in.
    pub fn manual(description: impl Into<String>, price: Price) -> Self {
        Item {
            locked: !price.is_missing(),
            origin: Some(Origin::Manual),
            ..Item::new(description, price)
        }
    }

    /// Copy of an auto item re-filed away from `home`
    pub fn relocated_from(mut self, home: &Location) -> Self {
        self.origin = Some(Origin::Auto);
        self.orig_category = Some(home.category.clone());
        self.orig_subcategory = Some(home.subcategory.clone());
        self
    }

    /// Where a moved item originally belonged, if recorded
    pub fn original_location(&self) -> Option<Location> {
        match (&self.orig_category, &self.orig_subcategory) {
            (Some(category), Some(subcategory)) => Some(Location::new(category, subcategory)),
            _ => None,
        }
    }

    /// Drop relocation metadata so the item looks freshly classified again
    pub fn into_auto(self) -> Self {
        Item {
            description: self.description,
            price: self.price,
            locked: false,
            origin: None,
            orig_category: None,
            orig_subcategory: None,
        }
    }

    pub fn normalized_description(&self) -> String {
        normalize_description(&self.description)
    }

    /// Exact value identity used by selections
    pub fn is(&self, description: &str, price: &Price) -> bool {
        self.description == description && &self.price == price
    }

    /// Listing line: description, then price when there is one
    pub fn display_line(&self) -> String {
        if self.price.is_missing() {
            self.description.clone()
        } else {
            format!("{} — {}", self.description, self.price)
        }
    }
}

/// Trim, lowercase and collapse inner whitespace
pub fn normalize_description(description: &str) -> String {
    description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ============================================================================
// SOURCES AND LOCATIONS
// ============================================================================

/// Which of the three trees holds an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    Auto,
    Moved,
    Manual,
}

impl ItemSource {
    /// Merge order
    pub const ALL: [ItemSource; 3] = [ItemSource::Auto, ItemSource::Moved, ItemSource::Manual];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemSource::Auto => "auto",
            ItemSource::Moved => "moved",
            ItemSource::Manual => "manual",
        }
    }
}

/// A (category, subcategory) bucket address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub category: String,
    pub subcategory: String,
}

impl Location {
    pub fn new(category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        Location {
            category: category.into(),
            subcategory: subcategory.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.category, self.subcategory)
    }
}

/// Selection of one item by value, not by position, so it stays valid
/// while other actions reshuffle the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRef {
    pub source: ItemSource,
    pub description: String,
    #[serde(default)]
    pub price: Price,
}

impl ItemRef {
    pub fn new(source: ItemSource, item: &Item) -> Self {
        ItemRef {
            source,
            description: item.description.clone(),
            price: item.price.clone(),
        }
    }
}

/// Numbered line of a merged bucket, as shown to admins
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedItem {
    /// 1-based
    pub number: usize,
    pub source: ItemSource,
    pub item: Item,
}

impl ListedItem {
    pub fn item_ref(&self) -> ItemRef {
        ItemRef::new(self.source, &self.item)
    }
}

// ============================================================================
// CATALOG TREE
// ============================================================================

type Bucket = Vec<Item>;
type Brands = IndexMap<String, Bucket>;

/// category → brand → items, insertion ordered at every level.
///
/// No empty brand list or empty category is kept after a removal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogTree {
    categories: IndexMap<String, Brands>,
}

impl CatalogTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Append an item, creating the category and brand when absent
    pub fn push(&mut self, location: &Location, item: Item) {
        self.categories
            .entry(location.category.clone())
            .or_default()
            .entry(location.subcategory.clone())
            .or_default()
            .push(item);
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Brands of one category with their item counts, in insertion order
    pub fn subcategories(&self, category: &str) -> Vec<(String, usize)> {
        self.categories
            .get(category)
            .map(|brands| {
                brands
                    .iter()
                    .map(|(name, items)| (name.clone(), items.len()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn bucket(&self, location: &Location) -> &[Item] {
        self.categories
            .get(&location.category)
            .and_then(|brands| brands.get(&location.subcategory))
            .map(|items| items.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_bucket(&self, location: &Location) -> bool {
        self.categories
            .get(&location.category)
            .map_or(false, |brands| brands.contains_key(&location.subcategory))
    }

    /// Every item with its address, in tree order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Item)> {
        self.categories.iter().flat_map(|(category, brands)| {
            brands.iter().flat_map(move |(brand, items)| {
                items
                    .iter()
                    .map(move |item| (category.as_str(), brand.as_str(), item))
            })
        })
    }

    pub fn item_count(&self) -> usize {
        self.categories
            .values()
            .flat_map(|brands| brands.values())
            .map(|items| items.len())
            .sum()
    }

    pub fn category_count(&self, category: &str) -> usize {
        self.categories
            .get(category)
            .map(|brands| brands.values().map(|items| items.len()).sum())
            .unwrap_or(0)
    }

    /// Remove the first item of a bucket matching `description`/`price`
    pub fn take(&mut self, location: &Location, description: &str, price: &Price) -> Option<Item> {
        let items = self
            .categories
            .get_mut(&location.category)?
            .get_mut(&location.subcategory)?;
        let position = items.iter().position(|item| item.is(description, price))?;
        let item = items.remove(position);
        self.prune(location);
        Some(item)
    }

    /// Mutable access to the first item of a bucket matching `description`/`price`
    pub fn find_mut(&mut self, location: &Location, description: &str, price: &Price) -> Option<&mut Item> {
        self.categories
            .get_mut(&location.category)?
            .get_mut(&location.subcategory)?
            .iter_mut()
            .find(|item| item.is(description, price))
    }

    pub fn remove_bucket(&mut self, location: &Location) -> Vec<Item> {
        let removed = self
            .categories
            .get_mut(&location.category)
            .and_then(|brands| brands.shift_remove(&location.subcategory))
            .unwrap_or_default();
        self.prune(location);
        removed
    }

    /// Remove a whole category, returning its buckets in order
    pub fn remove_category(&mut self, category: &str) -> Vec<(String, Vec<Item>)> {
        self.categories
            .shift_remove(category)
            .map(|brands| brands.into_iter().collect())
            .unwrap_or_default()
    }

    /// Keep only items for which `keep` returns true, then drop empty containers
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &str, &mut Item) -> bool,
    {
        for (category, brands) in self.categories.iter_mut() {
            for (brand, items) in brands.iter_mut() {
                items.retain_mut(|item| keep(category, brand, item));
            }
            brands.retain(|_, items| !items.is_empty());
        }
        self.categories.retain(|_, brands| !brands.is_empty());
    }

    /// Append every item of `other`, keeping its order
    pub fn absorb(&mut self, other: &CatalogTree) {
        for (category, brands) in &other.categories {
            let target = self.categories.entry(category.clone()).or_default();
            for (brand, items) in brands {
                target
                    .entry(brand.clone())
                    .or_default()
                    .extend(items.iter().cloned());
            }
        }
    }

    pub fn normalized_descriptions(&self) -> HashSet<String> {
        self.iter()
            .map(|(_, _, item)| item.normalized_description())
            .collect()
    }

    fn prune(&mut self, location: &Location) {
        let empty_category = match self.categories.get_mut(&location.category) {
            Some(brands) => {
                if brands
                    .get(&location.subcategory)
                    .map_or(false, |items| items.is_empty())
                {
                    brands.shift_remove(&location.subcategory);
                }
                brands.is_empty()
            }
            None => false,
        };
        if empty_category {
            self.categories.shift_remove(&location.category);
        }
    }
}

/// Union view: a copy of `auto` with every `moved` and `manual` item appended.
/// The inputs are left untouched.
pub fn merge(auto: &CatalogTree, moved: &CatalogTree, manual: &CatalogTree) -> CatalogTree {
    let mut merged = auto.clone();
    merged.absorb(moved);
    merged.absorb(manual);
    merged
}

/// Display order: preferred categories first, the rest alphabetically,
/// "Other" last.
pub fn sort_categories<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let present: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();

    let mut ordered: Vec<String> = PREFERRED_CATEGORY_ORDER
        .iter()
        .filter(|preferred| present.contains(preferred))
        .map(|name| name.to_string())
        .collect();

    let mut rest: Vec<String> = present
        .iter()
        .filter(|name| !PREFERRED_CATEGORY_ORDER.contains(name) && **name != OTHER_CATEGORY)
        .map(|name| name.to_string())
        .collect();
    rest.sort();
    rest.dedup();
    ordered.extend(rest);

    if present.contains(&OTHER_CATEGORY) {
        ordered.push(OTHER_CATEGORY.to_string());
    }
    ordered
}

// ============================================================================
// THE THREE SOURCES
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSources {
    pub auto: CatalogTree,
    pub moved: CatalogTree,
    pub manual: CatalogTree,
}

impl CatalogSources {
    pub fn get(&self, source: ItemSource) -> &CatalogTree {
        match source {
            ItemSource::Auto => &self.auto,
            ItemSource::Moved => &self.moved,
            ItemSource::Manual => &self.manual,
        }
    }

    pub fn get_mut(&mut self, source: ItemSource) -> &mut CatalogTree {
        match source {
            ItemSource::Auto => &mut self.auto,
            ItemSource::Moved => &mut self.moved,
            ItemSource::Manual => &mut self.manual,
        }
    }

    pub fn merged(&self) -> CatalogTree {
        merge(&self.auto, &self.moved, &self.manual)
    }

    pub fn total_items(&self) -> usize {
        ItemSource::ALL
            .iter()
            .map(|source| self.get(*source).item_count())
            .sum()
    }

    /// Merged bucket as a numbered list, in merge order
    pub fn bucket_listing(&self, location: &Location) -> Vec<ListedItem> {
        ItemSource::ALL
            .iter()
            .flat_map(|source| {
                self.get(*source)
                    .bucket(location)
                    .iter()
                    .map(move |item| (*source, item.clone()))
            })
            .enumerate()
            .map(|(i, (source, item))| ListedItem {
                number: i + 1,
                source,
                item,
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn loc(category: &str, subcategory: &str) -> Location {
        Location::new(category, subcategory)
    }

    fn sample_sources() -> CatalogSources {
        let mut sources = CatalogSources::default();
        sources
            .auto
            .push(&loc("Phones", "Apple"), Item::new("iPhone 15 128GB", 79990.into()));
        sources
            .auto
            .push(&loc("Laptops", "Apple"), Item::new("MacBook Air 13\" M2", 99990.into()));
        sources.moved.push(
            &loc("Phones", "Apple"),
            Item::new("iPhone 13 mini", 49990.into()).relocated_from(&loc("Other", "General")),
        );
        sources
            .manual
            .push(&loc("Gifts", "General"), Item::manual("Gift card", "5000".into()));
        sources
    }

    #[test]
    fn test_merge_appends_moved_and_manual() {
        let sources = sample_sources();
        let merged = sources.merged();

        let phones = merged.bucket(&loc("Phones", "Apple"));
        assert_eq!(phones.len(), 2);
        assert_eq!(phones[0].description, "iPhone 15 128GB");
        assert_eq!(phones[1].description, "iPhone 13 mini");
        assert_eq!(merged.bucket(&loc("Gifts", "General")).len(), 1);
        assert_eq!(merged.item_count(), sources.total_items());
    }

    #[test]
    fn test_merge_is_idempotent_and_pure() {
        let sources = sample_sources();
        let before = sources.clone();

        let first = sources.merged();
        let second = sources.merged();

        assert_eq!(first, second);
        assert_eq!(sources, before);
    }

    #[test]
    fn test_take_prunes_empty_containers() {
        let mut tree = CatalogTree::new();
        let at = loc("Phones", "Apple");
        tree.push(&at, Item::new("iPhone 15", 1.into()));

        let taken = tree.take(&at, "iPhone 15", &1.into());
        assert!(taken.is_some());
        assert!(tree.is_empty());

        // Already gone: no-op
        assert!(tree.take(&at, "iPhone 15", &1.into()).is_none());
    }

    #[test]
    fn test_take_matches_price_too() {
        let mut tree = CatalogTree::new();
        let at = loc("Phones", "Apple");
        tree.push(&at, Item::new("iPhone 15", 1.into()));
        tree.push(&at, Item::new("iPhone 15", 2.into()));

        let taken = tree.take(&at, "iPhone 15", &2.into()).unwrap();
        assert_eq!(taken.price, Price::from(2));
        assert_eq!(tree.bucket(&at).len(), 1);
    }

    #[test]
    fn test_sort_categories() {
        let names = vec!["Other", "Watches", "Laptops", "Accessories", "Phones"];
        assert_eq!(
            sort_categories(&names),
            vec!["Phones", "Laptops", "Accessories", "Watches", "Other"]
        );
    }

    #[test]
    fn test_bucket_listing_numbers_in_merge_order() {
        let sources = sample_sources();
        let listing = sources.bucket_listing(&loc("Phones", "Apple"));

        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].number, 1);
        assert_eq!(listing[0].source, ItemSource::Auto);
        assert_eq!(listing[1].number, 2);
        assert_eq!(listing[1].source, ItemSource::Moved);
    }

    #[test]
    fn test_price_parse_and_digits() {
        assert_eq!(Price::parse(""), Price::Missing);
        assert_eq!(Price::parse("129990"), Price::from(129990));
        assert_eq!(Price::parse("129990.0"), Price::from(129990));
        assert_eq!(Price::parse("12 990 ₽"), Price::Text("12 990 ₽".to_string()));

        assert_eq!(Price::parse("12 990 ₽").digits(), Some(12990));
        assert_eq!(Price::from(5000).digits(), Some(5000));
        assert_eq!(Price::Text("по запросу".to_string()).digits(), None);
        assert_eq!(Price::Missing.digits(), None);
    }

    #[test]
    fn test_fractional_prices_keep_every_digit() {
        assert_eq!(Price::parse("990.50"), Price::Text("990.50".to_string()));
        assert_eq!(Price::parse("990.50").digits(), Some(99050));
        assert_eq!(Price::parse("990,50").digits(), Some(99050));

        // Fractional numbers loaded from a JSON document follow the same rule
        let stored: Price = serde_json::from_str("990.5").unwrap();
        assert_eq!(stored.digits(), Some(9905));
    }

    #[test]
    fn test_item_json_shape() {
        let auto = Item::new("iPhone 15", 79990.into());
        assert_eq!(
            serde_json::to_value(&auto).unwrap(),
            serde_json::json!({"desc": "iPhone 15", "price": 79990})
        );

        let moved = Item::new("iPhone 15", 79990.into()).relocated_from(&loc("Other", "General"));
        assert_eq!(
            serde_json::to_value(&moved).unwrap(),
            serde_json::json!({
                "desc": "iPhone 15",
                "price": 79990,
                "origin": "auto",
                "orig_cat": "Other",
                "orig_sub": "General"
            })
        );

        let manual: Item =
            serde_json::from_value(serde_json::json!({"desc": "Gift card", "price": "5000", "price_locked": true}))
                .unwrap();
        assert!(manual.locked);
        assert_eq!(manual.price, Price::Text("5000".to_string()));
    }

    #[test]
    fn test_tree_json_round_trip_keeps_order() {
        let json = r#"{"Phones":{"Samsung":[{"desc":"S24","price":1}],"Apple":[{"desc":"iPhone","price":null}]}}"#;
        let tree: CatalogTree = serde_json::from_str(json).unwrap();

        assert_eq!(
            tree.subcategories("Phones"),
            vec![("Samsung".to_string(), 1), ("Apple".to_string(), 1)]
        );
        assert_eq!(tree.bucket(&loc("Phones", "Apple"))[0].price, Price::Missing);
        assert_eq!(serde_json::to_string(&tree).unwrap(), json);
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description("  iPhone   15\tPro "), "iphone 15 pro");
    }
}
