// ✋ Curation - admin edits across the three sources
//
// Every operation addresses items by value (`ItemRef`), never by position.
// A reference to an item that is already gone is skipped, so two admins
// acting on the same list cannot corrupt it.

use crate::catalog::{CatalogSources, Item, ItemRef, ItemSource, ListedItem, Location, Price};
use crate::classifier::Classifier;
use crate::error::CatalogError;

// ============================================================================
// RELOCATION
// ============================================================================

/// Re-file selected items from `from` to `to`. Returns how many moved.
///
/// - auto items go to moved-overrides and remember `from` as their home
/// - moved items are re-homed with their original home untouched
/// - manual items stay manual
pub fn move_items(sources: &mut CatalogSources, from: &Location, to: &Location, refs: &[ItemRef]) -> usize {
    if from == to {
        return 0;
    }

    let mut moved = 0;
    for item_ref in refs {
        let Some(item) = sources
            .get_mut(item_ref.source)
            .take(from, &item_ref.description, &item_ref.price)
        else {
            tracing::debug!(description = %item_ref.description, "item already gone, skipping move");
            continue;
        };

        match item_ref.source {
            ItemSource::Auto => sources.moved.push(to, item.relocated_from(from)),
            ItemSource::Moved => sources.moved.push(to, item),
            ItemSource::Manual => sources.manual.push(to, item),
        }
        moved += 1;
    }

    tracing::info!(from = %from, to = %to, moved, "relocated items");
    moved
}

// ============================================================================
// MANUAL BUCKET DELETION
// ============================================================================

/// Send a moved item back to auto-catalog: to its recorded home, or
/// wherever the classifier puts it when no home was recorded.
fn restore(sources: &mut CatalogSources, classifier: &Classifier, item: Item) {
    let home = item.original_location().unwrap_or_else(|| {
        let (category, subcategory) = classifier.classify(&item.description);
        Location::new(category, subcategory)
    });
    tracing::debug!(description = %item.description, home = %home, "restoring moved item");
    sources.auto.push(&home, item.into_auto());
}

/// Delete a curated bucket. Moved items filed there are restored to the
/// auto-catalog first; manual items are discarded. Returns the number of
/// restored items.
pub fn delete_manual_bucket(
    sources: &mut CatalogSources,
    classifier: &Classifier,
    location: &Location,
) -> Result<usize, CatalogError> {
    if !sources.manual.has_bucket(location) && !sources.moved.has_bucket(location) {
        return Err(CatalogError::UnknownBucket {
            category: location.category.clone(),
            subcategory: location.subcategory.clone(),
        });
    }

    let relocated = sources.moved.remove_bucket(location);
    let restored = relocated.len();
    for item in relocated {
        restore(sources, classifier, item);
    }

    let discarded = sources.manual.remove_bucket(location).len();
    tracing::info!(bucket = %location, restored, discarded, "deleted manual bucket");
    Ok(restored)
}

/// Delete every curated bucket of a category. Returns the number of
/// restored items.
pub fn delete_manual_category(
    sources: &mut CatalogSources,
    classifier: &Classifier,
    category: &str,
) -> Result<usize, CatalogError> {
    if !sources.manual.has_category(category) && !sources.moved.has_category(category) {
        return Err(CatalogError::UnknownBucket {
            category: category.to_string(),
            subcategory: "*".to_string(),
        });
    }

    let mut restored = 0;
    for (_, items) in sources.moved.remove_category(category) {
        restored += items.len();
        for item in items {
            restore(sources, classifier, item);
        }
    }

    sources.manual.remove_category(category);
    tracing::info!(category, restored, "deleted manual category");
    Ok(restored)
}

// ============================================================================
// MANUAL ITEMS AND PRICES
// ============================================================================

fn required<'a>(value: &'a str, what: &'static str) -> Result<&'a str, CatalogError> {
    let value = value.trim();
    if value.is_empty() {
        Err(CatalogError::EmptyName(what))
    } else {
        Ok(value)
    }
}

/// Append a hand-entered item, creating its category and brand as needed
pub fn add_manual_item(
    sources: &mut CatalogSources,
    location: &Location,
    description: &str,
    price: Price,
) -> Result<Item, CatalogError> {
    let location = Location::new(
        required(&location.category, "category")?,
        required(&location.subcategory, "brand")?,
    );
    let item = Item::manual(required(description, "description")?, price);
    sources.manual.push(&location, item.clone());
    tracing::info!(bucket = %location, description = %item.description, "added manual item");
    Ok(item)
}

/// Fix an item's price so imports leave it alone. Auto items are pinned
/// into moved-overrides at their current location, since the auto-catalog
/// is rebuilt on every import. Returns false when the item is gone.
pub fn set_price(sources: &mut CatalogSources, location: &Location, item_ref: &ItemRef, price: Price) -> bool {
    match item_ref.source {
        ItemSource::Auto => {
            let Some(mut item) = sources.auto.take(location, &item_ref.description, &item_ref.price) else {
                return false;
            };
            item.price = price;
            item.locked = true;
            sources.moved.push(location, item.relocated_from(location));
        }
        source => {
            let Some(item) = sources
                .get_mut(source)
                .find_mut(location, &item_ref.description, &item_ref.price)
            else {
                return false;
            };
            item.price = price;
            item.locked = true;
        }
    }
    tracing::info!(bucket = %location, description = %item_ref.description, "price set");
    true
}

/// Remove selected items from whichever source holds them.
/// Deleted auto items reappear on the next import.
pub fn delete_items(sources: &mut CatalogSources, location: &Location, refs: &[ItemRef]) -> usize {
    let deleted = refs
        .iter()
        .filter(|item_ref| {
            sources
                .get_mut(item_ref.source)
                .take(location, &item_ref.description, &item_ref.price)
                .is_some()
        })
        .count();
    tracing::info!(bucket = %location, deleted, "deleted items");
    deleted
}

// ============================================================================
// SELECTION
// ============================================================================

/// Parse "3", "1,4,7", "2-5" or mixes of them into sorted, distinct
/// 1-based numbers, each within `1..=len`.
pub fn parse_selection(input: &str, len: usize) -> Result<Vec<usize>, CatalogError> {
    let mut selected = Vec::new();

    for token in input.split(|c: char| c == ',' || c.is_whitespace()) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let (start, end) = match token.split_once('-') {
            Some((a, b)) => (parse_number(a, token)?, parse_number(b, token)?),
            None => {
                let n = parse_number(token, token)?;
                (n, n)
            }
        };
        let (start, end) = if start <= end { (start, end) } else { (end, start) };

        for index in [start, end] {
            if index == 0 || index > len {
                return Err(CatalogError::SelectionOutOfRange { index, len });
            }
        }
        selected.extend(start..=end);
    }

    if selected.is_empty() {
        return Err(CatalogError::EmptySelection);
    }
    selected.sort_unstable();
    selected.dedup();
    Ok(selected)
}

fn parse_number(text: &str, token: &str) -> Result<usize, CatalogError> {
    text.trim()
        .parse()
        .map_err(|_| CatalogError::InvalidSelection(token.to_string()))
}

/// Resolve selected numbers against a listing
pub fn select(listing: &[ListedItem], numbers: &[usize]) -> Vec<ItemRef> {
    listing
        .iter()
        .filter(|listed| numbers.contains(&listed.number))
        .map(ListedItem::item_ref)
        .collect()
}
