// 🔍 Search - query the merged catalog
//
// First non-empty tier wins:
//   0. "macbook..." queries look only at Laptops / Apple
//   1. exact brand name, across all categories
//   2. category name: exact, prefix, or the query extends the name
//   3. substring of an item description
//
// Names are compared against the query as typed (trimmed, lowercased), so
// "Insta360" still hits its brand. Only descriptions get letter/digit splitting.

use crate::catalog::{normalize_description, sort_categories, CatalogTree, Item, Location};
use serde::Serialize;

const MACBOOK_PREFIX: &str = "macbook";
const MACBOOK_CATEGORY: &str = "Laptops";
const MACBOOK_BRAND: &str = "Apple";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub category: String,
    pub subcategory: String,
    pub item: Item,
}

/// Collapse whitespace, lowercase and split letter/digit runs: "iPhone16" → "iphone 16"
pub fn normalize_query(query: &str) -> String {
    let lower = normalize_description(query);
    let mut out = String::with_capacity(lower.len() + 4);
    let mut prev: Option<char> = None;

    for c in lower.chars() {
        if let Some(p) = prev {
            let boundary = (p.is_alphabetic() && c.is_ascii_digit()) || (p.is_ascii_digit() && c.is_alphabetic());
            if boundary {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase()
}

fn hits_in<'a, F>(catalog: &'a CatalogTree, mut keep: F) -> Vec<SearchHit>
where
    F: FnMut(&str, &str, &'a Item) -> bool,
{
    let mut hits = Vec::new();
    for category in sort_categories(&catalog.category_names()) {
        for (brand, _) in catalog.subcategories(&category) {
            let location = Location::new(category.as_str(), brand.as_str());
            for item in catalog.bucket(&location) {
                if keep(&category, &brand, item) {
                    hits.push(SearchHit {
                        category: category.clone(),
                        subcategory: brand.clone(),
                        item: item.clone(),
                    });
                }
            }
        }
    }
    hits
}

/// Search the merged catalog. An empty query finds nothing.
pub fn search(query: &str, catalog: &CatalogTree) -> Vec<SearchHit> {
    let q = normalize_description(query);
    if q.is_empty() {
        return Vec::new();
    }

    let compact_query = compact(&q);
    if compact_query.starts_with(MACBOOK_PREFIX) {
        let location = Location::new(MACBOOK_CATEGORY, MACBOOK_BRAND);
        return catalog
            .bucket(&location)
            .iter()
            .filter(|item| compact(&item.description).contains(&compact_query))
            .map(|item| SearchHit {
                category: location.category.clone(),
                subcategory: location.subcategory.clone(),
                item: item.clone(),
            })
            .collect();
    }

    let by_brand = hits_in(catalog, |_, brand, _| brand.to_lowercase() == q);
    if !by_brand.is_empty() {
        return by_brand;
    }

    let by_category = hits_in(catalog, |category, _, _| {
        let category = category.to_lowercase();
        category == q || category.starts_with(&q) || q.starts_with(&category)
    });
    if !by_category.is_empty() {
        return by_category;
    }

    let split = normalize_query(query);
    hits_in(catalog, |_, _, item| normalize_query(&item.description).contains(&split))
}
