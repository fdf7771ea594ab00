// 📄 Spreadsheet - tabular import and export
//
// Input: a CSV with a description column and a price column. Headers are
// matched by alias, so "Цена" and "price" both work, and the delimiter is
// sniffed from the header line (`;` is common in localized exports).
//
// Output: three columns, "category/brand", description, integer price.

use crate::catalog::{sort_categories, CatalogTree, Location, Price};
use crate::error::CatalogError;
use anyhow::{Context, Result};
use serde::Serialize;

/// Header names accepted for the description column (case-insensitive)
pub const DESCRIPTION_ALIASES: [&str; 6] = ["description", "desription", "desc", "описание", "наименование", "name"];

/// Header names accepted for the price column (case-insensitive)
pub const PRICE_ALIASES: [&str; 4] = ["price", "цена", "cost", "стоимость"];

/// One usable spreadsheet row
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadsheetRow {
    pub description: String,
    pub price: Price,
}

impl SpreadsheetRow {
    pub fn new(description: impl Into<String>, price: Price) -> Self {
        SpreadsheetRow {
            description: description.into(),
            price,
        }
    }
}

// ============================================================================
// IMPORT
// ============================================================================

/// `;` when the header line has more semicolons than commas
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let semicolons = header.iter().filter(|b| **b == b';').count();
    let commas = header.iter().filter(|b| **b == b',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header = header.trim().trim_start_matches('\u{feff}').to_lowercase();
        aliases.contains(&header.as_str())
    })
}

/// Parse a whole spreadsheet. Fails as a unit: a missing column or a
/// malformed record rejects the file, so no partial catalog is built.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<SpreadsheetRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(sniff_delimiter(bytes))
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers().context("Failed to read spreadsheet header")?.clone();

    let description_col = find_column(&headers, &DESCRIPTION_ALIASES).ok_or_else(|| CatalogError::MissingColumn {
        column: "description",
        accepted: DESCRIPTION_ALIASES.join(", "),
    })?;
    let price_col = find_column(&headers, &PRICE_ALIASES).ok_or_else(|| CatalogError::MissingColumn {
        column: "price",
        accepted: PRICE_ALIASES.join(", "),
    })?;

    let mut rows = Vec::new();
    for (line_num, result) in reader.records().enumerate() {
        // +2: 1-indexed plus the header row
        let record = result.with_context(|| format!("Failed to parse spreadsheet line {}", line_num + 2))?;

        let description = record.get(description_col).unwrap_or("").trim();
        if description.is_empty() {
            tracing::debug!(line = line_num + 2, "skipping row without description");
            continue;
        }

        let price = Price::parse(record.get(price_col).unwrap_or(""));
        rows.push(SpreadsheetRow::new(description, price));
    }

    Ok(rows)
}

// ============================================================================
// EXPORT
// ============================================================================

/// One exported line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "category/brand")]
    pub key: String,
    pub description: String,
    pub price: Option<i64>,
}

/// Flatten a tree into export rows, categories in display order
pub fn export_rows(tree: &CatalogTree) -> Vec<ExportRow> {
    let mut rows = Vec::with_capacity(tree.item_count());
    for category in sort_categories(&tree.category_names()) {
        for (brand, _) in tree.subcategories(&category) {
            let location = Location::new(category.as_str(), brand.as_str());
            for item in tree.bucket(&location) {
                rows.push(ExportRow {
                    key: format!("{}/{}", category, brand),
                    description: item.description.clone(),
                    price: item.price.digits(),
                });
            }
        }
    }
    rows
}

/// Render a tree as CSV; prices without digits become empty cells
pub fn write_export(tree: &CatalogTree) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in export_rows(tree) {
        writer.serialize(&row).context("Failed to write export row")?;
    }
    writer.into_inner().context("Failed to finish export")
}
