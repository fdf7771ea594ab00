// ⚠️ Validation Errors - what an admin action can get wrong
// Each variant is reported back to the actor as-is; none of them mutates state.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// User identifiers must be numeric
    #[error("identifier must be numeric, got {0:?}")]
    InvalidIdentifier(String),

    /// Category, brand or item name left blank
    #[error("{0} must not be empty")]
    EmptyName(&'static str),

    #[error("no items selected")]
    EmptySelection,

    /// A selection token that is neither a number nor a range
    #[error("cannot read selection {0:?}: use numbers like 1,3 or ranges like 2-5")]
    InvalidSelection(String),

    #[error("item number {index} is out of range (1-{len})")]
    SelectionOutOfRange { index: usize, len: usize },

    #[error("no such bucket: {category} / {subcategory}")]
    UnknownBucket {
        category: String,
        subcategory: String,
    },

    /// Spreadsheet header is missing a required logical column
    #[error("spreadsheet has no {column} column (accepted headers: {accepted})")]
    MissingColumn {
        column: &'static str,
        accepted: String,
    },

    #[error("user {0} is not an administrator")]
    NotAuthorized(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_readable() {
        let err = CatalogError::SelectionOutOfRange { index: 9, len: 4 };
        assert_eq!(err.to_string(), "item number 9 is out of range (1-4)");

        let err = CatalogError::InvalidIdentifier("abc".to_string());
        assert_eq!(err.to_string(), "identifier must be numeric, got \"abc\"");
    }
}
