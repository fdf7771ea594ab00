// 🔑 Admin List - who may curate the catalog
// Persisted as {"admins": [user_id, ...]}

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminList {
    #[serde(default)]
    admins: Vec<i64>,
}

impl AdminList {
    pub fn new(admins: impl IntoIterator<Item = i64>) -> Self {
        let mut list = AdminList::default();
        for id in admins {
            list.add(id);
        }
        list
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.contains(&user_id)
    }

    /// Returns false when already present
    pub fn add(&mut self, user_id: i64) -> bool {
        if self.is_admin(user_id) {
            return false;
        }
        self.admins.push(user_id);
        true
    }

    /// Returns false when not present
    pub fn remove(&mut self, user_id: i64) -> bool {
        let before = self.admins.len();
        self.admins.retain(|id| *id != user_id);
        self.admins.len() != before
    }

    /// Merge ids that must always be admins (from configuration)
    pub fn seed(&mut self, user_ids: &[i64]) {
        for id in user_ids {
            self.add(*id);
        }
    }

    pub fn ids(&self) -> &[i64] {
        &self.admins
    }

    /// Fail with `NotAuthorized` unless `user_id` is an admin
    pub fn authorize(&self, user_id: i64) -> Result<(), CatalogError> {
        if self.is_admin(user_id) {
            Ok(())
        } else {
            Err(CatalogError::NotAuthorized(user_id))
        }
    }
}

/// User ids arrive as text from every surface
pub fn parse_user_id(text: &str) -> Result<i64, CatalogError> {
    let text = text.trim();
    text.parse()
        .map_err(|_| CatalogError::InvalidIdentifier(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut admins = AdminList::new([1, 2, 2]);
        assert_eq!(admins.ids(), &[1, 2]);

        assert!(admins.add(3));
        assert!(!admins.add(3));
        assert!(admins.remove(1));
        assert!(!admins.remove(1));
        assert_eq!(admins.ids(), &[2, 3]);
    }

    #[test]
    fn test_authorize() {
        let admins = AdminList::new([42]);
        assert!(admins.authorize(42).is_ok());
        assert_eq!(admins.authorize(7), Err(CatalogError::NotAuthorized(7)));
    }

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id(" 12345 "), Ok(12345));
        assert_eq!(parse_user_id("12a"), Err(CatalogError::InvalidIdentifier("12a".to_string())));
    }

    #[test]
    fn test_json_shape() {
        let admins: AdminList = serde_json::from_str(r#"{"admins": [5, 6]}"#).unwrap();
        assert!(admins.is_admin(6));
        assert_eq!(serde_json::to_string(&admins).unwrap(), r#"{"admins":[5,6]}"#);
    }
}
