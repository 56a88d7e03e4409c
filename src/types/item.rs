//! Rebuilt-input content items.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One line of a rebuilt `(collection, year)` file.
///
/// Only `id`, `lg` and `ft` feed the core; `tp`, `ts` and `cc` pass through
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    /// provider-supplied language code, possibly wrong or absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lg: Option<String>,
    /// full text body
    #[serde(default)]
    pub ft: Option<String>,
}

impl ContentItem {
    pub fn text(&self) -> &str {
        self.ft.as_deref().unwrap_or("")
    }
}

/// Collection acronym of an item id (`EXP-1898-07-01-a-i0001` → `EXP`).
pub fn collection_of(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}

/// Publication year of an item id (`EXP-1898-07-01-a-i0001` → 1898).
pub fn year_of(id: &str) -> Option<u16> {
    id.split('-').nth(1).and_then(|y| y.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_derivation() {
        assert_eq!(collection_of("EXP-1898-07-01-a-i0001"), "EXP");
        assert_eq!(year_of("EXP-1898-07-01-a-i0001"), Some(1898));
    }

    #[test]
    fn degenerate_ids() {
        assert_eq!(collection_of("EXP"), "EXP");
        assert_eq!(year_of("EXP"), None);
        assert_eq!(year_of("EXP-notayear-x"), None);
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let item: ContentItem =
            serde_json::from_str(r#"{"id":"GDL-1900-01-01-a-i0002","ft":"Bonjour"}"#).unwrap();
        assert_eq!(item.text(), "Bonjour");
        assert!(item.lg.is_none());
        assert!(item.tp.is_none());
    }
}
