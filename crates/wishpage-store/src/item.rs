//! Item types and the partial-update patch

use serde::{Deserialize, Serialize};

/// Wire value meaning "leave this text field unchanged"
pub const TEXT_UNCHANGED: &str = "NULL";

/// Wire value meaning "leave this numeric field unchanged"
pub const NUMBER_UNCHANGED: i64 = -1;

/// One row of the inventory relation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    /// Server-assigned id, never reused
    pub id: i64,
    /// What is wished for
    pub name: String,
    /// Who the item is for
    pub person: String,
    /// Optional shop link, empty when unset
    pub link: String,
    /// Price, unit-agnostic
    pub price: i64,
    /// Remaining reservable units
    pub count: i64,
    /// Free-form grouping label
    pub category: String,
}

/// Payload for creating an item
///
/// `name`, `person` and `category` stay optional here: a missing value is
/// passed through as NULL and rejected by the relation itself. An absent or
/// `null` link, price or count takes its default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NewItemPayload")]
pub struct NewItem {
    pub name: Option<String>,
    pub person: Option<String>,
    pub link: String,
    pub price: i64,
    pub count: i64,
    pub category: Option<String>,
}

fn default_count() -> i64 {
    1
}

/// Wire shape of an insert; `id` is accepted and ignored
#[derive(Deserialize)]
struct NewItemPayload {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    person: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    price: Option<i64>,
    #[serde(default)]
    count: Option<i64>,
    #[serde(default)]
    category: Option<String>,
}

impl From<NewItemPayload> for NewItem {
    fn from(payload: NewItemPayload) -> Self {
        Self {
            name: payload.name,
            person: payload.person,
            link: payload.link.unwrap_or_default(),
            price: payload.price.unwrap_or(0),
            count: payload.count.unwrap_or_else(default_count),
            category: payload.category,
        }
    }
}

impl NewItem {
    /// Create a fully specified item with the default count of one
    pub fn new(
        name: impl Into<String>,
        person: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            person: Some(person.into()),
            link: String::new(),
            price: 0,
            count: default_count(),
            category: Some(category.into()),
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    pub fn with_price(mut self, price: i64) -> Self {
        self.price = price;
        self
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }
}

/// A partial update: `None` leaves the stored field as it is
///
/// Deserializes from the flat update payload. A field that is absent,
/// `null`, [`TEXT_UNCHANGED`] or [`NUMBER_UNCHANGED`] decodes to `None`,
/// so those two sentinel values can never be written through an update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "PatchPayload")]
pub struct ItemPatch {
    pub name: Option<String>,
    pub person: Option<String>,
    pub link: Option<String>,
    pub price: Option<i64>,
    pub count: Option<i64>,
    pub category: Option<String>,
}

impl ItemPatch {
    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.person.is_none()
            && self.link.is_none()
            && self.price.is_none()
            && self.count.is_none()
            && self.category.is_none()
    }

    /// Names of the fields this patch sets
    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("person", self.person.is_some()),
            ("link", self.link.is_some()),
            ("price", self.price.is_some()),
            ("count", self.count.is_some()),
            ("category", self.category.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, set)| set.then_some(field))
        .collect()
    }
}

/// Wire shape of an update; `id` is accepted and ignored
#[derive(Deserialize)]
struct PatchPayload {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    person: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    price: Option<i64>,
    #[serde(default)]
    count: Option<i64>,
    #[serde(default)]
    category: Option<String>,
}

fn text_field(value: Option<String>) -> Option<String> {
    value.filter(|v| v != TEXT_UNCHANGED)
}

fn number_field(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v != NUMBER_UNCHANGED)
}

impl From<PatchPayload> for ItemPatch {
    fn from(payload: PatchPayload) -> Self {
        Self {
            name: text_field(payload.name),
            person: text_field(payload.person),
            link: text_field(payload.link),
            price: number_field(payload.price),
            count: number_field(payload.count),
            category: text_field(payload.category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_item_defaults() {
        let item: NewItem = serde_json::from_str(
            r#"{"name": "Shoes", "person": "Bob", "category": "Specific Item"}"#,
        )
        .unwrap();

        assert_eq!(item.count, 1);
        assert_eq!(item.price, 0);
        assert_eq!(item.link, "");
        assert_eq!(item.name.as_deref(), Some("Shoes"));
    }

    #[test]
    fn test_new_item_ignores_id() {
        let item: NewItem = serde_json::from_str(
            r#"{"id": -1, "name": "Shirt", "person": "Bob", "price": 25, "count": 3, "category": "Specific Item"}"#,
        )
        .unwrap();

        assert_eq!(item.count, 3);
        assert_eq!(item.price, 25);
    }

    #[test]
    fn test_new_item_null_fields_take_defaults() {
        // Cleared number inputs arrive as null from the form
        let item: NewItem = serde_json::from_str(
            r#"{"id": -1, "name": "Socks", "person": "Bob", "link": null,
                "price": null, "count": null, "category": "Specific Item"}"#,
        )
        .unwrap();

        assert_eq!(item, NewItem::new("Socks", "Bob", "Specific Item"));
    }

    #[test]
    fn test_new_item_missing_name_is_none() {
        let item: NewItem = serde_json::from_str(r#"{"person": "Bob", "category": "x"}"#).unwrap();
        assert!(item.name.is_none());
    }

    #[test]
    fn test_all_sentinel_patch_is_empty() {
        let patch: ItemPatch = serde_json::from_str(
            r#"{"id": -1, "name": "NULL", "person": "NULL", "link": "NULL",
                "price": -1, "count": -1, "category": "NULL"}"#,
        )
        .unwrap();

        assert!(patch.is_empty());
        assert!(patch.changed_fields().is_empty());
    }

    #[test]
    fn test_absent_fields_are_unchanged() {
        let patch: ItemPatch = serde_json::from_str(r#"{"count": 4}"#).unwrap();

        assert_eq!(patch.count, Some(4));
        assert_eq!(patch.changed_fields(), vec!["count"]);
    }

    #[rstest]
    #[case(r#"{"name": "Socks"}"#, "name")]
    #[case(r#"{"person": "Alice", "price": -1}"#, "person")]
    #[case(r#"{"link": "", "name": "NULL"}"#, "link")]
    #[case(r#"{"price": 0, "count": null}"#, "price")]
    #[case(r#"{"count": 0}"#, "count")]
    #[case(r#"{"category": "Books", "link": null}"#, "category")]
    fn test_single_field_patch(#[case] payload: &str, #[case] field: &str) {
        let patch: ItemPatch = serde_json::from_str(payload).unwrap();
        assert_eq!(patch.changed_fields(), vec![field]);
    }

    #[test]
    fn test_item_json_field_names() {
        let item = Item {
            id: 7,
            name: "Pants".to_string(),
            person: "Alice".to_string(),
            link: "https://www.amazon.de".to_string(),
            price: 55,
            count: 2,
            category: "Specific Item".to_string(),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["person"], "Alice");
        assert_eq!(json["count"], 2);
        assert_eq!(json["category"], "Specific Item");
    }
}
