//! Fixed sample data for development mode

use crate::item::NewItem;

const SHOP_LINK: &str = "https://www.amazon.de";

/// The five sample items loaded by [`crate::ItemStore::reset_with_sample_data`]
pub fn sample_items() -> Vec<NewItem> {
    vec![
        NewItem::new("Lunch together at a Biergarten", "Bob", "Shared Experience").with_count(2),
        NewItem::new("Shoes", "Bob", "Specific Item")
            .with_link(SHOP_LINK)
            .with_price(35),
        NewItem::new("Shirt", "Bob", "Specific Item")
            .with_link(SHOP_LINK)
            .with_price(25)
            .with_count(3),
        NewItem::new("Pants", "Alice", "Specific Item")
            .with_link(SHOP_LINK)
            .with_price(55)
            .with_count(2),
        NewItem::new("T-Shirts size 116", "Carol", "Buyer's Choice").with_count(2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_items_are_complete() {
        let items = sample_items();
        assert_eq!(items.len(), 5);
        assert!(items
            .iter()
            .all(|i| i.name.is_some() && i.person.is_some() && i.category.is_some()));
        assert_eq!(items.iter().map(|i| i.count).sum::<i64>(), 10);
    }
}
