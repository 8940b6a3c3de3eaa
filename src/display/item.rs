//! Item display formatting
//!
//! Formats items for terminal output in table and detail views.

use tabled::{settings::Style, Table, Tabled};

use crate::models::Item;

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Qty")]
    qty: u64,
    #[tabled(rename = "Location")]
    location: String,
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.to_string(),
            sku: item.sku.clone(),
            name: item.name.clone(),
            qty: item.qty,
            location: item.location.clone().unwrap_or_default(),
        }
    }
}

/// Format a list of items as a table
pub fn format_item_list(items: &[Item]) -> String {
    if items.is_empty() {
        return "No items found.\n".to_string();
    }

    let mut table = Table::new(items.iter().map(ItemRow::from));
    table.with(Style::psql());

    let mut output = table.to_string();
    output.push_str(&format!("\n{} item(s)\n", items.len()));
    output
}

/// Format a single item with all of its fields
pub fn format_item_details(item: &Item) -> String {
    let mut output = String::new();
    output.push_str(&format!("Item: {}\n", item));
    output.push_str(&format!("  ID:       {}\n", item.id));
    output.push_str(&format!("  SKU:      {}\n", item.sku));
    output.push_str(&format!("  Quantity: {}\n", item.qty));
    output.push_str(&format!(
        "  Location: {}\n",
        item.location.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "  Created:  {}\n",
        item.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!(
        "  Updated:  {}\n",
        item.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemId, NewItem};
    use chrono::Utc;

    #[test]
    fn test_empty_list() {
        assert_eq!(format_item_list(&[]), "No items found.\n");
    }

    #[test]
    fn test_list_contains_rows() {
        let items = vec![
            Item::from_new(ItemId::new(1), NewItem::new("A1", "Bolt", 5), Utc::now()),
            Item::from_new(
                ItemId::new(2),
                NewItem::new("B2", "Nut", 12).with_location("Bin 4"),
                Utc::now(),
            ),
        ];

        let output = format_item_list(&items);
        assert!(output.contains("SKU"));
        assert!(output.contains("Bolt"));
        assert!(output.contains("Bin 4"));
        assert!(output.contains("2 item(s)"));
    }

    #[test]
    fn test_details() {
        let item = Item::from_new(ItemId::new(3), NewItem::new("C3", "Washer", 0), Utc::now());
        let output = format_item_details(&item);
        assert!(output.starts_with("Item: Washer (C3)"));
        assert!(output.contains("Location: -"));
    }
}
