//! Builders shared by the database tests.

use chrono::{TimeZone, Utc};
use tradepost_core::{Product, Supplier};

use crate::pool::{Database, DbConfig};
use crate::repository::product::generate_display_id;

/// Fresh in-memory database with migrations applied.
pub async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database should open")
}

pub fn supplier(name: &str) -> Supplier {
    Supplier {
        id: 0,
        name: name.to_string(),
        address: None,
        phone_number: None,
        website_url: None,
        score: Some(4.0),
        response_rate: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

pub fn product(title: &str, category: Option<(&str, &str)>, supplier_id: Option<i64>) -> Product {
    Product {
        id: 0,
        product_display_id: generate_display_id(),
        item_id: None,
        url: None,
        title: Some(title.to_string()),
        description: Some(format!("<p>{} for industrial use</p>", title)),
        mcat_id: category.map(|(id, _)| id.to_string()),
        mcat_name: category.map(|(_, name)| name.to_string()),
        cat_id: None,
        main_image: None,
        brochure_url: None,
        supplier_id,
        price_value: Some(450.0),
        price_currency: Some("INR".to_string()),
        price_unit: Some("Piece".to_string()),
        price_display_string: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        supplier: None,
    }
}
