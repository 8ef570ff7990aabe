//! # Seed Data Generator
//!
//! Populates a development database with suppliers, products, images,
//! specifications and supplier profile sections.
//!
//! ## Usage
//! ```bash
//! # 40 suppliers, up to 25 products each (defaults)
//! cargo run -p tradepost-db --bin seed
//!
//! # Custom amounts
//! cargo run -p tradepost-db --bin seed -- --suppliers 100 --products 50
//!
//! # Specify database path (otherwise storefront.toml / TRADEPOST_DATABASE_PATH)
//! cargo run -p tradepost-db --bin seed -- --db ./data/tradepost.db
//! ```
//!
//! ## Generated Data
//! Values are derived from the row index, so two runs produce the same
//! catalog. Some suppliers get no response rate, no score or no products,
//! and some products get no category, to exercise the null paths of the
//! storefront.

use chrono::{Duration, Utc};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tradepost_core::{Product, Supplier};
use tradepost_db::repository::product::generate_display_id;
use tradepost_db::{Database, StorefrontConfig};

/// (mcat_id, mcat_name, product names)
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "1001",
        "Industrial Pipes",
        &["Seamless Steel Pipe", "ERW Pipe", "Galvanized Pipe", "Copper Tube", "PVC Pipe"],
    ),
    (
        "1002",
        "Valves",
        &["Ball Valve", "Gate Valve", "Butterfly Valve", "Check Valve", "Globe Valve"],
    ),
    (
        "1003",
        "Textile Yarn",
        &["Cotton Yarn", "Polyester Yarn", "Viscose Yarn", "Blended Yarn"],
    ),
    (
        "1004",
        "Packaging Machines",
        &["Pouch Packing Machine", "Shrink Wrapper", "Carton Sealer", "Strapping Machine"],
    ),
    (
        "1005",
        "Agricultural Equipment",
        &["Rotavator", "Seed Drill", "Power Tiller", "Sprayer Pump"],
    ),
];

const COMPANY_WORDS: &[&str] = &[
    "Shree", "Global", "National", "Apex", "Sunrise", "Vertex", "Royal", "Prime",
];

const COMPANY_SUFFIXES: &[&str] = &[
    "Industries", "Enterprises", "Exports", "Trading Co.", "Engineering Works",
];

const LOCATIONS: &[&str] = &[
    "MIDC Bhosari, Pune, Maharashtra, India",
    "Sector 63, Noida, Uttar Pradesh, India",
    "GIDC Vatva, Ahmedabad, Gujarat, India",
    "Bao'an District, Shenzhen, Guangdong, China",
    "Jebel Ali, Dubai, United Arab Emirates",
    "Peenya, Bengaluru, Karnataka, India",
];

const UNITS: &[&str] = &["Piece", "Metre", "Kg", "Set", "Unit"];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tradepost=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut supplier_count: usize = 40;
    let mut products_per_supplier: usize = 25;
    let mut db_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--suppliers" | "-s" => {
                if i + 1 < args.len() {
                    supplier_count = args[i + 1].parse().unwrap_or(supplier_count);
                    i += 1;
                }
            }
            "--products" | "-p" => {
                if i + 1 < args.len() {
                    products_per_supplier = args[i + 1].parse().unwrap_or(products_per_supplier);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tradepost Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --suppliers <N>  Number of suppliers (default: 40)");
                println!("  -p, --products <N>   Max products per supplier (default: 25)");
                println!("  -d, --db <PATH>      Database file path (default: from config)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            other => warn!(argument = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let mut config = StorefrontConfig::load_or_default(None);
    if let Some(path) = db_path {
        config.database.path = path;
    }
    if let Some(parent) = config.database.path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    info!(
        path = %config.database.path.display(),
        suppliers = supplier_count,
        products_per_supplier,
        "Seeding storefront database"
    );

    let db = Database::new(config.database.to_db_config()).await?;

    let existing = db.suppliers().count().await?;
    if existing > 0 {
        warn!(
            existing,
            "Database already has suppliers, skipping seed. Delete the file to regenerate."
        );
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut products_created = 0usize;

    for seed in 0..supplier_count {
        let supplier_id = db.suppliers().insert(&generate_supplier(seed)).await?;

        db.suppliers()
            .insert_about(
                supplier_id,
                "Company Overview",
                &format!(
                    "<p>Established in {}, we manufacture and export &amp; supply \
                     industrial goods.</p>",
                    1985 + seed % 35
                ),
            )
            .await?;
        if seed % 2 == 0 {
            db.suppliers()
                .insert_about(supplier_id, "Quality", "ISO 9001:2015 certified plant")
                .await?;
        }

        // Every seventh supplier has no products.
        let product_count = if seed % 7 == 6 {
            0
        } else {
            1 + (seed * 13) % products_per_supplier.max(1)
        };

        for index in 0..product_count {
            let product = generate_product(seed, index, supplier_id);
            let product_id = match db.products().insert(&product).await {
                Ok(id) => id,
                Err(e) => {
                    warn!(error = %e, "Failed to insert product");
                    continue;
                }
            };

            for image in 0..(index % 3) {
                let medium = format!("https://img.tradepost.example/{}/{}-m.jpg", product_id, image);
                let full = format!("https://img.tradepost.example/{}/{}-f.jpg", product_id, image);
                db.products()
                    .insert_image(product_id, Some(&medium), Some(&full))
                    .await?;
            }

            db.products()
                .insert_specification(product_id, Some("Brand"), Some(COMPANY_WORDS[seed % COMPANY_WORDS.len()]))
                .await?;
            db.products()
                .insert_specification(product_id, Some("Minimum Order Quantity"), Some("10"))
                .await?;

            products_created += 1;
        }

        if (seed + 1) % 10 == 0 {
            info!(suppliers = seed + 1, products = products_created, "Progress");
        }
    }

    info!(
        suppliers = supplier_count,
        products = products_created,
        elapsed = ?start.elapsed(),
        "Seed complete"
    );

    let categories = db.catalog(config.catalog.clone()).list_categories().await;
    for category in &categories.categories {
        info!(
            category = %category.display_name(),
            products = category.product_count,
            "Category"
        );
    }

    let stats = db.supplier_directory(config.catalog).supplier_stats().await;
    info!(
        total = stats.total_suppliers,
        active = stats.active_suppliers,
        countries = stats.countries_count,
        "Supplier stats"
    );

    db.close().await;
    Ok(())
}

fn generate_supplier(seed: usize) -> Supplier {
    let name = format!(
        "{} {}",
        COMPANY_WORDS[seed % COMPANY_WORDS.len()],
        COMPANY_SUFFIXES[(seed / COMPANY_WORDS.len()) % COMPANY_SUFFIXES.len()]
    );

    Supplier {
        id: 0,
        name,
        address: Some(LOCATIONS[seed % LOCATIONS.len()].to_string()),
        phone_number: Some(format!("+91 98{:08}", seed * 7919 % 100_000_000)),
        website_url: (seed % 3 != 0).then(|| format!("https://supplier{}.tradepost.example", seed)),
        score: (seed % 5 != 4).then(|| 2.5 + ((seed * 37) % 26) as f64 / 10.0),
        response_rate: (seed % 4 != 3).then(|| ((seed * 53) % 101) as f64),
        created_at: Utc::now() - Duration::days(((seed * 11) % 120) as i64),
    }
}

fn generate_product(supplier_seed: usize, index: usize, supplier_id: i64) -> Product {
    let seed = supplier_seed * 31 + index;
    let (mcat_id, mcat_name, names) = CATEGORIES[seed % CATEGORIES.len()];
    let name = names[(seed / CATEGORIES.len()) % names.len()];
    let unit = UNITS[seed % UNITS.len()];
    let price = 150.0 + ((seed * 97) % 5000) as f64;

    // Every eleventh product is uncategorized.
    let categorized = seed % 11 != 10;

    Product {
        id: 0,
        product_display_id: generate_display_id(),
        item_id: Some(format!("{}{:06}", mcat_id, seed)),
        url: None,
        title: Some(format!("{} - Grade {}", name, 200 + (seed % 4) * 100)),
        description: Some(format!(
            "<p><b>{}</b> for industrial use.</p>\r\n\r\n<ul><li>Grade &amp; finish as per order</li></ul>",
            name
        )),
        mcat_id: categorized.then(|| mcat_id.to_string()),
        mcat_name: categorized.then(|| mcat_name.to_string()),
        cat_id: None,
        main_image: Some(format!("https://img.tradepost.example/main/{}.jpg", seed)),
        brochure_url: None,
        supplier_id: Some(supplier_id),
        price_value: Some(price),
        price_currency: Some("INR".to_string()),
        price_unit: Some(unit.to_string()),
        price_display_string: (seed % 2 == 0).then(|| format!("₹ {:.0} / {}", price, unit)),
        created_at: Utc::now() - Duration::hours(((seed * 17) % (24 * 90)) as i64),
        supplier: None,
    }
}
