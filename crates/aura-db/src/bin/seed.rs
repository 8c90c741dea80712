//! # Seed Data Generator
//!
//! Populates the database with a demo beauty catalog and prints the
//! dashboard figures.
//!
//! ## Usage
//! ```bash
//! # Seed the configured database
//! cargo run -p aura-db --bin seed
//!
//! # Specify database path, and ring up a few demo sales
//! cargo run -p aura-db --bin seed -- --db ./data/aura.db --sales 5
//!
//! # Use a specific config file
//! cargo run -p aura-db --bin seed -- --config ./aura.toml
//! ```
//!
//! ## Generated Products
//! One product per catalog entry below. When the price column is `None`
//! the product takes the suggested price (cost × 3.40).

use std::env;
use std::path::PathBuf;

use aura_core::{Cart, ProductDraft, SaleStatus};
use aura_db::{init_tracing, AuraConfig, Database, EngineError, SaleEngine};

/// (name, category, cost cents, price cents, stock)
const CATALOG: &[(&str, &str, i64, Option<i64>, i64)] = &[
    ("Labial Mate Rojo Pasión", "Maquillaje", 2_500, Some(8_500), 24),
    ("Base Líquida Tono Medio", "Maquillaje", 6_000, None, 12),
    ("Máscara de Pestañas Volumen", "Maquillaje", 3_800, Some(12_900), 18),
    ("Rubor en Polvo Durazno", "Maquillaje", 2_200, None, 4),
    ("Serum Vitamina C", "Cuidado de piel", 9_500, Some(32_000), 10),
    ("Crema Hidratante Noche", "Cuidado de piel", 7_000, None, 8),
    ("Protector Solar SPF 50", "Cuidado de piel", 5_500, Some(18_500), 3),
    ("Agua Micelar 400ml", "Cuidado de piel", 3_000, None, 15),
    ("Shampoo Keratina", "Cabello", 4_200, Some(13_500), 9),
    ("Aceite de Argán", "Cabello", 3_600, None, 2),
    ("Perfume Floral 50ml", "Fragancias", 18_000, Some(59_900), 5),
    ("Esmalte Nude", "Uñas", 900, None, 30),
];

const CUSTOMERS: &[&str] = &["Ana López", "", "María Pérez", "Lucía Gómez", ""];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut sales: usize = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Aura POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: from config)");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -s, --sales <N>      Demo sales to ring up after seeding (default: 0)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = AuraConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = Some(path);
    }

    println!("🌱 Aura POS Seed Data Generator");
    println!("===============================");
    println!("Store:    {} ({})", config.store.name, config.store.id);
    println!("Database: {}", config.database_path().display());
    println!();

    if let Some(parent) = config.database_path().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(config.db_config()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let engine = SaleEngine::with_options(db, config.profit_split()?, config.engine_options());

    let existing = engine.store().products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping catalog seed to avoid duplicates.");
    } else {
        println!();
        println!("Generating catalog...");
        for (name, category, cost_cents, price_cents, stock) in CATALOG {
            let product = engine
                .create_product(ProductDraft {
                    name: name.to_string(),
                    category: Some(category.to_string()),
                    cost_cents: *cost_cents,
                    price_cents: *price_cents,
                    stock: *stock,
                })
                .await?;
            println!(
                "  + {:<32} {:>10}  stock {}",
                product.name,
                product.price().to_string(),
                product.stock
            );
        }
        println!("✓ Generated {} products", CATALOG.len());
    }

    if sales > 0 {
        println!();
        println!("Ringing up {} demo sales...", sales);
        let products = engine.products().await?;
        let in_stock: Vec<_> = products.iter().filter(|p| !p.is_sold_out()).collect();

        for n in 0..sales {
            if in_stock.is_empty() {
                println!("⚠ Nothing left in stock");
                break;
            }
            let mut cart = Cart::new();
            for offset in 0..=(n % 3) {
                let product = in_stock[(n * 3 + offset) % in_stock.len()];
                match engine.add_to_cart(&mut cart, &product.id).await {
                    Ok(()) => {}
                    Err(EngineError::Core(e)) if e.is_stock_error() => {
                        println!("  - {}: {}", product.name, e);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            if cart.is_empty() {
                continue;
            }

            let status = SaleStatus::ALL[n % SaleStatus::ALL.len()];
            let customer = CUSTOMERS[n % CUSTOMERS.len()];
            let sale = engine.commit_sale(&mut cart, Some(customer), Some(status)).await?;
            println!(
                "  # {:<16} {:>10}  {} unidades  {}",
                sale.customer_name,
                sale.total().to_string(),
                sale.unit_count(),
                sale.status
            );
        }
    }

    let summary = engine.inventory_summary().await?;
    println!();
    println!("Inventory");
    println!("---------");
    println!("  Products:        {}", summary.product_count);
    println!("  Stock value:     {}", summary.stock_value);
    println!("  Low stock (<{}): {}", config.stock.low_stock_threshold, summary.low_stock_count);
    println!("  Sales:           {} ({})", summary.sale_count, summary.sales_total);
    println!("  Profit:          {}", summary.profit_total);

    let distribution = engine.distribution().await?;
    println!();
    println!("Partners");
    println!("--------");
    println!("  Revenue:         {}", distribution.total_revenue);
    println!("  Profit:          {}", distribution.total_profit);
    println!("  Distributable:   {}", distribution.distributable);
    for partner in &distribution.partners {
        println!(
            "  {:<16} {:>6.2}%  share {}  paid {}  pending {}",
            partner.name,
            partner.share_rate.percentage(),
            partner.share,
            partner.paid,
            partner.remaining
        );
    }
    println!("  Cash in hand:    {}", distribution.cash_in_hand);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
