//! # Seed Data Generator
//!
//! Populates the database with a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Default catalog into ./caixa_dev.db
//! cargo run -p caixa-db --bin seed
//!
//! # Custom database path, limit product count
//! cargo run -p caixa-db --bin seed -- --db ./data/caixa.db --count 50
//! ```
//!
//! Each base product is generated in several sizes, with a price derived
//! from the base price and a stock between 0 and 24, so some products
//! start out of stock.

use std::env;

use caixa_core::{Money, Product};
use caixa_db::repository::product::generate_product_id;
use caixa_db::{Database, DbConfig};

/// Base products with their price in cents.
const BASE_PRODUCTS: &[(&str, i64)] = &[
    ("Arroz Branco", 2490),
    ("Feijão Carioca", 899),
    ("Café Torrado", 1899),
    ("Açúcar Refinado", 529),
    ("Leite Integral", 549),
    ("Óleo de Soja", 799),
    ("Macarrão Espaguete", 459),
    ("Farinha de Trigo", 619),
    ("Sal Refinado", 249),
    ("Biscoito Recheado", 349),
    ("Sabão em Pó", 1590),
    ("Detergente", 289),
];

/// Size variants: label and price multiplier in percent.
const SIZES: &[(&str, i64)] = &[("500g", 60), ("1kg", 100), ("2kg", 185), ("5kg", 420)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = BASE_PRODUCTS.len() * SIZES.len();
    let mut db_path = String::from("./caixa_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--count" => {
                if let Some(value) = args.get(i + 1) {
                    count = value.parse()?;
                    i += 1;
                }
            }
            "-d" | "--db" => {
                if let Some(value) = args.get(i + 1) {
                    db_path = value.clone();
                    i += 1;
                }
            }
            "-h" | "--help" => {
                println!("Meu Caixa Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: all)");
                println!("  -d, --db <PATH>    Database file path (default: ./caixa_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("Database: {}", db_path);

    let db = Database::new(DbConfig::for_path(&db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("Database already has {} products, skipping seed.", existing);
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    let mut generated = 0;
    for product in generate_catalog().into_iter().take(count) {
        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.name, e);
            continue;
        }
        generated += 1;
    }

    println!("Generated {} products", generated);

    let sample = db.products().search("caf", 5).await?;
    println!("Search 'caf': {} results", sample.len());

    db.close().await;
    Ok(())
}

fn generate_catalog() -> Vec<Product> {
    let mut catalog = Vec::with_capacity(BASE_PRODUCTS.len() * SIZES.len());

    for (base_idx, (name, base_price)) in BASE_PRODUCTS.iter().enumerate() {
        for (size_idx, (size, percent)) in SIZES.iter().enumerate() {
            let seed = base_idx * SIZES.len() + size_idx;
            let price = Money::from_cents(base_price * percent / 100);
            let stock = ((seed * 7) % 25) as i64;

            catalog.push(Product::new(
                generate_product_id(),
                format!("{} {}", name, size),
                price,
                stock,
            ));
        }
    }

    catalog
}
