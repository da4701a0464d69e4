//! # Seed Data Generator
//!
//! Populates the database with demo outlets, package templates and vouchers
//! for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p chit-db --bin seed
//!
//! # Specify database path and voucher count
//! cargo run -p chit-db --bin seed -- --db ./data/chit.db --vouchers 200
//! ```
//!
//! The initial admin account is NOT seeded here; the API server bootstraps
//! it from its own config on first start, because password hashing lives in
//! the API layer.

use chrono::Utc;
use std::env;

use chit_core::voucher::NewVoucher;
use chit_core::{Money, Voucher, VoucherType};
use chit_db::{Database, DbConfig};

/// Demo outlets: (name, code, address, gstin, phone)
const OUTLETS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "Indiranagar",
        "BLR-01",
        "100 Feet Road, Indiranagar, Bengaluru",
        "29AAACH7409R1ZX",
        "08041234567",
    ),
    (
        "Koramangala",
        "BLR-02",
        "80 Feet Road, Koramangala, Bengaluru",
        "29AAACH7409R2ZW",
        "08049876543",
    ),
    (
        "Jayanagar",
        "BLR-03",
        "11th Main, Jayanagar 4th Block, Bengaluru",
        "29AAACH7409R3ZV",
        "08026547890",
    ),
];

/// Demo templates: (package_value_rupees, service_value_rupees)
const TEMPLATES: &[(i64, i64)] = &[
    (5_000, 7_500),
    (10_000, 15_000),
    (20_000, 32_000),
    (50_000, 85_000),
];

/// Recipient names for generated vouchers.
const RECIPIENTS: &[&str] = &[
    "Meera Iyer",
    "Arjun Nair",
    "Priya Sharma",
    "Rohan Gupta",
    "Ananya Rao",
    "Vikram Menon",
    "Divya Pillai",
    "Karthik Reddy",
    "Sneha Kulkarni",
    "Aditya Joshi",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut voucher_count: usize = 50;
    let mut db_path = String::from("./chit_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--vouchers" | "-v" => {
                if i + 1 < args.len() {
                    voucher_count = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Chit Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -v, --vouchers <N>  Number of vouchers to generate (default: 50)");
                println!("  -d, --db <PATH>     Database file path (default: ./chit_dev.db)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Chit Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!("Vouchers: {}", voucher_count);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.outlets().count().await? > 0 {
        println!("⚠ Database already has outlets");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Outlets
    let mut outlet_ids = Vec::new();
    for (name, code, address, gstin, phone) in OUTLETS {
        let outlet = db
            .outlets()
            .create(name, code, address, gstin, phone)
            .await?;
        outlet_ids.push(outlet.id);
    }
    println!("✓ Created {} outlets", outlet_ids.len());

    // Package templates
    for (package_rupees, service_rupees) in TEMPLATES {
        db.packages()
            .create_template(
                None,
                Money::from_rupees(*package_rupees),
                Money::from_rupees(*service_rupees),
            )
            .await?;
    }
    println!("✓ Created {} package templates", TEMPLATES.len());

    // Vouchers spread across outlets, mixed types and expiries
    println!();
    println!("Generating vouchers...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..voucher_count {
        let new = NewVoucher {
            recipient_name: RECIPIENTS[seed % RECIPIENTS.len()].to_string(),
            // Modulo keeps the suffix at 8 digits for any voucher count
            recipient_mobile: format!("98{:08}", (10_000_000 + seed * 7919) % 100_000_000),
            voucher_type: if seed % 3 == 0 {
                VoucherType::FamilyFriends
            } else {
                VoucherType::Partner
            },
            // 10% - 30% in 5-point steps
            discount_bps: (1000 + (seed % 5) * 500) as u32,
            bill_no: format!("INV-{:05}", 10_000 + seed),
            expiry_days: [15, 30, 60, 90][seed % 4],
        };

        let outlet_id = &outlet_ids[seed % outlet_ids.len()];
        let voucher = Voucher::issue(new, outlet_id, Utc::now())?;

        if let Err(e) = db.vouchers().insert(&voucher).await {
            eprintln!("Failed to insert {}: {}", voucher.code, e);
            continue;
        }
        generated += 1;
    }

    let elapsed = start.elapsed();
    println!("✓ Generated {} vouchers in {:?}", generated, elapsed);

    println!();
    println!("✓ Seed complete!");
    println!("  Start the API server to bootstrap the admin account.");

    Ok(())
}
