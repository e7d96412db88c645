//! Wholesale storefront demo
//!
//! Seeds one tenant with a small catalog and serves the full API:
//!
//! ```sh
//! RUST_LOG=ordering=debug,tower_http=info cargo run --example storefront
//! ```
//!
//! Set `STOREFRONT_CONFIG` to a YAML file (see `demos/storefront/storefront.yaml`)
//! to change the schedule, prefix or advisory wording.

use ordering::prelude::*;
use tracing_subscriber::EnvFilter;

const TENANT_ID: &str = "e2e92411-5568-4436-a388-464c649a5a97";
const CLIENT_ID: &str = "4a8a0b37-6d84-4e58-9c0e-3cf36a0ad3c1";
const ADMIN_ID: &str = "9f1b6c52-2f0e-4d53-8b6a-0b8e2f3f1a77";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ordering=info,tower_http=info")),
        )
        .init();

    let config = match std::env::var("STOREFRONT_CONFIG") {
        Ok(path) => StorefrontConfig::from_yaml_file(&path)?,
        Err(_) => StorefrontConfig::default(),
    };
    let bind_address = config.server.bind_address.clone();

    let tenant_id = Uuid::parse_str(TENANT_ID)?;
    let catalog = InMemoryCatalog::new();
    seed_catalog(&catalog, tenant_id)?;

    println!("Wholesale storefront on http://{}", bind_address);
    println!();
    println!("  Tenant:  x-tenant-id: {}", TENANT_ID);
    println!("  Client:  x-client-id: {}", CLIENT_ID);
    println!("  Admin:   x-admin-id:  {}", ADMIN_ID);
    println!();
    println!("  GET    /draft                          - Current draft with totals");
    println!("  POST   /draft/items                    - Add a catalog product");
    println!("  POST   /draft/items/unlisted           - Add an unlisted item (multipart)");
    println!("  PUT    /draft/items/{{item_id}}          - Change a quantity (< 1 removes)");
    println!("  DELETE /draft/items/{{item_id}}          - Remove an item");
    println!("  DELETE /draft/items/{{item_id}}/image    - Drop an unlisted item's image");
    println!("  POST   /draft/submit                   - Submit the draft");
    println!("  GET    /orders                         - Submitted orders");
    println!("  GET    /order-control                  - Window state and advisory");
    println!("  PATCH  /admin/order-control            - Change the schedule or flags");
    println!("  PUT    /admin/order-control/message    - Set the custom message");
    println!("  GET    /ws?tenant=..&client=..         - Push channel");
    println!();

    ServerBuilder::new()
        .with_config(config)
        .with_catalog(catalog)
        .serve(&bind_address)
        .await
}

fn seed_catalog(catalog: &InMemoryCatalog, tenant_id: Uuid) -> Result<()> {
    let products = [
        ("Espresso beans 1kg", Decimal::new(2450, 2), 40),
        ("Oat milk 12x1L", Decimal::new(1899, 2), 25),
        ("Paper cups 8oz x1000", Decimal::new(6200, 2), 10),
        ("Cane sugar sticks x500", Decimal::new(1175, 2), 0),
    ];

    for (name, price, stock) in products {
        let id = Uuid::new_v4();
        catalog.upsert(
            tenant_id,
            ProductSnapshot {
                id,
                name: name.to_string(),
                price,
                stock,
                image_path: None,
            },
        )?;
        println!("  product {}  {:<24} {:>8}  stock {}", id, name, price, stock);
    }

    Ok(())
}
