//! Integration tests for storefront configuration loading

use ordering::prelude::*;
use std::io::Write;

#[test]
fn test_empty_file_uses_defaults() {
    let config = StorefrontConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, StorefrontConfig::default());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
server:
  bind_address: "0.0.0.0:8080"
ordering:
  order_number_prefix: ACME
  utc_offset_minutes: -300
defaults:
  timeControlEnabled: true
  showSalePrice: false
  policy:
    type: monthly
    settings:
      endDay: 25
      endHour: 18
      endMinute: 30
advisories:
  closes_tomorrow: "Last call: tomorrow at {{{{ end_time }}}}."
"#
    )
    .unwrap();

    let config = StorefrontConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(config.server.bind_address, "0.0.0.0:8080");
    assert_eq!(config.server.event_bus_capacity, 1024);
    assert_eq!(config.ordering.order_number_prefix, "ACME");
    assert_eq!(config.ordering.utc_offset_minutes, -300);
    assert!(config.defaults.time_control_enabled);
    assert!(!config.defaults.show_sale_price);
    assert!(config.defaults.show_quantity);
    assert_eq!(
        config.defaults.policy,
        Some(OrderWindowPolicy::Monthly(MonthlySettings {
            end_day: 25,
            end_hour: 18,
            end_minute: 30,
        }))
    );
    assert_eq!(
        config.advisories.closes_tomorrow,
        "Last call: tomorrow at {{ end_time }}."
    );
}

#[test]
fn test_missing_file_is_reported() {
    let err = StorefrontConfig::from_yaml_file("/nonexistent/storefront.yaml").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_invalid_default_policy_is_rejected() {
    let yaml = r#"
defaults:
  policy:
    type: daily
    settings:
      dailyHours: 30
"#;
    assert!(StorefrontConfig::from_yaml_str(yaml).is_err());
}

#[test]
fn test_unknown_policy_type_is_rejected() {
    let yaml = r#"
defaults:
  policy:
    type: hourly
    settings: {}
"#;
    assert!(StorefrontConfig::from_yaml_str(yaml).is_err());
}

#[tokio::test]
async fn test_configured_defaults_and_prefix_reach_the_services() {
    let config = StorefrontConfig::from_yaml_str(
        r#"
ordering:
  order_number_prefix: ACME
defaults:
  showQuantity: false
"#,
    )
    .unwrap();

    let tenant_id = Uuid::new_v4();
    let client_id = Uuid::new_v4();
    let product_id = Uuid::new_v4();
    let catalog = InMemoryCatalog::new();
    catalog
        .upsert(
            tenant_id,
            ProductSnapshot {
                id: product_id,
                name: "Rice 10kg".to_string(),
                price: Decimal::new(1500, 2),
                stock: 4,
                image_path: None,
            },
        )
        .unwrap();

    let host = ServerBuilder::new()
        .with_config(config)
        .with_catalog(catalog)
        .build_host()
        .unwrap();

    let state = host.control.snapshot(&tenant_id).await.unwrap();
    assert!(!state.show_quantity);

    host.drafts
        .add_listed_item(
            &tenant_id,
            &client_id,
            AddListedItem {
                product_id,
                quantity: 1,
            },
        )
        .await
        .unwrap();
    let order = host.gate.submit(&tenant_id, &client_id).await.unwrap();
    assert_eq!(order.order_number, "ACME-000001");
}
