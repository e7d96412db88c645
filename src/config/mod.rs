//! Configuration loading and management
//!
//! ```yaml
//! server:
//!   bind_address: "0.0.0.0:8080"
//!   expiry_sweep_interval_secs: 15
//! ordering:
//!   order_number_prefix: ACME
//!   utc_offset_minutes: 120
//!   monthly_end_day_overflow: reject
//! defaults:
//!   timeControlEnabled: true
//!   policy:
//!     type: weekly
//!     settings: { startDay: monday, endDay: friday, endHour: 17, endMinute: 0 }
//! advisories:
//!   closed: "We are closed for orders right now."
//! ```
//!
//! Every section has defaults, so a partial file (or none at all) works.

use crate::core::control::OrderControlState;
use crate::core::error::{ConfigError, OrderingError};
use crate::core::window::{AdvisoryTemplates, MonthOverflow, WindowEvaluator};
use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// HTTP server and background task settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub event_bus_capacity: usize,
    pub expiry_sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            event_bus_capacity: 1024,
            expiry_sweep_interval_secs: 30,
        }
    }
}

/// Ordering rules shared by every tenant of the deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    pub order_number_prefix: String,
    /// Offset of the storefront's wall clock from UTC
    pub utc_offset_minutes: i32,
    pub monthly_end_day_overflow: MonthOverflow,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            order_number_prefix: "WO".to_string(),
            utc_offset_minutes: 0,
            monthly_end_day_overflow: MonthOverflow::Clamp,
        }
    }
}

impl OrderingConfig {
    /// Storefront-local wall clock time for `now`
    pub fn local_time(&self, now: DateTime<Utc>) -> NaiveDateTime {
        match FixedOffset::east_opt(self.utc_offset_minutes * 60) {
            Some(offset) => now.with_timezone(&offset).naive_local(),
            None => now.naive_utc(),
        }
    }
}

/// Complete storefront configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub server: ServerConfig,
    pub ordering: OrderingConfig,
    /// Control state of a tenant before any admin change, and after a reset
    pub defaults: OrderControlState,
    pub advisories: AdvisoryTemplates,
}

impl StorefrontConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OrderingError::from(ConfigError::FileNotFound {
                    path: path.to_string(),
                })
            } else {
                OrderingError::from(e)
            }
        })?;

        Self::from_yaml_str(&content).map_err(|e| {
            anyhow::Error::from(OrderingError::from(ConfigError::ParseError {
                file: Some(path.to_string()),
                message: e.to_string(),
            }))
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), OrderingError> {
        if let Some(policy) = &self.defaults.policy {
            policy.validate()?;
        }

        if self.server.event_bus_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.event_bus_capacity".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            }
            .into());
        }

        if self.server.expiry_sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.expiry_sweep_interval_secs".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            }
            .into());
        }

        if self.ordering.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::InvalidValue {
                field: "ordering.utc_offset_minutes".to_string(),
                value: self.ordering.utc_offset_minutes.to_string(),
                message: "must be within one day".to_string(),
            }
            .into());
        }

        if let Err(e) = self.advisories.validate() {
            return Err(ConfigError::InvalidValue {
                field: format!("advisories.{}", e.name),
                value: e.template,
                message: e.message,
            }
            .into());
        }

        if self.ordering.order_number_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ordering.order_number_prefix".to_string(),
                value: self.ordering.order_number_prefix.clone(),
                message: "must not be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Window evaluator using the configured templates and month handling
    pub fn evaluator(&self) -> WindowEvaluator {
        WindowEvaluator::new(
            self.advisories.clone(),
            self.ordering.monthly_end_day_overflow,
        )
    }
}
