//! Typed error handling for the ordering engine
//!
//! Every failure a caller can react to has its own variant so handlers and
//! clients can match on it instead of parsing messages.
//!
//! # Error Categories
//!
//! - [`DraftError`]: missing draft items or orders
//! - [`StockError`]: a listed product cannot fulfil the requested quantity
//! - [`SubmissionError`]: the submission gate refused the draft
//! - [`ControlError`]: rejected administrator changes
//! - [`ConfigError`]: configuration parsing and validation
//! - [`ValidationError`]: malformed request input
//! - [`StorageError`]: storage backend failures and write conflicts
//! - [`RequestError`]: missing/invalid request context
//!
//! # HTTP body
//!
//! ```json
//! {"error": "Ordering is closed", "reason": "window-closed", "code": "WINDOW_CLOSED",
//!  "details": {"advisory": "Ordering is currently closed."}}
//! ```

use crate::core::window::PolicyError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The main error type of the ordering engine
#[derive(Debug)]
pub enum OrderingError {
    /// Draft item / order lookups
    Draft(DraftError),

    /// Stock and availability
    Stock(StockError),

    /// Submission gate refusals
    Submission(SubmissionError),

    /// Administrator control changes
    Control(ControlError),

    /// Configuration errors
    Config(ConfigError),

    /// Validation errors
    Validation(ValidationError),

    /// Storage backend errors
    Storage(StorageError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for OrderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderingError::Draft(e) => write!(f, "{}", e),
            OrderingError::Stock(e) => write!(f, "{}", e),
            OrderingError::Submission(e) => write!(f, "{}", e),
            OrderingError::Control(e) => write!(f, "{}", e),
            OrderingError::Config(e) => write!(f, "{}", e),
            OrderingError::Validation(e) => write!(f, "{}", e),
            OrderingError::Storage(e) => write!(f, "{}", e),
            OrderingError::Request(e) => write!(f, "{}", e),
            OrderingError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for OrderingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrderingError::Draft(e) => Some(e),
            OrderingError::Stock(e) => Some(e),
            OrderingError::Submission(e) => Some(e),
            OrderingError::Control(e) => Some(e),
            OrderingError::Config(e) => Some(e),
            OrderingError::Validation(e) => Some(e),
            OrderingError::Storage(e) => Some(e),
            OrderingError::Request(e) => Some(e),
            OrderingError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Coarse failure class a client can branch on
    pub reason: &'static str,
    /// Error code for programmatic handling
    pub code: &'static str,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl OrderingError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderingError::Draft(_) => StatusCode::NOT_FOUND,
            OrderingError::Stock(_) => StatusCode::CONFLICT,
            OrderingError::Submission(e) => e.status_code(),
            OrderingError::Control(_) => StatusCode::BAD_REQUEST,
            OrderingError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            OrderingError::Validation(_) => StatusCode::BAD_REQUEST,
            OrderingError::Storage(e) => e.status_code(),
            OrderingError::Request(e) => e.status_code(),
            OrderingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            OrderingError::Draft(e) => e.error_code(),
            OrderingError::Stock(e) => e.error_code(),
            OrderingError::Submission(e) => e.error_code(),
            OrderingError::Control(e) => e.error_code(),
            OrderingError::Config(_) => "CONFIG_ERROR",
            OrderingError::Validation(_) => "VALIDATION_ERROR",
            OrderingError::Storage(e) => e.error_code(),
            OrderingError::Request(e) => e.error_code(),
            OrderingError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Coarse failure class exposed as `reason`
    pub fn reason(&self) -> &'static str {
        match self {
            OrderingError::Draft(_) => "not-found",
            OrderingError::Stock(_) => "out-of-stock",
            OrderingError::Submission(SubmissionError::WindowClosed { .. }) => "window-closed",
            OrderingError::Submission(SubmissionError::EmptyOrder) => "empty-order",
            OrderingError::Control(_) | OrderingError::Validation(_) => "validation",
            OrderingError::Storage(StorageError::Conflict { .. }) => "conflict",
            OrderingError::Storage(_) => "storage",
            OrderingError::Request(RequestError::Unauthorized { .. }) => "unauthorized",
            OrderingError::Request(RequestError::Forbidden { .. }) => "forbidden",
            OrderingError::Request(_) => "validation",
            OrderingError::Config(_) | OrderingError::Internal(_) => "internal",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            reason: self.reason(),
            code: self.error_code(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            OrderingError::Submission(SubmissionError::WindowClosed { advisory }) => {
                Some(serde_json::json!({ "advisory": advisory }))
            }
            OrderingError::Stock(StockError::Insufficient {
                product_id,
                requested,
                available,
            }) => Some(serde_json::json!({
                "productId": product_id.to_string(),
                "requested": requested,
                "available": available
            })),
            OrderingError::Stock(StockError::ProductUnavailable { product_id }) => {
                Some(serde_json::json!({ "productId": product_id.to_string() }))
            }
            OrderingError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for OrderingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "Request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Draft Errors
// =============================================================================

/// Errors related to draft and order lookups
#[derive(Debug)]
pub enum DraftError {
    /// Item is not part of the client's draft
    ItemNotFound { item_id: Uuid },

    /// Order does not exist or belongs to another client
    OrderNotFound { order_id: Uuid },
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftError::ItemNotFound { item_id } => {
                write!(f, "Draft item '{}' not found", item_id)
            }
            DraftError::OrderNotFound { order_id } => {
                write!(f, "Order '{}' not found", order_id)
            }
        }
    }
}

impl std::error::Error for DraftError {}

impl DraftError {
    pub fn error_code(&self) -> &'static str {
        match self {
            DraftError::ItemNotFound { .. } => "DRAFT_ITEM_NOT_FOUND",
            DraftError::OrderNotFound { .. } => "ORDER_NOT_FOUND",
        }
    }
}

impl From<DraftError> for OrderingError {
    fn from(err: DraftError) -> Self {
        OrderingError::Draft(err)
    }
}

// =============================================================================
// Stock Errors
// =============================================================================

/// Errors related to product stock and availability
#[derive(Debug)]
pub enum StockError {
    /// Not enough stock for the requested line quantity
    Insufficient {
        product_id: Uuid,
        requested: u32,
        available: u32,
    },

    /// Product is unknown or no longer sold
    ProductUnavailable { product_id: Uuid },
}

impl fmt::Display for StockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockError::Insufficient {
                product_id,
                requested,
                available,
            } => {
                write!(
                    f,
                    "Insufficient stock for product '{}': requested {}, available {}",
                    product_id, requested, available
                )
            }
            StockError::ProductUnavailable { product_id } => {
                write!(f, "Product '{}' is not available", product_id)
            }
        }
    }
}

impl std::error::Error for StockError {}

impl StockError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StockError::Insufficient { .. } => "INSUFFICIENT_STOCK",
            StockError::ProductUnavailable { .. } => "PRODUCT_UNAVAILABLE",
        }
    }
}

impl From<StockError> for OrderingError {
    fn from(err: StockError) -> Self {
        OrderingError::Stock(err)
    }
}

// =============================================================================
// Submission Errors
// =============================================================================

/// Reasons the submission gate refuses a draft
#[derive(Debug)]
pub enum SubmissionError {
    /// The ordering window is closed; carries the advisory for display
    WindowClosed { advisory: Option<String> },

    /// The draft has no items
    EmptyOrder,
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::WindowClosed { advisory: Some(advisory) } => {
                write!(f, "Ordering window is closed: {}", advisory)
            }
            SubmissionError::WindowClosed { advisory: None } => {
                write!(f, "Ordering window is closed")
            }
            SubmissionError::EmptyOrder => write!(f, "Cannot submit an empty order"),
        }
    }
}

impl std::error::Error for SubmissionError {}

impl SubmissionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SubmissionError::WindowClosed { .. } => StatusCode::FORBIDDEN,
            SubmissionError::EmptyOrder => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SubmissionError::WindowClosed { .. } => "WINDOW_CLOSED",
            SubmissionError::EmptyOrder => "EMPTY_ORDER",
        }
    }
}

impl From<SubmissionError> for OrderingError {
    fn from(err: SubmissionError) -> Self {
        OrderingError::Submission(err)
    }
}

// =============================================================================
// Control Errors
// =============================================================================

/// Rejected administrator changes to the order control state
#[derive(Debug)]
pub enum ControlError {
    /// Policy settings out of range
    InvalidPolicy(PolicyError),

    /// Patch without any field
    EmptyPatch,

    /// Custom message text is blank
    EmptyMessage,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::InvalidPolicy(e) => write!(f, "Invalid window policy: {}", e),
            ControlError::EmptyPatch => write!(f, "Patch does not change any field"),
            ControlError::EmptyMessage => write!(f, "Custom message must not be empty"),
        }
    }
}

impl std::error::Error for ControlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ControlError::InvalidPolicy(e) => Some(e),
            _ => None,
        }
    }
}

impl ControlError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ControlError::InvalidPolicy(_) => "INVALID_POLICY",
            ControlError::EmptyPatch => "EMPTY_PATCH",
            ControlError::EmptyMessage => "EMPTY_MESSAGE",
        }
    }
}

impl From<ControlError> for OrderingError {
    fn from(err: ControlError) -> Self {
        OrderingError::Control(err)
    }
}

impl From<PolicyError> for OrderingError {
    fn from(err: PolicyError) -> Self {
        OrderingError::Control(ControlError::InvalidPolicy(err))
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    FileNotFound { path: String },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for OrderingError {
    fn from(err: ConfigError) -> Self {
        OrderingError::Config(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Single field validation error
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Invalid JSON format
    InvalidJson { message: String },

    /// Missing required argument
    MissingArgument { argument: String },

    /// Invalid UUID format
    InvalidUuid { value: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
            ValidationError::MissingArgument { argument } => {
                write!(f, "Missing required argument: {}", argument)
            }
            ValidationError::InvalidUuid { value } => {
                write!(f, "Invalid UUID: {}", value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for OrderingError {
    fn from(err: ValidationError) -> Self {
        OrderingError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for OrderingError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        OrderingError::Validation(ValidationError::FieldErrors(fields))
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug)]
pub enum StorageError {
    /// The record changed between read and write; re-fetch and retry
    Conflict { message: String },

    /// Transaction error
    TransactionError { message: String },

    /// Data integrity error
    IntegrityError { message: String },

    /// Backend not available
    Unavailable { backend: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Conflict { message } => {
                write!(f, "Write conflict: {}", message)
            }
            StorageError::TransactionError { message } => {
                write!(f, "Transaction error: {}", message)
            }
            StorageError::IntegrityError { message } => {
                write!(f, "Data integrity error: {}", message)
            }
            StorageError::Unavailable { backend } => {
                write!(f, "Storage backend '{}' is unavailable", backend)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl StorageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::Conflict { .. } => StatusCode::CONFLICT,
            StorageError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Conflict { .. } => "WRITE_CONFLICT",
            StorageError::TransactionError { .. } => "TRANSACTION_ERROR",
            StorageError::IntegrityError { .. } => "INTEGRITY_ERROR",
            StorageError::Unavailable { .. } => "STORAGE_UNAVAILABLE",
        }
    }
}

impl From<StorageError> for OrderingError {
    fn from(err: StorageError) -> Self {
        OrderingError::Storage(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Required header is missing
    MissingHeader { header: String },

    /// Header value is malformed
    InvalidHeader { header: String, message: String },

    /// Invalid request body
    InvalidBody { message: String },

    /// No identity on the request
    Unauthorized { message: String },

    /// Identity not allowed to perform the operation
    Forbidden { message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MissingHeader { header } => {
                write!(f, "Missing required header: {}", header)
            }
            RequestError::InvalidHeader { header, message } => {
                write!(f, "Invalid header '{}': {}", header, message)
            }
            RequestError::InvalidBody { message } => {
                write!(f, "Invalid request body: {}", message)
            }
            RequestError::Unauthorized { message } => {
                write!(f, "Unauthorized: {}", message)
            }
            RequestError::Forbidden { message } => {
                write!(f, "Forbidden: {}", message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::MissingHeader { .. } => StatusCode::UNAUTHORIZED,
            RequestError::InvalidHeader { .. } => StatusCode::BAD_REQUEST,
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::MissingHeader { .. } => "MISSING_HEADER",
            RequestError::InvalidHeader { .. } => "INVALID_HEADER",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
            RequestError::Forbidden { .. } => "FORBIDDEN",
        }
    }
}

impl From<RequestError> for OrderingError {
    fn from(err: RequestError) -> Self {
        OrderingError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for OrderingError {
    fn from(err: serde_json::Error) -> Self {
        OrderingError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for OrderingError {
    fn from(err: std::io::Error) -> Self {
        OrderingError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for OrderingError {
    fn from(err: serde_yaml::Error) -> Self {
        OrderingError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<uuid::Error> for OrderingError {
    fn from(err: uuid::Error) -> Self {
        OrderingError::Validation(ValidationError::InvalidUuid {
            value: err.to_string(),
        })
    }
}

/// Storage and collaborator traits return `anyhow::Result`; recover typed
/// errors they wrapped, anything else is internal.
impl From<anyhow::Error> for OrderingError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<OrderingError>() {
            Ok(ordering) => return ordering,
            Err(err) => err,
        };
        match err.downcast::<StorageError>() {
            Ok(storage) => OrderingError::Storage(storage),
            Err(err) => OrderingError::Internal(err.to_string()),
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for ordering operations
pub type OrderingResult<T> = Result<T, OrderingError>;

// =============================================================================
// Tests
// =============================================================================
