pub mod config;
pub mod domain;
pub mod gateway;
pub mod metrics;

pub use config::{ClientConfig, ConfigError};
pub use domain::notification::{Notification, NotificationCenter, NotificationId, NotificationKind};
pub use domain::order::{
    CoffeeType, DraftChange, FormSnapshot, GatewayError, OrderDraft, OrderResponse,
    OrderSubmissionController, Settlement, SubmissionState, Violation,
};
pub use gateway::{HttpOrderGateway, OrderGateway};
pub use metrics::Metrics;
