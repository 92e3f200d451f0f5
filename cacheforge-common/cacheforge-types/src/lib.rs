pub mod snapshot;
pub mod view;
pub mod metrics;
pub mod log;

pub use snapshot::{
    ApiErrorBody, KeyRecord, KeyRef, Measurement, MetricResponse, OperationData,
    OperationResponse, RawSnapshot, SetRequest, StripeId, NO_EXPIRY,
};
pub use view::{CacheKey, CacheOverview, Stripe, ViewModel};
pub use metrics::{CounterName, MetricsRecord};
pub use log::{LogEntry, LogLevel};
