pub mod metric_store;
pub mod notifier;
pub mod target_source;

pub use metric_store::MetricStore;
pub use notifier::{EmailNotifier, NotifyError, SmsNotifier};
pub use target_source::{SourceError, TargetSource};
