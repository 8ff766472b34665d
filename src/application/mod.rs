pub mod dispatch;
pub mod monitoring;
pub mod probe;

pub use dispatch::{AlertDispatcher, DispatchReport};
pub use monitoring::{CheckOutcome, CheckReport, Command, CommandOutcome, MonitoringSession, Snapshot};
pub use probe::{HealthProbe, DEFAULT_PROBE_TIMEOUT};
