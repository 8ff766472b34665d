pub mod alert;
pub mod probe;
pub mod sample;
pub mod target;

pub use alert::{AlertMessage, Verdict};
pub use probe::{ProbeFailure, ProbeResult};
pub use sample::{HealthSample, LatencySample};
pub use target::{TargetDetail, TargetId};
