// library entry
pub mod advisor;
pub mod balancer;
pub mod cache;
pub mod config;
pub mod error;
pub mod limiter;
pub mod logging;
pub mod queue;
pub mod resilience;
pub mod system;
pub mod test_utils;


// Re-export key components for convenience
pub use error::{PipelineError, Result};
pub use logging::init as init_logging;
pub use system::{DistributedSystem, Metrics, SystemRequest, SystemResponse};
