//! Background job scheduler and job implementations.

mod pool_metrics;
mod reservation_sweep;
mod scheduler;

pub use pool_metrics::PoolMetricsJob;
pub use reservation_sweep::ReservationSweepJob;
pub use scheduler::{Job, JobScheduler};
