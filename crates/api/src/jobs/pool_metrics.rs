//! Background job to record connection pool metrics.

use sqlx::PgPool;
use std::time::Duration;

use super::scheduler::Job;

/// Job that periodically records database connection pool metrics.
pub struct PoolMetricsJob {
    pool: PgPool,
}

impl PoolMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(10)
    }

    async fn execute(&self) -> Result<(), String> {
        persistence::metrics::record_pool_metrics(&self.pool);
        Ok(())
    }
}
