use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::metrics::ServiceMetrics;
use crate::restaurants::repo::expire_promotions;

/// Periodically clears promotions whose end date has passed.
pub fn spawn_promotion_sweeper(db: PgPool, metrics: ServiceMetrics, every: Duration) -> JoinHandle<()> {
    let every = every.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match expire_promotions(&db, Utc::now()).await {
                Ok(0) => debug!("no promotions expired"),
                Ok(count) => {
                    metrics.promotions_expired(count);
                    info!(count, "expired restaurant promotions");
                }
                Err(err) => warn!(error = %err, "promotion sweep failed"),
            }
        }
    })
}
