use std::{sync::Arc, time::Duration};

use tracing::{debug, error, info};

use crate::models::error::GiveawayError;

use super::{
    lifecycle::{Expiry, LifecycleController},
    ports::Collaborators,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub initial_delay: Duration,
    pub batch_size: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            interval: Duration::from_secs(30),
            initial_delay: Duration::from_secs(10),
            batch_size: 25,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub due: usize,
    pub ended: usize,
    pub closed: usize,
    pub deferred: usize,
    pub failed: usize,
    pub revoked: usize,
}

/// Ends giveaways whose time is up and takes back expired reward roles.
pub struct Scheduler {
    controller: Arc<LifecycleController>,
    collaborators: Collaborators,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(
        controller: Arc<LifecycleController>,
        collaborators: Collaborators,
        config: SchedulerConfig,
    ) -> Self {
        Scheduler {
            controller,
            collaborators,
            config,
        }
    }

    /// Runs forever. The next tick is only scheduled once the previous one
    /// finished, so ticks never overlap.
    pub async fn run(self) {
        info!(
            "Giveaway scheduler starting in {:?}, ticking every {:?}",
            self.config.initial_delay, self.config.interval
        );
        tokio::time::sleep(self.config.initial_delay).await;

        loop {
            let start = std::time::Instant::now();
            let summary = self.tick().await;
            debug!(
                "Finished giveaway tick in {}ms: {:?}",
                start.elapsed().as_millis(),
                summary
            );
            tokio::time::sleep(self.config.interval).await;
        }
    }

    pub async fn tick(&self) -> TickSummary {
        let mut summary = TickSummary::default();
        let now = self.collaborators.clock.now();

        match self
            .collaborators
            .repository
            .list_due_active(now, self.config.batch_size)
            .await
        {
            Ok(due) => {
                summary.due = due.len();
                for giveaway in due {
                    debug!(
                        "Expiring giveaway {} from guild {}",
                        giveaway.id, giveaway.guild_id
                    );
                    match self.controller.expire(&giveaway).await {
                        Ok(Expiry::Ended(_)) => summary.ended += 1,
                        Ok(Expiry::SilentlyClosed) => summary.closed += 1,
                        Ok(Expiry::Deferred) => summary.deferred += 1,
                        // Someone else ended it first, nothing left to do.
                        Err(GiveawayError::AlreadyEnded(_)) => {}
                        Err(err) => {
                            summary.failed += 1;
                            error!("Failed to expire giveaway {}: {}", giveaway.id, err);
                        }
                    }
                }
            }
            Err(err) => error!("Failed to fetch due giveaways: {}", err),
        }

        summary.revoked = self
            .controller
            .rewards()
            .revoke_due(self.config.batch_size)
            .await;
        summary
    }
}
