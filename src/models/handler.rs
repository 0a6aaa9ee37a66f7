use std::sync::{atomic::AtomicBool, Arc};

use crate::giveaway::{lifecycle::LifecycleController, ports::Collaborators, scheduler::SchedulerConfig};

#[derive(Clone)]
pub struct Handler {
    pub main_database: sqlx::PgPool,
    pub giveaways: Arc<LifecycleController>,
    pub collaborators: Collaborators,
    pub scheduler: SchedulerConfig,
    pub scheduler_started: Arc<AtomicBool>,
}
