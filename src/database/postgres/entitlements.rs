use serenity::all::GuildId;
use sqlx::PgPool;
use tracing::debug;

use crate::giveaway::ports::{Capability, Entitlements, PortResult};

/// A guild may use a feature when it holds an entitlement row for it and the
/// feature has not been killed globally.
pub struct PostgresEntitlements {
    pub main_database: PgPool,
}

impl PostgresEntitlements {
    pub fn new(main_database: PgPool) -> Self {
        PostgresEntitlements { main_database }
    }
}

#[async_trait::async_trait]
impl Entitlements for PostgresEntitlements {
    async fn has_capability(&self, guild_id: GuildId, capability: Capability) -> PortResult<bool> {
        debug!("Querying main database for guild {guild_id} {capability} entitlement");
        let (active, entitled) = sqlx::query_as::<_, (Option<bool>, bool)>(
            "SELECT (SELECT active FROM global_kills WHERE feature = $1), EXISTS(SELECT 1 FROM guild_entitlements WHERE guild_id = $2 AND feature = $1)",
        )
        .bind(capability.as_ref())
        .bind(guild_id.get() as i64)
        .fetch_one(&self.main_database)
        .await?;

        Ok(active.unwrap_or(true) && entitled)
    }
}
