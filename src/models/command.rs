use std::sync::atomic::AtomicBool;

use serenity::{
    all::{CommandInteraction, GuildId},
    builder::CreateCommand,
    prelude::Context as IncomingContext,
};

use super::{
    handler::Handler,
    permissions::Permission,
    response::{Response, ResponseResult},
};

#[async_trait::async_trait]
pub trait CommandContextReply {
    async fn reply(&self, cmd: &CommandInteraction, response: Response) -> ResponseResult;
}

pub struct CommandContext {
    pub ctx: IncomingContext,
    pub has_responsed: AtomicBool,
    pub user_permissions: Vec<Permission>,
    pub guild_id: GuildId,
}

pub struct FailedCommandContext {
    pub ctx: IncomingContext,
}

#[async_trait::async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;
    fn register(&self) -> CreateCommand;
    async fn router(
        &self,
        handler: &Handler,
        ctx: &CommandContext,
        command: &CommandInteraction,
    ) -> ResponseResult;
}
