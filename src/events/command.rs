use std::sync::atomic::AtomicBool;

use serenity::{all::CommandInteraction, prelude::Context as IncomingContext};
use strum::IntoEnumIterator;
use tracing::{debug, error};

use crate::{
    commands::get_command_list,
    common::reply::error_response,
    database::postgres::permissions::{get_role_permissions, get_user_permissions},
    models::{
        command::{CommandContext, CommandContextReply, FailedCommandContext},
        handler::Handler,
        permissions::Permission,
        response::Response,
    },
};

impl Handler {
    async fn command_permissions(
        &self,
        ctx: &IncomingContext,
        command: &CommandInteraction,
    ) -> Vec<Permission> {
        let Some(guild_id) = command.guild_id else {
            return vec![];
        };

        let cached_owner = guild_id
            .to_guild_cached(&ctx.cache)
            .map(|guild| guild.owner_id);
        let owner_id = match cached_owner {
            Some(owner_id) => Some(owner_id),
            None => match guild_id.to_partial_guild(&ctx.http).await {
                Ok(guild) => Some(guild.owner_id),
                Err(err) => {
                    error!("Could not get guild {guild_id}, failed with error: {err}");
                    None
                }
            },
        };
        if owner_id == Some(command.user.id) {
            return Permission::iter().collect();
        }

        let mut user_permissions = vec![];
        for permission in get_user_permissions(
            self,
            guild_id.get() as i64,
            command.user.id.get() as i64,
        )
        .await
        {
            if !user_permissions.contains(&permission) {
                user_permissions.push(permission);
            }
        }
        let roles = command
            .member
            .as_ref()
            .map(|member| member.roles.clone())
            .unwrap_or_default();
        for role in roles {
            for permission in
                get_role_permissions(self, guild_id.get() as i64, role.get() as i64).await
            {
                if !user_permissions.contains(&permission) {
                    user_permissions.push(permission);
                }
            }
        }
        user_permissions
    }

    pub async fn on_command(&self, ctx: IncomingContext, command: CommandInteraction) {
        let start = std::time::Instant::now();

        let Some(guild_id) = command.guild_id else {
            let fail_context = FailedCommandContext { ctx };
            if let Err(err) = fail_context
                .reply(
                    &command,
                    Response::new().content("Giveaways can only be run inside servers".to_string()),
                )
                .await
            {
                error!("Failed to reply to command: {:?}", err);
            }
            return;
        };

        let user_permissions = self.command_permissions(&ctx, &command).await;
        debug!("Took {:?} to resolve command permissions", start.elapsed());

        let command_context = CommandContext {
            ctx,
            has_responsed: AtomicBool::new(false),
            user_permissions,
            guild_id,
        };

        for existing_command in get_command_list() {
            if existing_command.name() != command.data.name {
                continue;
            }
            if let Err(err) = existing_command
                .router(self, &command_context, &command)
                .await
            {
                debug!("Command {} was rejected: {:?}", command.data.name, err);
                if let Err(err) = command_context.reply(&command, error_response(&err)).await {
                    error!("Failed to reply to command: {:?}", err);
                }
            }
        }

        debug!("Took {:?} to handle a command", start.elapsed());
    }
}
