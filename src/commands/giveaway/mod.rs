use serenity::{
    all::{CommandInteraction, CommandOptionType},
    builder::{CreateCommand, CreateCommandOption},
};

use crate::models::{
    command::{Command, CommandContext},
    giveaway::GiveawayId,
    handler::Handler,
    permissions::Permission,
    response::{ResponseError, ResponseResult},
};

pub mod end;
pub mod new;
pub mod reroll;

pub struct GiveawayCommand;

fn id_option(description: &'static str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::String, "id", description).required(true)
}

pub(crate) fn parse_id(id: Option<String>) -> Result<GiveawayId, ResponseError> {
    match id.map(|id| id.trim().to_string()) {
        Some(id) if !id.is_empty() => Ok(GiveawayId::from(id)),
        _ => Err(ResponseError::Execution(
            "Could not get giveaway ID",
            Some("Please provide the ID shown when the giveaway was created".to_string()),
        )),
    }
}

#[async_trait::async_trait]
impl Command for GiveawayCommand {
    fn name(&self) -> &'static str {
        "giveaway"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new("giveaway")
            .description("Giveaway commands")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "new",
                    "Start a new giveaway",
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "prize",
                        "The prize for the giveaway",
                    )
                    .required(true),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "duration",
                        "How long the giveaway runs, e.g. 1d12h",
                    )
                    .required(true),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Integer,
                        "winners",
                        "The number of winners for the giveaway (default: 1)",
                    )
                    .min_int_value(1)
                    .required(false),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Role,
                        "role",
                        "The role to require to enter the giveaway",
                    )
                    .required(false),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "description",
                        "The description for the giveaway",
                    )
                    .required(false),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Role,
                        "reward_role",
                        "A role given to every winner",
                    )
                    .required(false),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "reward_role_duration",
                        "How long winners keep the reward role, e.g. 7d",
                    )
                    .required(false),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "reward_dm",
                        "A direct message sent to every winner",
                    )
                    .required(false),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Channel,
                        "reward_channel",
                        "A channel to announce the winners in",
                    )
                    .required(false),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "reward_channel_message",
                        "Announcement text, supports {winners}, {prize} and {guild}",
                    )
                    .required(false),
                ),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "reroll",
                    "Reroll a giveaway",
                )
                .add_sub_option(id_option("The ID of the giveaway to reroll")),
            )
            .add_option(
                CreateCommandOption::new(CommandOptionType::SubCommand, "end", "End a giveaway")
                    .add_sub_option(id_option("The ID of the giveaway to end")),
            )
            .dm_permission(false)
    }

    async fn router(
        &self,
        handler: &Handler,
        ctx: &CommandContext,
        cmd: &CommandInteraction,
    ) -> ResponseResult {
        for option in &cmd.data.options {
            let permission = match option.name.as_str() {
                "new" => Permission::GiveawayCreate,
                "reroll" => Permission::GiveawayReroll,
                "end" => Permission::GiveawayEnd,
                _ => continue,
            };

            if !ctx.user_permissions.contains(&permission) {
                return Err(ResponseError::Execution(
                    "You do not have permission to do this!",
                    Some(format!("You are missing the `{permission}` permission. If you believe this is a mistake, please contact your server administrators.")),
                ));
            }

            match option.name.as_str() {
                "new" => return new::new(handler, ctx, cmd).await,
                "reroll" => return reroll::reroll(handler, ctx, cmd).await,
                "end" => return end::end(handler, ctx, cmd).await,
                _ => continue,
            }
        }

        Err(ResponseError::Execution(
            "Invalid command",
            Some("You must specify a subcommand to use this command!".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::parse_id;

    #[test]
    fn giveaway_ids_are_trimmed() {
        assert_eq!(parse_id(Some(" abc ".to_string())).unwrap().as_str(), "abc");
        assert!(parse_id(Some("  ".to_string())).is_err());
        assert!(parse_id(None).is_err());
    }
}
