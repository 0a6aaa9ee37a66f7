use serenity::{all::CommandInteraction, builder::CreateEmbed};

use crate::{
    common::{duration::Duration, options::Options},
    models::{
        command::{CommandContext, CommandContextReply},
        giveaway::{GiveawayStyle, NewGiveaway, RewardConfig},
        handler::Handler,
        response::{Response, ResponseError, ResponseResult},
    },
};

fn parse_minutes(value: &str, title: &'static str) -> Result<u32, ResponseError> {
    Duration::parse(value)
        .and_then(|duration| duration.to_minutes())
        .ok_or_else(|| {
            ResponseError::Execution(
                title,
                Some("Use a duration such as `30m`, `2h` or `1d12h`".to_string()),
            )
        })
}

pub async fn new(
    handler: &Handler,
    ctx: &CommandContext,
    cmd: &CommandInteraction,
) -> ResponseResult {
    let options = Options {
        options: cmd.data.options(),
    };

    let Some(prize) = options.get_string("prize") else {
        return Err(ResponseError::Execution(
            "Could not get giveaway prize",
            Some("Please notify the developer of this issue".to_string()),
        ));
    };
    let Some(duration) = options.get_string("duration") else {
        return Err(ResponseError::Execution(
            "Could not get giveaway duration",
            Some("Please notify the developer of this issue".to_string()),
        ));
    };
    let duration_minutes = parse_minutes(&duration, "Invalid giveaway duration")?;

    let winner_count = match options.get_integer("winners") {
        Some(winners) => i32::try_from(winners)
            .ok()
            .and_then(|winners| u32::try_from(winners).ok())
            .ok_or_else(|| ResponseError::Execution("Invalid number of winners", None))?,
        None => 1,
    };

    let role_remove_after_minutes = match options.get_string("reward_role_duration") {
        Some(value) => {
            let minutes = parse_minutes(&value, "Invalid reward role duration")?;
            if i32::try_from(minutes).is_err() {
                return Err(ResponseError::Execution(
                    "Invalid reward role duration",
                    Some("The reward role duration is too long".to_string()),
                ));
            }
            Some(minutes)
        }
        None => None,
    };

    let request = NewGiveaway {
        guild_id: ctx.guild_id,
        channel_id: cmd.channel_id,
        prize,
        duration_minutes,
        winner_count,
        host_id: cmd.user.id,
        host_name: cmd.user.name.clone(),
        required_role_id: options.get_role("role"),
        style: GiveawayStyle {
            description: options.get_string("description"),
            ..GiveawayStyle::default()
        },
        reward: RewardConfig {
            role_id: options.get_role("reward_role"),
            role_remove_after_minutes,
            dm_message: options.get_string("reward_dm"),
            channel_id: options.get_channel("reward_channel"),
            channel_message_template: options.get_string("reward_channel_message"),
        },
    };

    let giveaway = handler.giveaways.create(request).await?;

    ctx.reply(
        cmd,
        Response::new()
            .embed(
                CreateEmbed::new()
                    .title("Giveaway started")
                    .description(format!(
                        "Giveaway ID: `{}`\nEnds <t:{}:R>",
                        giveaway.id,
                        giveaway.ends_at.unix_timestamp()
                    ))
                    .color(0x00ff00),
            )
            .ephemeral(true),
    )
    .await
}
