use serenity::{all::CommandInteraction, builder::CreateEmbed};

use crate::{
    common::options::Options,
    models::{
        command::{CommandContext, CommandContextReply},
        handler::Handler,
        presentation::mention_all,
        response::{Response, ResponseResult},
    },
};

use super::parse_id;

pub async fn reroll(
    handler: &Handler,
    ctx: &CommandContext,
    cmd: &CommandInteraction,
) -> ResponseResult {
    let options = Options {
        options: cmd.data.options(),
    };
    let id = parse_id(options.get_string("id"))?;

    let result = handler.giveaways.reroll(ctx.guild_id, &id).await?;

    ctx.reply(
        cmd,
        Response::new()
            .embed(
                CreateEmbed::new()
                    .title("Successfully rerolled giveaway")
                    .description(if result.winners.is_empty() {
                        "No one entered, so there are no winners.".to_string()
                    } else {
                        format!("New winners: {}", mention_all(&result.winners))
                    })
                    .color(0x4752c4),
            )
            .ephemeral(true),
    )
    .await
}
