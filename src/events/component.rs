use serenity::{all::ComponentInteraction, builder::CreateEmbed, prelude::Context};
use tracing::{debug, error};

use crate::{
    common::reply::{error_response, reply_to_component},
    models::{
        handler::Handler,
        presentation::parse_custom_id,
        response::{Response, ResponseError},
    },
};

impl Handler {
    pub async fn on_component(&self, ctx: Context, interaction: ComponentInteraction) {
        let Some(id) = parse_custom_id(&interaction.data.custom_id) else {
            return;
        };
        let user_id = interaction.user.id;
        debug!("User {} pressed the join button of giveaway {}", user_id, id);

        let response = match self.giveaways.toggle_entry(&id, user_id).await {
            Ok(toggle) if toggle.joined => Response::new()
                .embed(
                    CreateEmbed::new()
                        .title("You're in the running!")
                        .description("You've entered this giveaway. Good luck!")
                        .color(0x00ff00),
                )
                .ephemeral(true),
            Ok(_) => Response::new()
                .embed(
                    CreateEmbed::new()
                        .title("You've left the giveaway")
                        .description("Press the button again to re-enter.")
                        .color(0xfdca4c),
                )
                .ephemeral(true),
            Err(err) => error_response(&ResponseError::from(err)),
        };

        if let Err(err) = reply_to_component(&ctx.http, &interaction, response).await {
            error!(
                "Could not acknowledge giveaway entry for giveaway {}. Failed with error: {:?}",
                id, err
            );
        }
    }
}
