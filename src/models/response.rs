use serenity::builder::{CreateActionRow, CreateEmbed};

use super::error::GiveawayError;

pub struct Response {
    pub content: Option<String>,
    pub embeds: Option<Vec<CreateEmbed>>,
    pub components: Option<Vec<CreateActionRow>>,
    pub ephemeral: bool,
}

#[derive(Debug)]
pub enum ResponseError {
    Serenity(serenity::Error),
    Execution(&'static str, Option<String>),
}

pub type ResponseResult = Result<(), ResponseError>;

impl Response {
    pub fn new() -> Self {
        Response {
            content: None,
            embeds: None,
            components: None,
            ephemeral: false,
        }
    }

    pub fn content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }

    pub fn embed(mut self, embed: CreateEmbed) -> Self {
        self.embeds = Some(vec![embed]);
        self
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }
}

impl From<serenity::Error> for ResponseError {
    fn from(value: serenity::Error) -> Self {
        ResponseError::Serenity(value)
    }
}

impl From<GiveawayError> for ResponseError {
    fn from(value: GiveawayError) -> Self {
        match value {
            GiveawayError::NotFound(_) => ResponseError::Execution(
                "This giveaway could not be found",
                Some("Please check the giveaway ID and try again".to_string()),
            ),
            GiveawayError::AlreadyEnded(_) => {
                ResponseError::Execution("This giveaway has already ended", None)
            }
            GiveawayError::NotYetEnded(_) => ResponseError::Execution(
                "This giveaway has not ended yet",
                Some("End the giveaway before rerolling it".to_string()),
            ),
            GiveawayError::PermissionDenied { .. } => ResponseError::Execution(
                "You do not have permission to enter this giveaway",
                Some("You are missing the role required to enter".to_string()),
            ),
            GiveawayError::CapabilityDenied(_) => ResponseError::Execution(
                "Giveaways are not available in this server",
                None,
            ),
            GiveawayError::Invalid(reason) => {
                ResponseError::Execution("Invalid giveaway", Some(reason.to_string()))
            }
            GiveawayError::Persistence(_)
            | GiveawayError::Presentation(_)
            | GiveawayError::Reward { .. } => ResponseError::Execution(
                "Something went wrong with this giveaway",
                Some("Please notify the developer of this issue".to_string()),
            ),
        }
    }
}
