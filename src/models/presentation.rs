use serenity::all::{RoleId, UserId};

use super::giveaway::{Giveaway, GiveawayId, GiveawayStyle, NewGiveaway};

pub const ACTIVE_COLOR: u32 = 0xfdca4c;
pub const ENDED_COLOR: u32 = 0x4752c4;

const BUTTON_PREFIX: &str = "giveaway:";
const PENDING_CUSTOM_ID: &str = "giveaway:pending";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinButton {
    pub custom_id: String,
    pub label: String,
    pub disabled: bool,
}

/// Render descriptor for the public giveaway announcement. The messaging
/// collaborator decides how it is drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presentation {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub footer: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub button: Option<JoinButton>,
}

pub fn join_custom_id(id: &GiveawayId) -> String {
    format!("{BUTTON_PREFIX}{id}")
}

/// Extracts the giveaway id from a join button custom id.
pub fn parse_custom_id(custom_id: &str) -> Option<GiveawayId> {
    let id = custom_id.strip_prefix(BUTTON_PREFIX)?;
    if id.is_empty() || custom_id == PENDING_CUSTOM_ID {
        return None;
    }
    Some(GiveawayId::from(id))
}

struct Summary<'a> {
    prize: &'a str,
    style: &'a GiveawayStyle,
    winner_count: u32,
    entry_count: usize,
    host_id: UserId,
    required_role_id: Option<RoleId>,
    ends_at: time::OffsetDateTime,
}

impl Summary<'_> {
    fn title(&self) -> String {
        match &self.style.title {
            Some(title) => title.clone(),
            None => format!("{} giveaway", self.prize),
        }
    }

    fn intro(&self) -> String {
        match &self.style.description {
            Some(description) => format!("{description}\n\n"),
            None => String::new(),
        }
    }

    fn active_description(&self) -> String {
        let mut description = self.intro();
        description.push_str(&format!(
            "Hosted by: <@{}>\nWinners: {}\nEntries: {}\n",
            self.host_id, self.winner_count, self.entry_count
        ));
        if let Some(role) = self.required_role_id {
            description.push_str(&format!("Required role: <@&{role}>\n"));
        }
        let timestamp = self.ends_at.unix_timestamp();
        description.push_str(&format!("\nGiveaway ends <t:{timestamp}:R> (<t:{timestamp}:F>)"));
        description
    }

    fn render(&self, description: String, color: u32, button: JoinButton) -> Presentation {
        Presentation {
            title: self.title(),
            description,
            color,
            footer: self.style.footer.clone(),
            image_url: self.style.image_url.clone(),
            thumbnail_url: self.style.thumbnail_url.clone(),
            button: Some(button),
        }
    }
}

fn summary(giveaway: &Giveaway) -> Summary<'_> {
    Summary {
        prize: &giveaway.prize,
        style: &giveaway.style,
        winner_count: giveaway.winner_count,
        entry_count: giveaway.entries.len(),
        host_id: giveaway.host_id,
        required_role_id: giveaway.required_role_id,
        ends_at: giveaway.ends_at,
    }
}

fn join_label(style: &GiveawayStyle) -> String {
    style
        .button_label
        .clone()
        .unwrap_or_else(|| "Enter".to_string())
}

impl Presentation {
    /// First phase of publishing: the record does not exist yet, so the join
    /// control cannot carry its id and stays disabled.
    pub fn pending(request: &NewGiveaway, ends_at: time::OffsetDateTime) -> Self {
        let summary = Summary {
            prize: &request.prize,
            style: &request.style,
            winner_count: request.winner_count,
            entry_count: 0,
            host_id: request.host_id,
            required_role_id: request.required_role_id,
            ends_at,
        };
        let color = request.style.color.unwrap_or(ACTIVE_COLOR);
        summary.render(
            summary.active_description(),
            color,
            JoinButton {
                custom_id: PENDING_CUSTOM_ID.to_string(),
                label: join_label(&request.style),
                disabled: true,
            },
        )
    }

    pub fn active(giveaway: &Giveaway) -> Self {
        let summary = summary(giveaway);
        summary.render(
            summary.active_description(),
            giveaway.style.color.unwrap_or(ACTIVE_COLOR),
            JoinButton {
                custom_id: join_custom_id(&giveaway.id),
                label: join_label(&giveaway.style),
                disabled: false,
            },
        )
    }

    pub fn ended(giveaway: &Giveaway) -> Self {
        let summary = summary(giveaway);
        let mut description = summary.intro();
        if giveaway.winners.is_empty() {
            description.push_str("No one won the giveaway.\n");
        } else {
            description.push_str(&format!(
                "The giveaway is now over, congratulations to the winners!\nWinners: {}\n",
                mention_all(&giveaway.winners)
            ));
        }
        description.push_str(&format!(
            "Hosted by: <@{}>\nEntries: {}\n\nGiveaway ended <t:{}:F>",
            giveaway.host_id,
            giveaway.entries.len(),
            giveaway.ends_at.unix_timestamp()
        ));

        summary.render(
            description,
            ENDED_COLOR,
            JoinButton {
                custom_id: join_custom_id(&giveaway.id),
                label: giveaway
                    .style
                    .ended_button_label
                    .clone()
                    .unwrap_or_else(|| "Giveaway ended".to_string()),
                disabled: true,
            },
        )
    }
}

pub fn mention_all(users: &[UserId]) -> String {
    users
        .iter()
        .map(|user| format!("<@{user}>"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn custom_id_round_trips_giveaway_id() {
        let id = GiveawayId::from("65f1c0ffee");
        assert_eq!(parse_custom_id(&join_custom_id(&id)), Some(id));
        assert_eq!(parse_custom_id(PENDING_CUSTOM_ID), None);
        assert_eq!(parse_custom_id("strike:1"), None);
        assert_eq!(parse_custom_id("giveaway:"), None);
    }

    #[test]
    fn active_message_counts_entries_and_enables_button() {
        let mut giveaway = testing::giveaway("active", &[1, 2]);
        giveaway.required_role_id = Some(RoleId::new(77));

        let presentation = Presentation::active(&giveaway);
        assert_eq!(presentation.title, "Nitro giveaway");
        assert!(presentation.description.contains("Entries: 2"));
        assert!(presentation.description.contains("Required role: <@&77>"));
        let button = presentation.button.unwrap();
        assert_eq!(button.custom_id, "giveaway:active");
        assert!(!button.disabled);
    }

    #[test]
    fn ended_message_lists_winners_and_disables_button() {
        let mut giveaway = testing::giveaway("ended", &[1, 2]);
        giveaway.ended = true;
        giveaway.winners = vec![UserId::new(2)];

        let presentation = Presentation::ended(&giveaway);
        assert!(presentation.description.contains("Winners: <@2>"));
        assert_eq!(presentation.color, ENDED_COLOR);
        assert!(presentation.button.unwrap().disabled);

        giveaway.winners.clear();
        let presentation = Presentation::ended(&giveaway);
        assert!(presentation.description.contains("No one won the giveaway."));
    }

    #[test]
    fn custom_style_overrides_defaults() {
        let mut giveaway = testing::giveaway("styled", &[]);
        giveaway.style.title = Some("Summer raffle".to_string());
        giveaway.style.color = Some(0x123456);
        giveaway.style.button_label = Some("Join".to_string());

        let presentation = Presentation::active(&giveaway);
        assert_eq!(presentation.title, "Summer raffle");
        assert_eq!(presentation.color, 0x123456);
        assert_eq!(presentation.button.unwrap().label, "Join");
    }
}
