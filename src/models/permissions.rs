#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumIter, strum::Display, strum::EnumString)]
pub enum Permission {
    #[strum(serialize = "giveaway.create")]
    GiveawayCreate,
    #[strum(serialize = "giveaway.end")]
    GiveawayEnd,
    #[strum(serialize = "giveaway.reroll")]
    GiveawayReroll,
}

#[cfg(test)]
mod tests {
    use super::Permission;

    #[test]
    fn permission_names_match_database_values() {
        assert_eq!(Permission::GiveawayCreate.to_string(), "giveaway.create");
        assert_eq!("giveaway.reroll".parse::<Permission>(), Ok(Permission::GiveawayReroll));
        assert!("moderation.ban".parse::<Permission>().is_err());
    }
}
