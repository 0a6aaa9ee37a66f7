use serenity::all::{ChannelId, ResolvedOption, ResolvedValue, RoleId};

#[derive(Debug, Clone)]
pub struct Options<'a> {
    pub options: Vec<ResolvedOption<'a>>,
}

impl Options<'_> {
    fn find<T>(&self, name: &str, extract: &impl Fn(&ResolvedValue<'_>) -> Option<T>) -> Option<T> {
        for option in &self.options {
            match &option.value {
                ResolvedValue::SubCommandGroup(cmd) | ResolvedValue::SubCommand(cmd) => {
                    let sub_options = Options {
                        options: cmd.clone(),
                    };
                    return sub_options.find(name, extract);
                }
                value => {
                    if option.name == name {
                        return extract(value);
                    }
                }
            }
        }
        None
    }

    pub fn get_string(&self, name: &str) -> Option<String> {
        self.find(name, &|value| match value {
            ResolvedValue::String(string) => Some((*string).to_string()),
            _ => None,
        })
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.find(name, &|value| match value {
            ResolvedValue::Integer(integer) => Some(*integer),
            _ => None,
        })
    }

    pub fn get_role(&self, name: &str) -> Option<RoleId> {
        self.find(name, &|value| match value {
            ResolvedValue::Role(role) => Some(role.id),
            _ => None,
        })
    }

    pub fn get_channel(&self, name: &str) -> Option<ChannelId> {
        self.find(name, &|value| match value {
            ResolvedValue::Channel(channel) => Some(channel.id),
            _ => None,
        })
    }
}
