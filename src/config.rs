use crate::Error;
use poise::serenity_prelude::GuildId;

/// Process settings, read from the environment (and `.env` if present).
pub struct Config {
    pub token: String,
    pub guild_id: GuildId,
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> Result<Config, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, Error> {
        let require = |key: &str| lookup(key).ok_or_else(|| format!("missing {key}"));
        let token = require("DISCORD_TOKEN")?;
        let guild_id = require("GUILD_ID")?
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .ok_or("GUILD_ID must be a non-zero integer")?;
        let database_url = require("DATABASE_URL")?;
        Ok(Config {
            token,
            guild_id: GuildId::new(guild_id),
            database_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn reads_all_settings() {
        let config = Config::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "token"),
            ("GUILD_ID", " 1257347557789663252 "),
            ("DATABASE_URL", "sqlite://habits.db"),
        ]))
        .unwrap();
        assert_eq!(config.token, "token");
        assert_eq!(config.guild_id, GuildId::new(1257347557789663252));
        assert_eq!(config.database_url, "sqlite://habits.db");
    }

    #[test]
    fn missing_variable_is_named() {
        let err = Config::from_lookup(lookup(&[("DISCORD_TOKEN", "token")]))
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "missing GUILD_ID");
    }

    #[test]
    fn rejects_bad_guild_id() {
        for bad in ["abc", "0", "-4"] {
            let result = Config::from_lookup(lookup(&[
                ("DISCORD_TOKEN", "token"),
                ("GUILD_ID", bad),
                ("DATABASE_URL", "sqlite::memory:"),
            ]));
            assert!(result.is_err(), "{bad} should be rejected");
        }
    }
}
