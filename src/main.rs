mod commands;
mod config;
mod tasks;
mod util;

use crate::config::Config;
use crate::tasks::task_handler;
use dotenvy::dotenv;
use poise::serenity_prelude as serenity;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct Data {
    pool: SqlitePool,
} // User data, which is stored and accessible in all command invocations
type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Arc<Data>, Error>;
pub type Command = poise::Command<Arc<Data>, Error>;

#[tokio::main]
async fn main() {
    // a missing .env is fine as long as the variables come from the real environment
    let _ = dotenv();
    tracing_subscriber::fmt::init();
    let config = Config::from_env().expect("invalid configuration");
    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let pool = commands::habits::util::connect(&config.database_url)
        .await
        .expect("failed to open the habit database");
    tracing::info!("connected to {}", config.database_url);
    let data = Arc::new(Data { pool });
    let guild_id = config.guild_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("h!".into()),
                ..Default::default()
            },
            commands: commands::commands(),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!("logged in as {}", ready.user.name);
                poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                    .await?;
                tracing::info!("registered commands in guild {guild_id}");
                let ctx_clone = ctx.clone();
                let data_clone = data.clone();
                tokio::spawn(async move { task_handler(ctx_clone, data_clone).await });
                Ok(data)
            })
        })
        .build();

    let client = serenity::ClientBuilder::new(config.token, intents)
        .framework(framework)
        .await;
    client.expect("failed to build the client").start().await.expect("client stopped");
}
