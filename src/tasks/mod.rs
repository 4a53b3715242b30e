use crate::{Data, Error};
use habits::check_habits;
use poise::serenity_prelude::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

mod habits;

pub async fn task_handler(ctx: Context, data: Arc<Data>) -> Result<(), Error> {
    let mut habit_interval = interval(Duration::from_secs(60));
    loop {
        habit_interval.tick().await;

        check_habits(&ctx, &data).await;
    }
}
