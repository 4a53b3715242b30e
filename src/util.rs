use crate::{Context, Error};
use poise::CreateReply;

pub async fn send_ephemeral_text(ctx: Context<'_>, content: &str) -> Result<(), Error> {
    ctx.send(CreateReply::default().content(content).ephemeral(true)).await?;
    Ok(())
}

/// Logs a failed database operation and tells the invoker it didn't work.
pub async fn report_failure(ctx: Context<'_>, error: Error, content: &str) -> Result<(), Error> {
    tracing::error!("/{} by {} failed: {error}", ctx.command().name, ctx.author().id);
    send_ephemeral_text(ctx, content).await
}
