use crate::commands::habits::util::{self, invalid_name_reply, HabitAction};
use crate::util::{report_failure, send_ephemeral_text};
use crate::{Context, Error};

/// Stop tracking a habit
///
/// h!remove_habit <name>
#[poise::command(slash_command, prefix_command, aliases("forgor"))]
pub async fn remove_habit(
    ctx: Context<'_>,
    #[description = "The name of the habit"]
    #[max_length = 100]
    #[rest]
    habit_name: String,
) -> Result<(), Error> {
    if let Some(reply) = invalid_name_reply(&habit_name) {
        return send_ephemeral_text(ctx, &reply).await;
    }
    // success is reported even when nothing matched
    match util::remove_habit(&ctx.data().pool, ctx.author().id, &habit_name).await {
        Ok(deleted) => {
            tracing::debug!("removed {deleted} habit(s) named {habit_name} for {}", ctx.author().id);
            ctx.say(format!("Removed habit {habit_name}")).await?;
        }
        Err(e) => {
            report_failure(ctx, e, HabitAction::Remove.failure_message()).await?;
        }
    }
    Ok(())
}
