use crate::commands::habits::cadence::Cadence;
use crate::commands::habits::util::{insert_habit, invalid_name_reply, AddOutcome, Habit, HabitAction};
use crate::util::{report_failure, send_ephemeral_text};
use crate::{Context, Error};
use chrono::{DateTime, Utc};
use poise::ChoiceParameter;

/// Start tracking a habit
///
/// h!add_habit <name> <repeat>
#[poise::command(slash_command, prefix_command)]
pub async fn add_habit(
    ctx: Context<'_>,
    #[description = "The name of the habit"]
    #[max_length = 100]
    habit_name: String,
    #[description = "How often to do the habit"] repeat: Cadence,
) -> Result<(), Error> {
    if let Some(reply) = invalid_name_reply(&habit_name) {
        return send_ephemeral_text(ctx, &reply).await;
    }
    let created_at =
        DateTime::from_timestamp(ctx.created_at().unix_timestamp(), 0).unwrap_or_else(Utc::now);
    let habit = Habit::new(habit_name, ctx.author().id, ctx.channel_id(), repeat, created_at);

    match insert_habit(&ctx.data().pool, &habit).await {
        Ok(AddOutcome::Added(id)) => {
            tracing::info!("habit #{id} {} added for {}", habit.name, habit.user_id);
            ctx.say(format!("Added habit {} with repeat {}", habit.name, repeat.name())).await?;
        }
        Ok(AddOutcome::Duplicate) => {
            ctx.say(format!("You are already doing {}.", habit.name)).await?;
        }
        Err(e) => {
            report_failure(ctx, e, HabitAction::Add.failure_message()).await?;
        }
    }
    Ok(())
}
