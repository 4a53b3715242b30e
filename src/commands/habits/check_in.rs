use crate::commands::habits::util::{check_in_habit, invalid_name_reply, CheckInOutcome, HabitAction};
use crate::util::{report_failure, send_ephemeral_text};
use crate::{Context, Error};
use chrono::Utc;

/// Mark a habit as done for this cycle
///
/// h!check_in <name>
#[poise::command(slash_command, prefix_command, aliases("checkin", "done"))]
pub async fn check_in(
    ctx: Context<'_>,
    #[description = "The name of the habit"]
    #[max_length = 100]
    #[rest]
    habit_name: String,
) -> Result<(), Error> {
    if let Some(reply) = invalid_name_reply(&habit_name) {
        return send_ephemeral_text(ctx, &reply).await;
    }
    match check_in_habit(&ctx.data().pool, ctx.author().id, &habit_name, Utc::now()).await {
        Ok(outcome) => {
            ctx.say(check_in_reply(outcome, &habit_name)).await?;
            Ok(())
        }
        Err(e) => report_failure(ctx, e, HabitAction::CheckIn.failure_message()).await,
    }
}

fn check_in_reply(outcome: CheckInOutcome, habit_name: &str) -> String {
    match outcome {
        CheckInOutcome::NotFound => format!("You are not doing {habit_name}."),
        CheckInOutcome::AlreadyCheckedIn => format!("You have already checked in for {habit_name}."),
        CheckInOutcome::CheckedIn => format!("Successfully checked in for {habit_name}."),
    }
}
