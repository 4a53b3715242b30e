use crate::commands::habits::util::{habits_for_user, Habit, HabitAction};
use crate::util::report_failure;
use crate::{Context, Error};
use poise::ChoiceParameter;

/// Discord refuses messages longer than this many characters.
const MESSAGE_LIMIT: usize = 2000;

/// Shows your habits
#[poise::command(slash_command, prefix_command, aliases("habits"), discard_spare_arguments)]
pub async fn list_habits(ctx: Context<'_>) -> Result<(), Error> {
    let habits = match habits_for_user(&ctx.data().pool, ctx.author().id).await {
        Ok(habits) => habits,
        Err(e) => return report_failure(ctx, e, HabitAction::List.failure_message()).await,
    };
    for message in habit_list_messages(&habits) {
        ctx.say(message).await?;
    }
    Ok(())
}

fn habit_line(habit: &Habit) -> String {
    format!(
        "\"{}\", repeating {}, due <t:{}:R>",
        habit.name,
        habit.repeat.name(),
        habit.due_date.timestamp()
    )
}

/// The habit list split into as few messages as fit under Discord's limit, one line per habit.
pub fn habit_list_messages(habits: &[Habit]) -> Vec<String> {
    if habits.is_empty() {
        return vec!["You have no habits.".to_string()];
    }
    let mut messages = vec!["Your habits are: ".to_string()];
    for line in habits.iter().map(habit_line) {
        let Some(current) = messages.last_mut() else {
            break;
        };
        // +1 for the newline joining the line on
        if current.chars().count() + 1 + line.chars().count() > MESSAGE_LIMIT {
            messages.push(line);
        } else {
            current.push('\n');
            current.push_str(&line);
        }
    }
    messages
}
