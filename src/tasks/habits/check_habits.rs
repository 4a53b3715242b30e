use crate::commands::habits::util::{advance_habit, overdue_habits, Habit};
use crate::{Data, Error};
use chrono::{DateTime, Utc};
use poise::serenity_prelude::{Context, CreateMessage, Mentionable};
use sqlx::SqlitePool;
use std::sync::Arc;

pub async fn check_habits(ctx: &Context, data: &Arc<Data>) {
    tracing::debug!("checking habits");
    let reminders = match scan_habits(&data.pool, Utc::now()).await {
        Ok(reminders) => reminders,
        Err(e) => {
            tracing::error!("failed to scan habits: {e}");
            return;
        }
    };

    for habit in reminders {
        let message = CreateMessage::new().content(shame_message(&habit));
        match habit.channel_id.send_message(ctx, message).await {
            Ok(_) => tracing::info!("reminded {} about {}", habit.user_id, habit.name),
            // continue even if it can't send the message
            Err(e) => tracing::warn!(
                "couldn't remind {} about {} in {}: {e}",
                habit.user_id,
                habit.name,
                habit.channel_id
            ),
        }
    }
}

/// Moves every overdue habit into its next cycle and returns the ones nobody checked in for,
/// as they were before advancing.
pub async fn scan_habits(pool: &SqlitePool, now: DateTime<Utc>) -> Result<Vec<Habit>, Error> {
    let mut reminders = Vec::new();
    for habit in overdue_habits(pool, now).await? {
        // an unadvanced habit stays overdue, so reminding now would repeat every scan
        if let Err(e) = advance_habit(pool, &habit).await {
            tracing::error!("failed to advance habit {} for {}: {e}", habit.name, habit.user_id);
            continue;
        }
        if !habit.has_checked_in {
            reminders.push(habit);
        }
    }
    Ok(reminders)
}

pub fn shame_message(habit: &Habit) -> String {
    format!("Shame {} for not doing {}.", habit.user_id.mention(), habit.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::habits::cadence::Cadence;
    use crate::commands::habits::util::{
        check_in_habit, find_habit, habits_for_user, insert_habit, test_pool,
    };
    use chrono::{Duration, TimeZone};
    use poise::serenity_prelude::{ChannelId, UserId};

    const USER: UserId = UserId::new(1257347557789663252);
    const CHANNEL: ChannelId = ChannelId::new(1257472857974505554);

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    async fn add(pool: &SqlitePool, name: &str, repeat: Cadence) -> Habit {
        let habit = Habit::new(name.to_string(), USER, CHANNEL, repeat, noon());
        insert_habit(pool, &habit).await.unwrap();
        find_habit(pool, USER, name).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn unchecked_overdue_habit_is_reminded_once() {
        let pool = test_pool().await;
        let habit = add(&pool, "read", Cadence::Daily).await;
        let now = habit.due_date + Duration::seconds(30);

        let reminders = scan_habits(&pool, now).await.unwrap();
        assert_eq!(reminders, vec![habit.clone()]);

        let advanced = find_habit(&pool, USER, "read").await.unwrap().unwrap();
        assert_eq!(advanced.due_date, habit.due_date + Duration::days(1));
        assert!(!advanced.has_checked_in);

        // the next scan in the same cycle finds nothing to do
        assert!(scan_habits(&pool, now + Duration::minutes(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn checked_in_habit_advances_silently() {
        let pool = test_pool().await;
        let habit = add(&pool, "run", Cadence::Weekly).await;
        check_in_habit(&pool, USER, "run", noon() + Duration::hours(1)).await.unwrap();

        let reminders = scan_habits(&pool, habit.due_date + Duration::seconds(1)).await.unwrap();
        assert!(reminders.is_empty());

        let advanced = find_habit(&pool, USER, "run").await.unwrap().unwrap();
        assert_eq!(advanced.due_date, habit.due_date + Duration::weeks(1));
        assert!(!advanced.has_checked_in);
        assert_eq!(advanced.check_ins.len(), 1);
    }

    #[tokio::test]
    async fn habits_not_yet_due_are_untouched() {
        let pool = test_pool().await;
        add(&pool, "read", Cadence::Daily).await;
        let before = habits_for_user(&pool, USER).await.unwrap();

        assert!(scan_habits(&pool, noon() + Duration::hours(23)).await.unwrap().is_empty());
        assert_eq!(habits_for_user(&pool, USER).await.unwrap(), before);
    }

    #[tokio::test]
    async fn long_outage_catches_up_one_step_per_scan() {
        let pool = test_pool().await;
        let habit = add(&pool, "stretch", Cadence::Minutely).await;
        let now = habit.due_date + Duration::minutes(10);

        assert_eq!(scan_habits(&pool, now).await.unwrap().len(), 1);
        assert_eq!(scan_habits(&pool, now).await.unwrap().len(), 1);
        let advanced = find_habit(&pool, USER, "stretch").await.unwrap().unwrap();
        assert_eq!(advanced.due_date, habit.due_date + Duration::minutes(2));
    }

    #[tokio::test]
    async fn failed_advance_sends_no_reminder() {
        let pool = test_pool().await;
        let habit = add(&pool, "read", Cadence::Daily).await;
        add(&pool, "run", Cadence::Daily).await;
        sqlx::query(
            "CREATE TRIGGER freeze_read BEFORE UPDATE ON habits WHEN OLD.name = 'read'
            BEGIN SELECT RAISE(ABORT, 'read is frozen'); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let reminders = scan_habits(&pool, habit.due_date + Duration::seconds(1)).await.unwrap();
        let names: Vec<&str> = reminders.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["run"]);
        let frozen = find_habit(&pool, USER, "read").await.unwrap().unwrap();
        assert_eq!(frozen.due_date, habit.due_date);
    }

    #[tokio::test]
    async fn corrupt_habit_does_not_block_the_scan() {
        let pool = test_pool().await;
        let habit = add(&pool, "read", Cadence::Daily).await;
        add(&pool, "run", Cadence::Daily).await;
        sqlx::query("UPDATE habits SET repeat = 42 WHERE name = 'read'")
            .execute(&pool)
            .await
            .unwrap();

        let reminders = scan_habits(&pool, habit.due_date + Duration::seconds(1)).await.unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].name, "run");
    }

    #[test]
    fn shame_mentions_the_user() {
        let habit = Habit::new("read".into(), USER, CHANNEL, Cadence::Daily, noon());
        assert_eq!(shame_message(&habit), "Shame <@1257347557789663252> for not doing read.");
    }
}
