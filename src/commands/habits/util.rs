use crate::commands::habits::cadence::Cadence;
use crate::Error;
use chrono::{DateTime, Utc};
use poise::serenity_prelude::{ChannelId, UserId};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{query, query_as, FromRow, SqlitePool};
use std::str::FromStr;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS habits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    user_id INTEGER NOT NULL,
    channel_id INTEGER NOT NULL,
    repeat INTEGER NOT NULL,
    due_date INTEGER NOT NULL,
    has_checked_in INTEGER NOT NULL DEFAULT 0,
    check_ins TEXT NOT NULL DEFAULT '[]',
    created_at INTEGER NOT NULL,
    UNIQUE (user_id, name)
);
CREATE INDEX IF NOT EXISTS habits_due_date ON habits (due_date);
";

/// Longest habit name accepted, keeping every reply well under Discord's message limit.
pub const MAX_HABIT_NAME: usize = 100;

const HABIT_COLUMNS: &str =
    "id, name, user_id, channel_id, repeat, due_date, has_checked_in, check_ins, created_at";

#[derive(Debug, Clone, PartialEq)]
pub struct Habit {
    pub id: Option<i64>,
    pub name: String,
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub repeat: Cadence,
    pub due_date: DateTime<Utc>,
    pub has_checked_in: bool,
    pub check_ins: Vec<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// A fresh habit whose first cycle ends one cadence step after `now`.
    pub fn new(
        name: String, user_id: UserId, channel_id: ChannelId, repeat: Cadence, now: DateTime<Utc>,
    ) -> Habit {
        Habit {
            id: None,
            name,
            user_id,
            channel_id,
            repeat,
            due_date: repeat.next_timing(now),
            has_checked_in: false,
            check_ins: Vec::new(),
            created_at: now,
        }
    }
}

#[derive(FromRow)]
struct HabitRow {
    id: i64,
    name: String,
    user_id: i64,
    channel_id: i64,
    repeat: i64,
    due_date: i64,
    has_checked_in: i64,
    check_ins: String,
    created_at: i64,
}

impl TryFrom<HabitRow> for Habit {
    type Error = Error;

    fn try_from(row: HabitRow) -> Result<Habit, Error> {
        let repeat = Cadence::from_stored(row.repeat)
            .ok_or_else(|| format!("habit {} has unknown repeat {}", row.id, row.repeat))?;
        let check_ins = serde_json::from_str::<Vec<i64>>(&row.check_ins)?
            .into_iter()
            .map(from_unix)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Habit {
            id: Some(row.id),
            name: row.name,
            user_id: UserId::new(discord_id(row.user_id)?),
            channel_id: ChannelId::new(discord_id(row.channel_id)?),
            repeat,
            due_date: from_unix(row.due_date)?,
            has_checked_in: row.has_checked_in != 0,
            check_ins,
            created_at: from_unix(row.created_at)?,
        })
    }
}

fn discord_id(stored: i64) -> Result<u64, Error> {
    match stored {
        0 => Err("stored discord id is zero".into()),
        id => Ok(id as u64),
    }
}

fn from_unix(seconds: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| format!("timestamp {seconds} out of range").into())
}

fn serialize_check_ins(check_ins: &[DateTime<Utc>]) -> Result<String, Error> {
    let seconds: Vec<i64> = check_ins.iter().map(DateTime::timestamp).collect();
    Ok(serde_json::to_string(&seconds)?)
}

fn rows_to_habits(rows: Vec<HabitRow>) -> Result<Vec<Habit>, Error> {
    rows.into_iter().map(Habit::try_from).collect()
}

/// Like `rows_to_habits`, but a row that can't be decoded is logged and left out.
fn decodable_habits(rows: Vec<HabitRow>) -> Vec<Habit> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match Habit::try_from(row) {
                Ok(habit) => Some(habit),
                Err(e) => {
                    tracing::warn!("skipping undecodable habit #{id}: {e}");
                    None
                }
            }
        })
        .collect()
}

/// Reply for a name that can't be a habit, if `name` is one.
pub fn invalid_name_reply(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        return Some("Habit names can't be empty.".to_string());
    }
    if name.chars().count() > MAX_HABIT_NAME {
        return Some(format!("Habit names can be at most {MAX_HABIT_NAME} characters long."));
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitAction {
    Add,
    List,
    CheckIn,
    Remove,
}

impl HabitAction {
    /// What the invoker is told when the database call behind `self` fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            HabitAction::Add => "Error: Couldn't add habit to the database.",
            HabitAction::List => "Error: Couldn't list habits from the database.",
            HabitAction::CheckIn => "Error: Couldn't check in.",
            HabitAction::Remove => "Error: Couldn't remove habit from the database.",
        }
    }
}

/// Opens (creating if needed) the habit database and makes sure the schema exists.
pub async fn connect(database_url: &str) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;
    create_schema(&pool).await?;
    Ok(pool)
}

pub async fn create_schema(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added(i64),
    Duplicate,
}

pub async fn insert_habit(pool: &SqlitePool, habit: &Habit) -> Result<AddOutcome, Error> {
    let check_ins = serialize_check_ins(&habit.check_ins)?;
    let inserted = query(
        "INSERT INTO habits (name, user_id, channel_id, repeat, due_date, has_checked_in, check_ins, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&habit.name)
    .bind(habit.user_id.get() as i64)
    .bind(habit.channel_id.get() as i64)
    .bind(habit.repeat.to_stored())
    .bind(habit.due_date.timestamp())
    .bind(habit.has_checked_in)
    .bind(check_ins)
    .bind(habit.created_at.timestamp())
    .execute(pool)
    .await;
    match inserted {
        Ok(result) => Ok(AddOutcome::Added(result.last_insert_rowid())),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(AddOutcome::Duplicate),
        Err(e) => Err(e.into()),
    }
}

pub async fn habits_for_user(pool: &SqlitePool, user_id: UserId) -> Result<Vec<Habit>, Error> {
    let sql = format!("SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = ? ORDER BY created_at, id");
    let rows = query_as::<_, HabitRow>(&sql)
        .bind(user_id.get() as i64)
        .fetch_all(pool)
        .await?;
    rows_to_habits(rows)
}

pub async fn find_habit(
    pool: &SqlitePool, user_id: UserId, name: &str,
) -> Result<Option<Habit>, Error> {
    let sql = format!("SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = ? AND name = ?");
    let row = query_as::<_, HabitRow>(&sql)
        .bind(user_id.get() as i64)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    row.map(Habit::try_from).transpose()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInOutcome {
    NotFound,
    AlreadyCheckedIn,
    CheckedIn,
}

pub async fn check_in_habit(
    pool: &SqlitePool, user_id: UserId, name: &str, now: DateTime<Utc>,
) -> Result<CheckInOutcome, Error> {
    let Some(mut habit) = find_habit(pool, user_id, name).await? else {
        return Ok(CheckInOutcome::NotFound);
    };
    if habit.has_checked_in {
        return Ok(CheckInOutcome::AlreadyCheckedIn);
    }
    habit.check_ins.push(now);
    let check_ins = serialize_check_ins(&habit.check_ins)?;
    // a concurrent check-in may have won between the read and this update
    let updated = query(
        "UPDATE habits SET has_checked_in = 1, check_ins = ?
        WHERE user_id = ? AND name = ? AND has_checked_in = 0",
    )
    .bind(check_ins)
    .bind(user_id.get() as i64)
    .bind(name)
    .execute(pool)
    .await?
    .rows_affected();
    if updated == 0 {
        return Ok(CheckInOutcome::AlreadyCheckedIn);
    }
    Ok(CheckInOutcome::CheckedIn)
}

/// Returns how many habits were deleted.
pub async fn remove_habit(pool: &SqlitePool, user_id: UserId, name: &str) -> Result<u64, Error> {
    let deleted = query("DELETE FROM habits WHERE user_id = ? AND name = ?")
        .bind(user_id.get() as i64)
        .bind(name)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(deleted)
}

/// Habits due strictly before `now`. Rows that fail to decode are skipped so one bad
/// record can't hold up everyone else's reminders.
pub async fn overdue_habits(pool: &SqlitePool, now: DateTime<Utc>) -> Result<Vec<Habit>, Error> {
    let sql = format!("SELECT {HABIT_COLUMNS} FROM habits WHERE due_date < ? ORDER BY due_date, id");
    let rows = query_as::<_, HabitRow>(&sql)
        .bind(now.timestamp())
        .fetch_all(pool)
        .await?;
    Ok(decodable_habits(rows))
}

/// Moves the habit into its next cycle and returns the new due date.
pub async fn advance_habit(pool: &SqlitePool, habit: &Habit) -> Result<DateTime<Utc>, Error> {
    let Some(id) = habit.id else {
        return Err(format!("habit {} was never stored", habit.name).into());
    };
    let due_date = habit.repeat.next_timing(habit.due_date);
    query("UPDATE habits SET due_date = ?, has_checked_in = 0 WHERE id = ?")
        .bind(due_date.timestamp())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(due_date)
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    // one long-lived connection, otherwise every connection gets its own empty memory database
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<std::time::Duration>)
        .max_lifetime(None::<std::time::Duration>)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    create_schema(&pool).await.unwrap();
    pool
}
