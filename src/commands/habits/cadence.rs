use chrono::{DateTime, Duration, Months, Utc};

/// How often a habit repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum Cadence {
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Cadence {
    /// Due date of the cycle following the one that ends at `current`.
    pub fn next_timing(self, current: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Cadence::Minutely => current + Duration::minutes(1),
            Cadence::Hourly => current + Duration::hours(1),
            Cadence::Daily => current + Duration::days(1),
            Cadence::Weekly => current + Duration::weeks(1),
            // clamps to the end of shorter months
            Cadence::Monthly => current + Months::new(1),
        }
    }

    /// Stored representation, stable across releases.
    pub fn to_stored(self) -> i64 {
        match self {
            Cadence::Minutely => 0,
            Cadence::Hourly => 1,
            Cadence::Daily => 2,
            Cadence::Weekly => 3,
            Cadence::Monthly => 4,
        }
    }

    pub fn from_stored(index: i64) -> Option<Cadence> {
        match index {
            0 => Some(Cadence::Minutely),
            1 => Some(Cadence::Hourly),
            2 => Some(Cadence::Daily),
            3 => Some(Cadence::Weekly),
            4 => Some(Cadence::Monthly),
            _ => None,
        }
    }
}
