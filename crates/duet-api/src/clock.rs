use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Zone the day boundary follows unless configured otherwise.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Decides which calendar day "today" is for the daily prompt.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    /// Wall clock in an IANA time zone, daylight saving included.
    Zone(Tz),
    /// Always the same day. Used by tests.
    Fixed(NaiveDate),
}

impl Default for Clock {
    fn default() -> Self {
        Clock::Zone(DEFAULT_TIMEZONE)
    }
}

impl Clock {
    /// Parse an IANA zone name such as `America/New_York`.
    pub fn from_zone_name(name: &str) -> Result<Self> {
        name.parse::<Tz>()
            .map(Clock::Zone)
            .map_err(|e| anyhow!("unknown time zone '{}': {}", name, e))
    }

    pub fn today(&self) -> NaiveDate {
        self.date_at(Utc::now())
    }

    /// The local calendar day at `instant`.
    pub fn date_at(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            Clock::Zone(tz) => instant.with_timezone(tz).date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}
