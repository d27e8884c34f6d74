use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Date format used for payment dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Clock abstracts access to the current timestamp so the store remains deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Today's date rendered as `YYYY-MM-DD`.
    fn today_string(&self) -> String {
        self.today().format(DATE_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn on(date: NaiveDate) -> Self {
        Self(DateTime::from_naive_utc_and_offset(
            date.and_time(NaiveTime::default()),
            Utc,
        ))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_formats_iso_date() {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(clock.today_string(), "2024-03-09");
    }
}
