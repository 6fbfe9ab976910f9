//! Clock abstraction so streaks and miss timestamps are deterministic in tests.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};

#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Local>),
}

impl Clock {
    /// A clock stopped on `day`, at local noon or the first later (then earlier) hour that exists.
    ///
    /// Returns `None` when no hour of the day resolves in the local timezone.
    pub fn on_day(day: NaiveDate) -> Option<Self> {
        (12..24)
            .chain((0..12).rev())
            .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
            .find_map(|time| Local.from_local_datetime(&day.and_time(time)).earliest())
            .map(Self::Fixed)
    }

    pub fn now(&self) -> DateTime<Local> {
        match self {
            Clock::System => Local::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Local calendar day, no timezone normalization.
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    pub fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

#[cfg(test)]
pub(crate) fn fixed_on(date: &str) -> Clock {
    Clock::on_day(date.parse().expect("valid test date")).expect("resolvable test date")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn fixed_clock_reports_its_day() {
        let clock = fixed_on("2024-05-17");
        assert!(matches!(clock, Clock::Fixed(_)));
        assert_eq!(clock.today(), "2024-05-17".parse::<NaiveDate>().unwrap());
        assert_eq!(clock.now_millis(), clock.now().timestamp_millis());
    }

    #[test]
    fn every_day_of_a_year_resolves() {
        let mut day: NaiveDate = "2024-01-01".parse().unwrap();
        while day.year() == 2024 {
            let clock = Clock::on_day(day).unwrap();
            assert_eq!(clock.today(), day);
            day = day.succ_opt().unwrap();
        }
    }
}
