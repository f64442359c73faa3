// Daily trigger for the polling loop
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Fires at most once per calendar day, on the first poll at or after `at`.
///
/// Only the last fired date is kept, in memory. A poll that arrives late on the
/// same day still fires; days with no poll at all are not replayed.
#[derive(Debug, Clone)]
pub struct DailyTrigger {
    at: NaiveTime,
    skip_weekends: bool,
    last_fired: Option<NaiveDate>,
}

impl DailyTrigger {
    /// A process started after today's trigger time waits for the next day.
    pub fn new(at: NaiveTime, skip_weekends: bool, now: NaiveDateTime) -> Self {
        let missed_today = now.time() > at;
        Self {
            at,
            skip_weekends,
            last_fired: missed_today.then(|| now.date()),
        }
    }

    /// Returns `true` when the job is due and records today as fired.
    pub fn poll(&mut self, now: NaiveDateTime) -> bool {
        let today = now.date();
        if self.last_fired == Some(today) || now.time() < self.at || !self.runs_on(today) {
            return false;
        }
        self.last_fired = Some(today);
        true
    }

    pub fn next_run(&self, now: NaiveDateTime) -> NaiveDateTime {
        let mut date = now.date();
        if self.last_fired == Some(date) {
            date = date + Duration::days(1);
        }
        while !self.runs_on(date) {
            date = date + Duration::days(1);
        }
        date.and_time(self.at)
    }

    fn runs_on(&self, date: NaiveDate) -> bool {
        !(self.skip_weekends && matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
    }
}
