use chrono::{DateTime, Duration, LocalResult, TimeZone, Utc};

const REFRESH_PERIOD_HOURS: i64 = 24;

/// First instant of the day after `now`, in `now`'s own time zone.
pub fn next_local_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let tz = now.timezone();
    let fallback = now.with_timezone(&Utc) + Duration::hours(REFRESH_PERIOD_HOURS);
    let Some(tomorrow) = now.date_naive().succ_opt() else {
        return fallback;
    };
    let Some(midnight) = tomorrow.and_hms_opt(0, 0, 0) else {
        return fallback;
    };
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Midnight skipped by a DST jump; an hour later exists.
        LocalResult::None => tz
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(fallback),
    }
}

/// Fires once at the next local midnight, then every 24 hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyRefresh {
    next_due: DateTime<Utc>,
}

impl DailyRefresh {
    pub fn new<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self {
            next_due: next_local_midnight(now),
        }
    }

    pub fn next_due(&self) -> DateTime<Utc> {
        self.next_due
    }

    /// True at most once per due time. After a long sleep the missed runs
    /// collapse into one and the schedule skips ahead.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if now < self.next_due {
            return false;
        }
        let period = Duration::hours(REFRESH_PERIOD_HOURS);
        while self.next_due <= now {
            self.next_due += period;
        }
        true
    }
}
