use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};

/// Source of the timestamps stamped onto new events and feedback
pub trait DateProvider: Send + Sync {
    fn get_current_time(&self) -> DateTime<Utc>;
}

pub struct SystemDateProvider;

impl DateProvider for SystemDateProvider {
    fn get_current_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Replaces today's date with a fixed one, keeping the wall-clock time.
/// Backs the `--override-date` flag.
pub struct OverrideDateProvider {
    override_date: NaiveDate,
}

impl OverrideDateProvider {
    pub fn new(override_date: NaiveDate) -> Self {
        Self { override_date }
    }
}

impl DateProvider for OverrideDateProvider {
    fn get_current_time(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let naive = self
            .override_date
            .and_hms_opt(now.hour(), now.minute(), now.second())
            .unwrap_or_else(|| self.override_date.and_time(NaiveTime::MIN));
        DateTime::from_naive_utc_and_offset(naive, Utc)
    }
}

/// Always returns the same instant
pub struct FixedDateProvider(pub DateTime<Utc>);

impl DateProvider for FixedDateProvider {
    fn get_current_time(&self) -> DateTime<Utc> {
        self.0
    }
}
