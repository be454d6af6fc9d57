use chrono::{DateTime, NaiveDate, Utc};

/// Time source injected into services so calendar rules ("date is in the
/// past") stay testable. The subsystem records in UTC; dates have no
/// per-doctor zone.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
