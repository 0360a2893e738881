use chrono::{DateTime, Duration, Months, Utc};

use crate::types::CompoundingFrequency;

const MS_PER_DAY: i64 = 86_400_000;

/// days between two instants, counting any started day as a full day.
/// zero or negative when `end <= start`; callers must reject non-positive
/// spans before charging interest.
pub fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let ms = (end - start).num_milliseconds();
    if ms % MS_PER_DAY == 0 {
        ms / MS_PER_DAY
    } else if ms > 0 {
        ms / MS_PER_DAY + 1
    } else {
        // truncation toward zero is already the ceiling for negatives
        ms / MS_PER_DAY
    }
}

/// advance by one compounding period: a day, a calendar month, a quarter,
/// or a year. month arithmetic clamps to the last day of shorter months.
pub fn next_due_date(from: DateTime<Utc>, frequency: CompoundingFrequency) -> DateTime<Utc> {
    match frequency {
        CompoundingFrequency::Daily => from + Duration::days(1),
        CompoundingFrequency::Monthly => from + Months::new(1),
        CompoundingFrequency::Quarterly => from + Months::new(3),
        CompoundingFrequency::Annually => from + Months::new(12),
    }
}
