pub mod availability;
pub mod balance;
pub mod capacity;
pub mod enrollment;
mod error;
pub mod slots;
pub mod sweep;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

pub use availability::{AvailabilityModel, TrainerAvailability};
pub use balance::PackageBalanceTracker;
pub use capacity::SessionCapacityLedger;
pub use enrollment::{EnrollmentLifecycle, SchedulingPolicy};
pub use error::{SchedulingError, SchedulingResult};
pub use slots::{GenerationReport, SlotGenerator};
pub use sweep::SweepReport;

/// Interpret a trainer-local wall-clock date and time as a UTC instant.
/// DST folds take the earlier instant; times inside a spring-forward gap
/// shift one hour later.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| naive.and_utc()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn local_to_utc_applies_the_zone_offset() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let utc = local_to_utc(date, time, chrono_tz::Europe::Berlin);
        // Berlin is UTC+1 in January.
        assert_eq!(utc, date.and_hms_opt(9, 0, 0).unwrap().and_utc());
    }

    #[test]
    fn local_to_utc_handles_spring_forward_gap() {
        // 2025-03-30 02:30 does not exist in Berlin; it resolves one hour on.
        let date = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
        let time = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        let utc = local_to_utc(date, time, chrono_tz::Europe::Berlin);
        assert_eq!(utc, date.and_hms_opt(1, 30, 0).unwrap().and_utc());
    }
}
