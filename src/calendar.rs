//! Bank holiday and business-day helpers.
//!
//! The encoder never consults this module. Callers may use it to pick an
//! effective entry date before constructing a [`crate::batch::Batch`].
//!
//! Bank days run from local midnight to local midnight in the calendar's
//! timezone, `America/Los_Angeles` unless configured otherwise. Daylight
//! saving follows the tz database, so the day starts at 07:00 UTC in summer
//! and 08:00 UTC in winter.

use crate::error::{Error, Result};
use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;
use std::collections::BTreeSet;

/// Timezone the bank day is reckoned in.
pub const BANK_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

/// Federal Reserve holidays 2018 through 2024.
///
/// A holiday on a Saturday stays on the Saturday; a Sunday holiday is
/// observed the following Monday.
const FEDERAL_RESERVE_HOLIDAYS: &[(i32, u32, u32)] = &[
    // 2018
    (2018, 1, 1),
    (2018, 1, 15),
    (2018, 2, 19),
    (2018, 5, 28),
    (2018, 7, 4),
    (2018, 9, 3),
    (2018, 10, 8),
    (2018, 11, 12),
    (2018, 11, 22),
    (2018, 12, 25),
    // 2019
    (2019, 1, 1),
    (2019, 1, 21),
    (2019, 2, 18),
    (2019, 5, 27),
    (2019, 7, 4),
    (2019, 9, 2),
    (2019, 10, 14),
    (2019, 11, 11),
    (2019, 11, 28),
    (2019, 12, 25),
    // 2020
    (2020, 1, 1),
    (2020, 1, 20),
    (2020, 2, 17),
    (2020, 5, 25),
    (2020, 7, 4),
    (2020, 9, 7),
    (2020, 10, 12),
    (2020, 11, 11),
    (2020, 11, 26),
    (2020, 12, 25),
    // 2021
    (2021, 1, 1),
    (2021, 1, 18),
    (2021, 2, 15),
    (2021, 5, 31),
    (2021, 6, 19),
    (2021, 7, 5),
    (2021, 9, 6),
    (2021, 10, 11),
    (2021, 11, 11),
    (2021, 11, 25),
    (2021, 12, 25),
    // 2022
    (2022, 1, 1),
    (2022, 1, 17),
    (2022, 2, 21),
    (2022, 5, 30),
    (2022, 6, 20),
    (2022, 7, 4),
    (2022, 9, 5),
    (2022, 10, 10),
    (2022, 11, 11),
    (2022, 11, 24),
    (2022, 12, 26),
    // 2023
    (2023, 1, 2),
    (2023, 1, 16),
    (2023, 2, 20),
    (2023, 5, 29),
    (2023, 6, 19),
    (2023, 7, 4),
    (2023, 9, 4),
    (2023, 10, 9),
    (2023, 11, 11),
    (2023, 11, 23),
    (2023, 12, 25),
    // 2024
    (2024, 1, 1),
    (2024, 1, 15),
    (2024, 2, 19),
    (2024, 5, 27),
    (2024, 6, 19),
    (2024, 7, 4),
    (2024, 9, 2),
    (2024, 10, 14),
    (2024, 11, 11),
    (2024, 11, 28),
    (2024, 12, 25),
];

/// An instant supplied to the calendar.
///
/// Only inputs that name a precise moment are accepted. A bare calendar
/// date such as `2020-07-04` is ambiguous across timezones and is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankInstant {
    DateTime(DateTime<Utc>),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    /// RFC 3339 / ISO 8601 date-time including a zone designator.
    Iso8601(String),
}

impl BankInstant {
    pub fn to_utc(&self) -> Result<DateTime<Utc>> {
        match self {
            BankInstant::DateTime(instant) => Ok(*instant),
            BankInstant::Timestamp(millis) => DateTime::from_timestamp_millis(*millis)
                .ok_or_else(|| Error::Calendar(format!("timestamp out of range: {}", millis))),
            BankInstant::Iso8601(text) => DateTime::parse_from_rfc3339(text)
                .map(|instant| instant.with_timezone(&Utc))
                .map_err(|_| {
                    Error::Calendar(format!(
                        "expected a full ISO 8601 date-time with zone, got {}",
                        text
                    ))
                }),
        }
    }
}

impl From<DateTime<Utc>> for BankInstant {
    fn from(instant: DateTime<Utc>) -> Self {
        BankInstant::DateTime(instant)
    }
}

/// Holiday and working-day lookup.
///
/// Every query fails with [`Error::Calendar`] when the instant cannot be
/// resolved to a moment in time.
pub trait BusinessCalendar {
    fn is_holiday(&self, instant: &BankInstant) -> Result<bool>;

    fn is_weekend(&self, instant: &BankInstant) -> Result<bool>;

    fn is_working_day(&self, instant: &BankInstant) -> Result<bool> {
        Ok(!self.is_weekend(instant)? && !self.is_holiday(instant)?)
    }
}

/// A calendar backed by a set of holiday dates in a bank timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayCalendar {
    holidays: BTreeSet<NaiveDate>,
    zone: Tz,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::federal_reserve()
    }
}

impl HolidayCalendar {
    /// Calendar with the given holidays in [`BANK_TIMEZONE`].
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
            zone: BANK_TIMEZONE,
        }
    }

    /// Calendar preloaded with the Federal Reserve holidays for 2018-2024.
    ///
    /// # Examples
    ///
    /// ```
    /// use ach_writer::calendar::{BankInstant, BusinessCalendar, HolidayCalendar};
    ///
    /// let calendar = HolidayCalendar::federal_reserve();
    /// let thanksgiving = BankInstant::Iso8601("2020-11-26T18:00:00Z".into());
    /// assert!(calendar.is_holiday(&thanksgiving)?);
    /// # Ok::<(), ach_writer::Error>(())
    /// ```
    pub fn federal_reserve() -> Self {
        Self::new(
            FEDERAL_RESERVE_HOLIDAYS
                .iter()
                .filter_map(|&(year, month, day)| NaiveDate::from_ymd_opt(year, month, day)),
        )
    }

    /// Use a different bank timezone.
    pub fn with_zone(mut self, zone: Tz) -> Self {
        self.zone = zone;
        self
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Add holidays on top of the ones already known.
    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays.extend(holidays);
        self
    }

    /// The bank-local calendar date of `instant`.
    pub fn bank_date(&self, instant: &BankInstant) -> Result<NaiveDate> {
        Ok(instant.to_utc()?.with_timezone(&self.zone).date_naive())
    }

    /// Move forward by `days` working days.
    ///
    /// From a working day the local wall-clock time is kept. From a
    /// non-working day the count starts at local midnight of the next
    /// working day.
    pub fn add_business_days(&self, instant: &BankInstant, days: u32) -> Result<DateTime<Utc>> {
        let utc = instant.to_utc()?;
        let local = utc.with_timezone(&self.zone);
        let mut date = local.date_naive();
        let mut time = local.time();

        if self.is_working_date(date) {
            if days == 0 {
                return Ok(utc);
            }
        } else {
            time = NaiveTime::MIN;
            date = self.next_working_date(date);
        }

        for _ in 0..days {
            date = self.next_working_date(date);
        }

        self.resolve(date.and_time(time))
    }

    /// Next working day after `instant`, as an effective entry date.
    pub fn next_effective_date(&self, instant: &BankInstant) -> Result<NaiveDate> {
        let next = self.add_business_days(instant, 1)?;
        Ok(next.with_timezone(&self.zone).date_naive())
    }

    fn is_working_date(&self, date: NaiveDate) -> bool {
        !is_weekend_date(date) && !self.holidays.contains(&date)
    }

    fn next_working_date(&self, mut date: NaiveDate) -> NaiveDate {
        loop {
            date = date.succ_opt().unwrap_or(date);
            if self.is_working_date(date) || date == NaiveDate::MAX {
                return date;
            }
        }
    }

    fn resolve(&self, local: NaiveDateTime) -> Result<DateTime<Utc>> {
        match self.zone.from_local_datetime(&local) {
            LocalResult::Single(instant) | LocalResult::Ambiguous(instant, _) => {
                Ok(instant.with_timezone(&Utc))
            }
            // Skipped by a spring-forward jump; land just after it.
            LocalResult::None => self
                .zone
                .from_local_datetime(&(local + Duration::hours(1)))
                .earliest()
                .map(|instant| instant.with_timezone(&Utc))
                .ok_or_else(|| {
                    Error::Calendar(format!("{} does not exist in {}", local, self.zone))
                }),
        }
    }
}

fn is_weekend_date(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

impl BusinessCalendar for HolidayCalendar {
    fn is_holiday(&self, instant: &BankInstant) -> Result<bool> {
        Ok(self.holidays.contains(&self.bank_date(instant)?))
    }

    fn is_weekend(&self, instant: &BankInstant) -> Result<bool> {
        Ok(is_weekend_date(self.bank_date(instant)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(text: &str) -> BankInstant {
        BankInstant::Iso8601(text.to_string())
    }

    fn utc(text: &str) -> DateTime<Utc> {
        at(text).to_utc().unwrap()
    }

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_summer_holiday_starts_at_pacific_daylight_midnight() {
        let calendar = HolidayCalendar::federal_reserve();
        assert!(!calendar.is_holiday(&at("2020-07-04T06:59:59.999Z")).unwrap());
        assert!(calendar.is_holiday(&at("2020-07-04T07:00:00.000Z")).unwrap());
        assert!(calendar.is_holiday(&at("2020-07-05T06:59:59.999Z")).unwrap());
        // July 5th 2020 is a Sunday.
        assert!(!calendar.is_working_day(&at("2020-07-05T07:00:00.000Z")).unwrap());
    }

    #[test]
    fn test_winter_holiday_starts_at_pacific_standard_midnight() {
        let calendar = HolidayCalendar::federal_reserve();
        assert!(!calendar.is_holiday(&at("2020-11-11T07:59:59.999Z")).unwrap());
        assert!(calendar.is_holiday(&at("2020-11-11T08:00:00.000Z")).unwrap());
        assert!(calendar.is_holiday(&at("2020-11-12T07:59:59.999Z")).unwrap());
        assert!(!calendar.is_holiday(&at("2020-11-12T08:00:00.000Z")).unwrap());

        assert!(calendar.is_holiday(&at("2020-11-26T08:00:00.000Z")).unwrap());
        assert!(calendar.is_holiday(&at("2020-11-27T07:59:59.999Z")).unwrap());
        assert!(!calendar.is_holiday(&at("2020-11-27T08:00:00.000Z")).unwrap());

        assert!(calendar.is_holiday(&at("2020-12-25T08:00:00.000Z")).unwrap());
        assert!(calendar.is_holiday(&at("2020-12-26T07:59:59.999Z")).unwrap());
        assert!(!calendar.is_working_day(&at("2020-12-26T08:00:00.000Z")).unwrap());
    }

    #[test]
    fn test_federal_reserve_table() {
        let calendar = HolidayCalendar::default();
        for date in [
            ymd(2020, 7, 4),
            ymd(2020, 11, 11),
            ymd(2020, 11, 26),
            ymd(2020, 12, 25),
            ymd(2022, 11, 11),
            ymd(2022, 11, 24),
        ] {
            let midday = at(&format!("{}T20:00:00Z", date));
            assert!(calendar.is_holiday(&midday).unwrap(), "{}", date);
        }
        assert!(!calendar.is_holiday(&at("2022-11-10T20:00:00Z")).unwrap());
        assert!(calendar.is_working_day(&at("2022-11-10T20:00:00Z")).unwrap());
    }

    #[test]
    fn test_every_table_entry_is_a_weekday_or_unshifted_saturday() {
        for &(year, month, day) in FEDERAL_RESERVE_HOLIDAYS {
            let date = ymd(year, month, day);
            assert_ne!(date.weekday(), Weekday::Sun, "{}", date);
        }
    }

    #[test]
    fn test_add_zero_business_days() {
        let calendar = HolidayCalendar::federal_reserve();
        assert_eq!(
            calendar.add_business_days(&at("2022-11-08T16:00:00.000Z"), 0).unwrap(),
            utc("2022-11-08T16:00:00.000Z")
        );
        assert_eq!(
            calendar.add_business_days(&at("2022-11-11T16:00:00.000Z"), 0).unwrap(),
            utc("2022-11-14T08:00:00.000Z")
        );
        assert_eq!(
            calendar.add_business_days(&at("2022-11-13T16:00:00.000Z"), 0).unwrap(),
            utc("2022-11-14T08:00:00.000Z")
        );
    }

    #[test]
    fn test_add_business_days_skips_holidays_and_weekends() {
        let calendar = HolidayCalendar::federal_reserve();
        let cases = [
            ("2022-11-07T16:00:00.000Z", 1, "2022-11-08T16:00:00.000Z"),
            ("2022-11-10T16:00:00.000Z", 1, "2022-11-14T16:00:00.000Z"),
            ("2022-11-13T16:00:00.000Z", 1, "2022-11-15T08:00:00.000Z"),
            ("2022-11-11T16:00:00.000Z", 1, "2022-11-15T08:00:00.000Z"),
            ("2022-11-12T16:00:00.000Z", 1, "2022-11-15T08:00:00.000Z"),
            ("2022-11-07T16:00:00.000Z", 2, "2022-11-09T16:00:00.000Z"),
            ("2022-11-10T16:00:00.000Z", 2, "2022-11-15T16:00:00.000Z"),
            ("2022-11-13T16:00:00.000Z", 2, "2022-11-16T08:00:00.000Z"),
            ("2022-11-11T16:00:00.000Z", 2, "2022-11-16T08:00:00.000Z"),
            ("2022-11-23T16:00:00.000Z", 2, "2022-11-28T16:00:00.000Z"),
        ];
        for (start, days, expected) in cases {
            assert_eq!(
                calendar.add_business_days(&at(start), days).unwrap(),
                utc(expected),
                "{} + {}",
                start,
                days
            );
        }
    }

    #[test]
    fn test_add_business_days_keeps_wall_clock_across_dst() {
        let calendar = HolidayCalendar::federal_reserve();
        // Friday 09:00 PDT to Monday 09:00 PST.
        assert_eq!(
            calendar.add_business_days(&at("2022-11-04T16:00:00Z"), 1).unwrap(),
            utc("2022-11-07T17:00:00Z")
        );
    }

    #[test]
    fn test_next_effective_date() {
        let calendar = HolidayCalendar::federal_reserve();
        assert_eq!(
            calendar.next_effective_date(&at("2022-11-10T16:00:00Z")).unwrap(),
            ymd(2022, 11, 14)
        );
    }

    #[test]
    fn test_instant_inputs() {
        let expected = utc("2020-07-04T07:00:00Z");
        assert_eq!(BankInstant::Timestamp(expected.timestamp_millis()).to_utc().unwrap(), expected);
        assert_eq!(BankInstant::from(expected).to_utc().unwrap(), expected);

        let calendar = HolidayCalendar::federal_reserve();
        assert!(calendar
            .is_holiday(&BankInstant::Timestamp(expected.timestamp_millis()))
            .unwrap());
        assert!(matches!(calendar.is_holiday(&at("2020-07-04")), Err(Error::Calendar(_))));
        assert!(matches!(calendar.is_holiday(&at("somestring")), Err(Error::Calendar(_))));
    }

    #[test]
    fn test_custom_zone_and_holidays() {
        let fixed = HolidayCalendar::federal_reserve().with_zone(Tz::Etc__GMTPlus8);
        assert_eq!(fixed.zone(), Tz::Etc__GMTPlus8);
        assert_eq!(
            fixed.bank_date(&at("2020-07-04T07:00:00Z")).unwrap(),
            ymd(2020, 7, 3)
        );

        let extra = HolidayCalendar::new([ymd(2024, 12, 31)]).with_holidays([ymd(2025, 1, 9)]);
        assert!(extra.is_holiday(&at("2025-01-09T20:00:00Z")).unwrap());
        assert!(extra.is_holiday(&at("2024-12-31T20:00:00Z")).unwrap());
        assert!(!extra.is_holiday(&at("2020-07-04T20:00:00Z")).unwrap());
    }
}
