use std::collections::BTreeSet;

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use super::model::MealRecord;

/// Inclusive instant range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl DateRange {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self { start, end }
    }

    /// First to last instant of `date` in `offset`.
    pub fn day(date: Date, offset: UtcOffset) -> Self {
        Self {
            start: date.midnight().assume_offset(offset),
            end: PrimitiveDateTime::new(date, Time::MAX).assume_offset(offset),
        }
    }

    /// Month given 0-based (`0` = January). `None` when `month0 > 11`.
    pub fn month(year: i32, month0: u8, offset: UtcOffset) -> Option<Self> {
        let month = Month::try_from(month0.checked_add(1)?).ok()?;
        let first = Date::from_calendar_date(year, month, 1).ok()?;
        let next_first = match month {
            Month::December => Date::from_calendar_date(year.checked_add(1)?, Month::January, 1),
            _ => Date::from_calendar_date(year, month.next(), 1),
        }
        .ok()?;
        Some(Self {
            start: first.midnight().assume_offset(offset),
            end: next_first.midnight().assume_offset(offset) - Duration::NANOSECOND,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Filters in-memory records by period. Calendar days are taken in `offset`.
#[derive(Debug, Clone, Copy)]
pub struct PeriodResolver {
    offset: UtcOffset,
}

impl Default for PeriodResolver {
    fn default() -> Self {
        Self::new(UtcOffset::UTC)
    }
}

impl PeriodResolver {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    pub fn query<'a, I>(&self, records: I, range: DateRange) -> Vec<&'a MealRecord>
    where
        I: IntoIterator<Item = &'a MealRecord>,
    {
        query(records, range)
    }

    pub fn query_day<'a, I>(&self, records: I, date: Date) -> Vec<&'a MealRecord>
    where
        I: IntoIterator<Item = &'a MealRecord>,
    {
        query(records, DateRange::day(date, self.offset))
    }

    pub fn query_month<'a, I>(&self, records: I, year: i32, month0: u8) -> Vec<&'a MealRecord>
    where
        I: IntoIterator<Item = &'a MealRecord>,
    {
        match DateRange::month(year, month0, self.offset) {
            Some(range) => query(records, range),
            None => Vec::new(),
        }
    }

    /// Records on any of `dates`, each at most once.
    pub fn query_dates<'a, I>(&self, records: I, dates: &[Date]) -> Vec<&'a MealRecord>
    where
        I: IntoIterator<Item = &'a MealRecord>,
    {
        let selected: BTreeSet<Date> = dates.iter().copied().collect();
        let mut hits: Vec<&MealRecord> = records
            .into_iter()
            .filter(|r| selected.contains(&self.local_date(r)))
            .collect();
        hits.sort_by_key(|r| r.timestamp());
        hits
    }

    pub fn local_date(&self, record: &MealRecord) -> Date {
        record.timestamp().to_offset(self.offset).date()
    }
}

/// Records with `start <= timestamp <= end`, ascending by timestamp.
///
/// Ties keep input order. An inverted range yields nothing.
pub fn query<'a, I>(records: I, range: DateRange) -> Vec<&'a MealRecord>
where
    I: IntoIterator<Item = &'a MealRecord>,
{
    if range.is_empty() {
        return Vec::new();
    }
    let mut hits: Vec<&MealRecord> = records
        .into_iter()
        .filter(|r| range.contains(r.timestamp()))
        .collect();
    hits.sort_by_key(|r| r.timestamp());
    hits
}
