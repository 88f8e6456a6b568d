//! Period parameters: relative periods, ISO fixed periods and date ranges.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use tea_model::OffsetUid;

use crate::error::{QueryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativePeriod {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    ThisMonth,
    LastMonth,
    Last3Months,
    Last12Months,
    ThisYear,
    LastYear,
    Last5Years,
}

impl RelativePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelativePeriod::Today => "TODAY",
            RelativePeriod::Yesterday => "YESTERDAY",
            RelativePeriod::Last7Days => "LAST_7_DAYS",
            RelativePeriod::Last30Days => "LAST_30_DAYS",
            RelativePeriod::ThisMonth => "THIS_MONTH",
            RelativePeriod::LastMonth => "LAST_MONTH",
            RelativePeriod::Last3Months => "LAST_3_MONTHS",
            RelativePeriod::Last12Months => "LAST_12_MONTHS",
            RelativePeriod::ThisYear => "THIS_YEAR",
            RelativePeriod::LastYear => "LAST_YEAR",
            RelativePeriod::Last5Years => "LAST_5_YEARS",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let period = match value {
            "TODAY" => RelativePeriod::Today,
            "YESTERDAY" => RelativePeriod::Yesterday,
            "LAST_7_DAYS" => RelativePeriod::Last7Days,
            "LAST_30_DAYS" => RelativePeriod::Last30Days,
            "THIS_MONTH" => RelativePeriod::ThisMonth,
            "LAST_MONTH" => RelativePeriod::LastMonth,
            "LAST_3_MONTHS" => RelativePeriod::Last3Months,
            "LAST_12_MONTHS" => RelativePeriod::Last12Months,
            "THIS_YEAR" => RelativePeriod::ThisYear,
            "LAST_YEAR" => RelativePeriod::LastYear,
            "LAST_5_YEARS" => RelativePeriod::Last5Years,
            _ => return None,
        };
        Some(period)
    }

    fn date_range(&self, reference: NaiveDate) -> Option<DateRange> {
        let this_month = month_start(reference.year(), reference.month())?;
        let this_year = NaiveDate::from_ymd_opt(reference.year(), 1, 1)?;
        let range = match self {
            RelativePeriod::Today => DateRange::new(reference, reference),
            RelativePeriod::Yesterday => {
                let day = reference - Duration::days(1);
                DateRange::new(day, day)
            }
            RelativePeriod::Last7Days => DateRange::new(
                reference - Duration::days(7),
                reference - Duration::days(1),
            ),
            RelativePeriod::Last30Days => DateRange::new(
                reference - Duration::days(30),
                reference - Duration::days(1),
            ),
            RelativePeriod::ThisMonth => DateRange::new(this_month, month_end(this_month)?),
            RelativePeriod::LastMonth => months_before(this_month, 1)?,
            RelativePeriod::Last3Months => months_before(this_month, 3)?,
            RelativePeriod::Last12Months => months_before(this_month, 12)?,
            RelativePeriod::ThisYear => {
                DateRange::new(this_year, NaiveDate::from_ymd_opt(reference.year(), 12, 31)?)
            }
            RelativePeriod::LastYear => years_before(this_year, 1)?,
            RelativePeriod::Last5Years => years_before(this_year, 5)?,
        };
        Some(range)
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, value: NaiveDateTime) -> bool {
        let day = value.date();
        self.start <= day && day <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Period {
    Relative(RelativePeriod),
    Year(i32),
    Month(i32, u32),
    Day(NaiveDate),
    Range(DateRange),
}

impl Period {
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        let invalid = || QueryError::InvalidPeriod(value.to_string());
        if let Some(relative) = RelativePeriod::parse(value) {
            return Ok(Period::Relative(relative));
        }
        if let Some((start, end)) = value.split_once('_')
            && let (Ok(start), Ok(end)) = (parse_iso_date(start), parse_iso_date(end))
        {
            if start > end {
                return Err(invalid());
            }
            return Ok(Period::Range(DateRange::new(start, end)));
        }
        if let Ok(day) = parse_iso_date(value) {
            return Ok(Period::Day(day));
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year = value
            .get(..4)
            .and_then(|y| y.parse::<i32>().ok())
            .ok_or_else(invalid)?;
        match value.len() {
            4 => Ok(Period::Year(year)),
            6 => {
                let month = value[4..].parse::<u32>().map_err(|_| invalid())?;
                month_start(year, month).ok_or_else(invalid)?;
                Ok(Period::Month(year, month))
            }
            8 => NaiveDate::parse_from_str(value, "%Y%m%d")
                .map(Period::Day)
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }

    pub fn date_range(&self, reference: NaiveDate) -> Result<DateRange> {
        let range = match self {
            Period::Relative(relative) => relative.date_range(reference),
            Period::Year(year) => NaiveDate::from_ymd_opt(*year, 1, 1)
                .zip(NaiveDate::from_ymd_opt(*year, 12, 31))
                .map(|(start, end)| DateRange::new(start, end)),
            Period::Month(year, month) => month_start(*year, *month)
                .and_then(|start| month_end(start).map(|end| DateRange::new(start, end))),
            Period::Day(day) => Some(DateRange::new(*day, *day)),
            Period::Range(range) => Some(*range),
        };
        range.ok_or_else(|| QueryError::InvalidPeriod(format!("{self:?}")))
    }
}

/// Periods for one parameter, optionally scoped to a program enrollment,
/// as in `IpHINAT79UW[1].LAST_YEAR;2019`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodFilter {
    pub program: Option<OffsetUid>,
    pub periods: Vec<Period>,
}

impl PeriodFilter {
    pub fn parse(value: &str) -> Result<Self> {
        let (program, periods) = match value.split_once('.') {
            Some((program, periods)) => {
                let program = program
                    .parse::<OffsetUid>()
                    .map_err(|_| QueryError::InvalidPeriod(value.to_string()))?;
                (Some(program), periods)
            }
            None => (None, value),
        };
        let periods = periods
            .split(';')
            .filter(|period| !period.trim().is_empty())
            .map(Period::parse)
            .collect::<Result<Vec<_>>>()?;
        if periods.is_empty() {
            return Err(QueryError::InvalidPeriod(value.to_string()));
        }
        Ok(Self { program, periods })
    }

    pub fn date_ranges(&self, reference: NaiveDate) -> Result<Vec<DateRange>> {
        self.periods
            .iter()
            .map(|period| period.date_range(reference))
            .collect()
    }
}

fn parse_iso_date(value: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
}

fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn month_end(start: NaiveDate) -> Option<NaiveDate> {
    start
        .checked_add_months(Months::new(1))
        .map(|next| next - Duration::days(1))
}

/// The `count` whole months preceding the month starting at `this_month`.
fn months_before(this_month: NaiveDate, count: u32) -> Option<DateRange> {
    let start = this_month.checked_sub_months(Months::new(count))?;
    Some(DateRange::new(start, this_month - Duration::days(1)))
}

fn years_before(this_year: NaiveDate, count: i32) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(this_year.year() - count, 1, 1)?;
    Some(DateRange::new(start, this_year - Duration::days(1)))
}
