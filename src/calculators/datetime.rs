use crate::config::CalcConfig;
use crate::domain::ports::Calculator;
use crate::utils::error::{CalcError, Result};
use crate::utils::validation::validate_non_negative;
use chrono::{Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

const REGULAR_HOURS_PER_WEEK: f64 = 40.0;
const OVERTIME_MULTIPLIER: f64 = 1.5;
const MINUTES_PER_DAY: i64 = 24 * 60;

/// Whole years, months and days between two dates, borrowing from the month before `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarSpan {
    pub years: i32,
    pub months: u32,
    pub days: u32,
}

fn days_in_previous_month(date: NaiveDate) -> Result<u32> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .ok_or_else(|| CalcError::overflow("date before the supported calendar range"))
}

/// Requires `start <= end`.
pub fn calendar_span(start: NaiveDate, end: NaiveDate) -> Result<CalendarSpan> {
    let mut years = end.year() - start.year();
    let mut months = end.month() as i32 - start.month() as i32;
    let mut days = end.day() as i32 - start.day() as i32;

    if days < 0 {
        months -= 1;
        days += days_in_previous_month(end)? as i32;
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }
    Ok(CalendarSpan {
        years,
        months: months as u32,
        days: days.max(0) as u32,
    })
}

fn parse_clock(field: &str, raw: &str) -> Result<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| CalcError::ParseError {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

// Age

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeInput {
    pub birth_date: NaiveDate,
    /// Defaults to today.
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeResult {
    pub target_date: NaiveDate,
    pub years: i32,
    pub months: u32,
    pub days: u32,
    pub total_days: i64,
    pub total_weeks: i64,
    pub total_months: i64,
}

impl Calculator for AgeInput {
    type Output = AgeResult;

    fn compute(&self, _config: &CalcConfig) -> Result<AgeResult> {
        let target = self.target_date.unwrap_or_else(|| Local::now().date_naive());
        if self.birth_date > target {
            return Err(CalcError::out_of_domain(
                "birth_date",
                "must not be after the target date",
            ));
        }

        let span = calendar_span(self.birth_date, target)?;
        let total_days = (target - self.birth_date).num_days();
        Ok(AgeResult {
            target_date: target,
            years: span.years,
            months: span.months,
            days: span.days,
            total_days,
            total_weeks: total_days / 7,
            total_months: i64::from(span.years) * 12 + i64::from(span.months),
        })
    }
}

// Dates

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DateInput {
    Difference {
        start: NaiveDate,
        end: NaiveDate,
    },
    Add {
        base: NaiveDate,
        #[serde(default)]
        years: i32,
        #[serde(default)]
        months: i32,
        #[serde(default)]
        days: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DateResult {
    Difference {
        days: i64,
        weeks: i64,
        months: i64,
        years: i32,
        exact: CalendarSpan,
    },
    Add {
        date: NaiveDate,
        weekday: String,
    },
}

/// Shifts `base` by whole months, clamping to the end of shorter months.
pub fn add_months(base: NaiveDate, months: i64) -> Result<NaiveDate> {
    let magnitude = u32::try_from(months.unsigned_abs())
        .map_err(|_| CalcError::overflow("month offset"))?;
    let shifted = if months >= 0 {
        base.checked_add_months(Months::new(magnitude))
    } else {
        base.checked_sub_months(Months::new(magnitude))
    };
    shifted.ok_or_else(|| CalcError::overflow("date outside the supported range"))
}

pub fn add_days(base: NaiveDate, days: i64) -> Result<NaiveDate> {
    let shifted = if days >= 0 {
        base.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        base.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(|| CalcError::overflow("date outside the supported range"))
}

impl Calculator for DateInput {
    type Output = DateResult;

    fn compute(&self, _config: &CalcConfig) -> Result<DateResult> {
        match *self {
            DateInput::Difference { start, end } => {
                let (earlier, later) = if start <= end { (start, end) } else { (end, start) };
                let exact = calendar_span(earlier, later)?;
                let days = (later - earlier).num_days();
                Ok(DateResult::Difference {
                    days,
                    weeks: days / 7,
                    months: i64::from(exact.years) * 12 + i64::from(exact.months),
                    years: exact.years,
                    exact,
                })
            }
            DateInput::Add {
                base,
                years,
                months,
                days,
            } => {
                let total_months = i64::from(years) * 12 + i64::from(months);
                let date = add_days(add_months(base, total_months)?, days)?;
                Ok(DateResult::Add {
                    date,
                    weekday: date.format("%A").to_string(),
                })
            }
        }
    }
}

// Time

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hms {
    #[serde(default)]
    pub hours: i64,
    #[serde(default)]
    pub minutes: i64,
    #[serde(default)]
    pub seconds: i64,
}

impl Hms {
    pub fn total_seconds(self) -> Result<i64> {
        self.hours
            .checked_mul(3600)
            .and_then(|h| self.minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
            .and_then(|hm| hm.checked_add(self.seconds))
            .ok_or_else(|| CalcError::overflow("time value"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBreakdown {
    pub formatted: String,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub total_seconds: i64,
    pub is_negative: bool,
}

impl TimeBreakdown {
    pub fn from_seconds(total: i64) -> Self {
        let magnitude = total.saturating_abs();
        let (hours, minutes, seconds) = (magnitude / 3600, magnitude % 3600 / 60, magnitude % 60);
        let sign = if total < 0 { "-" } else { "" };
        TimeBreakdown {
            formatted: format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds),
            hours,
            minutes,
            seconds,
            total_seconds: magnitude,
            is_negative: total < 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOperation {
    Add,
    Subtract,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimeInput {
    Arithmetic {
        first: Hms,
        operation: TimeOperation,
        second: Hms,
    },
    /// Without dates both times fall on the same day, and an end before
    /// the start wraps past midnight.
    Difference {
        start_time: String,
        end_time: String,
        #[serde(default)]
        start_date: Option<NaiveDate>,
        #[serde(default)]
        end_date: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimeResult {
    Arithmetic {
        first: String,
        second: String,
        result: TimeBreakdown,
    },
    Difference {
        result: TimeBreakdown,
        total_days: i64,
        total_hours: i64,
        total_minutes: i64,
        total_seconds: i64,
    },
}

impl Calculator for TimeInput {
    type Output = TimeResult;

    fn compute(&self, _config: &CalcConfig) -> Result<TimeResult> {
        match self {
            TimeInput::Arithmetic {
                first,
                operation,
                second,
            } => {
                let a = first.total_seconds()?;
                let b = second.total_seconds()?;
                let total = match operation {
                    TimeOperation::Add => a.checked_add(b),
                    TimeOperation::Subtract => a.checked_sub(b),
                }
                .ok_or_else(|| CalcError::overflow("time arithmetic"))?;
                Ok(TimeResult::Arithmetic {
                    first: TimeBreakdown::from_seconds(a).formatted,
                    second: TimeBreakdown::from_seconds(b).formatted,
                    result: TimeBreakdown::from_seconds(total),
                })
            }
            TimeInput::Difference {
                start_time,
                end_time,
                start_date,
                end_date,
            } => {
                let start_clock = parse_clock("start_time", start_time)?;
                let end_clock = parse_clock("end_time", end_time)?;
                let seconds = match (start_date, end_date) {
                    (Some(start_date), Some(end_date)) => {
                        let start = NaiveDateTime::new(*start_date, start_clock);
                        let end = NaiveDateTime::new(*end_date, end_clock);
                        (end - start).num_seconds()
                    }
                    (None, None) => {
                        let diff = (end_clock - start_clock).num_seconds();
                        if diff < 0 {
                            diff + MINUTES_PER_DAY * 60
                        } else {
                            diff
                        }
                    }
                    _ => {
                        return Err(CalcError::MissingField {
                            field: if start_date.is_none() { "start_date" } else { "end_date" }.to_string(),
                        })
                    }
                };
                Ok(TimeResult::Difference {
                    result: TimeBreakdown::from_seconds(seconds),
                    total_days: seconds / 86_400,
                    total_hours: seconds / 3600,
                    total_minutes: seconds / 60,
                    total_seconds: seconds,
                })
            }
        }
    }
}

// Hours timesheet

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftEntry {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub break_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoursInput {
    pub entries: Vec<ShiftEntry>,
    #[serde(default)]
    pub hourly_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftSummary {
    pub entry: usize,
    pub start: String,
    pub end: String,
    pub break_hours: f64,
    pub worked_hours: f64,
    pub worked_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoursResult {
    pub total_minutes: f64,
    pub total_hours: f64,
    pub total_time: String,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub regular_pay: f64,
    pub overtime_pay: f64,
    pub total_pay: f64,
    pub average_per_entry: f64,
    pub breakdown: Vec<ShiftSummary>,
}

/// `H:MM`
fn format_minutes(minutes: f64) -> String {
    let whole = minutes.round() as i64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

fn minutes_of_day(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight() / 60)
}

impl Calculator for HoursInput {
    type Output = HoursResult;

    fn compute(&self, _config: &CalcConfig) -> Result<HoursResult> {
        if self.entries.is_empty() {
            return Err(CalcError::MissingField {
                field: "entries".to_string(),
            });
        }
        let rate = validate_non_negative("hourly_rate", self.hourly_rate)?;

        let mut total_minutes = 0.0;
        let mut breakdown = Vec::with_capacity(self.entries.len());
        for (index, entry) in self.entries.iter().enumerate() {
            let start = minutes_of_day(parse_clock("start", &entry.start)?);
            let end = minutes_of_day(parse_clock("end", &entry.end)?);
            let break_hours = validate_non_negative("break_hours", entry.break_hours)?;

            let mut shift = end - start;
            if shift < 0 {
                shift += MINUTES_PER_DAY;
            }
            let worked = (shift as f64 - break_hours * 60.0).max(0.0);
            total_minutes += worked;
            breakdown.push(ShiftSummary {
                entry: index + 1,
                start: entry.start.clone(),
                end: entry.end.clone(),
                break_hours,
                worked_hours: worked / 60.0,
                worked_time: format_minutes(worked),
            });
        }

        let total_hours = total_minutes / 60.0;
        let regular_hours = total_hours.min(REGULAR_HOURS_PER_WEEK);
        let overtime_hours = (total_hours - REGULAR_HOURS_PER_WEEK).max(0.0);
        let regular_pay = regular_hours * rate;
        let overtime_pay = overtime_hours * rate * OVERTIME_MULTIPLIER;
        Ok(HoursResult {
            total_minutes,
            total_hours,
            total_time: format_minutes(total_minutes),
            regular_hours,
            overtime_hours,
            regular_pay,
            overtime_pay,
            total_pay: regular_pay + overtime_pay,
            average_per_entry: total_hours / self.entries.len() as f64,
            breakdown,
        })
    }
}
