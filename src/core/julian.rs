//! Julian-day backed temporal payloads
//!
//! Dates are stored as a Julian day number, times as a fraction of a day
//! since midnight. A date-time is the astronomical Julian date, which starts
//! its day at noon: `JD = JDN + fraction - 0.5`.

use crate::core::datum::{DatumType, Number};
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike,
};

/// Offset between chrono's days-from-CE and the Julian day number.
const JDN_CE_OFFSET: i64 = 1_721_425;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Temporal payload with optional date, time and time-zone parts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Julian {
    day: Option<i64>,
    time: Option<f64>,
    offset_minutes: Option<i32>,
}

impl Julian {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            day: Some(i64::from(date.num_days_from_ce()) + JDN_CE_OFFSET),
            time: None,
            offset_minutes: None,
        }
    }

    pub fn from_time(time: NaiveTime) -> Self {
        Self {
            day: None,
            time: Some(time_to_fraction(time)),
            offset_minutes: None,
        }
    }

    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self {
            day: Self::from_date(datetime.date()).day,
            time: Some(time_to_fraction(datetime.time())),
            offset_minutes: None,
        }
    }

    pub fn from_datetime_with_offset(datetime: DateTime<FixedOffset>) -> Self {
        let mut julian = Self::from_datetime(datetime.naive_local());
        julian.offset_minutes = Some(datetime.offset().local_minus_utc() / 60);
        julian
    }

    /// Date-only payload from a Julian day number.
    pub fn from_day_number(day: i64) -> Self {
        Self {
            day: Some(day),
            time: None,
            offset_minutes: None,
        }
    }

    /// Time-only payload from a fraction of a day.
    pub fn from_time_fraction(fraction: f64) -> Self {
        Self {
            day: None,
            time: Some(fraction.rem_euclid(1.0)),
            offset_minutes: None,
        }
    }

    /// Date-time payload from an astronomical Julian date.
    pub fn from_julian_date(julian_date: f64) -> Self {
        let shifted = julian_date + 0.5;
        let day = shifted.floor();
        Self {
            day: Some(day as i64),
            time: Some(shifted - day),
            offset_minutes: None,
        }
    }

    /// Build the payload a numeric value represents for `datum_type`.
    pub fn from_number(datum_type: DatumType, number: &Number) -> Option<Self> {
        match datum_type {
            DatumType::Date => Some(Self::from_day_number(number.as_f64().floor() as i64)),
            DatumType::Time => Some(Self::from_time_fraction(number.as_f64())),
            DatumType::DateTime => Some(Self::from_julian_date(number.as_f64())),
            _ => None,
        }
    }

    pub fn has_date(&self) -> bool {
        self.day.is_some()
    }

    pub fn has_time(&self) -> bool {
        self.time.is_some()
    }

    pub fn julian_day(&self) -> Option<i64> {
        self.day
    }

    pub fn time_fraction(&self) -> Option<f64> {
        self.time
    }

    pub fn offset_minutes(&self) -> Option<i32> {
        self.offset_minutes
    }

    /// The datum type implied by which components are present.
    pub fn datum_type(&self) -> DatumType {
        match (self.has_date(), self.has_time()) {
            (true, true) => DatumType::DateTime,
            (false, true) => DatumType::Time,
            _ => DatumType::Date,
        }
    }

    /// Astronomical Julian date (local time).
    pub fn julian_date(&self) -> f64 {
        let day = self.day.unwrap_or(0) as f64;
        day + self.time.unwrap_or(0.0) - 0.5
    }

    /// Numeric value stored alongside the payload for `datum_type`.
    pub fn number_for(&self, datum_type: DatumType) -> Number {
        match datum_type {
            DatumType::Date => Number::Integer(self.day.unwrap_or(0)),
            DatumType::Time => Number::Real(self.time.unwrap_or(0.0)),
            _ => Number::Real(self.julian_date()),
        }
    }

    /// Comparable instant. Offsets are normalised to UTC; time-only values
    /// compare by their fraction of the day.
    pub fn timestamp(&self) -> f64 {
        let offset = f64::from(self.offset_minutes.unwrap_or(0)) / 1440.0;
        match self.day {
            Some(_) => self.julian_date() - offset,
            None => self.time.unwrap_or(0.0) - offset,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        let days = self.day? - JDN_CE_OFFSET;
        NaiveDate::from_num_days_from_ce_opt(i32::try_from(days).ok()?)
    }

    pub fn time(&self) -> Option<NaiveTime> {
        let seconds = (self.time? * SECONDS_PER_DAY).round();
        let seconds = (seconds as u32).min(86_399);
        NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
    }

    pub fn datetime(&self) -> Option<NaiveDateTime> {
        Some(self.date()?.and_time(self.time().unwrap_or(NaiveTime::MIN)))
    }

    /// ISO 8601 rendering of the components present.
    pub fn iso(&self) -> String {
        let mut out = String::new();
        if let Some(date) = self.date() {
            out.push_str(&format!(
                "{:04}-{:02}-{:02}",
                date.year(),
                date.month(),
                date.day()
            ));
        }
        if let Some(time) = self.time() {
            if !out.is_empty() {
                out.push('T');
            }
            out.push_str(&format!(
                "{:02}:{:02}:{:02}",
                time.hour(),
                time.minute(),
                time.second()
            ));
            if let Some(offset) = self.offset_minutes {
                let sign = if offset < 0 { '-' } else { '+' };
                let offset = offset.abs();
                out.push_str(&format!("{}{:02}:{:02}", sign, offset / 60, offset % 60));
            }
        }
        out
    }

    /// Render with a chrono strftime pattern.
    pub fn format_with(&self, pattern: &str) -> String {
        match (self.date(), self.time()) {
            (Some(date), Some(time)) => date.and_time(time).format(pattern).to_string(),
            (Some(date), None) => date.format(pattern).to_string(),
            (None, Some(time)) => time.format(pattern).to_string(),
            (None, None) => String::new(),
        }
    }
}

fn time_to_fraction(time: NaiveTime) -> f64 {
    f64::from(time.num_seconds_from_midnight()) / SECONDS_PER_DAY
}
