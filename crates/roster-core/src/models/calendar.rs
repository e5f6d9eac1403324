//! Weekdays and wall-clock parsing shared by slots and appointments.

use std::str::FromStr;

use jiff::civil::{Date, Time, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, Result};

/// Day of the week a recurring slot repeats on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl FromStr for DayOfWeek {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "monday" | "mon" => Ok(Self::Monday),
            "tuesday" | "tue" | "tues" => Ok(Self::Tuesday),
            "wednesday" | "wed" => Ok(Self::Wednesday),
            "thursday" | "thu" | "thurs" => Ok(Self::Thursday),
            "friday" | "fri" => Ok(Self::Friday),
            "saturday" | "sat" => Ok(Self::Saturday),
            "sunday" | "sun" => Ok(Self::Sunday),
            _ => Err(BookingError::InvalidDay {
                value: s.to_string(),
            }),
        }
    }
}

impl DayOfWeek {
    /// Convert to display string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    /// ISO weekday number, Monday = 1. Stored in the database so slots sort
    /// in calendar order.
    pub fn number(&self) -> i64 {
        match self {
            Self::Monday => 1,
            Self::Tuesday => 2,
            Self::Wednesday => 3,
            Self::Thursday => 4,
            Self::Friday => 5,
            Self::Saturday => 6,
            Self::Sunday => 7,
        }
    }

    /// Inverse of [`DayOfWeek::number`].
    pub fn from_number(number: i64) -> Option<Self> {
        match number {
            1 => Some(Self::Monday),
            2 => Some(Self::Tuesday),
            3 => Some(Self::Wednesday),
            4 => Some(Self::Thursday),
            5 => Some(Self::Friday),
            6 => Some(Self::Saturday),
            7 => Some(Self::Sunday),
            _ => None,
        }
    }

    /// Weekday of a calendar date.
    pub fn of(date: Date) -> Self {
        date.weekday().into()
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Monday => Self::Monday,
            Weekday::Tuesday => Self::Tuesday,
            Weekday::Wednesday => Self::Wednesday,
            Weekday::Thursday => Self::Thursday,
            Weekday::Friday => Self::Friday,
            Weekday::Saturday => Self::Saturday,
            Weekday::Sunday => Self::Sunday,
        }
    }
}

/// Parses a strict `HH:MM` wall-clock time.
///
/// `field` names the input in the error so callers can report which of
/// several times was malformed.
pub fn parse_time(field: &str, value: &str) -> Result<Time> {
    let invalid = || BookingError::InvalidTimeFormat {
        field: field.to_string(),
        value: value.to_string(),
    };

    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[2] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || b.is_ascii_digit());
    if !well_formed {
        return Err(invalid());
    }

    let hour: i8 = value[..2].parse().map_err(|_| invalid())?;
    let minute: i8 = value[3..].parse().map_err(|_| invalid())?;
    Time::new(hour, minute, 0, 0).map_err(|_| invalid())
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<Date> {
    let invalid = || BookingError::InvalidDateFormat {
        value: value.to_string(),
    };
    if value.len() != 10 {
        return Err(invalid());
    }
    value.parse::<Date>().map_err(|_| invalid())
}

/// Formats a time as `HH:MM`, the form slots are stored and compared in.
pub fn format_time(time: Time) -> String {
    time.strftime("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, time};

    use super::*;

    #[test]
    fn parses_strict_hhmm() {
        assert_eq!(parse_time("start_time", "09:00").unwrap(), time(9, 0, 0, 0));
        assert_eq!(parse_time("start_time", "23:59").unwrap(), time(23, 59, 0, 0));

        for bad in ["9:00", "09:0", "24:00", "12:60", "0900", "09:00:00", "+9:00", "ab:cd", ""] {
            let err = parse_time("start_time", bad).unwrap_err();
            assert!(
                matches!(err, BookingError::InvalidTimeFormat { ref field, .. } if field == "start_time"),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn parses_dates_and_derives_weekday() {
        let monday = parse_date("2025-01-06").unwrap();
        assert_eq!(monday, date(2025, 1, 6));
        assert_eq!(DayOfWeek::of(monday), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::of(date(2025, 1, 12)), DayOfWeek::Sunday);

        assert!(matches!(
            parse_date("2025-1-6"),
            Err(BookingError::InvalidDateFormat { .. })
        ));
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn day_names_are_normalised() {
        assert_eq!("Mon".parse::<DayOfWeek>().unwrap(), DayOfWeek::Monday);
        assert_eq!(" SUNDAY ".parse::<DayOfWeek>().unwrap(), DayOfWeek::Sunday);
        assert!(matches!(
            "funday".parse::<DayOfWeek>(),
            Err(BookingError::InvalidDay { .. })
        ));

        for number in 1..=7 {
            let day = DayOfWeek::from_number(number).unwrap();
            assert_eq!(day.number(), number);
        }
        assert_eq!(DayOfWeek::from_number(0), None);
    }

    #[test]
    fn formats_time_without_seconds() {
        assert_eq!(format_time(time(7, 5, 0, 0)), "07:05");
    }
}
