//! Date and time display helpers.

use std::fmt;

use jiff::{civil::DateTime, tz::TimeZone, Timestamp};

/// A record timestamp shown in the system time zone as
/// `YYYY-MM-DD HH:MM TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M %Z")
        )
    }
}

/// A visit's local wall-clock start, e.g. `Mon 2025-01-06 09:00`.
pub struct VisitTime<'a>(pub &'a DateTime);

impl fmt::Display for VisitTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.strftime("%a %Y-%m-%d %H:%M"))
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn visit_time_includes_weekday() {
        let at = date(2025, 1, 6).at(9, 0, 0, 0);
        assert_eq!(VisitTime(&at).to_string(), "Mon 2025-01-06 09:00");
    }
}
