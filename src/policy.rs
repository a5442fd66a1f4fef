//! Wall-clock admission windows.
//!
//! Gated actions (audio uploads, subscription payments) are only admitted
//! during a fixed civil-time interval. The interval is expressed in IST
//! (UTC+05:30) regardless of where the server runs, so the check converts the
//! current instant with a constant offset rather than consulting the server's
//! local time zone.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Offset of the civil zone all windows are expressed in (UTC+05:30).
const CIVIL_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// A half-open `[start, end)` interval of civil-clock minutes.
///
/// The end bound is exclusive: for a 14:00-19:00 window, 18:59 is admitted
/// and 19:00 is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionWindow {
    start_minutes: u16,
    end_minutes: u16,
}

impl AdmissionWindow {
    pub fn new(start_hour: u16, start_minute: u16, end_hour: u16, end_minute: u16) -> Self {
        Self {
            start_minutes: start_hour * 60 + start_minute,
            end_minutes: end_hour * 60 + end_minute,
        }
    }

    /// Whether `now` falls inside the window, evaluated on the UTC+05:30 clock.
    pub fn admits(&self, now: DateTime<Utc>) -> bool {
        let offset = FixedOffset::east_opt(CIVIL_OFFSET_SECS).expect("offset is in range");
        let civil = now.with_timezone(&offset);
        let minutes = (civil.hour() * 60 + civil.minute()) as u16;
        self.start_minutes <= minutes && minutes < self.end_minutes
    }
}

impl fmt::Display for AdmissionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start_minutes / 60,
            self.start_minutes % 60,
            self.end_minutes / 60,
            self.end_minutes % 60
        )
    }
}

/// Parses `"HH:MM-HH:MM"`, e.g. `"14:00-19:00"`.
impl FromStr for AdmissionWindow {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn parse_clock(s: &str) -> anyhow::Result<(u16, u16)> {
            let (hour, minute) = s
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("expected HH:MM, got {s:?}"))?;
            let hour: u16 = hour.parse()?;
            let minute: u16 = minute.parse()?;
            anyhow::ensure!(hour <= 24 && minute < 60, "clock value out of range: {s:?}");
            Ok((hour, minute))
        }

        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| anyhow::anyhow!("expected HH:MM-HH:MM, got {s:?}"))?;
        let (start_hour, start_minute) = parse_clock(start.trim())?;
        let (end_hour, end_minute) = parse_clock(end.trim())?;
        let window = Self::new(start_hour, start_minute, end_hour, end_minute);
        anyhow::ensure!(
            window.start_minutes < window.end_minutes,
            "window start must precede end: {s:?}"
        );
        Ok(window)
    }
}

impl Serialize for AdmissionWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AdmissionWindow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// An arbitrary date at the given IST wall-clock time, as a UTC instant.
    fn ist(hour: u32, minute: u32) -> DateTime<Utc> {
        let offset = FixedOffset::east_opt(CIVIL_OFFSET_SECS).unwrap();
        offset
            .with_ymd_and_hms(2026, 3, 10, hour, minute, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn end_bound_is_exclusive() {
        let window = AdmissionWindow::new(14, 0, 19, 0);

        assert!(window.admits(ist(18, 59)));
        assert!(!window.admits(ist(19, 0)));
    }

    #[test]
    fn start_bound_is_inclusive() {
        let window = AdmissionWindow::new(14, 0, 19, 0);

        assert!(window.admits(ist(14, 0)));
        assert!(!window.admits(ist(13, 59)));
    }

    #[test]
    fn evaluates_on_the_fixed_civil_clock_not_utc() {
        let window = AdmissionWindow::new(14, 0, 19, 0);

        // 15:00 IST is 09:30 UTC; the UTC hour alone would be rejected.
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 30, 0).unwrap();
        assert!(window.admits(now));
    }

    #[test]
    fn parses_clock_ranges() {
        let window: AdmissionWindow = "14:00-19:00".parse().unwrap();
        assert_eq!(window, AdmissionWindow::new(14, 0, 19, 0));

        let window: AdmissionWindow = "10:00-11:00".parse().unwrap();
        assert_eq!(window, AdmissionWindow::new(10, 0, 11, 0));

        assert!("19:00-14:00".parse::<AdmissionWindow>().is_err());
        assert!("14:00".parse::<AdmissionWindow>().is_err());
        assert!("14:61-19:00".parse::<AdmissionWindow>().is_err());
    }

    #[test]
    fn round_trips_through_serde() {
        let window: AdmissionWindow = serde_json::from_str("\"14:00-19:00\"").unwrap();
        assert_eq!(window, AdmissionWindow::new(14, 0, 19, 0));
        assert_eq!(serde_json::to_string(&window).unwrap(), "\"14:00-19:00\"");
    }
}
