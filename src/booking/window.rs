//! Booking-window gating.
//!
//! A session's bookings open at a configured time before the session starts.
//! This is a plain time comparison at request time — nothing is scheduled,
//! queued, or retried.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PitchsideError, Result};

/// When bookings open relative to a session's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingWindow {
    /// Days before the session date that booking opens.
    pub days_before_booking: u32,
    /// Hour of day (0-23) bookings open on that day.
    pub open_hour: u32,
    /// Minute (0-59) bookings open.
    pub open_minute: u32,
    /// Bypass the window entirely: bookings are always open.
    pub no_time_constraints: bool,
}

impl BookingWindow {
    /// Window opening `days_before` days ahead of the session at
    /// `open_hour:open_minute`.
    pub fn new(days_before: u32, open_hour: u32, open_minute: u32) -> Result<Self> {
        if open_hour > 23 {
            return Err(PitchsideError::bad_request(format!(
                "open_hour must be 0-23, got {}",
                open_hour
            )));
        }
        if open_minute > 59 {
            return Err(PitchsideError::bad_request(format!(
                "open_minute must be 0-59, got {}",
                open_minute
            )));
        }
        Ok(Self {
            days_before_booking: days_before,
            open_hour,
            open_minute,
            no_time_constraints: false,
        })
    }

    /// A window with no constraints: always open.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self {
            days_before_booking: 0,
            open_hour: 0,
            open_minute: 0,
            no_time_constraints: true,
        }
    }

    /// The instant bookings open for a session starting at `session_start`.
    #[must_use]
    pub fn open_at(&self, session_start: DateTime<Utc>) -> DateTime<Utc> {
        let open_date =
            session_start.date_naive() - Duration::days(i64::from(self.days_before_booking));
        open_date
            .and_hms_opt(self.open_hour, self.open_minute, 0)
            // Unreachable with a validated window; fall back to midnight.
            .unwrap_or_else(|| open_date.and_hms_opt(0, 0, 0).expect("midnight is valid"))
            .and_utc()
    }

    /// Whether a booking attempt at `now` is permitted.
    #[must_use]
    pub fn is_open(&self, session_start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if self.no_time_constraints {
            return true;
        }
        now >= self.open_at(session_start)
    }
}
