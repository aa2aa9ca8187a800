//! Kendo date and time pickers driven from the keyboard.
//!
//! The pickers are masked text inputs: each part (day, month, year, hour,
//! minute, AM/PM) is typed into whichever input currently has focus, so the
//! caller clicks the input first.

use super::keyboard::send_keys_with_interval;
use crate::driver::DriverRef;
use crate::locator::By;
use crate::result::E2eResult;
use chrono::{Datelike, Month, NaiveDateTime, Timelike};
use std::fmt;
use std::time::Duration;

/// Pause between typed characters
pub const CALENDAR_KEY_INTERVAL: Duration = Duration::from_millis(100);

/// Half of the twelve-hour clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// Split a 24-hour value into a 12-hour value and its half
    #[must_use]
    pub const fn from_hour24(hour: u32) -> (u32, Self) {
        let meridiem = if hour < 12 { Self::Am } else { Self::Pm };
        let hour12 = match hour % 12 {
            0 => 12,
            h => h,
        };
        (hour12, meridiem)
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Am => f.write_str("AM"),
            Self::Pm => f.write_str("PM"),
        }
    }
}

/// Keyboard-driven date/time picker
#[derive(Debug, Clone)]
pub struct CalendarPicker {
    driver: DriverRef,
    interval: Duration,
}

impl CalendarPicker {
    /// "Set" button of the time popup
    pub const SET_BUTTON: &'static str = "k-time-accept";

    #[must_use]
    pub fn new(driver: DriverRef) -> Self {
        Self {
            driver,
            interval: CALENDAR_KEY_INTERVAL,
        }
    }

    /// Override the per-character pause
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    async fn type_parts(&self, parts: &[String]) -> E2eResult<()> {
        let input = self.driver.active_element().await?;
        for part in parts {
            send_keys_with_interval(input.as_ref(), part, self.interval).await?;
        }
        Ok(())
    }

    /// Type `dd`, `MM` and `yyyy` into the focused date input
    pub async fn enter_date(&self, day: u32, month: Month, year: i32) -> E2eResult<&Self> {
        self.type_parts(&[
            format!("{day:02}"),
            format!("{:02}", month.number_from_month()),
            format!("{year:04}"),
        ])
        .await?;
        Ok(self)
    }

    /// Type `hh`, `mm` and the meridiem into the focused time input
    pub async fn enter_time(&self, hour: u32, minute: u32, meridiem: Meridiem) -> E2eResult<&Self> {
        self.type_parts(&[format!("{hour:02}"), format!("{minute:02}"), meridiem.to_string()])
            .await?;
        Ok(self)
    }

    /// Type the whole of `at`: date first, then the twelve-hour time
    pub async fn enter_date_time(&self, at: &NaiveDateTime) -> E2eResult<&Self> {
        let month = Month::try_from(at.month() as u8).unwrap_or(Month::January);
        self.enter_date(at.day(), month, at.year()).await?;
        let (hour, meridiem) = Meridiem::from_hour24(at.hour());
        self.enter_time(hour, at.minute(), meridiem).await
    }

    /// Confirm the time popup
    pub async fn click_set(&self) -> E2eResult<&Self> {
        self.driver
            .find_element(&By::class_name(Self::SET_BUTTON))
            .await?
            .click()
            .await?;
        Ok(self)
    }
}
