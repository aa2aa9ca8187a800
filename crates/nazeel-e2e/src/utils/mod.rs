//! Keyboard, scroll and date-picker helpers shared by the suites.

mod calendar;
mod keyboard;
mod scroll;

pub use calendar::{CalendarPicker, Meridiem, CALENDAR_KEY_INTERVAL};
pub use keyboard::send_keys_with_interval;
pub use scroll::{
    scroll_down_little, scroll_down_page, scroll_element_into_view, scroll_position, scroll_up_little,
    scroll_up_page, ScrollDirection, LITTLE_SCROLL_SETTLE, PAGE_SCROLL_SETTLE,
};
