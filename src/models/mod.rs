// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod activity;
pub mod calendar;
pub mod session;
pub mod streams;
pub mod view;

pub use activity::{parse_activities, Activity, RawActivity};
pub use calendar::{MonthCalendar, YearCalendar};
pub use session::{Session, SessionTokens};
pub use streams::{MapBounds, RawStreamSet, SampleStream};
pub use view::{CalendarView, NavAction};
