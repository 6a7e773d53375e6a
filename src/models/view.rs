// SPDX-License-Identifier: MIT

//! Calendar navigation state machine.
//!
//! The dashboard is always in one of two views: a yearly overview or a
//! single month. Navigation actions are an explicit tagged enum dispatched
//! with exhaustive matching; the resulting view is stored in the session.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Current calendar view, held in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarView {
    Year { year: i32 },
    Month { year: i32, month: u32 },
}

/// A navigation action sent by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum NavAction {
    PrevYear,
    NextYear,
    SelectMonth { month: u32 },
    PrevMonth,
    NextMonth,
    BackToYear,
}

impl CalendarView {
    /// Initial view: the current year.
    pub fn current_year() -> Self {
        CalendarView::Year {
            year: chrono::Local::now().year(),
        }
    }

    /// Apply a navigation action.
    ///
    /// Actions that don't apply to the current view (e.g. `prev-month`
    /// while in the year view) leave the view unchanged.
    pub fn apply(self, action: NavAction) -> Self {
        match (self, action) {
            (CalendarView::Year { year }, NavAction::PrevYear) => {
                CalendarView::Year { year: year - 1 }
            }
            (CalendarView::Year { year }, NavAction::NextYear) => {
                CalendarView::Year { year: year + 1 }
            }
            (CalendarView::Year { year }, NavAction::SelectMonth { month }) => {
                if (1..=12).contains(&month) {
                    CalendarView::Month { year, month }
                } else {
                    self
                }
            }
            (CalendarView::Month { year, month: 1 }, NavAction::PrevMonth) => CalendarView::Month {
                year: year - 1,
                month: 12,
            },
            (CalendarView::Month { year, month }, NavAction::PrevMonth) => CalendarView::Month {
                year,
                month: month - 1,
            },
            (CalendarView::Month { year, month: 12 }, NavAction::NextMonth) => CalendarView::Month {
                year: year + 1,
                month: 1,
            },
            (CalendarView::Month { year, month }, NavAction::NextMonth) => CalendarView::Month {
                year,
                month: month + 1,
            },
            (CalendarView::Month { year, .. }, NavAction::BackToYear) => {
                CalendarView::Year { year }
            }
            // No-ops: month navigation in year view and vice versa
            (CalendarView::Year { .. }, NavAction::PrevMonth)
            | (CalendarView::Year { .. }, NavAction::NextMonth)
            | (CalendarView::Year { .. }, NavAction::BackToYear)
            | (CalendarView::Month { .. }, NavAction::PrevYear)
            | (CalendarView::Month { .. }, NavAction::NextYear)
            | (CalendarView::Month { .. }, NavAction::SelectMonth { .. }) => self,
        }
    }
}
