//! Period calculator
//!
//! Resolves the calendar window of a budget period around a reference date
//! and clamps it to a budget's own validity range. Both functions are pure.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::models::{PeriodKind, PeriodWindow};

/// Calendar window of `kind` containing `reference`, clamped to the bounds
///
/// - weekly: Monday through Sunday of the ISO week
/// - monthly: first through last day of the month
/// - yearly: January 1 through December 31
///
/// The start is raised to `lower` and the end lowered to `upper` when they
/// fall inside the calendar window.
pub fn resolve_window(
    kind: PeriodKind,
    reference: NaiveDate,
    lower: Option<NaiveDate>,
    upper: Option<NaiveDate>,
) -> PeriodWindow {
    let (mut start, mut end) = calendar_bounds(kind, reference);

    if let Some(lower) = lower {
        if start < lower {
            start = lower;
        }
    }
    if let Some(upper) = upper {
        if end > upper {
            end = upper;
        }
    }

    PeriodWindow::new(start, end)
}

/// Same as [`resolve_window`], with the end additionally capped at `today`
///
/// Used for "spent so far" figures; projections use the uncapped window.
pub fn resolve_capped_window(
    kind: PeriodKind,
    reference: NaiveDate,
    lower: Option<NaiveDate>,
    upper: Option<NaiveDate>,
    today: NaiveDate,
) -> PeriodWindow {
    let window = resolve_window(kind, reference, lower, upper);
    PeriodWindow::new(window.start, window.end.min(today))
}

fn calendar_bounds(kind: PeriodKind, date: NaiveDate) -> (NaiveDate, NaiveDate) {
    match kind {
        PeriodKind::Weekly => {
            let from_monday = u64::from(date.weekday().num_days_from_monday());
            let start = date.checked_sub_days(Days::new(from_monday)).unwrap_or(NaiveDate::MIN);
            let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
            (start, end)
        }
        PeriodKind::Monthly => (first_of_month(date), last_of_month(date)),
        PeriodKind::Yearly => (
            date.with_ordinal(1).unwrap_or(date),
            NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date),
        ),
    }
}

pub(crate) fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of `date`'s month: first of next month minus one day
pub(crate) fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}
