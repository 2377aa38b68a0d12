//! The simple BY-parts: the ones that only ever need the current candidate
//! and the rule's static configuration to decide membership or to expand
//! into a small, fixed-shape set of candidates.

use jiff::civil::DateTime;

use crate::rule::RecurrenceRuleInner;

pub(crate) fn has_by_month(rule: &RecurrenceRuleInner) -> bool {
    !rule.by_month.is_empty()
}

pub(crate) fn has_by_week(rule: &RecurrenceRuleInner) -> bool {
    !rule.by_week.is_empty()
}

pub(crate) fn has_by_year_day(rule: &RecurrenceRuleInner) -> bool {
    !rule.by_year_day.is_empty()
}

pub(crate) fn has_by_month_day(rule: &RecurrenceRuleInner) -> bool {
    !rule.by_month_day.is_empty()
}

pub(crate) fn has_by_week_day(rule: &RecurrenceRuleInner) -> bool {
    !rule.by_week_day.is_empty()
}

pub(crate) fn has_by_hour(rule: &RecurrenceRuleInner) -> bool {
    !rule.by_hour.is_empty()
}

pub(crate) fn has_by_minute(rule: &RecurrenceRuleInner) -> bool {
    !rule.by_minute.is_empty()
}

pub(crate) fn has_by_second(rule: &RecurrenceRuleInner) -> bool {
    !rule.by_second.is_empty()
}

pub(crate) fn has_by_set_pos(rule: &RecurrenceRuleInner) -> bool {
    !rule.by_set_pos.is_empty()
}

pub(crate) fn satisfies_by_month(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> bool {
    !has_by_month(rule) || rule.by_month.contains(&dt.month())
}

pub(crate) fn satisfies_by_year_day(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> bool {
    if !has_by_year_day(rule) {
        return true;
    }
    let positive = dt.day_of_year();
    // Minus 1 because -1 is the last day of the year, and the days of the
    // year are 1-indexed.
    let negative = positive - 1 - dt.days_in_year();
    rule.by_year_day.binary_search(&positive).is_ok()
        || rule.by_year_day.binary_search(&negative).is_ok()
}

pub(crate) fn satisfies_by_month_day(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> bool {
    if !has_by_month_day(rule) {
        return true;
    }
    let positive = dt.day();
    // Minus 1 because -1 is the last day of the month, and the days of the
    // month are 1-indexed.
    let negative = positive - 1 - dt.days_in_month();
    rule.by_month_day.binary_search(&positive).is_ok()
        || rule.by_month_day.binary_search(&negative).is_ok()
}

pub(crate) fn satisfies_by_week_day(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> bool {
    if !has_by_week_day(rule) {
        return true;
    }
    let wd = dt.weekday();
    rule.by_week_day.iter().any(|bywd| bywd.is_match(wd))
}

pub(crate) fn satisfies_by_hour(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> bool {
    !has_by_hour(rule) || rule.by_hour.contains(&dt.hour())
}

pub(crate) fn satisfies_by_minute(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> bool {
    !has_by_minute(rule) || rule.by_minute.contains(&dt.minute())
}

pub(crate) fn satisfies_by_second(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> bool {
    !has_by_second(rule) || rule.by_second.contains(&dt.second())
}

/// Returns true if and only if the zero-indexed `position` in an ordered
/// set of length `len` satisfies the BYSETPOS rule.
pub(crate) fn satisfies_by_set_pos(
    rule: &RecurrenceRuleInner,
    position: usize,
    len: usize,
) -> bool {
    let Ok(position) = i32::try_from(position) else { return false };
    let Ok(len) = i32::try_from(len) else { return false };
    let positive = position + 1;
    // Minus 1 because -1 is the last datetime of a recurrence set, and the
    // positions of a set are 1-indexed according to RFC 5545.
    let negative = positive - 1 - len;
    rule.by_set_pos.binary_search(&positive).is_ok()
        || rule.by_set_pos.binary_search(&negative).is_ok()
}

pub(crate) fn limit_by_month(
    rule: &RecurrenceRuleInner,
    set: &mut super::IntervalSet,
) {
    if !has_by_month(rule) {
        return;
    }
    set.retain(|dt| satisfies_by_month(rule, dt));
}

pub(crate) fn limit_by_year_day(
    rule: &RecurrenceRuleInner,
    set: &mut super::IntervalSet,
) {
    if !has_by_year_day(rule) {
        return;
    }
    set.retain(|dt| satisfies_by_year_day(rule, dt));
}

pub(crate) fn limit_by_month_day(
    rule: &RecurrenceRuleInner,
    set: &mut super::IntervalSet,
) {
    if !has_by_month_day(rule) {
        return;
    }
    set.retain(|dt| satisfies_by_month_day(rule, dt));
}

pub(crate) fn limit_by_week_day(
    rule: &RecurrenceRuleInner,
    set: &mut super::IntervalSet,
) {
    if !has_by_week_day(rule) {
        return;
    }
    set.retain(|dt| satisfies_by_week_day(rule, dt));
}

pub(crate) fn limit_by_hour(
    rule: &RecurrenceRuleInner,
    set: &mut super::IntervalSet,
) {
    if !has_by_hour(rule) {
        return;
    }
    set.retain(|dt| satisfies_by_hour(rule, dt));
}

pub(crate) fn limit_by_minute(
    rule: &RecurrenceRuleInner,
    set: &mut super::IntervalSet,
) {
    if !has_by_minute(rule) {
        return;
    }
    set.retain(|dt| satisfies_by_minute(rule, dt));
}

pub(crate) fn limit_by_second(
    rule: &RecurrenceRuleInner,
    set: &mut super::IntervalSet,
) {
    if !has_by_second(rule) {
        return;
    }
    set.retain(|dt| satisfies_by_second(rule, dt));
}

/// Returns an iterator over the BYMONTH values in this recurrence rule.
///
/// The values returned are datetimes with each of the corresponding
/// months. The day is clamped to the last day of the target month when
/// `dt`'s day doesn't exist there (e.g. expanding Jan 31 into February).
pub(crate) fn iter_by_month(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> impl Iterator<Item = DateTime> + use<'_> {
    // Note that we deliberately pull the day from the rule's starting
    // point rather than from `dt`: if the starting point is e.g. Jan 31
    // and an earlier stage already constrained `dt`'s day (because April
    // has no 31st), we still want every subsequent month to be tried
    // against day 31, not the already-narrowed day.
    let day = rule.start.day();
    rule.by_month.iter().copied().filter_map(move |month| {
        dt.with().month(month).day(day).build().ok()
    })
}

/// Like [`iter_by_month`], but synthesizes a seed for every month of the
/// year containing `dt` rather than reading BYMONTH. Used for the
/// YEARLY+BYMONTHDAY-only combination, where RFC 5545 says BYMONTHDAY
/// expands across every month when BYMONTH is absent.
pub(crate) fn iter_by_month_all_months(
    dt: DateTime,
) -> impl Iterator<Item = DateTime> + use<> {
    (1..=12i8).filter_map(move |month| dt.with().month(month).build().ok())
}

/// Returns an iterator over the BYYEARDAY values in this recurrence rule.
///
/// This handles negative day of the year values according to the number of
/// days in the year containing `dt`.
pub(crate) fn iter_by_year_day(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> impl Iterator<Item = DateTime> + use<'_> {
    let days_in_year = dt.days_in_year();
    rule.by_year_day.iter().copied().filter_map(move |raw_day| {
        let mut day = raw_day;
        if day.is_negative() {
            day = days_in_year.checked_add(day + 1)?;
        }
        let built = dt.with().day_of_year(day).build().ok();
        if built.is_none() {
            log::trace!(
                "dropping out-of-range 'by year day' value {raw_day} for \
                 {dt}",
            );
        }
        built
    })
}

/// Returns an iterator over the BYMONTHDAY values in this recurrence rule.
///
/// This handles negative month day values according to the number of days
/// in the month containing `dt`.
pub(crate) fn iter_by_month_day(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> impl Iterator<Item = DateTime> + use<'_> {
    let days_in_month = dt.days_in_month();
    rule.by_month_day.iter().copied().filter_map(move |raw_day| {
        let mut day = raw_day;
        if day.is_negative() {
            day = days_in_month.checked_add(day + 1)?;
        }
        let built = dt.with().day(day).build().ok();
        if built.is_none() {
            log::trace!(
                "dropping out-of-range 'by month day' value {raw_day} for \
                 {dt}",
            );
        }
        built
    })
}

pub(crate) fn iter_by_hour(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> impl Iterator<Item = DateTime> + use<'_> {
    rule.by_hour
        .iter()
        .copied()
        .filter_map(move |hour| dt.with().hour(hour).build().ok())
}

pub(crate) fn iter_by_minute(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> impl Iterator<Item = DateTime> + use<'_> {
    rule.by_minute
        .iter()
        .copied()
        .filter_map(move |minute| dt.with().minute(minute).build().ok())
}

pub(crate) fn iter_by_second(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> impl Iterator<Item = DateTime> + use<'_> {
    rule.by_second
        .iter()
        .copied()
        .filter_map(move |second| dt.with().second(second).build().ok())
}
