//! BYWEEKNO expansion.
//!
//! At YEARLY frequency this is the plain RFC 5545 behavior: each BYWEEKNO
//! value resolves to the date on which that week (per the rule's WKST)
//! starts. At MONTHLY frequency, this module additionally implements the
//! RFC 2445 tolerance extension: a week is considered active for a given
//! month if any part of it falls within that month, and the final
//! `FilterMonth` stage clips away whichever end of the week spills into
//! the neighboring month.

use jiff::civil::DateTime;

use crate::{rule::RecurrenceRuleInner, weekdate::WeekDate};

/// Returns an iterator over the BYWEEKNO values in this recurrence rule at
/// YEARLY frequency.
///
/// The values returned are datetimes corresponding to the start of each
/// selected week. The other parts of the datetime are copied from `dt`.
pub(crate) fn iter_by_week_yearly(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> impl Iterator<Item = DateTime> + use<'_> {
    let weeks_in_year = WeekDate::from_date(rule.week_start, dt.date())
        .map(|wd| wd.weeks_in_year())
        .ok();
    let week_start = rule.week_start;
    let year = dt.year();
    rule.by_week.iter().copied().filter_map(move |raw_week| {
        let mut week = raw_week;
        if week.is_negative() {
            // Add 1 because -1 is the last week of the year, and the
            // weeks of the year are 1-indexed.
            week = weeks_in_year?.checked_add(week + 1)?;
        }
        let Ok(start) = WeekDate::new(week_start, year, week, week_start)
        else {
            log::trace!(
                "dropping out-of-range 'by week' value {raw_week} for year \
                 {year}",
            );
            return None;
        };
        dt.with().date(start.date()).build().ok()
    })
}

/// Returns an iterator over the BYWEEKNO values in this recurrence rule at
/// MONTHLY frequency (an RFC 2445 tolerance extension).
///
/// Unlike the YEARLY case, a week is only surfaced here if it overlaps the
/// month containing `dt` at all. The caller is expected to follow this
/// stage with a BYDAY expansion (or a plain 7-day expansion) and then a
/// `FilterMonth` pass, which clips away the part of the week that falls
/// outside `dt`'s month.
pub(crate) fn iter_by_week_monthly(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> impl Iterator<Item = DateTime> + use<'_> {
    let weeks_in_year = WeekDate::from_date(rule.week_start, dt.date())
        .map(|wd| wd.weeks_in_year())
        .ok();
    let week_start = rule.week_start;
    let year = dt.year();
    let first_of_month = dt.first_of_month().date();
    let last_of_month = dt.last_of_month().date();
    rule.by_week.iter().copied().filter_map(move |raw_week| {
        let mut week = raw_week;
        if week.is_negative() {
            week = weeks_in_year?.checked_add(week + 1)?;
        }
        let wd = WeekDate::new(week_start, year, week, week_start).ok()?;
        let start = wd.date();
        let end = crate::weekdate::last_of_week(week_start, start).ok()?;
        let overlaps = start <= last_of_month && end >= first_of_month;
        if !overlaps {
            log::trace!(
                "dropping 'by week' value {raw_week}: no overlap with \
                 {month}",
                month = dt.first_of_month(),
            );
            return None;
        }
        dt.with().date(start).build().ok()
    })
}

#[cfg(test)]
mod tests {
    use jiff::civil::Weekday;

    use super::*;
    use crate::rule::{Frequency, RecurrenceRule};

    fn datetime(s: &str) -> DateTime {
        s.parse().unwrap()
    }

    // RFC 2445 tolerance: BYWEEKNO at MONTHLY frequency. Week 1 of 1999
    // (WKST=MO) runs Mon Jan 4 through Sun Jan 10, entirely inside January,
    // so every day of it should show up when the rule is scoped to month 1.
    #[test]
    fn week_one_inside_january() {
        let rule = RecurrenceRule::builder(
            Frequency::Monthly,
            datetime("1999-01-01T09:00:00"),
        )
        .by_month(1)
        .by_week(1)
        .build()
        .unwrap();
        let candidates: Vec<_> = iter_by_week_monthly(
            rule.inner(),
            datetime("1999-01-01T09:00:00"),
        )
        .collect();
        assert_eq!(candidates, vec![datetime("1999-01-04T09:00:00")]);
    }

    // Week 52 of 1998 (WKST=MO) runs Mon Dec 21 1998 through Sun Dec 27
    // 1998 - entirely inside December, so scoping to November should drop
    // it (the caller's trailing `FilterMonth` does the actual clipping;
    // this only checks the overlap test itself for a week with no overlap
    // at all).
    #[test]
    fn week_with_no_overlap_is_skipped() {
        let rule = RecurrenceRule::builder(
            Frequency::Monthly,
            datetime("1998-11-01T09:00:00"),
        )
        .by_month(11)
        .by_week(52)
        .build()
        .unwrap();
        let candidates: Vec<_> = iter_by_week_monthly(
            rule.inner(),
            datetime("1998-11-01T09:00:00"),
        )
        .collect();
        assert!(candidates.is_empty());
    }

    #[test]
    fn negative_week_number_yearly() {
        let rule = RecurrenceRule::builder(
            Frequency::Yearly,
            datetime("1997-01-01T09:00:00"),
        )
        .by_week(-1)
        .week_start(Weekday::Monday)
        .build()
        .unwrap();
        let candidates: Vec<_> = iter_by_week_yearly(
            rule.inner(),
            datetime("1997-01-01T09:00:00"),
        )
        .collect();
        assert_eq!(candidates.len(), 1);
    }
}
