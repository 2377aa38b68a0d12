//! BYDAY expansion.
//!
//! A plain weekday (`ByWeekday::Any`) always expands to every occurrence of
//! that weekday in the enclosing period. A numbered weekday
//! (`ByWeekday::Numbered`) picks out a single occurrence, counting from the
//! start of the period when `nth` is positive and from the end when `nth`
//! is negative.

use jiff::civil::{DateTime, Weekday};

use crate::{
    rule::{ByWeekday, RecurrenceRuleInner},
    weekdate::{first_of_week, last_of_week},
};

/// An iterator that dispatches to one of two concrete iterator types
/// without boxing either of them.
pub(crate) enum Either<L, R> {
    Left(L),
    Right(R),
}

impl<L, R, T> Iterator for Either<L, R>
where
    L: Iterator<Item = T>,
    R: Iterator<Item = T>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self {
            Either::Left(it) => it.next(),
            Either::Right(it) => it.next(),
        }
    }
}

/// Returns every datetime with the given weekday in the inclusive range
/// `[start, end]`.
pub(crate) fn iter_weekdays_between(
    weekday: Weekday,
    start: DateTime,
    end: DateTime,
) -> impl Iterator<Item = DateTime> + use<> {
    (start.weekday() == weekday).then_some(start).into_iter().chain({
        let mut cur = start.nth_weekday(1, weekday).ok();
        std::iter::from_fn(move || {
            let next = cur.take()?;
            if next > end {
                return None;
            }
            cur = next.nth_weekday(1, weekday).ok();
            Some(next)
        })
    })
}

impl ByWeekday {
    /// Return an iterator of weekdays, at yearly frequency, within the
    /// given range of datetimes.
    ///
    /// `start` should be the first day of a year and `end` should be the
    /// last day of that same year.
    ///
    /// When this is a numbered weekday, a positive number is interpreted
    /// relative to the start and a negative number relative to the end.
    /// Either way, the iterator returned yields at most one element.
    ///
    /// When this is "any" weekday, every date with that weekday between
    /// `start` and `end` (inclusive) is returned.
    pub(crate) fn iter_yearly(
        &self,
        start: DateTime,
        end: DateTime,
    ) -> impl Iterator<Item = DateTime> + use<> {
        match *self {
            ByWeekday::Any(weekday) => {
                Either::Left(iter_weekdays_between(weekday, start, end))
            }
            ByWeekday::Numbered { nth, weekday } => {
                let nth = if start.weekday() != weekday {
                    nth
                } else if nth == 1 {
                    return Either::Right(Some(start).into_iter());
                } else if nth == -1 {
                    return Either::Right(Some(end).into_iter());
                } else {
                    nth - nth.signum()
                };
                let from = if nth < 0 { end } else { start };
                if let Ok(dt) = from.nth_weekday(i32::from(nth), weekday) {
                    return Either::Right(Some(dt).into_iter());
                }
                Either::Right(None.into_iter())
            }
        }
    }

    /// Return an iterator of weekdays, at monthly frequency, within the
    /// given range of datetimes.
    ///
    /// `start` should be the first day of a month and `end` should be the
    /// last day of that same month.
    pub(crate) fn iter_monthly(
        &self,
        start: DateTime,
        end: DateTime,
    ) -> impl Iterator<Item = DateTime> + use<> {
        match *self {
            ByWeekday::Any(weekday) => {
                Either::Left(iter_weekdays_between(weekday, start, end))
            }
            ByWeekday::Numbered { nth, weekday } => Either::Right(
                start.nth_weekday_of_month(nth, weekday).ok().into_iter(),
            ),
        }
    }

    /// Return an iterator of weekdays, at weekly frequency, within the
    /// given range of datetimes.
    ///
    /// `start` should be the first day of a week and `end` should be the
    /// last day of that same week (per the rule's WKST).
    ///
    /// # Panics
    ///
    /// When this `ByWeekday` is `Numbered`. RFC 5545 doesn't permit that
    /// construction at anything other than YEARLY and MONTHLY frequency,
    /// and rule construction rejects it earlier.
    pub(crate) fn iter_weekly(
        &self,
        start: DateTime,
        end: DateTime,
    ) -> impl Iterator<Item = DateTime> + use<> {
        match *self {
            ByWeekday::Any(weekday) => {
                iter_weekdays_between(weekday, start, end)
            }
            ByWeekday::Numbered { .. } => unreachable!(),
        }
    }
}

/// BYDAY expansion scoped to the whole year containing `dt`.
pub(crate) fn iter_by_week_day_yearly(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> impl Iterator<Item = DateTime> + use<'_> {
    let start = dt.first_of_year();
    let end = dt.last_of_year();
    rule.by_week_day
        .iter()
        .copied()
        .flat_map(move |weekday| weekday.iter_yearly(start, end))
}

/// BYDAY expansion scoped to the month containing `dt`.
pub(crate) fn iter_by_week_day_monthly(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> impl Iterator<Item = DateTime> + use<'_> {
    let start = dt.first_of_month();
    let end = dt.last_of_month();
    rule.by_week_day
        .iter()
        .copied()
        .flat_map(move |weekday| weekday.iter_monthly(start, end))
}

/// BYDAY expansion scoped to the week containing `dt`.
pub(crate) fn iter_by_week_day_weekly(
    rule: &RecurrenceRuleInner,
    dt: DateTime,
) -> impl Iterator<Item = DateTime> + use<'_> {
    let Ok(start) = first_of_week(rule.week_start, dt.date()) else {
        return Either::Left(std::iter::empty());
    };
    let Ok(end) = last_of_week(rule.week_start, dt.date()) else {
        return Either::Left(std::iter::empty());
    };
    let Ok(start) = dt.with().date(start).build() else {
        return Either::Left(std::iter::empty());
    };
    let Ok(end) = dt.with().date(end).build() else {
        return Either::Left(std::iter::empty());
    };
    Either::Right(
        rule.by_week_day
            .iter()
            .copied()
            .flat_map(move |weekday| weekday.iter_weekly(start, end)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime(s: &str) -> DateTime {
        s.parse().unwrap()
    }

    #[test]
    fn weekdays_between_is_inclusive_of_both_ends() {
        let start = datetime("1997-09-01T09:00:00"); // Monday
        let end = datetime("1997-09-30T09:00:00"); // Tuesday
        let got: Vec<_> =
            iter_weekdays_between(Weekday::Monday, start, end).collect();
        assert_eq!(
            got,
            vec![
                datetime("1997-09-01T09:00:00"),
                datetime("1997-09-08T09:00:00"),
                datetime("1997-09-15T09:00:00"),
                datetime("1997-09-22T09:00:00"),
                datetime("1997-09-29T09:00:00"),
            ],
        );
    }

    #[test]
    fn numbered_weekday_negative_counts_from_end() {
        let by = ByWeekday::Numbered { nth: -1, weekday: Weekday::Friday };
        let start = datetime("1997-09-01T09:00:00").first_of_month();
        let end = datetime("1997-09-01T09:00:00").last_of_month();
        let got: Vec<_> = by.iter_monthly(start, end).collect();
        assert_eq!(got, vec![datetime("1997-09-26T09:00:00")]);
    }
}
