//! The expansion pipeline.
//!
//! Each recurrence rule is compiled, once, into a `Vec<Stage>` — a flat
//! list of tagged-variant instructions, computed by [`plan`] from the
//! rule's frequency and which BY-parts are present. An [`IntervalSet`] is
//! then driven through that list by a single dispatcher
//! ([`run`]) rather than by a tree of per-frequency methods: every stage
//! is either a filter (narrows the set down) or an expander (replaces
//! each element with zero or more results), and the plan is just data, so
//! adding a new combination never means adding a new virtual call.

mod by_parts;
mod byday;
mod weekno;

use jiff::{ToSpan, civil::DateTime};

use crate::rule::{Frequency, RecurrenceRuleInner};

/// A working set of candidate datetimes being pushed through a
/// recurrence rule's stage list.
///
/// Internally the set is kept sorted in *descending* order so that
/// [`IntervalSet::pop`] (which pulls from the end of the backing
/// `Vec`) yields datetimes in ascending, chronological order.
#[derive(Clone, Debug, Default)]
pub(crate) struct IntervalSet {
    items: Vec<DateTime>,
}

impl IntervalSet {
    pub(crate) fn new() -> IntervalSet {
        IntervalSet { items: vec![] }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }

    pub(crate) fn insert(&mut self, dt: DateTime) {
        self.items.push(dt);
    }

    pub(crate) fn retain(&mut self, mut predicate: impl FnMut(DateTime) -> bool) {
        self.items.retain(|&dt| predicate(dt));
    }

    fn expand<F, I>(&mut self, f: F)
    where
        F: Fn(DateTime) -> I,
        I: Iterator<Item = DateTime>,
    {
        let len = self.items.len();
        for i in 0..len {
            let dt = self.items[i];
            self.items.extend(f(dt));
        }
        self.items.drain(..len);
    }

    fn canonicalize(&mut self) {
        self.items.sort_by(|a, b| a.cmp(b).reverse());
        self.items.dedup();
    }

    /// Pops the chronologically-earliest remaining datetime out of the
    /// set.
    pub(crate) fn pop(&mut self) -> Option<DateTime> {
        self.items.pop()
    }
}

/// A single instruction in a recurrence rule's compiled expansion plan.
///
/// `Filter*` variants narrow an [`IntervalSet`] down to the elements that
/// satisfy a BY-part already fixed by an earlier stage (or by the seed
/// itself). `Expand*` variants replace each element with the (possibly
/// empty) set of candidates implied by a BY-part.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Stage {
    FilterMonth,
    FilterYearDay,
    FilterMonthDay,
    FilterWeekDay,
    FilterHour,
    FilterMinute,
    FilterSecond,
    ExpandMonth,
    ExpandMonthAllMonths,
    ExpandWeekNoYearly,
    ExpandWeekNoMonthly,
    ExpandWeekNoDays,
    ExpandWeekDayYearly,
    ExpandWeekDayMonthly,
    ExpandWeekDayWeekly,
    ExpandYearDay,
    ExpandMonthDay,
    ExpandHour,
    ExpandMinute,
    ExpandSecond,
}

/// Computes the stage list for a rule, once, up front.
///
/// This mirrors the BY-part classification table: whether a given BY-part
/// acts as an expander or a filter depends entirely on the rule's outer
/// frequency and on which other BY-parts are present, so the branching
/// happens here, exactly once, rather than being re-decided on every tick
/// of the driver.
pub(crate) fn plan(rule: &RecurrenceRuleInner) -> Vec<Stage> {
    use Stage::*;

    let has_month = by_parts::has_by_month(rule);
    let has_week = by_parts::has_by_week(rule);
    let has_year_day = by_parts::has_by_year_day(rule);
    let has_month_day = by_parts::has_by_month_day(rule);
    let has_week_day = by_parts::has_by_week_day(rule);

    let mut stages = Vec::new();
    match rule.freq {
        Frequency::Yearly => {
            if has_week_day {
                if has_week {
                    stages.push(ExpandWeekNoYearly);
                    stages.push(ExpandWeekDayWeekly);
                    stages.push(FilterMonth);
                } else if has_month {
                    stages.push(ExpandMonth);
                    stages.push(ExpandWeekDayMonthly);
                } else {
                    stages.push(ExpandWeekDayYearly);
                }
                stages.push(FilterYearDay);
                stages.push(FilterMonthDay);
            } else if has_week {
                stages.push(ExpandWeekNoYearly);
                // Unlike other YEARLY BY-parts, BYWEEKNO without BYDAY
                // expands into every day of each selected week, not just
                // the day-of-week of the starting point.
                stages.push(ExpandWeekNoDays);
                stages.push(FilterMonth);
                stages.push(FilterYearDay);
                stages.push(FilterMonthDay);
            } else if has_month {
                stages.push(ExpandMonth);
                stages.push(ExpandMonthDay);
                stages.push(FilterYearDay);
            } else if has_month_day {
                stages.push(ExpandMonthAllMonths);
                stages.push(ExpandMonthDay);
                stages.push(FilterYearDay);
            } else if has_year_day {
                stages.push(ExpandYearDay);
            }
            stages.push(ExpandHour);
            stages.push(ExpandMinute);
            stages.push(ExpandSecond);
        }
        Frequency::Monthly => {
            // BYMONTH acts as a filter at MONTHLY frequency: the seed
            // itself is rejected if its month doesn't match.
            stages.push(FilterMonth);
            if has_week {
                // RFC 2445 tolerance: BYWEEKNO may also expand at MONTHLY
                // frequency. Candidate weeks that spill into a
                // neighboring month are clipped by the trailing
                // `FilterMonth`. BYWEEKNO is the one doing the expanding
                // here, so BYDAY/BYMONTHDAY only narrow what it produced.
                // They must not also expand, since that would reapply a
                // day picked out of one week to every matching day of the
                // whole month.
                stages.push(ExpandWeekNoMonthly);
                stages.push(ExpandWeekNoDays);
                stages.push(FilterMonth);
                if has_week_day {
                    stages.push(FilterWeekDay);
                }
                if has_month_day {
                    stages.push(FilterMonthDay);
                }
            } else if has_week_day {
                stages.push(ExpandWeekDayMonthly);
                stages.push(FilterMonthDay);
            } else {
                stages.push(ExpandMonthDay);
            }
            stages.push(ExpandHour);
            stages.push(ExpandMinute);
            stages.push(ExpandSecond);
        }
        Frequency::Weekly => {
            stages.push(FilterMonth);
            stages.push(ExpandWeekDayWeekly);
            stages.push(ExpandHour);
            stages.push(ExpandMinute);
            stages.push(ExpandSecond);
        }
        Frequency::Daily => {
            stages.push(FilterMonth);
            stages.push(FilterMonthDay);
            stages.push(FilterWeekDay);
            stages.push(ExpandHour);
            stages.push(ExpandMinute);
            stages.push(ExpandSecond);
        }
        Frequency::Hourly => {
            stages.push(FilterMonth);
            stages.push(FilterYearDay);
            stages.push(FilterMonthDay);
            stages.push(FilterWeekDay);
            stages.push(FilterHour);
            stages.push(ExpandMinute);
            stages.push(ExpandSecond);
        }
        Frequency::Minutely => {
            stages.push(FilterMonth);
            stages.push(FilterYearDay);
            stages.push(FilterMonthDay);
            stages.push(FilterWeekDay);
            stages.push(FilterHour);
            stages.push(FilterMinute);
            stages.push(ExpandSecond);
        }
        Frequency::Secondly => {
            stages.push(FilterMonth);
            stages.push(FilterYearDay);
            stages.push(FilterMonthDay);
            stages.push(FilterWeekDay);
            stages.push(FilterHour);
            stages.push(FilterMinute);
            stages.push(FilterSecond);
        }
    }
    stages
}

/// Runs a rule's compiled stage list against the seed `cur`, producing the
/// fully expanded, canonicalized, deduplicated, and (if BYSETPOS is used)
/// positionally-filtered set of candidates for this tick of the outer
/// frequency.
pub(crate) fn run(
    rule: &RecurrenceRuleInner,
    stages: &[Stage],
    cur: DateTime,
) -> IntervalSet {
    let mut set = IntervalSet::new();
    set.insert(cur);
    for &stage in stages {
        dispatch(rule, stage, &mut set);
        if set.is_empty() {
            break;
        }
    }
    set.canonicalize();
    if by_parts::has_by_set_pos(rule) {
        apply_set_pos(rule, &mut set);
    }
    set
}

fn dispatch(rule: &RecurrenceRuleInner, stage: Stage, set: &mut IntervalSet) {
    use Stage::*;
    match stage {
        FilterMonth => by_parts::limit_by_month(rule, set),
        FilterYearDay => by_parts::limit_by_year_day(rule, set),
        FilterMonthDay => by_parts::limit_by_month_day(rule, set),
        FilterWeekDay => by_parts::limit_by_week_day(rule, set),
        FilterHour => by_parts::limit_by_hour(rule, set),
        FilterMinute => by_parts::limit_by_minute(rule, set),
        FilterSecond => by_parts::limit_by_second(rule, set),
        ExpandMonth => set.expand(|dt| by_parts::iter_by_month(rule, dt)),
        ExpandMonthAllMonths => {
            set.expand(by_parts::iter_by_month_all_months)
        }
        ExpandWeekNoYearly => {
            set.expand(|dt| weekno::iter_by_week_yearly(rule, dt))
        }
        ExpandWeekNoMonthly => {
            set.expand(|dt| weekno::iter_by_week_monthly(rule, dt))
        }
        ExpandWeekNoDays => set.expand(|dt| {
            (0..=6).filter_map(move |n| dt.checked_add(n.days()).ok())
        }),
        ExpandWeekDayYearly => {
            set.expand(|dt| byday::iter_by_week_day_yearly(rule, dt))
        }
        ExpandWeekDayMonthly => {
            set.expand(|dt| byday::iter_by_week_day_monthly(rule, dt))
        }
        ExpandWeekDayWeekly => {
            set.expand(|dt| byday::iter_by_week_day_weekly(rule, dt))
        }
        ExpandYearDay => {
            set.expand(|dt| by_parts::iter_by_year_day(rule, dt))
        }
        ExpandMonthDay => {
            set.expand(|dt| by_parts::iter_by_month_day(rule, dt))
        }
        ExpandHour => {
            if by_parts::has_by_hour(rule) {
                set.expand(|dt| by_parts::iter_by_hour(rule, dt));
            }
        }
        ExpandMinute => {
            if by_parts::has_by_minute(rule) {
                set.expand(|dt| by_parts::iter_by_minute(rule, dt));
            }
        }
        ExpandSecond => {
            if by_parts::has_by_second(rule) {
                set.expand(|dt| by_parts::iter_by_second(rule, dt));
            }
        }
    }
}


fn apply_set_pos(rule: &RecurrenceRuleInner, set: &mut IntervalSet) {
    // `set.items` is sorted descending; flip it around so BYSETPOS
    // positions (which are 1-indexed from the chronological start of the
    // set) line up with plain forward iteration.
    set.items.reverse();
    let len = set.items.len();
    let mut position = 0;
    set.items.retain(|&dt| {
        let keep = by_parts::satisfies_by_set_pos(rule, position, len);
        if !keep {
            log::trace!(
                "dropping {dt}: position {position} doesn't satisfy 'by \
                 set pos'",
            );
        }
        position += 1;
        keep
    });
    set.items.reverse();
}
