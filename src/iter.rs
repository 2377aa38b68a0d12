use jiff::civil::DateTime;

use crate::{
    pipeline::{self, Stage},
    rule::{Frequency, RecurrenceRule},
};

/// The lifecycle state of a [`RecurrenceIter`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    /// Still able to produce more datetimes.
    Active,
    /// Reached `until`, `count`, or ran off the end of Jiff's supported
    /// date range. This is a normal, successful end of iteration.
    Terminated,
    /// Gave up after `empty_interval_limit` consecutive intervals each
    /// produced zero candidates. This means the rule is very likely (or
    /// certainly) unsatisfiable — e.g. `FREQ=MONTHLY;BYMONTHDAY=31` paired
    /// with `BYMONTH=2` can never produce an occurrence, and without this
    /// valve the iterator would advance forever looking for one.
    Drained,
}

/// A pull-based driver over the datetimes a [`RecurrenceRule`] describes.
///
/// Datetimes are produced in ascending order, with no duplicates. Besides
/// the standard `Iterator` interface, this also exposes [`peek`] and
/// [`fast_forward`], which a caller merging several recurring schedules
/// together typically needs.
///
/// [`peek`]: RecurrenceIter::peek
/// [`fast_forward`]: RecurrenceIter::fast_forward
#[derive(Clone, Debug)]
pub struct RecurrenceIter<'r> {
    rule: &'r RecurrenceRule,
    stages: Vec<Stage>,
    set: pipeline::IntervalSet,
    /// The attempt count paired with the datetime it produced. `None`
    /// once the underlying frequency stream itself has run out (e.g. hit
    /// `until` or Jiff's maximum date).
    cur: Option<(i64, DateTime)>,
    emitted: u32,
    empty_streak: u32,
    state: State,
    peeked: Option<Option<DateTime>>,
}

impl<'r> RecurrenceIter<'r> {
    pub(crate) fn new(rule: &'r RecurrenceRule) -> RecurrenceIter<'r> {
        let stages = pipeline::plan(rule.inner());
        RecurrenceIter {
            rule,
            stages,
            set: pipeline::IntervalSet::new(),
            cur: Some((0, rule.inner().start)),
            emitted: 0,
            empty_streak: 0,
            state: State::Active,
            peeked: None,
        }
    }

    /// Returns the next datetime without consuming it.
    ///
    /// Calling this repeatedly without an intervening call to `next`
    /// always returns the same value.
    pub fn peek(&mut self) -> Option<DateTime> {
        if self.peeked.is_none() {
            let next = self.advance();
            self.peeked = Some(next);
        }
        self.peeked.unwrap()
    }

    /// Advances the iterator until the next produced datetime is greater
    /// than or equal to `to`, or until iteration ends.
    ///
    /// Rather than expanding every intervening interval's BY-parts, this
    /// first jumps the underlying frequency stream directly to (the
    /// neighborhood of) the interval that could contain `to`, using only
    /// `FREQ`/`INTERVAL` arithmetic. It then falls back to the ordinary
    /// peek/next loop, which both covers any undershoot from that estimate
    /// and is where the actual BY-part expansion happens. A rule with a
    /// COUNT skips the jump and always uses the peek/next loop alone, since
    /// COUNT has to reflect every occurrence produced even when a caller
    /// never observes it.
    pub fn fast_forward(&mut self, to: DateTime) {
        // COUNT must reflect every occurrence the rule actually produces,
        // including ones a caller skips past, so the shortcut below (which
        // doesn't visit skipped ticks at all) only applies to COUNT-less
        // rules. Bounded rules fall back to the exact peek/next loop.
        if self.state == State::Active && self.rule.inner().count.is_none() {
            if let Some((attempt, cur)) = self.cur {
                if cur < to {
                    if let Some(jumped) = self.estimate_attempt(attempt, to) {
                        self.cur = Some(jumped);
                        self.set.clear();
                        self.peeked = None;
                    }
                }
            }
        }
        while let Some(dt) = self.peek() {
            if dt >= to {
                break;
            }
            self.next();
        }
    }

    /// Finds a validated `(attempt, datetime)` pair at or a few attempts
    /// before the frequency interval that could first contain `to`.
    ///
    /// The underlying frequency stream's raw arithmetic (`start + interval *
    /// attempt`) is monotonic in `attempt`, so a galloping search followed by
    /// a binary search narrows the attempt count in `O(log n)` comparisons
    /// rather than walking one interval at a time. The constraining-date
    /// skip `candidate_at` applies only ever pushes a real candidate's
    /// attempt forward relative to the raw arithmetic, never backward, so
    /// backing off a handful of attempts before searching for a validated
    /// one guarantees this never jumps past the real answer.
    fn estimate_attempt(&self, from: i64, to: DateTime) -> Option<(i64, DateTime)> {
        let r = self.rule.inner();
        let raw = |attempt: i64| -> Option<DateTime> {
            r.start.checked_add(r.interval.checked_mul(attempt).ok()?).ok()
        };
        let mut lo = from;
        let mut hi = from.checked_add(1)?;
        while raw(hi).is_some_and(|dt| dt < to) {
            lo = hi;
            hi = hi.checked_mul(2)?.max(hi.checked_add(1)?);
        }
        while lo + 1 < hi {
            let mid = lo + (hi - lo) / 2;
            if raw(mid).is_some_and(|dt| dt < to) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let start = lo.saturating_sub(4).max(from);
        self.candidate_at(start)
    }

    fn is_frequency_stream_done(&self) -> bool {
        self.cur.is_none() && self.set.is_empty()
    }

    fn expand(&mut self) {
        let Some((_, cur)) = self.cur else { return };
        self.set = pipeline::run(self.rule.inner(), &self.stages, cur);
    }

    /// Computes the next `(attempt, datetime)` pair in the underlying
    /// frequency stream, or `None` if the stream has run out (either
    /// because `until` was passed or because Jiff's supported date range
    /// was exhausted).
    fn increment(&self) -> Option<(i64, DateTime)> {
        let (attempt, _) = self.cur?;
        self.candidate_at(attempt.checked_add(1)?)
    }

    /// Computes the first validated `(attempt, datetime)` pair at or after
    /// `attempt`, skipping any in between that Jiff's calendar arithmetic
    /// constrained down to an existing day RFC 5545 doesn't consider a
    /// match (see the comment on `RecurrenceRuleInner::interval` in
    /// `rule.rs`).
    fn candidate_at(&self, mut attempt: i64) -> Option<(i64, DateTime)> {
        let r = self.rule.inner();
        loop {
            let span = r.interval.checked_mul(attempt).ok()?;
            let next = r.start.checked_add(span).ok()?;
            if let Some(until) = r.until {
                if next > until {
                    return None;
                }
            }
            // When adding whole years or months lands on a day that
            // doesn't exist (Feb 29 + 1 year), Jiff constrains it down
            // (Feb 28). RFC 5545 wants that candidate skipped rather than
            // treated as a real occurrence, *unless* some other BY-part is
            // already responsible for choosing the day, in which case the
            // constrained seed is just an input to that BY-part and
            // doesn't need to equal the rule's starting day at all.
            match r.freq {
                Frequency::Yearly if next.day() != r.start.day() => {
                    if r.by_month.is_empty()
                        && r.by_week.is_empty()
                        && r.by_year_day.is_empty()
                        && r.by_month_day.is_empty()
                        && r.by_week_day.is_empty()
                    {
                        log::trace!(
                            "skipping constrained candidate {next} (wanted \
                             day {day}) at attempt {attempt}",
                            day = r.start.day(),
                        );
                        attempt = attempt.checked_add(1)?;
                        continue;
                    }
                }
                Frequency::Monthly if next.day() != r.start.day() => {
                    if r.by_week.is_empty()
                        && r.by_week_day.is_empty()
                        && r.by_month_day.is_empty()
                    {
                        log::trace!(
                            "skipping constrained candidate {next} (wanted \
                             day {day}) at attempt {attempt}",
                            day = r.start.day(),
                        );
                        attempt = attempt.checked_add(1)?;
                        continue;
                    }
                }
                _ => {}
            }
            return Some((attempt, next));
        }
    }

    fn advance(&mut self) -> Option<DateTime> {
        if self.state != State::Active {
            return None;
        }
        loop {
            if self.is_frequency_stream_done() {
                self.state = State::Terminated;
                return None;
            }
            if let Some(count) = self.rule.inner().count {
                if self.emitted >= count {
                    self.state = State::Terminated;
                    return None;
                }
            }
            while let Some(dt) = self.set.pop() {
                if dt < self.rule.inner().start {
                    log::trace!("dropping candidate {dt}: before DTSTART");
                    continue;
                }
                if let Some(until) = self.rule.inner().until {
                    if dt > until {
                        self.set.clear();
                        self.cur = None;
                        self.state = State::Terminated;
                        return None;
                    }
                }
                self.emitted += 1;
                self.empty_streak = 0;
                return Some(dt);
            }
            self.expand();
            if self.set.is_empty() {
                self.empty_streak += 1;
                if self.empty_streak >= self.rule.inner().empty_interval_limit
                {
                    log::debug!(
                        "giving up after {streak} consecutive empty \
                         intervals",
                        streak = self.empty_streak,
                    );
                    self.cur = None;
                    self.state = State::Drained;
                    return None;
                }
            }
            self.cur = self.increment();
        }
    }
}

impl<'r> Iterator for RecurrenceIter<'r> {
    type Item = DateTime;

    fn next(&mut self) -> Option<DateTime> {
        if let Some(cached) = self.peeked.take() {
            return cached;
        }
        self.advance()
    }
}

impl<'r> std::iter::FusedIterator for RecurrenceIter<'r> {}

#[cfg(test)]
mod tests {
    use jiff::civil::{DateTime, Weekday};

    use crate::rule::{Frequency, RecurrenceRule, RecurrenceRuleBuilder};

    fn datetime(s: &str) -> DateTime {
        s.parse().unwrap()
    }

    fn snapshot<T: ToString>(it: impl IntoIterator<Item = T>) -> String {
        it.into_iter()
            .map(|item| item.to_string())
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn expect_err(builder: &mut RecurrenceRuleBuilder) -> anyhow::Error {
        match builder.build() {
            Err(err) => err,
            Ok(ok) => panic!("expected rule error, but got: {ok:?}"),
        }
    }

    // DTSTART:19970902T090000
    // RRULE:FREQ=DAILY;COUNT=10
    #[test]
    fn daily_for_ten_occurrences() {
        let start = datetime("1997-09-02T09:00:00");
        let rrule = RecurrenceRule::builder(Frequency::Daily, start)
            .count(10)
            .build()
            .unwrap();
        let got: Vec<_> = rrule.iter().collect();
        assert_eq!(got.len(), 10);
        assert_eq!(got[0], start);
        assert_eq!(got[9], datetime("1997-09-11T09:00:00"));
    }

    // DTSTART:19970902T090000
    // RRULE:FREQ=DAILY;INTERVAL=10;COUNT=5
    #[test]
    fn daily_every_ten_days_five_occurrences() {
        let start = datetime("1997-09-02T09:00:00");
        let rrule = RecurrenceRule::builder(Frequency::Daily, start)
            .interval(10)
            .count(5)
            .build()
            .unwrap();
        insta::assert_snapshot!(
            snapshot(rrule.iter()),
            @r"
        1997-09-02T09:00:00
        1997-09-12T09:00:00
        1997-09-22T09:00:00
        1997-10-02T09:00:00
        1997-10-12T09:00:00
        ",
        );
    }

    // DTSTART:19970902T090000
    // RRULE:FREQ=WEEKLY;INTERVAL=2;WKST=SU;BYDAY=TU,TH;COUNT=8
    #[test]
    fn weekly_every_other_week_on_tues_thurs() {
        let start = datetime("1997-09-02T09:00:00");
        let rrule = RecurrenceRule::builder(Frequency::Weekly, start)
            .interval(2)
            .week_start(Weekday::Sunday)
            .by_week_day([Weekday::Tuesday, Weekday::Thursday])
            .count(8)
            .build()
            .unwrap();
        insta::assert_snapshot!(
            snapshot(rrule.iter()),
            @r"
        1997-09-02T09:00:00
        1997-09-04T09:00:00
        1997-09-16T09:00:00
        1997-09-18T09:00:00
        1997-09-30T09:00:00
        1997-10-02T09:00:00
        1997-10-14T09:00:00
        1997-10-16T09:00:00
        ",
        );
    }

    // DTSTART:19970901T090000
    // RRULE:FREQ=MONTHLY;BYMONTHDAY=1,-1;COUNT=4
    #[test]
    fn monthly_first_and_last_day() {
        let start = datetime("1997-09-01T09:00:00");
        let rrule = RecurrenceRule::builder(Frequency::Monthly, start)
            .by_month_day([1, -1])
            .count(4)
            .build()
            .unwrap();
        insta::assert_snapshot!(
            snapshot(rrule.iter()),
            @r"
        1997-09-01T09:00:00
        1997-09-30T09:00:00
        1997-10-01T09:00:00
        1997-10-31T09:00:00
        ",
        );
    }

    // DTSTART:19970905T090000
    // RRULE:FREQ=MONTHLY;BYDAY=1FR;COUNT=3
    #[test]
    fn monthly_first_friday() {
        let start = datetime("1997-09-05T09:00:00");
        let rrule = RecurrenceRule::builder(Frequency::Monthly, start)
            .by_week_day((1, Weekday::Friday))
            .count(3)
            .build()
            .unwrap();
        insta::assert_snapshot!(
            snapshot(rrule.iter()),
            @r"
        1997-09-05T09:00:00
        1997-10-03T09:00:00
        1997-11-07T09:00:00
        ",
        );
    }

    // RFC 2445 tolerance: BYWEEKNO at MONTHLY frequency, narrowed by BYDAY.
    // Week 1 of 1999 (WKST=MO) runs Mon Jan 4 through Sun Jan 10, so the
    // Monday of that week is Jan 4. BYDAY must narrow the week BYWEEKNO
    // already expanded rather than re-expanding across the whole month, or
    // this would wrongly produce every Monday in January.
    #[test]
    fn monthly_by_week_no_narrowed_by_week_day() {
        let start = datetime("1999-01-01T09:00:00");
        let rrule = RecurrenceRule::builder(Frequency::Monthly, start)
            .week_start(Weekday::Monday)
            .by_week(1)
            .by_week_day(Weekday::Monday)
            .count(1)
            .build()
            .unwrap();
        let got: Vec<_> = rrule.iter().collect();
        assert_eq!(got, vec![datetime("1999-01-04T09:00:00")]);
    }

    // Same RFC 2445 tolerance, narrowed by BYMONTHDAY instead of BYDAY.
    #[test]
    fn monthly_by_week_no_narrowed_by_month_day() {
        let start = datetime("1999-01-01T09:00:00");
        let rrule = RecurrenceRule::builder(Frequency::Monthly, start)
            .week_start(Weekday::Monday)
            .by_week(1)
            .by_month_day(4)
            .count(1)
            .build()
            .unwrap();
        let got: Vec<_> = rrule.iter().collect();
        assert_eq!(got, vec![datetime("1999-01-04T09:00:00")]);
    }

    // DTSTART:19970101T090000
    // RRULE:FREQ=YEARLY;BYMONTH=1,6;BYDAY=1SU,-1SU;COUNT=4
    #[test]
    fn yearly_first_and_last_sunday_of_jan_and_jun() {
        let start = datetime("1997-01-05T09:00:00");
        let rrule = RecurrenceRule::builder(Frequency::Yearly, start)
            .by_month([1, 6])
            .by_week_day([
                (1, Weekday::Sunday),
                (-1, Weekday::Sunday),
            ])
            .count(4)
            .build()
            .unwrap();
        insta::assert_snapshot!(
            snapshot(rrule.iter()),
            @r"
        1997-01-05T09:00:00
        1997-01-26T09:00:00
        1997-06-01T09:00:00
        1997-06-29T09:00:00
        ",
        );
    }

    // A rule that can never produce anything (February has no 30th) should
    // give up rather than loop forever.
    #[test]
    fn unsatisfiable_rule_drains() {
        let start = datetime("1997-02-01T09:00:00");
        let rrule = RecurrenceRule::builder(Frequency::Monthly, start)
            .by_month(2)
            .by_month_day(30)
            .empty_interval_limit(5)
            .build()
            .unwrap();
        let got: Vec<_> = rrule.iter().collect();
        assert!(got.is_empty());
    }

    #[test]
    fn peek_does_not_consume() {
        let start = datetime("1997-09-02T09:00:00");
        let rrule = RecurrenceRule::builder(Frequency::Daily, start)
            .count(3)
            .build()
            .unwrap();
        let mut it = rrule.iter();
        let peeked = it.peek();
        assert_eq!(peeked, it.peek());
        assert_eq!(peeked, it.next());
        assert_eq!(it.next(), Some(datetime("1997-09-03T09:00:00")));
    }

    #[test]
    fn fast_forward_lands_on_or_after_target() {
        let start = datetime("1997-09-02T09:00:00");
        let rrule = RecurrenceRule::builder(Frequency::Daily, start)
            .until(datetime("1997-10-01T00:00:00"))
            .build()
            .unwrap();
        let mut it = rrule.iter();
        it.fast_forward(datetime("1997-09-15T00:00:00"));
        assert_eq!(it.next(), Some(datetime("1997-09-15T09:00:00")));
    }

    // `fast_forward` is an optimization, not a different algorithm: landing
    // on a target and pulling the rest of the sequence from there should
    // agree with fully draining the sequence from the start and skipping
    // past the same target by hand.
    #[test]
    fn fast_forward_agrees_with_full_drain() {
        let start = datetime("1997-01-05T09:00:00");
        let target = datetime("2001-01-01T00:00:00");
        let build = || {
            RecurrenceRule::builder(Frequency::Yearly, start)
                .by_month([1, 6])
                .by_week_day([
                    (1, Weekday::Sunday),
                    (-1, Weekday::Sunday),
                ])
                .until(datetime("2003-01-01T00:00:00"))
                .build()
                .unwrap()
        };

        let jumped = build();
        let mut jumped_it = jumped.iter();
        jumped_it.fast_forward(target);
        let jumped_rest: Vec<_> = jumped_it.collect();

        let drained = build();
        let mut drained_it = drained.iter().peekable();
        while drained_it.next_if(|&dt| dt < target).is_some() {}
        let drained_rest: Vec<_> = drained_it.collect();

        assert_eq!(jumped_rest, drained_rest);
        assert!(!drained_rest.is_empty());
    }

    #[test]
    fn until_terminates_iteration() {
        let start = datetime("1997-09-02T09:00:00");
        let until = datetime("1997-09-16T00:00:00");
        let rrule = RecurrenceRule::builder(Frequency::Daily, start)
            .until(until)
            .build()
            .unwrap();
        insta::assert_snapshot!(
            snapshot(rrule.iter()),
            @r"
        1997-09-02T09:00:00
        1997-09-03T09:00:00
        1997-09-04T09:00:00
        1997-09-05T09:00:00
        1997-09-06T09:00:00
        1997-09-07T09:00:00
        1997-09-08T09:00:00
        1997-09-09T09:00:00
        1997-09-10T09:00:00
        1997-09-11T09:00:00
        1997-09-12T09:00:00
        1997-09-13T09:00:00
        1997-09-14T09:00:00
        1997-09-15T09:00:00
        ",
        );
    }

    #[test]
    fn invalid_month_is_rejected() {
        let err = expect_err(
            RecurrenceRule::builder(
                Frequency::Yearly,
                datetime("1997-09-02T09:00:00"),
            )
            .by_month(13),
        );
        insta::assert_snapshot!(
            err,
            @"invalid 'by month' value `13` (values must be in range 1..=12)",
        );
    }
}
