use std::{
    cmp::Ordering,
    ops::{Range, RangeInclusive},
    sync::Arc,
};

use jiff::{Span, civil::{DateTime, Weekday}};

/// The RFC 5545 recurrence rule.
///
/// This is the immutable, validated value that the expansion pipeline
/// (`RecurrenceIter`) consumes. It is built via [`RecurrenceRule::builder`]
/// rather than constructed directly; an external rule-text parser is
/// expected to drive the same builder this crate exposes.
#[derive(Clone, Debug)]
pub struct RecurrenceRule {
    pub(crate) inner: Arc<RecurrenceRuleInner>,
}

#[derive(Debug)]
pub(crate) struct RecurrenceRuleInner {
    pub(crate) freq: Frequency,
    pub(crate) start: DateTime,
    pub(crate) until: Option<DateTime>,
    pub(crate) count: Option<u32>,
    /// The per-tick span, already multiplied by the builder's raw
    /// interval value (e.g. `INTERVAL=3` at `FREQ=MONTHLY` is stored here
    /// as a 3-month span). `RecurrenceIter::increment` multiplies this by
    /// the attempt count rather than adding it repeatedly to an
    /// ever-growing datetime, so that Jiff's "constraining" behavior
    /// (Feb 29 + 1 year = Feb 28) can't permanently strand iteration away
    /// from dates like leap days.
    pub(crate) interval: Span,
    pub(crate) by_month: Box<[i8]>,
    // can be negative
    pub(crate) by_week: Box<[i8]>,
    // can be negative
    pub(crate) by_year_day: Box<[i16]>,
    // can be negative
    pub(crate) by_month_day: Box<[i8]>,
    pub(crate) by_week_day: Box<[ByWeekday]>,
    pub(crate) by_hour: Box<[i8]>,
    pub(crate) by_minute: Box<[i8]>,
    pub(crate) by_second: Box<[i8]>,
    // can be negative
    pub(crate) by_set_pos: Box<[i32]>,
    pub(crate) week_start: Weekday,
    pub(crate) empty_interval_limit: u32,
}

impl RecurrenceRule {
    /// Returns a builder for constructing a `RecurrenceRule`.
    ///
    /// The frequency and the starting point are the only two things
    /// required to build a rule.
    pub fn builder(freq: Frequency, start: DateTime) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder::new(freq, start)
    }

    /// Returns an iterator over all datetimes this rule describes.
    ///
    /// The iterator may be "infinite" in the sense that it keeps producing
    /// datetimes until `DateTime`'s own supported range is exhausted.
    /// Callers should therefore set `until`/`count` on the rule, or impose
    /// their own bound with `Iterator::take`.
    pub fn iter(&self) -> crate::iter::RecurrenceIter<'_> {
        crate::iter::RecurrenceIter::new(self)
    }

    pub(crate) fn inner(&self) -> &RecurrenceRuleInner {
        &self.inner
    }
}

impl<'r> IntoIterator for &'r RecurrenceRule {
    type IntoIter = crate::iter::RecurrenceIter<'r>;
    type Item = DateTime;

    fn into_iter(self) -> crate::iter::RecurrenceIter<'r> {
        self.iter()
    }
}

/// The outer periodicity of a recurrence rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Frequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
    Hourly,
    Minutely,
    Secondly,
}

impl Frequency {
    pub(crate) fn to_span(self, interval: i32) -> anyhow::Result<jiff::Span> {
        use jiff::ToSpan;

        let base = match self {
            Frequency::Yearly => 1.year(),
            Frequency::Monthly => 1.month(),
            Frequency::Weekly => 1.week(),
            Frequency::Daily => 1.day(),
            Frequency::Hourly => 1.hour(),
            Frequency::Minutely => 1.minute(),
            Frequency::Secondly => 1.second(),
        };
        Ok(base.checked_mul(i64::from(interval))?)
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Frequency::Yearly => "yearly",
            Frequency::Monthly => "monthly",
            Frequency::Weekly => "weekly",
            Frequency::Daily => "daily",
            Frequency::Hourly => "hourly",
            Frequency::Minutely => "minutely",
            Frequency::Secondly => "secondly",
        }
    }
}

/// A weekday as it appears in a BYDAY value list.
///
/// `Numbered` values are only legal at YEARLY (without BYWEEKNO) and
/// MONTHLY scope; `RecurrenceRuleBuilder::build` rejects a numbered weekday
/// anywhere else rather than silently downgrading it to `Any`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ByWeekday {
    Any(Weekday),
    Numbered { nth: i8, weekday: Weekday },
}

impl ByWeekday {
    pub(crate) fn weekday(&self) -> Weekday {
        match *self {
            ByWeekday::Any(wd) => wd,
            ByWeekday::Numbered { weekday, .. } => weekday,
        }
    }

    pub(crate) fn is_match(&self, wd: Weekday) -> bool {
        match *self {
            ByWeekday::Any(weekday) => weekday == wd,
            ByWeekday::Numbered { .. } => unreachable!(
                "numbered weekdays are never checked via `is_match`; they \
                 only ever appear in a scope where BYDAY is an expander",
            ),
        }
    }
}

impl Ord for ByWeekday {
    fn cmp(&self, rhs: &ByWeekday) -> Ordering {
        match (*self, *rhs) {
            (ByWeekday::Any(lhs), ByWeekday::Any(rhs)) => {
                lhs.to_monday_one_offset().cmp(&rhs.to_monday_one_offset())
            }
            (
                ByWeekday::Numbered { nth: lhs_nth, weekday: lhs_weekday },
                ByWeekday::Numbered { nth: rhs_nth, weekday: rhs_weekday },
            ) => {
                let lhs = (lhs_nth, lhs_weekday.to_monday_one_offset());
                let rhs = (rhs_nth, rhs_weekday.to_monday_one_offset());
                lhs.cmp(&rhs)
            }
            (ByWeekday::Any(_), ByWeekday::Numbered { .. }) => Ordering::Less,
            (ByWeekday::Numbered { .. }, ByWeekday::Any(_)) => {
                Ordering::Greater
            }
        }
    }
}

impl PartialOrd for ByWeekday {
    fn partial_cmp(&self, rhs: &ByWeekday) -> Option<Ordering> {
        Some(self.cmp(rhs))
    }
}

/// A builder for constructing a valid [`RecurrenceRule`].
#[derive(Clone, Debug)]
pub struct RecurrenceRuleBuilder {
    freq: Frequency,
    start: DateTime,
    until: Option<DateTime>,
    count: Option<u32>,
    interval: i32,
    by_month: Vec<i8>,
    by_week: Vec<i8>,
    by_year_day: Vec<i16>,
    by_month_day: Vec<i8>,
    by_week_day: Vec<ByWeekday>,
    by_hour: Vec<i8>,
    by_minute: Vec<i8>,
    by_second: Vec<i8>,
    by_set_pos: Vec<i32>,
    week_start: Weekday,
    empty_interval_limit: u32,
}

impl RecurrenceRuleBuilder {
    fn new(freq: Frequency, start: DateTime) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder {
            freq,
            start,
            until: None,
            count: None,
            interval: 1,
            by_month: vec![],
            by_week: vec![],
            by_year_day: vec![],
            by_month_day: vec![],
            by_week_day: vec![],
            by_hour: vec![],
            by_minute: vec![],
            by_second: vec![],
            by_set_pos: vec![],
            week_start: Weekday::Monday,
            empty_interval_limit: 1_000,
        }
    }

    /// Validates and builds the rule.
    ///
    /// # Errors
    ///
    /// Returns an error (the `InvalidSeed`/`RuleUnsatisfiable` failure
    /// kinds, both surfaced as plain `anyhow::Error`) when any BY-part
    /// value is out of its RFC 5545 range, when a BY-part is used at a
    /// frequency that can never host it, when BYSETPOS is given without
    /// another BY-part, or when both `until` and `count` are set.
    pub fn build(&self) -> anyhow::Result<RecurrenceRule> {
        fn sort_and_dedup<T: Clone + Ord>(slice: &[T]) -> Box<[T]> {
            let mut vec = slice.to_vec();
            vec.sort();
            vec.dedup();
            vec.into_boxed_slice()
        }

        anyhow::ensure!(
            self.interval >= 1,
            "interval value of `{}` is invalid \
             (interval must be greater than or equal to 1)",
            self.interval,
        );
        anyhow::ensure!(
            self.until.is_none() || self.count.is_none(),
            "a recurrence rule cannot set both 'until' and 'count'",
        );
        if let Some(until) = self.until {
            anyhow::ensure!(
                until >= self.start,
                "'until' value of `{until}` is before the rule's starting \
                 point of `{start}`",
                start = self.start,
            );
        }
        if let Some(count) = self.count {
            anyhow::ensure!(
                count >= 1,
                "'count' value of `{count}` is invalid \
                 (count must be greater than or equal to 1)",
            );
        }
        for &v in self.by_month.iter() {
            anyhow::ensure!(
                1 <= v && v <= 12,
                "invalid 'by month' value `{v}` \
                 (values must be in range 1..=12)",
            );
        }
        for &v in self.by_week.iter() {
            anyhow::ensure!(
                (-53 <= v && v <= -1) || (1 <= v && v <= 53),
                "invalid 'by week' value `{v}` \
                 (values must be in range 1..=53 or -53..=-1)",
            );
        }
        for &v in self.by_year_day.iter() {
            anyhow::ensure!(
                (-366 <= v && v <= -1) || (1 <= v && v <= 366),
                "invalid 'by day of the year' value `{v}` \
                 (values must be in range 1..=366 or -366..=-1)",
            );
        }
        for &v in self.by_month_day.iter() {
            anyhow::ensure!(
                (-31 <= v && v <= -1) || (1 <= v && v <= 31),
                "invalid 'by day of the month' value `{v}` \
                 (values must be in range 1..=31 or -31..=-1)",
            );
        }
        for &v in self.by_week_day.iter() {
            let nth = match v {
                ByWeekday::Any(_) => continue,
                ByWeekday::Numbered { nth, .. } => nth,
            };
            anyhow::ensure!(
                nth != 0,
                "numbered weekday `{nth}` must be nonzero",
            );
            // Numbered weekdays are only allowed for YEARLY or MONTHLY
            // scope. Unlike a plain out-of-range value, an illegally
            // placed numbered weekday is rejected outright rather than
            // downgraded to a plain weekday, so a caller's mistake is
            // never silently reinterpreted.
            anyhow::ensure!(
                matches!(self.freq, Frequency::Yearly | Frequency::Monthly),
                "numbered weekday with `nth = {nth}` is only allowed at \
                 yearly or monthly frequencies",
            );
            anyhow::ensure!(
                !matches!(self.freq, Frequency::Yearly)
                    || self.by_week.is_empty(),
                "numbered weekday with `nth = {nth}` is only allowed at \
                 yearly frequency when 'by week' is not used",
            );
            if matches!(self.freq, Frequency::Yearly)
                && self.by_month.is_empty()
            {
                anyhow::ensure!(
                    (-53 <= nth && nth <= -1) || (1 <= nth && nth <= 53),
                    "invalid numbered 'by week day' value with \
                     `nth = {nth}` (values must be in range 1..=53 or \
                     -53..=-1)",
                );
            } else {
                anyhow::ensure!(
                    (-5 <= nth && nth <= -1) || (1 <= nth && nth <= 5),
                    "invalid numbered 'by week day' value with \
                     `nth = {nth}` (values must be in range 1..=5 or \
                     -5..=-1)",
                );
            }
        }
        for &v in self.by_hour.iter() {
            anyhow::ensure!(
                0 <= v && v <= 23,
                "invalid 'by hour' value `{v}` \
                 (values must be in range 0..=23)",
            );
        }
        for &v in self.by_minute.iter() {
            anyhow::ensure!(
                0 <= v && v <= 59,
                "invalid 'by minute' value `{v}` \
                 (values must be in range 0..=59)",
            );
        }
        for &v in self.by_second.iter() {
            // RFC 5545 technically permits a value of `60` here for leap
            // seconds. Jiff doesn't model leap seconds outside of parsing,
            // and clamping it would silently change the rule, so this is
            // rejected just like `python-dateutil` rejects it.
            anyhow::ensure!(
                0 <= v && v <= 59,
                "invalid 'by second' value `{v}` \
                 (values must be in range 0..=59)",
            );
        }
        for &v in self.by_set_pos.iter() {
            anyhow::ensure!(
                (-366 <= v && v <= -1) || (1 <= v && v <= 366),
                "invalid 'by set position' value `{v}` \
                 (values must be in range 1..=366 or -366..=-1)",
            );
        }

        // Frequency-specific legality of each BY-part, per the expander
        // versus filter classification table. A part that can never be a
        // filter target for its scope (e.g. BYWEEKNO below MONTHLY) is
        // rejected outright rather than silently ignored.
        if !self.by_week.is_empty() {
            anyhow::ensure!(
                matches!(self.freq, Frequency::Yearly | Frequency::Monthly),
                "'by week' is only allowed at yearly or monthly frequency \
                 (monthly is an RFC 2445 tolerance extension)",
            );
        }
        if !self.by_year_day.is_empty() {
            anyhow::ensure!(
                !matches!(
                    self.freq,
                    Frequency::Monthly | Frequency::Weekly | Frequency::Daily
                ),
                "'by day of the year' cannot be used \
                 with monthly, weekly or daily frequency",
            );
        }
        if !self.by_month_day.is_empty() {
            anyhow::ensure!(
                !matches!(self.freq, Frequency::Weekly),
                "'by day of the month' cannot be used with weekly frequency",
            );
        }
        if !self.by_set_pos.is_empty() {
            anyhow::ensure!(
                !self.by_month.is_empty()
                    || !self.by_week.is_empty()
                    || !self.by_year_day.is_empty()
                    || !self.by_month_day.is_empty()
                    || !self.by_week_day.is_empty()
                    || !self.by_hour.is_empty()
                    || !self.by_minute.is_empty()
                    || !self.by_second.is_empty(),
                "when 'by set position' is used, at least one other \
                 'by' rule must be specified, but all are empty",
            );
        }

        let interval =
            self.freq.to_span(self.interval).map_err(|err| {
                anyhow::anyhow!(
                    "could not convert {freq} interval of `{interval}` to \
                     a time span: {err}",
                    freq = self.freq.as_str(),
                    interval = self.interval,
                )
            })?;
        // `to_span` is re-validated below via `checked_mul` during
        // iteration, but an interval of zero length would spin forever, so
        // reject it here too.
        anyhow::ensure!(
            !interval.is_zero(),
            "interval span evaluated to zero, which would never advance",
        );
        let inner = Arc::new(RecurrenceRuleInner {
            freq: self.freq,
            start: self.start,
            until: self.until,
            count: self.count,
            interval,
            by_month: sort_and_dedup(&self.by_month),
            by_week: sort_and_dedup(&self.by_week),
            by_year_day: sort_and_dedup(&self.by_year_day),
            by_month_day: sort_and_dedup(&self.by_month_day),
            by_week_day: sort_and_dedup(&self.by_week_day),
            by_hour: sort_and_dedup(&self.by_hour),
            by_minute: sort_and_dedup(&self.by_minute),
            by_second: sort_and_dedup(&self.by_second),
            by_set_pos: sort_and_dedup(&self.by_set_pos),
            week_start: self.week_start,
            empty_interval_limit: self.empty_interval_limit,
        });
        Ok(RecurrenceRule { inner })
    }

    pub fn until(&mut self, until: DateTime) -> &mut RecurrenceRuleBuilder {
        self.until = Some(until);
        self
    }

    pub fn count(&mut self, count: u32) -> &mut RecurrenceRuleBuilder {
        self.count = Some(count);
        self
    }

    pub fn interval(&mut self, increment: i32) -> &mut RecurrenceRuleBuilder {
        self.interval = increment;
        self
    }

    pub fn by_month<I: IntoI8Iter>(
        &mut self,
        months: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_month.extend(months.into_i8_iter());
        self
    }

    pub fn by_week<I: IntoI8Iter>(
        &mut self,
        weeks: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_week.extend(weeks.into_i8_iter());
        self
    }

    pub fn by_year_day<I: IntoI16Iter>(
        &mut self,
        days: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_year_day.extend(days.into_i16_iter());
        self
    }

    pub fn by_month_day<I: IntoI8Iter>(
        &mut self,
        days: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_month_day.extend(days.into_i8_iter());
        self
    }

    pub fn by_week_day<I: IntoByWeekdayIter>(
        &mut self,
        week_days: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_week_day.extend(week_days.into_by_weekday_iter());
        self
    }

    pub fn by_hour<I: IntoI8Iter>(
        &mut self,
        hours: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_hour.extend(hours.into_i8_iter());
        self
    }

    pub fn by_minute<I: IntoI8Iter>(
        &mut self,
        minutes: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_minute.extend(minutes.into_i8_iter());
        self
    }

    pub fn by_second<I: IntoI8Iter>(
        &mut self,
        seconds: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_second.extend(seconds.into_i8_iter());
        self
    }

    pub fn by_set_position<I: IntoI32Iter>(
        &mut self,
        positions: I,
    ) -> &mut RecurrenceRuleBuilder {
        self.by_set_pos.extend(positions.into_i32_iter());
        self
    }

    pub fn week_start(
        &mut self,
        weekday: Weekday,
    ) -> &mut RecurrenceRuleBuilder {
        self.week_start = weekday;
        self
    }

    /// Overrides the number of consecutive empty interval sets the
    /// iterator tolerates before transitioning to the `Drained` state.
    ///
    /// This exists so tests can probe the drain boundary without actually
    /// iterating a thousand empty intervals.
    pub fn empty_interval_limit(
        &mut self,
        limit: u32,
    ) -> &mut RecurrenceRuleBuilder {
        self.empty_interval_limit = limit;
        self
    }
}

/// A trait that permits flexibly specifying a sequence of `i8` integers.
///
/// This trait is used by the `RecurrenceRuleBuilder::by_*` methods. It
/// permits callers to provide integers in a number of flexible ways:
///
/// * A single integer: `5`
/// * An array of integers: `[1, 3, 5]`.
/// * A single range of integers: `5..8` or `5..=8`.
/// * An array of ranges of integers: `[5..=10, 15..=20]`.
pub trait IntoI8Iter {
    fn into_i8_iter(self) -> impl Iterator<Item = i8>;
}

pub trait IntoI16Iter {
    fn into_i16_iter(self) -> impl Iterator<Item = i16>;
}

pub trait IntoI32Iter {
    fn into_i32_iter(self) -> impl Iterator<Item = i32>;
}

impl IntoI8Iter for i8 {
    fn into_i8_iter(self) -> impl Iterator<Item = i8> {
        std::iter::once(self)
    }
}

impl IntoI16Iter for i16 {
    fn into_i16_iter(self) -> impl Iterator<Item = i16> {
        std::iter::once(self)
    }
}

impl IntoI32Iter for i32 {
    fn into_i32_iter(self) -> impl Iterator<Item = i32> {
        std::iter::once(self)
    }
}

impl IntoI8Iter for Range<i8> {
    fn into_i8_iter(self) -> impl Iterator<Item = i8> {
        self.into_iter()
    }
}

impl IntoI16Iter for Range<i16> {
    fn into_i16_iter(self) -> impl Iterator<Item = i16> {
        self.into_iter()
    }
}

impl IntoI32Iter for Range<i32> {
    fn into_i32_iter(self) -> impl Iterator<Item = i32> {
        self.into_iter()
    }
}

impl IntoI8Iter for RangeInclusive<i8> {
    fn into_i8_iter(self) -> impl Iterator<Item = i8> {
        self.into_iter()
    }
}

impl IntoI16Iter for RangeInclusive<i16> {
    fn into_i16_iter(self) -> impl Iterator<Item = i16> {
        self.into_iter()
    }
}

impl IntoI32Iter for RangeInclusive<i32> {
    fn into_i32_iter(self) -> impl Iterator<Item = i32> {
        self.into_iter()
    }
}

impl<const N: usize> IntoI8Iter for [i8; N] {
    fn into_i8_iter(self) -> impl Iterator<Item = i8> {
        self.into_iter()
    }
}

impl<const N: usize> IntoI16Iter for [i16; N] {
    fn into_i16_iter(self) -> impl Iterator<Item = i16> {
        self.into_iter()
    }
}

impl<const N: usize> IntoI32Iter for [i32; N] {
    fn into_i32_iter(self) -> impl Iterator<Item = i32> {
        self.into_iter()
    }
}

impl<const N: usize> IntoI8Iter for [Range<i8>; N] {
    fn into_i8_iter(self) -> impl Iterator<Item = i8> {
        self.into_iter().flatten()
    }
}

impl<const N: usize> IntoI16Iter for [Range<i16>; N] {
    fn into_i16_iter(self) -> impl Iterator<Item = i16> {
        self.into_iter().flatten()
    }
}

impl<const N: usize> IntoI32Iter for [Range<i32>; N] {
    fn into_i32_iter(self) -> impl Iterator<Item = i32> {
        self.into_iter().flatten()
    }
}

impl<const N: usize> IntoI8Iter for [RangeInclusive<i8>; N] {
    fn into_i8_iter(self) -> impl Iterator<Item = i8> {
        self.into_iter().flatten()
    }
}

impl<const N: usize> IntoI16Iter for [RangeInclusive<i16>; N] {
    fn into_i16_iter(self) -> impl Iterator<Item = i16> {
        self.into_iter().flatten()
    }
}

impl<const N: usize> IntoI32Iter for [RangeInclusive<i32>; N] {
    fn into_i32_iter(self) -> impl Iterator<Item = i32> {
        self.into_iter().flatten()
    }
}

/// A trait that permits flexibly specifying a sequence of BYDAY weekdays.
///
/// * Directly via `ByWeekday::Numbered { nth: 3, weekday: Weekday::Monday }`.
/// * As just any weekday via `Weekday::Monday`.
/// * As a range of weekdays via `Weekday::Monday..=Weekday::Wednesday`.
/// * As an array of weekdays via `[Weekday::Monday, Weekday::Friday]`.
/// * As an array of numbered weekdays via
///   `[(2, Weekday::Monday), (1, Weekday::Friday)]`.
pub trait IntoByWeekdayIter {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday>;
}

impl IntoByWeekdayIter for ByWeekday {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        std::iter::once(self)
    }
}

impl IntoByWeekdayIter for Weekday {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        std::iter::once(ByWeekday::Any(self))
    }
}

impl IntoByWeekdayIter for (i8, Weekday) {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        let (nth, weekday) = self;
        std::iter::once(ByWeekday::Numbered { nth, weekday })
    }
}

impl IntoByWeekdayIter for RangeInclusive<Weekday> {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        let (start, end) = (*self.start(), *self.end());
        // OK because `Weekday::until` guarantees `0..=6`, plus `1` because
        // this is an inclusive range.
        let count = 1 + usize::try_from(start.until(end)).unwrap();
        start.cycle_forward().take(count).map(ByWeekday::Any)
    }
}

impl<const N: usize> IntoByWeekdayIter for [ByWeekday; N] {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        self.into_iter()
    }
}

impl<const N: usize> IntoByWeekdayIter for [Weekday; N] {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        self.into_iter().flat_map(|any| any.into_by_weekday_iter())
    }
}

impl<const N: usize> IntoByWeekdayIter for [(i8, Weekday); N] {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        self.into_iter().flat_map(|numbered| numbered.into_by_weekday_iter())
    }
}

impl<const N: usize> IntoByWeekdayIter for [RangeInclusive<Weekday>; N] {
    fn into_by_weekday_iter(self) -> impl Iterator<Item = ByWeekday> {
        self.into_iter().flat_map(|any| any.into_by_weekday_iter())
    }
}
