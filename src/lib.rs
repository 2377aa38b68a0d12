/*!
An implementation of the RFC 5545 recurrence rule expansion pipeline.

Given a [`RecurrenceRule`] (built via [`RecurrenceRule::builder`]) and a
civil starting point, [`RecurrenceRule::iter`] produces the ordered,
deduplicated sequence of occurrences the rule describes, applying each of
the RFC 5545 BY-parts (BYMONTH, BYWEEKNO, BYYEARDAY, BYMONTHDAY, BYDAY,
BYHOUR, BYMINUTE, BYSECOND, BYSETPOS) as either an expander or a filter
depending on the rule's frequency.

This crate operates entirely on civil, zone-naive datetimes. Attaching a
time zone to the resulting sequence, merging several rules together
(RDATE/EXDATE/EXRULE), and parsing rule text are all left to a caller —
this crate exposes the builder an external parser is expected to drive.
*/

mod iter;
mod pipeline;
mod rule;
mod weekdate;

pub use crate::{
    iter::RecurrenceIter,
    rule::{
        ByWeekday, Frequency, IntoByWeekdayIter, IntoI8Iter, IntoI16Iter,
        IntoI32Iter, RecurrenceRule, RecurrenceRuleBuilder,
    },
};
