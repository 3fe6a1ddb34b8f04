//! Upcoming/past partitioning of reminders.
//!
//! # Responsibility
//! - Bucket reminders relative to one caller-supplied `now`.
//! - Order each bucket for timeline display.
//!
//! # Invariants
//! - Past iff `scheduled_time` is strictly before `now`; an instant equal to
//!   `now` and an unscheduled reminder are upcoming.
//! - Upcoming is ascending by instant, unscheduled last, stable.
//! - Past is descending by instant, stable among equal instants.
//! - Every input reminder appears in exactly one bucket.

use crate::model::reminder::Reminder;
use crate::time::instant::Instant;
use std::cmp::Ordering;

/// Timeline bucket a reminder belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Upcoming,
    Past,
}

/// Returns the bucket for a reminder scheduled at `scheduled_time`.
pub fn bucket_of(scheduled_time: Option<Instant>, now: Instant) -> Bucket {
    match scheduled_time {
        Some(instant) if instant < now => Bucket::Past,
        _ => Bucket::Upcoming,
    }
}

/// Ordered reminder buckets for one classification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub upcoming: Vec<Reminder>,
    pub past: Vec<Reminder>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.upcoming.len() + self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.past.is_empty()
    }
}

/// Partitions `reminders` into upcoming and past relative to `now`.
///
/// Input order only matters for ties; the input is not modified.
pub fn classify(reminders: &[Reminder], now: Instant) -> Partition {
    let (mut upcoming, mut past): (Vec<Reminder>, Vec<Reminder>) = reminders
        .iter()
        .cloned()
        .partition(|reminder| bucket_of(reminder.scheduled_time, now) == Bucket::Upcoming);

    // `sort_by` is stable, which keeps ties in input order.
    upcoming.sort_by(|left, right| upcoming_order(left.scheduled_time, right.scheduled_time));
    past.sort_by(|left, right| right.scheduled_time.cmp(&left.scheduled_time));

    Partition { upcoming, past }
}

fn upcoming_order(left: Option<Instant>, right: Option<Instant>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::{bucket_of, classify, Bucket};
    use crate::model::reminder::{Reminder, ReminderStatus};
    use crate::time::instant::Instant;
    use chrono::Duration;

    fn now() -> Instant {
        Instant::parse("2025-03-01T12:00:00Z").unwrap()
    }

    fn at(offset_minutes: i64) -> Option<Instant> {
        now().checked_add(Duration::minutes(offset_minutes))
    }

    fn reminder(id: i64, scheduled_time: Option<Instant>) -> Reminder {
        Reminder {
            id,
            title: format!("reminder {id}"),
            description: None,
            scheduled_time,
            phone_to_call: "+15550000000".to_string(),
            status: ReminderStatus::Scheduled,
            created_at: Instant::parse("2025-01-01T00:00:00Z").unwrap(),
        }
    }

    fn ids(reminders: &[Reminder]) -> Vec<i64> {
        reminders.iter().map(|reminder| reminder.id).collect()
    }

    #[test]
    fn instant_equal_to_now_is_upcoming() {
        assert_eq!(bucket_of(at(0), now()), Bucket::Upcoming);
        assert_eq!(bucket_of(at(-1), now()), Bucket::Past);
        assert_eq!(bucket_of(at(1), now()), Bucket::Upcoming);
        assert_eq!(bucket_of(None, now()), Bucket::Upcoming);
    }

    #[test]
    fn splits_future_unscheduled_and_elapsed() {
        let reminders = vec![reminder(1, at(60)), reminder(2, None), reminder(3, at(-60))];
        let partition = classify(&reminders, now());
        assert_eq!(ids(&partition.upcoming), vec![1, 2]);
        assert_eq!(ids(&partition.past), vec![3]);
    }

    #[test]
    fn upcoming_ascends_with_unscheduled_last_in_input_order() {
        let reminders = vec![
            reminder(1, None),
            reminder(2, at(300)),
            reminder(3, None),
            reminder(4, at(10)),
            reminder(5, at(300)),
        ];
        let partition = classify(&reminders, now());
        assert_eq!(ids(&partition.upcoming), vec![4, 2, 5, 1, 3]);
        assert!(partition.past.is_empty());
    }

    #[test]
    fn past_descends_with_stable_ties() {
        let reminders = vec![
            reminder(1, at(-600)),
            reminder(2, at(-5)),
            reminder(3, at(-600)),
            reminder(4, at(-1)),
        ];
        let partition = classify(&reminders, now());
        assert_eq!(ids(&partition.past), vec![4, 2, 1, 3]);
    }

    #[test]
    fn reminder_at_exactly_now_stays_upcoming() {
        let reminders = vec![reminder(1, at(0)), reminder(2, at(-1))];
        let partition = classify(&reminders, now());
        assert_eq!(ids(&partition.upcoming), vec![1]);
        assert_eq!(ids(&partition.past), vec![2]);
    }

    #[test]
    fn empty_input_yields_empty_partition() {
        let partition = classify(&[], now());
        assert!(partition.is_empty());
        assert_eq!(partition.len(), 0);
    }
}
