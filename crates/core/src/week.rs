//! Monday-based weeks and the weekly availability editor.
//!
//! The editor shows one resource's marks for the seven days of a week and
//! turns clicks into [`AvailabilityOp`]s. Ops are planned against the
//! current view so they can be applied optimistically before the store
//! confirms them.

use chrono::{Datelike, Duration};
use serde::Serialize;

use crate::availability::{AvailabilityKey, AvailabilityMark, AvailabilityOp};
use crate::resource::Resource;
use crate::time_slot::TimeSlot;
use crate::types::{Day, DbId};

pub const DAYS_PER_WEEK: usize = 7;

/// The Monday of the week containing `date`.
pub fn week_start(date: Day) -> Day {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// The seven days of the week containing `date`, Monday first.
pub fn week_days(date: Day) -> [Day; DAYS_PER_WEEK] {
    let monday = week_start(date);
    std::array::from_fn(|i| monday + Duration::days(i as i64))
}

/// Upper-case day header, e.g. `MON JAN 6`.
pub fn day_label(date: Day) -> String {
    date.format("%a %b %-d").to_string().to_uppercase()
}

/// Long label for the date navigator, e.g. `Monday, January 6th, 2025`.
pub fn long_day_label(date: Day) -> String {
    format!(
        "{}, {} {}{}, {}",
        date.format("%A"),
        date.format("%B"),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotToggle {
    pub time_slot: TimeSlot,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekDayAvailability {
    pub date: Day,
    pub label: String,
    pub slots: Vec<SlotToggle>,
    pub marked: usize,
}

/// One resource's availability for a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyAvailability {
    pub resource_id: DbId,
    pub week_start: Day,
    pub days: Vec<WeekDayAvailability>,
}

impl WeeklyAvailability {
    /// Build the editor view from a listing covering (at least) the week.
    pub fn build(resource_id: DbId, date: Day, marks: &[AvailabilityMark]) -> Self {
        let days = week_days(date)
            .into_iter()
            .map(|day| {
                let slots: Vec<SlotToggle> = TimeSlot::ALL
                    .into_iter()
                    .map(|time_slot| SlotToggle {
                        time_slot,
                        available: is_marked(marks, resource_id, day, time_slot),
                    })
                    .collect();
                let marked = slots.iter().filter(|s| s.available).count();
                WeekDayAvailability {
                    date: day,
                    label: day_label(day),
                    slots,
                    marked,
                }
            })
            .collect();

        Self {
            resource_id,
            week_start: week_start(date),
            days,
        }
    }
}

fn is_marked(marks: &[AvailabilityMark], resource_id: DbId, day: Day, slot: TimeSlot) -> bool {
    marks
        .iter()
        .any(|m| m.resource_id == resource_id && m.day == day && m.time_slot == slot)
}

/// Flip one (resource, day, slot): remove the mark if present, add it otherwise.
pub fn plan_slot_toggle(
    marks: &[AvailabilityMark],
    resource: &Resource,
    day: Day,
    time_slot: TimeSlot,
) -> AvailabilityOp {
    if is_marked(marks, resource.id, day, time_slot) {
        AvailabilityOp::Remove(AvailabilityKey {
            resource_id: resource.id,
            day,
            time_slot,
        })
    } else {
        AvailabilityOp::Add(AvailabilityMark {
            resource_id: resource.id,
            resource_name: resource.display_name.clone(),
            day,
            time_slot,
        })
    }
}

/// Flip a whole day. A partially marked day is filled up; a fully marked
/// day is cleared.
pub fn plan_day_toggle(
    marks: &[AvailabilityMark],
    resource: &Resource,
    day: Day,
) -> Vec<AvailabilityOp> {
    let (marked, missing): (Vec<TimeSlot>, Vec<TimeSlot>) = TimeSlot::ALL
        .into_iter()
        .partition(|slot| is_marked(marks, resource.id, day, *slot));

    if missing.is_empty() {
        marked
            .into_iter()
            .map(|time_slot| {
                AvailabilityOp::Remove(AvailabilityKey {
                    resource_id: resource.id,
                    day,
                    time_slot,
                })
            })
            .collect()
    } else {
        missing
            .into_iter()
            .map(|time_slot| {
                AvailabilityOp::Add(AvailabilityMark {
                    resource_id: resource.id,
                    resource_name: resource.display_name.clone(),
                    day,
                    time_slot,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Day {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pilot() -> Resource {
        Resource {
            id: Uuid::new_v4(),
            display_name: "Pilot".to_string(),
        }
    }

    fn mark(resource: &Resource, day: Day, slot: TimeSlot) -> AvailabilityMark {
        AvailabilityMark {
            resource_id: resource.id,
            resource_name: resource.display_name.clone(),
            day,
            time_slot: slot,
        }
    }

    #[test]
    fn week_starts_on_monday() {
        // 2025-01-08 is a Wednesday.
        assert_eq!(week_start(date(2025, 1, 8)), date(2025, 1, 6));
        assert_eq!(week_start(date(2025, 1, 6)), date(2025, 1, 6));
        // Sunday belongs to the week that started six days earlier.
        assert_eq!(week_start(date(2025, 1, 12)), date(2025, 1, 6));

        let days = week_days(date(2025, 1, 8));
        assert_eq!(days[0], date(2025, 1, 6));
        assert_eq!(days[6], date(2025, 1, 12));
    }

    #[test]
    fn labels_are_upper_case_without_padding() {
        assert_eq!(day_label(date(2025, 1, 6)), "MON JAN 6");
        assert_eq!(day_label(date(2025, 3, 21)), "FRI MAR 21");
        assert_eq!(long_day_label(date(2025, 1, 6)), "Monday, January 6th, 2025");
        assert_eq!(long_day_label(date(2025, 1, 1)), "Wednesday, January 1st, 2025");
        assert_eq!(long_day_label(date(2025, 1, 22)), "Wednesday, January 22nd, 2025");
        assert_eq!(long_day_label(date(2025, 1, 23)), "Thursday, January 23rd, 2025");
        assert_eq!(long_day_label(date(2025, 1, 12)), "Sunday, January 12th, 2025");
        assert_eq!(long_day_label(date(2025, 1, 31)), "Friday, January 31st, 2025");
    }

    #[test]
    fn weekly_view_reflects_marks_of_one_resource() {
        let (me, other) = (pilot(), pilot());
        let marks = vec![
            mark(&me, date(2025, 1, 7), TimeSlot::T0830),
            mark(&other, date(2025, 1, 7), TimeSlot::T0730),
            // Outside the week.
            mark(&me, date(2025, 1, 13), TimeSlot::T0830),
        ];

        let week = WeeklyAvailability::build(me.id, date(2025, 1, 9), &marks);
        assert_eq!(week.week_start, date(2025, 1, 6));
        assert_eq!(week.days.len(), DAYS_PER_WEEK);

        let tuesday = &week.days[1];
        assert_eq!(tuesday.label, "TUE JAN 7");
        assert_eq!(tuesday.marked, 1);
        assert!(tuesday.slots[1].available);
        assert!(!tuesday.slots[0].available);
        assert_eq!(week.days.iter().map(|d| d.marked).sum::<usize>(), 1);
    }

    #[test]
    fn slot_toggle_adds_then_removes() {
        let me = pilot();
        let day = date(2025, 1, 6);
        let mut marks = Vec::new();

        let add = plan_slot_toggle(&marks, &me, day, TimeSlot::T1100);
        assert_matches!(add, AvailabilityOp::Add(_));
        add.apply(&mut marks);

        let remove = plan_slot_toggle(&marks, &me, day, TimeSlot::T1100);
        assert_matches!(remove, AvailabilityOp::Remove(_));
        remove.apply(&mut marks);
        assert!(marks.is_empty());
    }

    #[test]
    fn day_toggle_fills_a_partial_day() {
        let me = pilot();
        let day = date(2025, 1, 6);
        let marks = vec![mark(&me, day, TimeSlot::T0730), mark(&me, day, TimeSlot::T1645)];

        let ops = plan_day_toggle(&marks, &me, day);
        assert_eq!(ops.len(), TimeSlot::COUNT - 2);
        assert!(ops.iter().all(|op| matches!(op, AvailabilityOp::Add(_))));
    }

    #[test]
    fn day_toggle_clears_a_full_day() {
        let me = pilot();
        let day = date(2025, 1, 6);
        let mut marks: Vec<_> = TimeSlot::ALL.into_iter().map(|s| mark(&me, day, s)).collect();

        let ops = plan_day_toggle(&marks, &me, day);
        assert_eq!(ops.len(), TimeSlot::COUNT);
        for op in &ops {
            op.apply(&mut marks);
        }
        assert!(marks.is_empty());
    }

    #[test]
    fn day_toggle_on_an_empty_day_marks_every_slot() {
        let me = pilot();
        let ops = plan_day_toggle(&[], &me, date(2025, 1, 6));
        assert_eq!(ops.len(), TimeSlot::COUNT);
    }
}
