//! Slot packing: place variable-width bookings onto resource columns.
//!
//! For one (day, time slot) row, every resource column becomes a cell.
//! Available columns are pulled to the left (stable partition), then each
//! booking, in creation order, claims the first contiguous run of
//! `number_of_people` still-available cells. A booking that finds no run is
//! left out of the row; it is never partially placed.
//!
//! Packing is a pure function of its inputs. It holds no state between
//! calls, so repacking the same snapshot always yields the same row.

use std::str::FromStr;

use serde::Serialize;

use crate::availability::AvailabilityIndex;
use crate::booking::Booking;
use crate::error::CoreError;
use crate::resource::Resource;
use crate::time_slot::TimeSlot;
use crate::types::DbId;

/// How a booking's party size maps to the number of columns it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidthPolicy {
    /// Use `number_of_people` unchanged.
    #[default]
    Raw,
    /// Cap the width at the given maximum (and at the row's column count).
    ClampTo(usize),
}

impl WidthPolicy {
    /// Columns a booking of `number_of_people` occupies in a row of
    /// `column_count` columns, or `None` if it can never be placed.
    pub fn span(self, number_of_people: i32, column_count: usize) -> Option<usize> {
        let raw = usize::try_from(number_of_people).ok().filter(|w| *w > 0)?;
        let width = match self {
            WidthPolicy::Raw => raw,
            WidthPolicy::ClampTo(max) => raw.min(max).min(column_count),
        };
        (width > 0).then_some(width)
    }
}

impl FromStr for WidthPolicy {
    type Err = CoreError;

    /// Parse a maximum width; an empty string means no clamping.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(WidthPolicy::Raw);
        }
        trimmed
            .parse::<usize>()
            .ok()
            .filter(|max| *max > 0)
            .map(WidthPolicy::ClampTo)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid maximum booking width '{s}'. Must be a positive integer"
                ))
            })
    }
}

/// One rendered cell of a time row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotCell<'a> {
    /// Resource free and unbooked; activating it starts a booking.
    Available { resource: &'a Resource },
    /// Resource not marked available at this slot.
    Unavailable { resource: &'a Resource },
    /// Leftmost column of a booking's span.
    Booking {
        resource: &'a Resource,
        booking: &'a Booking,
        width: usize,
    },
    /// A column consumed by a booking beyond its leftmost column.
    Hidden { resource: &'a Resource },
    /// Padding in fixed-width grids.
    Empty,
}

impl<'a> SlotCell<'a> {
    pub fn is_available(&self) -> bool {
        matches!(self, SlotCell::Available { .. })
    }

    pub fn resource(&self) -> Option<&'a Resource> {
        match *self {
            SlotCell::Available { resource }
            | SlotCell::Unavailable { resource }
            | SlotCell::Booking { resource, .. }
            | SlotCell::Hidden { resource } => Some(resource),
            SlotCell::Empty => None,
        }
    }
}

/// The packed cells of one time row plus the bookings that did not fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackedRow<'a> {
    pub time_slot: TimeSlot,
    pub cells: Vec<SlotCell<'a>>,
    /// Bookings left out of this row because no contiguous run was free.
    pub overflow: Vec<&'a Booking>,
}

impl<'a> PackedRow<'a> {
    /// Number of cells still open for new bookings.
    pub fn free_columns(&self) -> usize {
        self.cells.iter().filter(|c| c.is_available()).count()
    }

    /// Column range `[start, end)` occupied by a placed booking.
    pub fn span_of(&self, booking_id: DbId) -> Option<(usize, usize)> {
        self.cells.iter().enumerate().find_map(|(i, cell)| match cell {
            SlotCell::Booking { booking, width, .. } if booking.id == booking_id => {
                Some((i, i + width))
            }
            _ => None,
        })
    }

    /// Append `Empty` cells until the row has at least `columns` cells.
    pub fn pad_to(&mut self, columns: usize) {
        if self.cells.len() < columns {
            self.cells.resize(columns, SlotCell::Empty);
        }
    }
}

/// Pack one time row.
///
/// `resources` is the day's full column list (every resource with any
/// mark that day). `bookings` are the bookings of this exact (day, slot);
/// they are packed by ascending `created_at`, ties in the given order.
pub fn pack_slot<'a>(
    resources: &'a [Resource],
    availability: &AvailabilityIndex,
    bookings: &[&'a Booking],
    time_slot: TimeSlot,
    policy: WidthPolicy,
) -> PackedRow<'a> {
    let (mut cells, unavailable): (Vec<_>, Vec<_>) = resources
        .iter()
        .map(|resource| {
            if availability.is_available(resource.id, time_slot) {
                SlotCell::Available { resource }
            } else {
                SlotCell::Unavailable { resource }
            }
        })
        .partition(SlotCell::is_available);
    cells.extend(unavailable);

    let mut ordered = bookings.to_vec();
    ordered.sort_by_key(|b| b.created_at);

    let mut overflow = Vec::new();
    for booking in ordered {
        let placement = policy
            .span(booking.number_of_people, cells.len())
            .and_then(|width| first_fit(&cells, width).map(|start| (start, width)));

        match placement {
            Some((start, width)) => place(&mut cells, booking, start, width),
            None => overflow.push(booking),
        }
    }

    PackedRow {
        time_slot,
        cells,
        overflow,
    }
}

/// Earliest start index of `width` consecutive available cells.
fn first_fit(cells: &[SlotCell<'_>], width: usize) -> Option<usize> {
    if width > cells.len() {
        return None;
    }
    cells
        .windows(width)
        .position(|run| run.iter().all(SlotCell::is_available))
}

fn place<'a>(cells: &mut [SlotCell<'a>], booking: &'a Booking, start: usize, width: usize) {
    for (offset, cell) in cells[start..start + width].iter_mut().enumerate() {
        if let SlotCell::Available { resource } = *cell {
            *cell = if offset == 0 {
                SlotCell::Booking {
                    resource,
                    booking,
                    width,
                }
            } else {
                SlotCell::Hidden { resource }
            };
        }
    }
}
