//! Daily scheduling grid: time rows x resource columns.
//!
//! [`DailyGrid::build`] shapes one day's snapshot into the column list and
//! one [`PackedRow`] per fixed time slot, delegating every row to
//! [`pack_slot`]. [`DailyGrid::activate`] routes a click on a cell to the
//! booking-creation or booking-edit flow.

use serde::Serialize;

use crate::availability::{AvailabilityIndex, AvailabilityMark};
use crate::booking::{bookings_at, Booking};
use crate::packer::{pack_slot, PackedRow, SlotCell, WidthPolicy};
use crate::resource::{derive_resources, ColumnOrder, Resource};
use crate::time_slot::TimeSlot;
use crate::types::{Day, DbId};

/// Layout options for building a grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridOptions {
    pub column_order: ColumnOrder,
    pub width_policy: WidthPolicy,
    /// Pad every row with `Empty` cells up to this many columns.
    pub min_columns: Option<usize>,
}

/// Immutable input for one day's repack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DaySnapshot {
    pub availability: Vec<AvailabilityMark>,
    /// Bookings of the day in ascending creation order.
    pub bookings: Vec<Booking>,
}

/// Result of activating a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GridAction {
    /// Open the booking form prefilled with this slot and resource.
    CreateBooking {
        day: Day,
        time_slot: TimeSlot,
        resource_id: DbId,
        /// Free columns left in the row, the upper bound for the party size.
        max_people: usize,
    },
    /// Open the edit form for this booking.
    EditBooking { booking_id: DbId },
}

/// One row of the grid with its capacity summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow<'a> {
    #[serde(flatten)]
    pub packed: PackedRow<'a>,
    pub free_columns: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyGrid<'a> {
    pub day: Day,
    pub columns: &'a [Resource],
    pub rows: Vec<GridRow<'a>>,
}

impl<'a> DailyGrid<'a> {
    /// Pack every time slot of `day`.
    ///
    /// `columns` must come from [`DailyGrid::columns_for`] on the same
    /// snapshot; it is borrowed so cells can point into it.
    pub fn build(
        day: Day,
        columns: &'a [Resource],
        snapshot: &'a DaySnapshot,
        options: GridOptions,
    ) -> Self {
        let index = AvailabilityIndex::for_day(&snapshot.availability, day);

        let rows = TimeSlot::ALL
            .into_iter()
            .map(|slot| {
                let at_slot: Vec<&Booking> = bookings_at(&snapshot.bookings, slot)
                    .into_iter()
                    .filter(|b| b.booking_date == day)
                    .collect();
                let mut packed = pack_slot(columns, &index, &at_slot, slot, options.width_policy);
                let free_columns = packed.free_columns();
                if let Some(min) = options.min_columns {
                    packed.pad_to(min);
                }
                GridRow {
                    packed,
                    free_columns,
                }
            })
            .collect();

        Self { day, columns, rows }
    }

    /// Column list for `day`: every resource with any mark that day.
    pub fn columns_for(day: Day, snapshot: &DaySnapshot, order: ColumnOrder) -> Vec<Resource> {
        let day_marks: Vec<AvailabilityMark> = snapshot
            .availability
            .iter()
            .filter(|m| m.day == day)
            .cloned()
            .collect();
        derive_resources(&day_marks, order)
    }

    pub fn row(&self, slot: TimeSlot) -> Option<&GridRow<'a>> {
        self.rows.iter().find(|r| r.packed.time_slot == slot)
    }

    /// Bookings that could not be placed, with their slot.
    pub fn overflow(&self) -> impl Iterator<Item = (TimeSlot, &'a Booking)> + '_ {
        self.rows.iter().flat_map(|r| {
            let slot = r.packed.time_slot;
            r.packed.overflow.iter().map(move |b| (slot, *b))
        })
    }

    /// Route a click on cell `column` of the `slot` row.
    ///
    /// Available cells start a booking, booking cells open the editor,
    /// everything else (including hidden continuations and padding) is inert.
    pub fn activate(&self, slot: TimeSlot, column: usize) -> Option<GridAction> {
        let row = self.row(slot)?;
        match row.packed.cells.get(column)? {
            SlotCell::Available { resource } => Some(GridAction::CreateBooking {
                day: self.day,
                time_slot: slot,
                resource_id: resource.id,
                max_people: row.free_columns,
            }),
            SlotCell::Booking { booking, .. } => Some(GridAction::EditBooking {
                booking_id: booking.id,
            }),
            SlotCell::Unavailable { .. } | SlotCell::Hidden { .. } | SlotCell::Empty => None,
        }
    }
}
