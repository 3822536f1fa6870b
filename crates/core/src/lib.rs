//! Domain types and pure scheduling logic for the tandem booking grid.
//!
//! Nothing in this crate performs I/O. The daily grid is rebuilt from an
//! immutable [`grid::DaySnapshot`] on every read; [`packer::pack_slot`] is
//! the per-row placement step.

pub mod availability;
pub mod booking;
pub mod cache;
pub mod error;
pub mod grid;
pub mod packer;
pub mod resource;
pub mod tag;
pub mod time_slot;
pub mod types;
pub mod week;
