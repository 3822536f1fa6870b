//! Raw store rows and their validating mappers.
//!
//! Rows mirror what the queries return, with the time slot still a string
//! and joined fields optional. Each row type converts into its domain type
//! through `TryFrom`; [`map_rows`] applies the conversion to a whole result
//! set and skips rows that fail it.

pub mod availability;
pub mod booking;
pub mod resource;
pub mod tag;

use tandem_core::error::CoreError;

/// Convert every row, dropping (and logging) the ones that do not validate.
pub fn map_rows<R, T>(entity: &'static str, rows: Vec<R>) -> Vec<T>
where
    T: TryFrom<R, Error = CoreError>,
{
    rows.into_iter()
        .filter_map(|row| match T::try_from(row) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(entity, error = %e, "Skipping malformed row");
                None
            }
        })
        .collect()
}
