//! Model to entity mappers
//!
//! Rows convert with `TryFrom` where a column holds an enum the domain must
//! recognise; an unrecognised value surfaces as a database error.

mod event;
mod guest_token;
mod media_file;
mod message;

pub use media_file::StageColumns;

use guestbook_core::error::DomainError;

/// Convert a batch of rows, failing on the first corrupt one
pub fn map_rows<M, E>(rows: Vec<M>) -> Result<Vec<E>, DomainError>
where
    E: TryFrom<M, Error = DomainError>,
{
    rows.into_iter().map(E::try_from).collect()
}
