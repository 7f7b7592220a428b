//! Conversions between ID-keyed persisted tables and dense in-memory lists

use crate::error::FormatError;
use std::collections::BTreeMap;

/// Convert an ID-keyed record table into a dense list. IDs must run from zero.
pub fn dense_from_records<R, T>(
    records: &BTreeMap<usize, R>,
    what: &str,
) -> Result<Vec<T>, FormatError>
where
    for<'a> T: From<&'a R>,
{
    records
        .iter()
        .enumerate()
        .map(|(expected, (&id, record))| {
            if id == expected {
                Ok(T::from(record))
            } else {
                Err(FormatError::MissingKey(format!("{} {}", what, expected)))
            }
        })
        .collect()
}

/// Convert a dense list into an ID-keyed record table
pub fn dense_to_records<T, R>(items: &[T]) -> BTreeMap<usize, R>
where
    for<'a> R: From<&'a T>,
{
    items.iter().map(R::from).enumerate().collect()
}
