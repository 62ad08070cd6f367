//! Strip runs in the index width expected by an encoder

use crate::error::{Error, Result};
use crate::stripify::Strip;

/// Strips flattened into one index buffer, `lengths[i]` indices per strip.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StripRuns<T> {
    pub lengths: Vec<u32>,
    pub runs: Vec<T>,
}

impl<T> StripRuns<T> {
    /// Iterates over the index run of each strip.
    pub fn iter(&self) -> impl Iterator<Item = &[T]> + '_ {
        let mut offset = 0;

        self.lengths.iter().map(move |length| {
            let run = &self.runs[offset..offset + *length as usize];
            offset += *length as usize;
            run
        })
    }
}

/// Converts strips to `(length, run)` pairs with indices of type `T`, e.g. `u16` for 16-bit index buffers.
///
/// # Example
///
/// ```
/// use tristrip_rs::runs::strip_runs;
/// use tristrip_rs::stripify::Strip;
///
/// let strips = [Strip { indices: vec![0, 1, 2, 3], faces: vec![0, 1] }];
/// let runs = strip_runs::<u16>(&strips).unwrap();
///
/// assert_eq!(runs.lengths, [4]);
/// assert_eq!(runs.runs, [0u16, 1, 2, 3]);
/// ```
pub fn strip_runs<T>(strips: &[Strip]) -> Result<StripRuns<T>>
where
    T: TryFrom<u32>,
{
    let mut result = StripRuns {
        lengths: Vec::with_capacity(strips.len()),
        runs: Vec::with_capacity(strips.iter().map(Strip::len).sum()),
    };

    for strip in strips {
        result.lengths.push(strip.len() as u32);

        for index in &strip.indices {
            let value = T::try_from(*index).map_err(|_| Error::IndexOutOfRange {
                index: *index,
                width: std::mem::size_of::<T>() * 8,
            })?;

            result.runs.push(value);
        }
    }

    Ok(result)
}
