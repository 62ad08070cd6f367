//! Stable index radix sort with temporal coherence
//!
//! [RadixSorter] never moves the keys, it computes a permutation (`ranks`) that visits them in ascending order.
//! Every sort starts from the previous permutation, which gives two properties for free:
//!
//! * sorting input that is already in order according to the current ranks returns immediately;
//! * chaining sorts on several key arrays of the same length performs a stable multi-key sort where the
//!   *last* key is the most significant one.

use std::collections::TryReserveError;
use std::mem::size_of;

const PASSES: usize = 4;
const BUCKETS: usize = 256;

/// Reusable radix sorter over 32-bit keys.
///
/// # Example
///
/// ```
/// use tristrip_rs::radix::RadixSorter;
///
/// let minor = [1, 0, 1, 0];
/// let major = [0, 0, 1, 1];
///
/// let mut sorter = RadixSorter::new();
/// let ranks = sorter.sort(&minor, false).sort(&major, false).ranks();
///
/// assert_eq!(ranks, &[1, 0, 3, 2]);
/// ```
#[derive(Clone)]
pub struct RadixSorter {
    histogram: [[u32; BUCKETS]; PASSES],
    offsets: [u32; BUCKETS],
    ranks: Vec<u32>,
    ranks2: Vec<u32>,
}

impl Default for RadixSorter {
    fn default() -> Self {
        Self::new()
    }
}

impl RadixSorter {
    pub fn new() -> Self {
        Self {
            histogram: [[0; BUCKETS]; PASSES],
            offsets: [0; BUCKETS],
            ranks: Vec::new(),
            ranks2: Vec::new(),
        }
    }

    /// Returns the current permutation: `keys[ranks[0]] <= keys[ranks[1]] <= ...` for the last sorted keys.
    pub fn ranks(&self) -> &[u32] {
        &self.ranks
    }

    /// Restores the identity permutation, dropping any temporal coherence.
    pub fn reset_ranks(&mut self) -> &mut Self {
        for (i, r) in self.ranks.iter_mut().enumerate() {
            *r = i as u32;
        }
        self
    }

    /// Returns the number of bytes of scratch memory held by the sorter.
    pub fn used_ram(&self) -> usize {
        size_of::<[[u32; BUCKETS]; PASSES]>()
            + size_of::<[u32; BUCKETS]>()
            + (self.ranks.capacity() + self.ranks2.capacity()) * size_of::<u32>()
    }

    /// Reserves rank storage for `count` keys, reporting allocation failure instead of aborting.
    ///
    /// Sorting `count` keys afterwards doesn't allocate.
    pub fn try_reserve(&mut self, count: usize) -> Result<&mut Self, TryReserveError> {
        self.ranks.try_reserve_exact(count.saturating_sub(self.ranks.len()))?;
        self.ranks2.try_reserve_exact(count.saturating_sub(self.ranks2.len()))?;

        Ok(self)
    }

    fn prepare(&mut self, count: usize) {
        assert!(count <= u32::MAX as usize);

        // ranks of a different length can't be reused as a starting order
        if self.ranks.len() != count {
            self.ranks.resize(count, 0);
            self.ranks2.resize(count, 0);
            self.reset_ranks();
        }

        self.histogram = [[0; BUCKETS]; PASSES];
    }

    /// Sorts integer keys, treating them as two's complement `i32` when `signed` is set.
    pub fn sort(&mut self, keys: &[u32], signed: bool) -> &mut Self {
        self.prepare(keys.len());

        if keys.is_empty() {
            return self;
        }

        // build all four histograms in one run, checking the current order along the way
        let mut sorted = true;
        let mut previous = keys[self.ranks[0] as usize];

        for (key, rank) in keys.iter().zip(&self.ranks) {
            let value = keys[*rank as usize];

            let in_order = if signed {
                value as i32 >= previous as i32
            } else {
                value >= previous
            };
            sorted &= in_order;
            previous = value;

            for (pass, byte) in key.to_le_bytes().into_iter().enumerate() {
                self.histogram[pass][byte as usize] += 1;
            }
        }

        if sorted {
            return self;
        }

        // values with the sign bit set land in buckets 128..256 of the last histogram
        let negative_count: u32 = if signed {
            self.histogram[PASSES - 1][128..].iter().sum()
        } else {
            0
        };

        for pass in 0..PASSES {
            let counts = &self.histogram[pass];

            if !pass_required(counts, keys.len()) {
                continue;
            }

            if pass == PASSES - 1 && signed {
                // negative numbers are in the right order but at the wrong place, bias the offsets
                self.offsets[0] = negative_count;
                for i in 1..128 {
                    self.offsets[i] = self.offsets[i - 1] + counts[i - 1];
                }

                self.offsets[128] = 0;
                for i in 129..BUCKETS {
                    self.offsets[i] = self.offsets[i - 1] + counts[i - 1];
                }
            } else {
                prefix_offsets(&mut self.offsets, counts);
            }

            let shift = pass * 8;

            for rank in &self.ranks {
                let bucket = ((keys[*rank as usize] >> shift) & 0xff) as usize;

                let slot = &mut self.offsets[bucket];
                self.ranks2[*slot as usize] = *rank;
                *slot += 1;
            }

            std::mem::swap(&mut self.ranks, &mut self.ranks2);
        }

        self
    }

    /// Sorts IEEE-754 keys in ascending numeric order.
    ///
    /// Equal negative keys come out in reverse relative order, since negative values are scattered backwards
    /// in the last pass.
    pub fn sort_f32(&mut self, keys: &[f32]) -> &mut Self {
        self.prepare(keys.len());

        if keys.is_empty() {
            return self;
        }

        let mut sorted = true;
        let mut previous = keys[self.ranks[0] as usize];

        for (key, rank) in keys.iter().zip(&self.ranks) {
            let value = keys[*rank as usize];

            sorted &= !(value < previous);
            previous = value;

            for (pass, byte) in key.to_bits().to_le_bytes().into_iter().enumerate() {
                self.histogram[pass][byte as usize] += 1;
            }
        }

        if sorted {
            return self;
        }

        let negative_count: u32 = self.histogram[PASSES - 1][128..].iter().sum();

        for pass in 0..PASSES {
            let counts = &self.histogram[pass];

            if pass < PASSES - 1 {
                if !pass_required(counts, keys.len()) {
                    continue;
                }

                prefix_offsets(&mut self.offsets, counts);

                let shift = pass * 8;

                for rank in &self.ranks {
                    let bucket = ((keys[*rank as usize].to_bits() >> shift) & 0xff) as usize;

                    let slot = &mut self.offsets[bucket];
                    self.ranks2[*slot as usize] = *rank;
                    *slot += 1;
                }
            } else {
                // a shared negative top byte still needs the pass: it is the one reversing negative values
                if !pass_required(counts, keys.len()) && negative_count == 0 {
                    continue;
                }

                self.offsets[0] = negative_count;
                for i in 1..128 {
                    self.offsets[i] = self.offsets[i - 1] + counts[i - 1];
                }

                // negative buckets are laid out from 255 down to 128, each one filled from its end
                self.offsets[255] = counts[255];
                for i in (128..255).rev() {
                    self.offsets[i] = self.offsets[i + 1] + counts[i];
                }

                for rank in &self.ranks {
                    let bucket = (keys[*rank as usize].to_bits() >> 24) as usize;

                    let slot = &mut self.offsets[bucket];
                    if bucket < 128 {
                        self.ranks2[*slot as usize] = *rank;
                        *slot += 1;
                    } else {
                        *slot -= 1;
                        self.ranks2[*slot as usize] = *rank;
                    }
                }
            }

            std::mem::swap(&mut self.ranks, &mut self.ranks2);
        }

        self
    }
}

// a pass is useless when every key has the same byte
fn pass_required(counts: &[u32; BUCKETS], count: usize) -> bool {
    counts
        .iter()
        .find(|c| **c != 0)
        .is_some_and(|c| *c as usize != count)
}

fn prefix_offsets(offsets: &mut [u32; BUCKETS], counts: &[u32; BUCKETS]) {
    offsets[0] = 0;
    for i in 1..BUCKETS {
        offsets[i] = offsets[i - 1] + counts[i - 1];
    }
}

/// Returns the permutation that sorts `keys` in ascending order.
pub fn sort_indices(keys: &[u32], signed: bool) -> Vec<u32> {
    RadixSorter::new().sort(keys, signed).ranks().to_vec()
}
