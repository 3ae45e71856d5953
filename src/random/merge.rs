// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::common::Coin;
use crate::common::Lcg64;
use crate::common::RandomSource;
use crate::error::Error;
use crate::error::ErrorKind;

use super::buffer::BufferSet;
use super::buffer::CLEARED;
use super::helper::params_from_eps;
use super::sketch::FinishedRandom;

/// A sorted slice of values tagged with the level the values were
/// collected at. Unlike a buffer, the slice shrinks as it is consumed.
pub(crate) struct MergeItem<'a> {
    pub data: &'a [f64],
    pub level: i32,
}

/// Merges a handful of sorted slices in linear time per emission.
pub(crate) struct MergeSorter<'a> {
    items: Vec<MergeItem<'a>>,
}

impl<'a> MergeSorter<'a> {
    pub fn new(items: Vec<MergeItem<'a>>) -> Self {
        Self { items }
    }

    /// Returns the minimum value across all the slices and the level of
    /// the slice it came from, or None when every slice is drained. Ties
    /// go to the first minimum in scan order.
    pub fn next(&mut self) -> Option<(f64, i32)> {
        if self.items.is_empty() {
            return None;
        }

        let mut val = self.items[0].data[0];
        let mut idx = 0;
        for i in 1..self.items.len() {
            let cand = self.items[i].data[0];
            if cand < val {
                val = cand;
                idx = i;
            }
        }

        let level = self.items[idx].level;
        if self.items[idx].data.len() <= 1 {
            // Drained; drop the slice so it is never scanned again.
            self.items.swap_remove(idx);
        } else {
            self.items[idx].data = &self.items[idx].data[1..];
        }

        Some((val, level))
    }
}

/// Merges pairs of same-level buffers, halving them into the next level
/// with an unbiased coin.
#[derive(Debug, Clone)]
pub(crate) struct BufferMerger<R> {
    coin: Coin<R>,
    scratch: Vec<f64>,
}

impl<R: RandomSource> BufferMerger<R> {
    /// Creates a merger with scratch space for `cap` values.
    pub fn new(cap: usize, rng: R) -> Self {
        Self {
            coin: Coin::new(rng),
            scratch: Vec::with_capacity(cap),
        }
    }

    /// Merges buffer `src` into buffer `dst` within `set`. Both must be
    /// sorted, full, and at the same level. Afterwards `dst` holds half of
    /// the union at level + 1 and `src` is cleared.
    ///
    /// The initial toss picks which parity class of the merged sequence
    /// survives, so every value has an unbiased 1/2 chance of promotion.
    pub fn merge(&mut self, set: &mut BufferSet, dst: usize, src: usize) {
        debug_assert_ne!(dst, src);
        debug_assert_eq!(set.level(dst), set.level(src));
        debug_assert!(set.is_sorted(dst) && set.is_sorted(src));
        debug_assert!(set.is_full(dst) && set.is_full(src));

        self.scratch.clear();
        let mut sorter = MergeSorter::new(vec![
            MergeItem {
                data: set.data(dst),
                level: set.level(dst),
            },
            MergeItem {
                data: set.data(src),
                level: set.level(src),
            },
        ]);

        let mut keep = self.coin.toss();
        while let Some((value, _)) = sorter.next() {
            if keep {
                self.scratch.push(value);
            }
            keep = !keep;
        }

        set.store_merged(dst, &self.scratch);
        set.clear(src);
    }
}

/// Merges `extras` into `primary`, producing a result equivalent to having
/// collected every input's stream into one sketch. All inputs must share
/// the primary's epsilon; the first mismatch is returned as an
/// [`ErrorKind::EpsilonMismatch`] error carrying both values.
///
/// With no extras this is the identity and returns `primary` unchanged.
pub fn merge(
    seed: u64,
    primary: FinishedRandom,
    extras: &[FinishedRandom],
) -> Result<FinishedRandom, Error> {
    if extras.is_empty() {
        return Ok(primary);
    }

    let eps = primary.eps;
    let (b, s) = params_from_eps(eps);
    let mut merger = BufferMerger::new(s, Lcg64::new(seed));

    // Union-copy every input's buffers into one pool.
    let mut n = primary.n;
    let mut pool = BufferSet::new((1 + extras.len()) * primary.buffers.count(), s);
    let mut filled = 0;
    for i in 0..primary.buffers.count() {
        pool.copy_slot_from(filled, &primary.buffers, i);
        filled += 1;
    }
    for extra in extras {
        if extra.eps != eps {
            return Err(Error::new(ErrorKind::EpsilonMismatch {
                primary: eps,
                other: extra.eps,
            }));
        }
        n += extra.n;
        for i in 0..extra.buffers.count() {
            pool.copy_slot_from(filled, &extra.buffers, i);
            filled += 1;
        }
    }

    // Repeatedly walk the pool in level order, merging adjacent pairs of
    // full same-level buffers, until a full pass makes no progress. The
    // walk checks live slot state, so pairs created mid-pass are still
    // candidates on the next pass.
    let mut order: Vec<usize> = (0..pool.count()).collect();
    loop {
        let mut merged = false;
        order.sort_by_key(|&i| pool.level(i));

        for w in 0..order.len() - 1 {
            let lo = order[w];
            let hi = order[w + 1];
            if pool.level(lo) == CLEARED || pool.level(lo) != pool.level(hi) {
                continue;
            }
            if pool.len(lo) != s || pool.len(hi) != s {
                continue;
            }

            if !pool.is_sorted(lo) {
                pool.sort(lo);
            }
            if !pool.is_sorted(hi) {
                pool.sort(hi);
            }

            merged = true;
            merger.merge(&mut pool, hi, lo);
        }

        if !merged {
            break;
        }
    }

    // Keep the b highest-level buffers.
    order.sort_by_key(|&i| pool.level(i));
    let mut buffers = BufferSet::new(b, s);
    for (dst, &src) in order[order.len() - b..].iter().enumerate() {
        buffers.copy_slot_from(dst, &pool, src);
    }

    Ok(FinishedRandom { eps, n, buffers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Pcg32;

    fn item(data: &[f64], level: i32) -> MergeItem<'_> {
        MergeItem { data, level }
    }

    #[test]
    fn test_merge_sorter_orders_values() {
        let a = [1.0, 4.0, 7.0];
        let b = [2.0, 5.0, 8.0];
        let c = [3.0, 6.0, 9.0];
        let mut sorter = MergeSorter::new(vec![item(&a, 0), item(&b, 1), item(&c, 2)]);

        let mut out = Vec::new();
        while let Some((value, _)) = sorter.next() {
            out.push(value);
        }
        assert_eq!(out, (1..=9).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_merge_sorter_tracks_levels() {
        let a = [1.0, 3.0];
        let b = [2.0, 4.0];
        let mut sorter = MergeSorter::new(vec![item(&a, 5), item(&b, 9)]);

        assert_eq!(sorter.next(), Some((1.0, 5)));
        assert_eq!(sorter.next(), Some((2.0, 9)));
        assert_eq!(sorter.next(), Some((3.0, 5)));
        assert_eq!(sorter.next(), Some((4.0, 9)));
        assert_eq!(sorter.next(), None);
    }

    #[test]
    fn test_merge_sorter_empty() {
        let mut sorter = MergeSorter::new(Vec::new());
        assert_eq!(sorter.next(), None);
    }

    #[test]
    fn test_buffer_merger_halves_into_next_level() {
        let mut set = BufferSet::new(2, 4);
        set.set_level(0, 2);
        set.set_level(1, 2);
        for v in [1.0, 3.0, 5.0, 7.0] {
            set.push(0, v);
        }
        for v in [2.0, 4.0, 6.0, 8.0] {
            set.push(1, v);
        }
        set.sort(0);
        set.sort(1);

        let mut merger = BufferMerger::new(4, Pcg32::new(17, 0));
        merger.merge(&mut set, 1, 0);

        // Destination took half the union at the next level.
        assert_eq!(set.level(1), 3);
        assert_eq!(set.len(1), 4);
        assert!(set.is_sorted(1));
        // Source is cleared for reuse.
        assert_eq!(set.level(0), CLEARED);
        assert_eq!(set.len(0), 0);

        // The survivors are one full parity class of 1..=8.
        let kept = set.data(1);
        let odd: &[f64] = &[1.0, 3.0, 5.0, 7.0];
        let even: &[f64] = &[2.0, 4.0, 6.0, 8.0];
        assert!(kept == odd || kept == even, "unexpected survivors {kept:?}");
    }

    #[test]
    fn test_buffer_merger_deterministic_for_seed() {
        let build = || {
            let mut set = BufferSet::new(2, 4);
            for i in 0..2 {
                set.set_level(i, 0);
                for v in 0..4 {
                    set.push(i, (v * 2 + i) as f64);
                }
                set.sort(i);
            }
            set
        };

        let mut first = build();
        let mut second = build();
        BufferMerger::new(4, Pcg32::new(3, 0)).merge(&mut first, 1, 0);
        BufferMerger::new(4, Pcg32::new(3, 0)).merge(&mut second, 1, 0);
        assert_eq!(first.data(1), second.data(1));
    }
}
